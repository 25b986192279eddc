//! Lossless animated WebP via `webp-animation`

use webp_animation::{Encoder, EncoderOptions, EncodingConfig, EncodingType};

use super::{AnimationEncoder, check_frame_size};
use crate::config::OutputFormat;
use crate::error::OutputError;
use crate::renderer::Frame;

/// libwebp effort level (0 = fast, 6 = smallest)
const METHOD: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct WebpEncoder;

fn webp_error(err: webp_animation::Error) -> OutputError {
    OutputError::Webp(format!("{err:?}"))
}

impl AnimationEncoder for WebpEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Webp
    }

    fn encode(
        &self,
        frames: &mut dyn Iterator<Item = Frame>,
        frame_duration_ms: u32,
    ) -> Result<Vec<u8>, OutputError> {
        let mut frames = frames.peekable();
        let Some(first) = frames.peek() else {
            return Ok(Vec::new());
        };
        let expected = (first.width, first.height);

        // Loop count defaults to 0, which loops forever
        let options = EncoderOptions {
            encoding_config: Some(EncodingConfig {
                encoding_type: EncodingType::Lossless,
                quality: 100.0,
                method: METHOD,
            }),
            ..Default::default()
        };
        let mut encoder = Encoder::new_with_options(expected, options).map_err(webp_error)?;

        // Timestamps must strictly increase
        let step = i32::try_from(frame_duration_ms).unwrap_or(i32::MAX).max(1);
        let mut timestamp = 0i32;
        let mut count = 0usize;
        for frame in frames {
            check_frame_size(&frame, expected)?;
            encoder
                .add_frame(frame.as_bytes(), timestamp)
                .map_err(webp_error)?;
            timestamp = timestamp.saturating_add(step);
            count += 1;
        }
        let data = encoder.finalize(timestamp).map_err(webp_error)?;
        log::debug!("webp: encoded {count} frames at {frame_duration_ms}ms");
        Ok(data.to_vec())
    }
}
