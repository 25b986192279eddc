//! Looping GIF via the `image` crate

use image::codecs::gif::{GifEncoder as ImageGifEncoder, Repeat};
use image::{Delay, RgbaImage};

use super::{AnimationEncoder, check_frame_size};
use crate::config::OutputFormat;
use crate::error::OutputError;
use crate::renderer::Frame;

/// Palette quantization speed (1 = best, 30 = fastest)
const DEFAULT_SPEED: i32 = 10;

#[derive(Debug, Clone, Copy)]
pub struct GifEncoder {
    pub speed: i32,
}

impl Default for GifEncoder {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
        }
    }
}

impl AnimationEncoder for GifEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Gif
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
        let delay = Delay::from_numer_denom_ms(frame_duration_ms, 1);

        let mut bytes = Vec::new();
        {
            let mut encoder = ImageGifEncoder::new_with_speed(&mut bytes, self.speed);
            encoder.set_repeat(Repeat::Infinite)?;
            let mut count = 0usize;
            for frame in frames {
                check_frame_size(&frame, expected)?;
                let buffer = RgbaImage::from_raw(frame.width, frame.height, frame.as_bytes().to_vec())
                    .ok_or(OutputError::FrameSize {
                        index: frame.index,
                        expected,
                        actual: (frame.width, frame.height),
                    })?;
                encoder.encode_frame(image::Frame::from_parts(buffer, 0, 0, delay))?;
                count += 1;
            }
            log::debug!("gif: encoded {count} frames at {frame_duration_ms}ms");
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_frames;

    #[test]
    fn test_gif_header() {
        let frames = test_frames::sample(3);
        let bytes = GifEncoder::default()
            .encode(&mut frames.into_iter(), 25)
            .unwrap();
        assert!(bytes.starts_with(b"GIF89a"));
    }

    #[test]
    fn test_gif_loops_forever() {
        let frames = test_frames::sample(2);
        let bytes = GifEncoder::default()
            .encode(&mut frames.into_iter(), 25)
            .unwrap();
        // NETSCAPE2.0 application extension carries the loop count
        assert!(bytes.windows(11).any(|w| w == b"NETSCAPE2.0"));
    }

    #[test]
    fn test_gif_empty() {
        let bytes = GifEncoder::default()
            .encode(&mut std::iter::empty(), 25)
            .unwrap();
        assert!(bytes.is_empty());
    }
}
