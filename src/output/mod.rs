//! Animation encoding and file output
//!
//! Encoders consume frames lazily and return the finished container in
//! memory. Nothing touches the filesystem until encoding has succeeded, and
//! then only through `write_atomic`.

pub mod dataurl;
pub mod gif;
pub mod webp;

use std::io::{self, Write};
use std::path::Path;

use crate::config::OutputFormat;
use crate::error::OutputError;
use crate::renderer::Frame;

pub use dataurl::{data_url, img_tag, splice_section, write_data_url_section};
pub use gif::GifEncoder;
pub use webp::WebpEncoder;

/// Opening marker of the README section that receives the animation
pub const SECTION_START_MARKER: &str = "<!-- gh-space-shooter:start -->";
/// Closing marker of that section
pub const SECTION_END_MARKER: &str = "<!-- gh-space-shooter:end -->";

/// Turns a frame stream into an animation container
pub trait AnimationEncoder {
    fn format(&self) -> OutputFormat;

    /// Encode every frame, each shown for `frame_duration_ms`.
    /// An empty stream encodes to an empty byte vector.
    fn encode(
        &self,
        frames: &mut dyn Iterator<Item = Frame>,
        frame_duration_ms: u32,
    ) -> Result<Vec<u8>, OutputError>;
}

pub fn encoder_for(format: OutputFormat) -> Box<dyn AnimationEncoder> {
    match format {
        OutputFormat::Gif => Box::new(GifEncoder::default()),
        OutputFormat::Webp => Box::new(WebpEncoder),
    }
}

/// All frames of one animation must share the first frame's size
pub(crate) fn check_frame_size(frame: &Frame, expected: (u32, u32)) -> Result<(), OutputError> {
    let actual = (frame.width, frame.height);
    if actual != expected {
        return Err(OutputError::FrameSize {
            index: frame.index,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Write through a temp file in the target directory, then rename over the
/// target, so readers never observe a partial file. The temp file is removed
/// on every failure path.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    let io_err = |source: io::Error| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".gh-space-shooter.")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
