//! Base64 data URLs and README section splicing

use std::fs;
use std::io;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::{SECTION_END_MARKER, SECTION_START_MARKER, write_atomic};
use crate::config::OutputFormat;
use crate::error::OutputError;

/// `data:image/<fmt>;base64,...`
pub fn data_url(bytes: &[u8], format: OutputFormat) -> String {
    format!("data:{};base64,{}", format.mime_type(), BASE64.encode(bytes))
}

pub fn img_tag(url: &str) -> String {
    format!("<img src=\"{url}\" />")
}

/// Replace everything between the section markers with `payload`.
///
/// Text outside the markers is preserved byte for byte. Missing or
/// misordered markers are errors, never a silent append.
pub fn splice_section(content: &str, payload: &str) -> Result<String, OutputError> {
    let start = content
        .find(SECTION_START_MARKER)
        .ok_or(OutputError::StartMarkerMissing)?;
    let body_start = start + SECTION_START_MARKER.len();
    let end = match content[body_start..].find(SECTION_END_MARKER) {
        Some(offset) => body_start + offset,
        None if content.contains(SECTION_END_MARKER) => {
            return Err(OutputError::MarkersOutOfOrder);
        }
        None => return Err(OutputError::EndMarkerMissing),
    };

    let mut out = String::with_capacity(content.len() + payload.len());
    out.push_str(&content[..body_start]);
    out.push('\n');
    out.push_str(payload);
    out.push('\n');
    out.push_str(&content[end..]);
    Ok(out)
}

/// Splice `payload` into the marked section of `path`. A missing file is
/// created holding just the markers and the payload.
pub fn write_data_url_section(path: &Path, payload: &str) -> Result<(), OutputError> {
    let updated = match fs::read_to_string(path) {
        Ok(content) => splice_section(&content, payload)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("{} does not exist, creating it", path.display());
            format!("{SECTION_START_MARKER}\n{payload}\n{SECTION_END_MARKER}\n")
        }
        Err(source) => {
            return Err(OutputError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    write_atomic(path, updated.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(body: &str) -> String {
        format!("# Me\n\n{SECTION_START_MARKER}\n{body}\n{SECTION_END_MARKER}\n\nfooter\n")
    }

    #[test]
    fn test_data_url_prefix() {
        assert_eq!(data_url(b"hi", OutputFormat::Webp), "data:image/webp;base64,aGk=");
        assert!(data_url(b"", OutputFormat::Gif).starts_with("data:image/gif;base64,"));
        assert_eq!(img_tag("data:x"), "<img src=\"data:x\" />");
    }

    #[test]
    fn test_splice_replaces_between_markers() {
        let out = splice_section(&section("old\nstuff"), "NEW").unwrap();
        assert_eq!(out, section("NEW"));
    }

    #[test]
    fn test_splice_is_repeatable() {
        let once = splice_section(&section(""), "A").unwrap();
        let twice = splice_section(&once, "B").unwrap();
        assert_eq!(twice, section("B"));
    }

    #[test]
    fn test_splice_missing_markers() {
        assert!(matches!(
            splice_section("no markers", "x"),
            Err(OutputError::StartMarkerMissing)
        ));
        let only_start = format!("{SECTION_START_MARKER}\nbody\n");
        assert!(matches!(
            splice_section(&only_start, "x"),
            Err(OutputError::EndMarkerMissing)
        ));
    }

    #[test]
    fn test_splice_out_of_order() {
        let reversed = format!("{SECTION_END_MARKER}\nbody\n{SECTION_START_MARKER}\n");
        let err = splice_section(&reversed, "x").unwrap_err();
        assert!(matches!(err, OutputError::MarkersOutOfOrder));
        assert!(err.to_string().contains("must appear before"));
    }

    #[test]
    fn test_write_section_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, section("old")).unwrap();
        write_data_url_section(&path, "<img src=\"x\" />").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), section("<img src=\"x\" />"));
    }

    #[test]
    fn test_write_section_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.md");
        write_data_url_section(&path, "payload").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{SECTION_START_MARKER}\npayload\n{SECTION_END_MARKER}\n")
        );
    }

    #[test]
    fn test_write_section_error_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, "no markers here\n").unwrap();
        assert!(write_data_url_section(&path, "x").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "no markers here\n");
    }
}
