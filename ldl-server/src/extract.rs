//! PDF text extraction.

use ldl_common::{Error, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Extract the raw text content of a PDF file.
///
/// Formatting (line breaks, column order) follows whatever the underlying
/// parser emits. Corrupt or non-PDF input yields [`Error::DocumentParse`]
/// carrying the parser's message; callers surface that as a generic failure,
/// never retry. The file itself is left in place.
pub fn extract_text(path: &Path) -> Result<String> {
    pdf_extract::extract_text(path).map_err(|e| Error::DocumentParse(e.to_string()))
}

/// Extract text from in-memory PDF bytes.
///
/// The bytes are staged in a uniquely named temp file that is removed on
/// every exit path, success or failure, so concurrent uploads never collide
/// and parse failures never leak files.
pub fn extract_from_bytes(bytes: &[u8]) -> Result<String> {
    let mut staged = NamedTempFile::new()?;
    staged.write_all(bytes)?;
    extract_text(staged.path())
}
