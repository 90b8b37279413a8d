use std::io::{Cursor, Write};

use anyhow::Context;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ApiError;
use crate::models::FileSet;

/// Reduces an archive entry name to `[A-Za-z0-9._-]`. An empty result gets
/// the placeholder name so every entry stays addressable.
pub fn sanitize_filename(name: &str) -> String {
    let safe: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    if safe.is_empty() {
        "file.txt".to_string()
    } else {
        safe
    }
}

/// Packages a FileSet into an in-memory deflate ZIP. The stream is
/// single-use: built once per successful request and discarded after send.
pub fn build_zip(files: &FileSet) -> Result<Vec<u8>, ApiError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for (filename, content) in files {
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        writer
            .start_file(sanitize_filename(filename), options)
            .context("failed to start zip entry")?;
        writer
            .write_all(content.as_bytes())
            .context("failed to write zip entry")?;
    }

    let cursor = writer.finish().context("failed to finalize zip")?;
    Ok(cursor.into_inner())
}
