//! CSV export of scraped posts.
//!
//! Files are UTF-8 with a leading byte-order mark so spreadsheet tools pick
//! the right encoding. Absent fields are written as empty cells and read back
//! as absent.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::models::PostRecord;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Write posts to `path`, replacing any existing file.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_posts(path: &Path, posts: &[PostRecord]) -> Result<usize, ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    let csv_err = |source| ExportError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut file = BufWriter::new(File::create(path).map_err(io_err)?);
    file.write_all(UTF8_BOM).map_err(io_err)?;

    let mut writer = csv::Writer::from_writer(file);
    if posts.is_empty() {
        // serde only emits the header alongside the first record
        writer.write_record(HEADER).map_err(csv_err)?;
    }
    for post in posts {
        writer.serialize(post).map_err(csv_err)?;
    }
    writer.flush().map_err(io_err)?;

    info!(count = posts.len(), path = %path.display(), "Saved posts");
    Ok(posts.len())
}

/// Read posts previously written by [`write_posts`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or a row does not parse.
pub fn read_posts(path: &Path) -> Result<Vec<PostRecord>, ExportError> {
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;

    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    csv::Reader::from_reader(body)
        .deserialize()
        .collect::<Result<Vec<PostRecord>, _>>()
        .map_err(|source| ExportError::Csv {
            path: path.display().to_string(),
            source,
        })
}

/// Column names in output order.
pub const HEADER: [&str; 7] = [
    "post_text",
    "likes",
    "comments",
    "shares",
    "post_time",
    "content_type",
    "post_link",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;

    #[test]
    fn test_header_matches_serialized_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.csv");
        write_posts(&path, &[PostRecord::empty(ContentType::Text)]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let first_line = contents.trim_start_matches('\u{feff}').lines().next().unwrap();
        assert_eq!(first_line, HEADER.join(","));
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        assert_eq!(write_posts(&path, &[]).unwrap(), 0);

        let contents = std::fs::read(&path).unwrap();
        assert!(contents.starts_with(UTF8_BOM));
        assert!(read_posts(&path).unwrap().is_empty());
    }
}
