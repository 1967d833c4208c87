use std::path::{Path, PathBuf};

use doctree::DocumentFormat;
use tracing::{debug, warn};

use crate::error::UploadError;

/// Reads a local `.md`/`.html` file chosen for a new document.
///
/// The extension is checked before the file is opened; the text is returned
/// as-is, Markdown included.
pub async fn read_upload(path: Option<&Path>) -> Result<String, UploadError> {
    let path = check_upload_path(path)?;

    debug!("Reading uploaded file {}", path.display());
    tokio::fs::read_to_string(path).await.map_err(|e| {
        warn!("Failed to read uploaded file {}: {}", path.display(), e);
        UploadError::Read {
            path: path.to_path_buf(),
            kind: e.kind(),
        }
    })
}

pub fn check_upload_path(path: Option<&Path>) -> Result<&Path, UploadError> {
    let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
        return Err(UploadError::NoFileSelected);
    };

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    if DocumentFormat::from_name(file_name).is_none() {
        return Err(UploadError::UnsupportedExtension(PathBuf::from(path)));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[tokio::test]
    async fn reads_markdown_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.md");
        std::fs::write(&path, "# Guide\n\nraw *markdown*").unwrap();

        let text = read_upload(Some(&path)).await.unwrap();
        assert_eq!(text, "# Guide\n\nraw *markdown*");
    }

    #[tokio::test]
    async fn nothing_selected() {
        let err = read_upload(None).await.unwrap_err();
        assert_eq!(err.to_string(), "Please select a file to upload.");
        assert_eq!(
            read_upload(Some(Path::new(""))).await.unwrap_err(),
            UploadError::NoFileSelected
        );
    }

    #[tokio::test]
    async fn wrong_extension_is_rejected_before_reading() {
        // does not exist: the extension check must come first
        let err = read_upload(Some(Path::new("/nowhere/photo.png")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please select a .md or .html file.");
    }

    #[tokio::test]
    async fn unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.html");
        let err = read_upload(Some(&path)).await.unwrap_err();
        assert_eq!(
            err,
            UploadError::Read {
                path,
                kind: ErrorKind::NotFound
            }
        );
        assert_eq!(err.to_string(), "Error reading file content.");
    }
}
