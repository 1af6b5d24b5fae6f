//! Media uploader capability
//!
//! Stores photo binaries and returns a stable reference (public id +
//! URL) that step 2 later attaches to the listing. Production points
//! this trait at object storage; the bundled implementation writes to
//! the local media root.

use std::path::{Path, PathBuf};

use lodgekeep_core::{Error, PhotoInput, Result};
use tracing::instrument;
use uuid::Uuid;

/// Upload cap, matching the per-listing photo limit
pub const MAX_UPLOAD_PHOTOS: usize = 5;

/// Object storage capability for listing photos
pub trait MediaUploader: Send + Sync {
    /// Store one photo and return its stable reference
    fn upload(&self, filename: &str, bytes: &[u8]) -> Result<PhotoInput>;
}

/// Filesystem-backed uploader for development and tests
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl MediaUploader for LocalMediaStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    fn upload(&self, filename: &str, bytes: &[u8]) -> Result<PhotoInput> {
        let id = Uuid::new_v4();
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");

        let dest = self.root.join(format!("{id}.{extension}"));
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Upload(format!("could not create media root: {e}")))?;
        }
        std::fs::write(&dest, bytes)
            .map_err(|e| Error::Upload(format!("could not store {filename}: {e}")))?;

        Ok(PhotoInput {
            public_id: format!("listings/{id}"),
            secure_url: format!("file://{}", dest.display()),
        })
    }
}

/// Upload a batch of listing photos ahead of a step-2 apply.
///
/// The batch is bounded before any upload starts; an individual upload
/// failure surfaces as an upload error, distinct from validation.
pub fn upload_listing_photos(
    uploader: &dyn MediaUploader,
    files: &[(String, Vec<u8>)],
) -> Result<Vec<PhotoInput>> {
    if files.is_empty() {
        return Err(Error::Validation(vec!["No photos uploaded".to_string()]));
    }
    if files.len() > MAX_UPLOAD_PHOTOS {
        return Err(Error::Validation(vec![
            "Maximum 5 photos allowed".to_string()
        ]));
    }

    files
        .iter()
        .map(|(filename, bytes)| uploader.upload(filename, bytes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalMediaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path().join("media"));
        (dir, store)
    }

    #[test]
    fn test_upload_writes_file_and_returns_reference() {
        let (_dir, store) = store();
        let result = store.upload("front.jpg", b"jpeg-bytes").unwrap();

        assert!(result.public_id.starts_with("listings/"));
        assert!(result.secure_url.starts_with("file://"));
        assert!(result.secure_url.ends_with(".jpg"));
    }

    #[test]
    fn test_batch_rejects_empty_and_oversized() {
        let (_dir, store) = store();

        let err = upload_listing_photos(&store, &[]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let files: Vec<(String, Vec<u8>)> = (0..6)
            .map(|i| (format!("p{i}.jpg"), vec![0u8; 4]))
            .collect();
        let err = upload_listing_photos(&store, &files).unwrap_err();
        match err {
            Error::Validation(messages) => {
                assert_eq!(messages, vec!["Maximum 5 photos allowed".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_batch_uploads_each_file() {
        let (_dir, store) = store();
        let files = vec![
            ("a.jpg".to_string(), b"a".to_vec()),
            ("b.png".to_string(), b"b".to_vec()),
        ];

        let uploads = upload_listing_photos(&store, &files).unwrap();
        assert_eq!(uploads.len(), 2);
        assert!(uploads[1].secure_url.ends_with(".png"));
    }
}
