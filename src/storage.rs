//! Screenshot storage on disk.
//!
//! Files are named `{slug}_{YYYY-MM-DD}.jpg` (page) and
//! `{slug}_zoom_{YYYY-MM-DD}.jpg` (close-up), so repeated scans on the same
//! day overwrite each other and earlier days are kept.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::imaging::{encode_for_display, run_blocking, Gravity, ImageError};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to prepare screenshot: {0}")]
    Image(#[from] ImageError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which screenshot of a site is being stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenshotKind {
    Page,
    Zoom,
}

impl ScreenshotKind {
    /// Crop anchor for the display frame. Pages keep their bottom edge so
    /// the footer stays visible.
    pub fn gravity(&self) -> Gravity {
        match self {
            ScreenshotKind::Page => Gravity::Bottom,
            ScreenshotKind::Zoom => Gravity::Center,
        }
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// File name for a stored screenshot.
pub fn screenshot_file_name(kind: ScreenshotKind, slug: &str, date: NaiveDate) -> String {
    let day = date.format("%Y-%m-%d");
    match kind {
        ScreenshotKind::Page => format!("{}_{}.jpg", slug, day),
        ScreenshotKind::Zoom => format!("{}_zoom_{}.jpg", slug, day),
    }
}

/// Location of a written screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredScreenshot {
    pub path: PathBuf,
    pub url: String,
}

/// Writes display-ready screenshots and maps them to public URLs.
#[derive(Debug, Clone)]
pub struct ScreenshotStore {
    dir: PathBuf,
    public_base_url: String,
}

impl ScreenshotStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_base_url, file_name)
    }

    /// Fit `bytes` to the display frame, write it, and return where it went.
    pub async fn store(
        &self,
        kind: ScreenshotKind,
        slug: &str,
        date: NaiveDate,
        bytes: &[u8],
    ) -> Result<StoredScreenshot, StorageError> {
        let source = bytes.to_vec();
        let gravity = kind.gravity();
        let framed = run_blocking(move || encode_for_display(&source, gravity)).await?;
        let file_name = screenshot_file_name(kind, slug, date);
        let path = self.dir.join(&file_name);

        let write_error = |source: std::io::Error| StorageError::Write {
            path: path.clone(),
            source,
        };
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(write_error)?;
        tokio::fs::write(&path, &framed).await.map_err(write_error)?;

        tracing::debug!("Stored {} ({} bytes)", path.display(), framed.len());
        Ok(StoredScreenshot {
            url: self.public_url(&file_name),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{decode, encode_png};
    use image::DynamicImage;
    use tempfile::tempdir;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            screenshot_file_name(ScreenshotKind::Page, "acme-test", day()),
            "acme-test_2024-06-03.jpg"
        );
        assert_eq!(
            screenshot_file_name(ScreenshotKind::Zoom, "acme-test", day()),
            "acme-test_zoom_2024-06-03.jpg"
        );
    }

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_public_url_trims_slash() {
        let store = ScreenshotStore::new("/tmp/x", "https://cdn.example.com/shots/");
        assert_eq!(
            store.public_url("a.jpg"),
            "https://cdn.example.com/shots/a.jpg"
        );
    }

    #[tokio::test]
    async fn test_store_writes_display_frame() {
        let dir = tempdir().unwrap();
        let store = ScreenshotStore::new(dir.path().join("shots"), "/screenshots");
        let png = encode_png(&DynamicImage::new_rgb8(960, 2400)).unwrap();

        let stored = store
            .store(ScreenshotKind::Page, "acme-test", day(), &png)
            .await
            .unwrap();

        assert_eq!(stored.url, "/screenshots/acme-test_2024-06-03.jpg");
        let written = std::fs::read(&stored.path).unwrap();
        let image = decode(&written).unwrap();
        assert_eq!((image.width(), image.height()), (1920, 1080));
    }
}
