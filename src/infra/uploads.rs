//! Filesystem storage for images uploaded through the admin API.

use std::path::{Component, Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};
use slug::slugify;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::fs;
use tracing::info;

const TARGET: &str = "vitrine::uploads";

#[derive(Debug, Error)]
pub enum ImageStorageError {
    #[error("invalid stored path")]
    InvalidPath,
    #[error("image payload is not valid base64")]
    InvalidEncoding(#[from] base64::DecodeError),
    #[error("image payload is empty")]
    EmptyPayload,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Images stored flat under one directory and served from `public_base_url`.
#[derive(Debug)]
pub struct ImageStorage {
    root: PathBuf,
    public_base_url: String,
}

impl ImageStorage {
    /// Initialise storage rooted at the provided directory, creating it if necessary.
    pub fn new(root: PathBuf, public_base_url: impl Into<String>) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decode a base64 image (optionally a `data:image/...;base64,` URL) and
    /// store it. Returns the public URL.
    pub async fn store_base64(
        &self,
        filename: &str,
        data: &str,
    ) -> Result<String, ImageStorageError> {
        let bytes = STANDARD.decode(strip_data_url(data).trim())?;
        if bytes.is_empty() {
            return Err(ImageStorageError::EmptyPayload);
        }

        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let stored_name = format!("{millis}-{}", sanitize_filename(filename));
        let absolute = self.resolve(&stored_name)?;
        fs::write(&absolute, &bytes).await?;

        info!(
            target = TARGET,
            name = %stored_name,
            size_bytes = bytes.len(),
            "Image stored"
        );
        Ok(format!("{}/{stored_name}", self.public_base_url))
    }

    /// Remove the image a public URL points at. Missing files are treated as success.
    pub async fn delete_by_url(&self, url: &str) -> Result<(), ImageStorageError> {
        let name = url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .ok_or(ImageStorageError::InvalidPath)?;
        let absolute = self.resolve(name)?;
        match fs::remove_file(&absolute).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ImageStorageError::Io(err)),
        }
    }

    fn resolve(&self, stored_name: &str) -> Result<PathBuf, ImageStorageError> {
        let relative = Path::new(stored_name);
        let mut components = relative.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(relative)),
            _ => Err(ImageStorageError::InvalidPath),
        }
    }
}

fn strip_data_url(data: &str) -> &str {
    match data.strip_prefix("data:image/") {
        Some(rest) => rest
            .split_once(";base64,")
            .map_or(data, |(_, payload)| payload),
        None => data,
    }
}

fn sanitize_filename(original: &str) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("image");
    let mut base = slugify(stem);
    if base.is_empty() {
        base = "image".to_string();
    }

    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.trim_matches('.').to_ascii_lowercase())
        .filter(|value| !value.is_empty());

    match extension {
        Some(ext) => format!("{base}.{ext}"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn storage(dir: &TempDir) -> ImageStorage {
        ImageStorage::new(dir.path().join("uploads"), "/uploads/").expect("storage")
    }

    #[tokio::test]
    async fn stores_data_url_payload() {
        let dir = TempDir::new().expect("tempdir");
        let storage = storage(&dir);
        let payload = format!("data:image/png;base64,{}", STANDARD.encode(b"png-bytes"));

        let url = storage
            .store_base64("My Photo.PNG", &payload)
            .await
            .expect("stored");

        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("-my-photo.png"));
        let name = url.rsplit('/').next().expect("name");
        let written = std::fs::read(storage.root().join(name)).expect("file");
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn rejects_empty_and_malformed_payloads() {
        let dir = TempDir::new().expect("tempdir");
        let storage = storage(&dir);

        assert!(matches!(
            storage.store_base64("a.png", "").await,
            Err(ImageStorageError::EmptyPayload)
        ));
        assert!(matches!(
            storage.store_base64("a.png", "not base64!").await,
            Err(ImageStorageError::InvalidEncoding(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = TempDir::new().expect("tempdir");
        let storage = storage(&dir);
        let url = storage
            .store_base64("logo.svg", &STANDARD.encode(b"<svg/>"))
            .await
            .expect("stored");

        storage.delete_by_url(&url).await.expect("delete");
        storage.delete_by_url(&url).await.expect("delete again");

        let name = url.rsplit('/').next().expect("name");
        assert!(!storage.root().join(name).exists());
    }

    #[tokio::test]
    async fn delete_rejects_traversal() {
        let dir = TempDir::new().expect("tempdir");
        let storage = storage(&dir);

        assert!(matches!(
            storage.delete_by_url("https://cdn.example.com/uploads/").await,
            Err(ImageStorageError::InvalidPath)
        ));
        assert!(matches!(
            storage.delete_by_url("/uploads/..").await,
            Err(ImageStorageError::InvalidPath)
        ));
    }

    #[test]
    fn strips_only_image_data_urls() {
        assert_eq!(strip_data_url("data:image/jpeg;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url("QUJD"), "QUJD");
    }
}
