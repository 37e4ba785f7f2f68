//! Local filesystem implementation of the `ImageStore` port.
//!
//! Uploads land under a flat directory with uuid filenames; the stored
//! reference is the public URL the router serves them from.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use domains::{AppError, ImageStore, Result};

pub struct LocalImageStore {
    /// Root directory for all uploads (e.g. "./data/uploads").
    root: PathBuf,
    /// Public URL prefix (e.g. "/static/uploads").
    public_base: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    fn extension_for(content_type: &str) -> Result<&'static str> {
        match content_type {
            "image/jpeg" => Ok("jpg"),
            "image/png" => Ok("png"),
            "image/webp" => Ok("webp"),
            other => Err(AppError::Validation(format!(
                "unsupported image type: {other}"
            ))),
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, data: Vec<u8>, content_type: &str) -> Result<String> {
        if data.is_empty() {
            return Err(AppError::Validation("empty image upload".into()));
        }
        let ext = Self::extension_for(content_type)?;
        let filename = format!("{}.{ext}", Uuid::new_v4());

        fs::create_dir_all(&self.root)
            .await
            .map_err(AppError::internal)?;
        fs::write(self.root.join(&filename), &data)
            .await
            .map_err(AppError::internal)?;

        Ok(format!("{}/{filename}", self.public_base))
    }

    async fn remove(&self, reference: &str) -> Result<()> {
        let filename = reference
            .strip_prefix(&self.public_base)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| AppError::Validation("unknown image reference".into()))?;
        // flat directory only; a separator here means the reference is not ours
        if filename.contains('/') || filename.contains("..") {
            return Err(AppError::Validation("unknown image reference".into()));
        }
        match fs::remove_file(self.root.join(filename)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::internal(err)),
        }
    }
}
