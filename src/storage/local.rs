use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::{join_url, validate_key, FileStorage, StoredFile};
use crate::types::AppResult;

/// Stores uploads in a directory that the server also exposes read-only.
pub struct LocalStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalStorage {
    pub fn new(root: impl AsRef<Path>, public_base: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            public_base: public_base.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    fn stored_file(&self, key: &str, size: u64, uploaded_at: Option<DateTime<Utc>>) -> StoredFile {
        StoredFile {
            key: key.to_string(),
            url: join_url(&self.public_base, key),
            size,
            uploaded_at,
        }
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn upload(&self, key: &str, data: Bytes, _content_type: &str) -> AppResult<StoredFile> {
        validate_key(key)?;
        self.ensure_dir().await?;

        let path = self.root.join(key);
        fs::write(&path, &data).await?;
        info!(key, size = data.len(), "Stored upload on local disk");

        Ok(self.stored_file(key, data.len() as u64, Some(Utc::now())))
    }

    async fn list(&self) -> AppResult<Vec<StoredFile>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.to_ascii_lowercase().ends_with(".pdf") {
                continue;
            }
            let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
            files.push(self.stored_file(&name, metadata.len(), modified));
        }

        files.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then_with(|| b.key.cmp(&a.key)));
        Ok(files)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        validate_key(key)?;
        match fs::remove_file(self.root.join(key)).await {
            Ok(()) => {
                info!(key, "Deleted local upload");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(key, "Delete of missing local upload ignored");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_list_delete() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("uploads"), "/uploads");

        let stored = storage
            .upload("1-plan.pdf", Bytes::from_static(b"%PDF-1.7"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(stored.url, "/uploads/1-plan.pdf");
        assert_eq!(stored.size, 8);

        // Non-PDF files in the directory are not listed.
        fs::write(storage.root().join("notes.txt"), b"x").await.unwrap();

        let listed = storage.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].key, "1-plan.pdf");

        storage.delete("1-plan.pdf").await.unwrap();
        assert!(storage.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path(), "/uploads");
        storage.delete("missing.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_without_directory() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("not-created"), "/uploads");
        assert!(storage.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path(), "/uploads");
        assert!(storage.delete("../outside.pdf").await.is_err());
        assert!(storage
            .upload("../outside.pdf", Bytes::from_static(b"x"), "application/pdf")
            .await
            .is_err());
    }
}
