// S3-compatible object storage (AWS, R2, MinIO, ...)

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use s3::Bucket;
use tracing::{debug, info};

use super::{join_url, validate_key, FileStorage, StoredFile};
use crate::config::StorageConfig;
use crate::types::{AppError, AppResult};

pub struct S3Storage {
    bucket: Bucket,
    public_base: String,
    prefix: String,
}

impl S3Storage {
    pub fn new(config: &StorageConfig) -> AppResult<Self> {
        let region = match &config.s3_endpoint {
            Some(endpoint) => Region::Custom {
                region: config.s3_region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .s3_region
                .parse()
                .map_err(|e| AppError::Internal(format!("invalid S3 region: {}", e)))?,
        };

        let credentials = Credentials::new(
            config.s3_access_key_id.as_deref(),
            config.s3_secret_access_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("invalid S3 credentials: {}", e)))?;

        let mut bucket = Bucket::new(&config.s3_bucket, region, credentials)?;
        if config.s3_path_style {
            bucket = bucket.with_path_style();
        }

        let public_base = config
            .s3_public_url
            .clone()
            .unwrap_or_else(|| bucket.url());

        Ok(Self {
            bucket,
            public_base,
            prefix: "portfolio/".to_string(),
        })
    }

    fn object_path(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl FileStorage for S3Storage {
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<StoredFile> {
        validate_key(key)?;
        let path = self.object_path(key);

        let response = self
            .bucket
            .put_object_with_content_type(&path, &data, content_type)
            .await?;
        if !(200..300).contains(&response.status_code()) {
            return Err(AppError::Internal(format!(
                "S3 rejected upload of {} with status {}",
                path,
                response.status_code()
            )));
        }
        info!(key = %path, size = data.len(), "Stored upload in object storage");

        Ok(StoredFile {
            key: key.to_string(),
            url: join_url(&self.public_base, &path),
            size: data.len() as u64,
            uploaded_at: Some(Utc::now()),
        })
    }

    async fn list(&self) -> AppResult<Vec<StoredFile>> {
        let pages = self.bucket.list(self.prefix.clone(), None).await?;

        let mut files: Vec<StoredFile> = pages
            .into_iter()
            .flat_map(|page| page.contents)
            .filter_map(|object| {
                let key = object.key.strip_prefix(&self.prefix)?.to_string();
                if key.is_empty() || key.contains('/') {
                    return None;
                }
                Some(StoredFile {
                    url: join_url(&self.public_base, &object.key),
                    key,
                    size: object.size,
                    uploaded_at: DateTime::parse_from_rfc3339(&object.last_modified)
                        .ok()
                        .map(|t| t.with_timezone(&Utc)),
                })
            })
            .collect();

        files.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then_with(|| b.key.cmp(&a.key)));
        Ok(files)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        validate_key(key)?;
        let path = self.object_path(key);
        // S3 answers 204 for keys that do not exist; some compatible stores answer 404.
        let status = match self.bucket.delete_object(&path).await {
            Ok(response) => response.status_code(),
            Err(S3Error::HttpFailWithBody(404, _)) => 404,
            Err(e) => return Err(e.into()),
        };
        match status {
            404 => debug!(key = %path, "Object was already gone"),
            200..=299 => info!(key = %path, "Deleted object"),
            _ => {
                return Err(AppError::Internal(format!(
                    "S3 rejected delete of {} with status {}",
                    path, status
                )))
            }
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, StorageProvider};
    use std::path::PathBuf;

    fn s3_config() -> StorageConfig {
        let mut config = Config::for_local(PathBuf::from("uploads"), "secret").storage;
        config.provider = StorageProvider::S3;
        config.s3_bucket = "studio-portfolio".to_string();
        config.s3_endpoint = Some("http://127.0.0.1:9000".to_string());
        config.s3_path_style = true;
        config.s3_access_key_id = Some("minio".to_string());
        config.s3_secret_access_key = Some("minio-secret".to_string());
        config
    }

    #[test]
    fn test_public_url_override() {
        let mut config = s3_config();
        config.s3_public_url = Some("https://cdn.example.com/".to_string());
        let storage = S3Storage::new(&config).unwrap();
        assert_eq!(storage.object_path("1-a.pdf"), "portfolio/1-a.pdf");
        assert_eq!(
            join_url(&storage.public_base, &storage.object_path("1-a.pdf")),
            "https://cdn.example.com/portfolio/1-a.pdf"
        );
    }

    #[test]
    fn test_path_style_bucket_url() {
        let storage = S3Storage::new(&s3_config()).unwrap();
        assert!(storage.public_base.starts_with("http://127.0.0.1:9000"));
        assert!(storage.public_base.ends_with("studio-portfolio"));
    }

    fn storage_at(server: &mockito::Server) -> S3Storage {
        let mut config = s3_config();
        config.s3_endpoint = Some(server.url());
        S3Storage::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_upload_puts_pdf_under_prefix() {
        let mut server = mockito::Server::new_async().await;
        let put = server
            .mock("PUT", "/studio-portfolio/portfolio/1-a.pdf")
            .match_header("content-type", "application/pdf")
            .with_status(200)
            .with_header("ETag", "\"abc\"")
            .expect(2)
            .create_async()
            .await;

        let stored = storage_at(&server)
            .upload("1-a.pdf", Bytes::from_static(b"%PDF-1.4"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(stored.key, "1-a.pdf");
        assert_eq!(stored.size, 8);
        assert_eq!(
            stored.url,
            format!("{}/studio-portfolio/portfolio/1-a.pdf", server.url())
        );

        let mut config = s3_config();
        config.s3_endpoint = Some(server.url());
        config.s3_public_url = Some("https://cdn.example.com".to_string());
        let stored = S3Storage::new(&config)
            .unwrap()
            .upload("1-a.pdf", Bytes::from_static(b"%PDF-1.4"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(stored.url, "https://cdn.example.com/portfolio/1-a.pdf");
        put.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_rejected_by_store_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/studio-portfolio/portfolio/1-a.pdf")
            .with_status(403)
            .with_body("<Error><Code>AccessDenied</Code></Error>")
            .create_async()
            .await;

        let result = storage_at(&server)
            .upload("1-a.pdf", Bytes::from_static(b"%PDF-1.4"), "application/pdf")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_keeps_direct_children_newest_first() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>studio-portfolio</Name>
  <Prefix>portfolio/</Prefix>
  <MaxKeys>1000</MaxKeys>
  <IsTruncated>false</IsTruncated>
  <Contents>
    <Key>portfolio/</Key>
    <LastModified>2023-11-01T00:00:00.000Z</LastModified>
    <Size>0</Size>
  </Contents>
  <Contents>
    <Key>portfolio/1700000000000-a.pdf</Key>
    <LastModified>2023-11-14T22:13:20.000Z</LastModified>
    <Size>120</Size>
  </Contents>
  <Contents>
    <Key>portfolio/1800000000000-b.pdf</Key>
    <LastModified>2027-01-15T08:00:00.000Z</LastModified>
    <Size>340</Size>
  </Contents>
  <Contents>
    <Key>portfolio/nested/c.pdf</Key>
    <LastModified>2028-01-01T00:00:00.000Z</LastModified>
    <Size>10</Size>
  </Contents>
</ListBucketResult>"#;
        server
            .mock("GET", "/studio-portfolio/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/xml")
            .with_body(body)
            .create_async()
            .await;

        let files = storage_at(&server).list().await.unwrap();
        let keys: Vec<&str> = files.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["1800000000000-b.pdf", "1700000000000-a.pdf"]);
        assert_eq!(files[0].size, 340);
        assert_eq!(
            files[1].url,
            format!("{}/studio-portfolio/portfolio/1700000000000-a.pdf", server.url())
        );
        assert!(files.iter().all(|f| f.uploaded_at.is_some()));
    }

    #[tokio::test]
    async fn test_delete_succeeds_for_removed_and_missing_objects() {
        let mut server = mockito::Server::new_async().await;
        let removed = server
            .mock("DELETE", "/studio-portfolio/portfolio/1-a.pdf")
            .with_status(204)
            .create_async()
            .await;
        let missing = server
            .mock("DELETE", "/studio-portfolio/portfolio/2-b.pdf")
            .with_status(404)
            .with_body("<Error><Code>NoSuchKey</Code></Error>")
            .create_async()
            .await;

        let storage = storage_at(&server);
        storage.delete("1-a.pdf").await.unwrap();
        storage.delete("2-b.pdf").await.unwrap();
        removed.assert_async().await;
        missing.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_surfaces_other_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/studio-portfolio/portfolio/1-a.pdf")
            .with_status(500)
            .with_body("<Error><Code>InternalError</Code></Error>")
            .create_async()
            .await;

        assert!(storage_at(&server).delete("1-a.pdf").await.is_err());
    }
}
