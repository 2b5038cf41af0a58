use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// 10 MiB, the ceiling the admin upload form advertises.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Longest accepted session, one year.
pub const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub kv: KvConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub public_dir: PathBuf,
    /// Externally visible origin, used for OAuth redirect URIs.
    pub site_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KvProvider {
    Redis,
    Memory,
}

impl KvProvider {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(KvProvider::Redis),
            "memory" => Ok(KvProvider::Memory),
            other => bail!("unknown KV_PROVIDER '{}', expected 'redis' or 'memory'", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KvConfig {
    pub provider: KvProvider,
    pub redis_url: String,
    pub key_prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Local,
    S3,
}

impl StorageProvider {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "fs" => Ok(StorageProvider::Local),
            "s3" => Ok(StorageProvider::S3),
            other => bail!("unknown STORAGE_PROVIDER '{}', expected 'local' or 's3'", other),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub upload_dir: PathBuf,
    pub upload_public_base: String,
    pub max_upload_bytes: usize,
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>,
    pub s3_public_url: Option<String>,
    pub s3_path_style: bool,
    pub s3_access_key_id: Option<String>,
    pub s3_secret_access_key: Option<String>,
}

// Credentials stay out of the start-up log line.
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("provider", &self.provider)
            .field("upload_dir", &self.upload_dir)
            .field("upload_public_base", &self.upload_public_base)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_region", &self.s3_region)
            .field("s3_endpoint", &self.s3_endpoint)
            .field("s3_public_url", &self.s3_public_url)
            .field("s3_path_style", &self.s3_path_style)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
    pub admin_email: Option<String>,
    pub admin_password_hash: Option<String>,
    pub session_ttl_secs: i64,
    pub cookie_secure: bool,
    pub github: GithubOAuthConfig,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_email", &self.admin_email)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("cookie_secure", &self.cookie_secure)
            .field("github", &self.github)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Deserialize)]
pub struct GithubOAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub allowed_logins: Vec<String>,
    pub oauth_url: String,
    pub api_url: String,
}

impl GithubOAuthConfig {
    /// OAuth sign-in is only offered when both client credentials are set.
    pub fn is_enabled(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

impl std::fmt::Debug for GithubOAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubOAuthConfig")
            .field("client_id", &self.client_id)
            .field("allowed_logins", &self.allowed_logins)
            .field("oauth_url", &self.oauth_url)
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

fn csv_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .context("PORT must be a valid port number")?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: csv_list(
                    &env::var("ALLOWED_ORIGINS")
                        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string()),
                ),
                public_dir: PathBuf::from(
                    env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()),
                ),
                site_url: env::var("SITE_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
            kv: KvConfig {
                provider: KvProvider::parse(
                    &env::var("KV_PROVIDER").unwrap_or_else(|_| "redis".to_string()),
                )?,
                redis_url: env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
                key_prefix: env::var("KV_PREFIX").unwrap_or_default(),
            },
            storage: StorageConfig {
                provider: StorageProvider::parse(
                    &env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "local".to_string()),
                )?,
                upload_dir: PathBuf::from(
                    env::var("UPLOAD_DIR").unwrap_or_else(|_| "public/uploads".to_string()),
                ),
                upload_public_base: env::var("UPLOAD_PUBLIC_BASE")
                    .unwrap_or_else(|_| "/uploads".to_string()),
                max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                    .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
                    .parse()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                s3_bucket: env::var("S3_BUCKET").unwrap_or_default(),
                s3_region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                s3_endpoint: non_empty("S3_ENDPOINT"),
                s3_public_url: non_empty("S3_PUBLIC_URL"),
                s3_path_style: env::var("S3_PATH_STYLE")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .context("S3_PATH_STYLE must be true or false")?,
                s3_access_key_id: non_empty("AWS_ACCESS_KEY_ID"),
                s3_secret_access_key: non_empty("AWS_SECRET_ACCESS_KEY"),
            },
            auth: AuthConfig {
                secret: non_empty("AUTH_SECRET").context("AUTH_SECRET must be set")?,
                admin_email: non_empty("ADMIN_EMAIL"),
                admin_password_hash: non_empty("ADMIN_PASSWORD_HASH"),
                session_ttl_secs: env::var("SESSION_TTL_SECS")
                    .unwrap_or_else(|_| "86400".to_string())
                    .parse()
                    .context("SESSION_TTL_SECS must be a number of seconds")?,
                cookie_secure: env::var("COOKIE_SECURE")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .context("COOKIE_SECURE must be true or false")?,
                github: GithubOAuthConfig {
                    client_id: non_empty("GITHUB_CLIENT_ID"),
                    client_secret: non_empty("GITHUB_CLIENT_SECRET"),
                    allowed_logins: csv_list(&env::var("GITHUB_ALLOWED_LOGINS").unwrap_or_default()),
                    oauth_url: env::var("GITHUB_OAUTH_URL")
                        .unwrap_or_else(|_| "https://github.com/login/oauth".to_string()),
                    api_url: env::var("GITHUB_API_URL")
                        .unwrap_or_else(|_| "https://api.github.com".to_string()),
                },
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.storage.provider == StorageProvider::S3 && self.storage.s3_bucket.is_empty() {
            bail!("S3_BUCKET must be set when STORAGE_PROVIDER=s3");
        }
        if self.storage.max_upload_bytes == 0 {
            bail!("MAX_UPLOAD_BYTES must be greater than zero");
        }
        if self.auth.session_ttl_secs <= 0 {
            bail!("SESSION_TTL_SECS must be positive");
        }
        if self.auth.session_ttl_secs > MAX_SESSION_TTL_SECS {
            bail!(
                "SESSION_TTL_SECS must be at most {} (one year)",
                MAX_SESSION_TTL_SECS
            );
        }
        Ok(())
    }

    /// Configuration for tests and local tooling: in-memory documents,
    /// uploads under `upload_dir`.
    pub fn for_local(upload_dir: PathBuf, secret: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                port: 3000,
                host: "127.0.0.1".to_string(),
                cors_allowed_origins: vec!["http://localhost:3000".to_string()],
                public_dir: PathBuf::from("public"),
                site_url: "http://localhost:3000".to_string(),
            },
            kv: KvConfig {
                provider: KvProvider::Memory,
                redis_url: "redis://localhost:6379".to_string(),
                key_prefix: String::new(),
            },
            storage: StorageConfig {
                provider: StorageProvider::Local,
                upload_dir,
                upload_public_base: "/uploads".to_string(),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
                s3_bucket: String::new(),
                s3_region: "us-east-1".to_string(),
                s3_endpoint: None,
                s3_public_url: None,
                s3_path_style: false,
                s3_access_key_id: None,
                s3_secret_access_key: None,
            },
            auth: AuthConfig {
                secret: secret.into(),
                admin_email: None,
                admin_password_hash: None,
                session_ttl_secs: 3600,
                cookie_secure: false,
                github: GithubOAuthConfig {
                    client_id: None,
                    client_secret: None,
                    allowed_logins: Vec::new(),
                    oauth_url: "https://github.com/login/oauth".to_string(),
                    api_url: "https://api.github.com".to_string(),
                },
            },
        }
    }
}
