use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::ConfigError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PDF_MIN_BYTES: usize = 51_200;
pub const DEFAULT_BUCKET: &str = "reports";
pub const DEFAULT_MAX_BODY_BYTES: usize = 262_144; // 256KB
pub const DEFAULT_MAX_PART_BYTES: u64 = 32 * 1024 * 1024; // 32MB

#[derive(Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Supabase { url: String, service_key: String },
    S3 { endpoint_url: Option<String> },
}

impl fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Supabase { url, .. } => f
                .debug_struct("Supabase")
                .field("url", url)
                .field("service_key", &"<redacted>")
                .finish(),
            StorageBackend::S3 { endpoint_url } => f
                .debug_struct("S3")
                .field("endpoint_url", endpoint_url)
                .finish(),
        }
    }
}

/// Process-wide settings, read once at startup and shared read-only.
#[derive(Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Shared secret expected in `x-api-key`. Empty rejects every caller.
    pub service_key: String,
    pub gotenberg_url: String,
    pub pdf_min_bytes: usize,
    pub storage: StorageBackend,
    pub bucket: String,
    /// Applied to every outbound HTTP call; `None` keeps the client default.
    pub http_timeout: Option<Duration>,
    pub max_body_bytes: usize,
    /// Ceiling on the decompressed size of one rewritten template part.
    pub max_part_bytes: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            service_key: String::new(),
            gotenberg_url: String::new(),
            pdf_min_bytes: DEFAULT_PDF_MIN_BYTES,
            storage: StorageBackend::Supabase {
                url: String::new(),
                service_key: String::new(),
            },
            bucket: DEFAULT_BUCKET.to_string(),
            http_timeout: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_part_bytes: DEFAULT_MAX_PART_BYTES,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("service_key", &if self.service_key.is_empty() { "<empty>" } else { "<redacted>" })
            .field("gotenberg_url", &self.gotenberg_url)
            .field("pdf_min_bytes", &self.pdf_min_bytes)
            .field("storage", &self.storage)
            .field("bucket", &self.bucket)
            .field("http_timeout", &self.http_timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("max_part_bytes", &self.max_part_bytes)
            .finish()
    }
}

impl ServiceConfig {
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source, so callers other than
    /// the process environment (tests, embedding) can supply values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let storage = match text("STORAGE_BACKEND", "supabase").trim().to_lowercase().as_str() {
            "supabase" => StorageBackend::Supabase {
                url: text("SUPABASE_URL", ""),
                service_key: text("SUPABASE_SERVICE_ROLE_KEY", ""),
            },
            "s3" => StorageBackend::S3 {
                endpoint_url: lookup("S3_ENDPOINT_URL").filter(|url| !url.trim().is_empty()),
            },
            other => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        let timeout_ms: u64 = parse_var(&lookup, "HTTP_TIMEOUT_MS", 0)?;

        Ok(ServiceConfig {
            host: text("HOST", "0.0.0.0"),
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            service_key: text("PDF_SERVICE_KEY", ""),
            gotenberg_url: text("GOTENBERG_URL", "").trim_end_matches('/').to_string(),
            pdf_min_bytes: parse_var(&lookup, "PDF_MIN_BYTES", DEFAULT_PDF_MIN_BYTES)?,
            storage,
            bucket: text("STORAGE_BUCKET", DEFAULT_BUCKET),
            http_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            max_body_bytes: parse_var(&lookup, "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            max_part_bytes: parse_var(&lookup, "MAX_PART_BYTES", DEFAULT_MAX_PART_BYTES)?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        _ => Ok(default),
    }
}

#[derive(Default)]
pub struct ServiceConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    service_key: Option<String>,
    gotenberg_url: Option<String>,
    pdf_min_bytes: Option<usize>,
    storage: Option<StorageBackend>,
    bucket: Option<String>,
    http_timeout: Option<Duration>,
    max_body_bytes: Option<usize>,
    max_part_bytes: Option<u64>,
}

impl ServiceConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn service_key(mut self, key: impl Into<String>) -> Self {
        self.service_key = Some(key.into());
        self
    }

    pub fn gotenberg_url(mut self, url: impl Into<String>) -> Self {
        self.gotenberg_url = Some(url.into());
        self
    }

    pub fn pdf_min_bytes(mut self, bytes: usize) -> Self {
        self.pdf_min_bytes = Some(bytes);
        self
    }

    pub fn storage(mut self, storage: StorageBackend) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = Some(bytes);
        self
    }

    pub fn max_part_bytes(mut self, bytes: u64) -> Self {
        self.max_part_bytes = Some(bytes);
        self
    }

    pub fn build(self) -> ServiceConfig {
        let default = ServiceConfig::default();
        ServiceConfig {
            host: self.host.unwrap_or(default.host),
            port: self.port.unwrap_or(default.port),
            service_key: self.service_key.unwrap_or(default.service_key),
            gotenberg_url: self
                .gotenberg_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(default.gotenberg_url),
            pdf_min_bytes: self.pdf_min_bytes.unwrap_or(default.pdf_min_bytes),
            storage: self.storage.unwrap_or(default.storage),
            bucket: self.bucket.unwrap_or(default.bucket),
            http_timeout: self.http_timeout.or(default.http_timeout),
            max_body_bytes: self.max_body_bytes.unwrap_or(default.max_body_bytes),
            max_part_bytes: self.max_part_bytes.unwrap_or(default.max_part_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.pdf_min_bytes, 51_200);
        assert_eq!(config.bucket, "reports");
        assert!(config.service_key.is_empty());
        assert!(config.http_timeout.is_none());
        assert_eq!(config.max_part_bytes, 32 * 1024 * 1024);
        assert!(matches!(config.storage, StorageBackend::Supabase { .. }));
    }

    #[test]
    fn reads_every_recognized_variable() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("PORT", "9090"),
            ("PDF_SERVICE_KEY", "s3cret"),
            ("GOTENBERG_URL", "http://gotenberg:3000/"),
            ("PDF_MIN_BYTES", "1024"),
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "role-key"),
            ("HTTP_TIMEOUT_MS", "2500"),
            ("MAX_PART_BYTES", "4096"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.service_key, "s3cret");
        assert_eq!(config.gotenberg_url, "http://gotenberg:3000");
        assert_eq!(config.pdf_min_bytes, 1024);
        assert_eq!(config.http_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(config.max_part_bytes, 4096);
        assert_eq!(
            config.storage,
            StorageBackend::Supabase {
                url: "https://project.supabase.co".to_string(),
                service_key: "role-key".to_string(),
            }
        );
    }

    #[test]
    fn selects_s3_backend() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "S3"),
            ("S3_ENDPOINT_URL", "http://minio:9000"),
        ]))
        .unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::S3 {
                endpoint_url: Some("http://minio:9000".to_string())
            }
        );
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = ServiceConfig::from_lookup(lookup_from(&[("PDF_MIN_BYTES", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "PDF_MIN_BYTES", .. }));
    }

    #[test]
    fn rejects_unknown_backend() {
        let err = ServiceConfig::from_lookup(lookup_from(&[("STORAGE_BACKEND", "ftp")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBackend(_)));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = ServiceConfig::builder()
            .service_key("top-secret")
            .storage(StorageBackend::Supabase {
                url: "https://x.supabase.co".into(),
                service_key: "role-secret".into(),
            })
            .build();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("role-secret"));
    }
}
