use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub storage: StorageConfig,
    pub site: SiteConfig,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Inactivity expiry of the session cookie, in hours
    pub session_ttl_hours: i64,
    /// Mark the session cookie `Secure` (HTTPS deployments)
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Supabase,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Project URL without a trailing slash (required for supabase)
    pub supabase_url: Option<String>,
    /// Public anon key (required for supabase)
    pub supabase_anon_key: Option<String>,
    /// redb directory for the local backend
    pub data_dir: String,
    /// Account seeded into the local backend's admin allowlist
    pub local_admin: Option<LocalAdmin>,
}

#[derive(Debug, Clone)]
pub struct LocalAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory for the local object store
    pub local_storage_path: String,
    pub media_bucket: String,
    pub covers_bucket: String,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub title: String,
    pub owner: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            session_ttl_hours: 12,
            secure_cookies: false,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Local,
            supabase_url: None,
            supabase_anon_key: None,
            data_dir: "./data".to_string(),
            local_admin: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_storage_path: "./files".to_string(),
            media_bucket: "media".to_string(),
            covers_bucket: "anime-covers".to_string(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "romanriv.com".to_string(),
            owner: "Roman Rivera".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            backend: BackendConfig::default(),
            storage: StorageConfig::default(),
            site: SiteConfig::default(),
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

/// Unset and blank variables both count as missing.
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let bind_address =
            env_opt("BIND_ADDRESS").unwrap_or(defaults.server.bind_address.clone());

        let session_ttl_hours = env_opt("SESSION_TTL_HOURS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.server.session_ttl_hours);

        let kind = match env_opt("BACKEND")
            .unwrap_or_else(|| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "supabase" => BackendKind::Supabase,
            "local" => BackendKind::Local,
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "BACKEND must be 'local' or 'supabase', got '{other}'"
                )))
            }
        };

        let supabase_url =
            env_opt("SUPABASE_URL").map(|url| url.trim_end_matches('/').to_string());
        let supabase_anon_key = env_opt("SUPABASE_ANON_KEY");

        let local_admin = match (env_opt("LOCAL_ADMIN_EMAIL"), env_opt("LOCAL_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(LocalAdmin { email, password }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::ValidationError(
                    "LOCAL_ADMIN_EMAIL and LOCAL_ADMIN_PASSWORD must be set together".to_string(),
                ))
            }
        };

        let max_upload_size = env_opt("MAX_UPLOAD_SIZE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_upload_size);

        let config = Config {
            server: ServerConfig {
                bind_address,
                session_ttl_hours,
                secure_cookies: env_flag("SECURE_COOKIES"),
            },
            backend: BackendConfig {
                kind,
                supabase_url,
                supabase_anon_key,
                data_dir: env_opt("DATA_DIR").unwrap_or(defaults.backend.data_dir),
                local_admin,
            },
            storage: StorageConfig {
                local_storage_path: env_opt("LOCAL_STORAGE_PATH")
                    .unwrap_or(defaults.storage.local_storage_path),
                media_bucket: env_opt("MEDIA_BUCKET").unwrap_or(defaults.storage.media_bucket),
                covers_bucket: env_opt("COVERS_BUCKET")
                    .unwrap_or(defaults.storage.covers_bucket),
            },
            site: SiteConfig {
                title: env_opt("SITE_TITLE").unwrap_or(defaults.site.title),
                owner: env_opt("SITE_OWNER").unwrap_or(defaults.site.owner),
            },
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.kind == BackendKind::Supabase
            && (self.backend.supabase_url.is_none() || self.backend.supabase_anon_key.is_none())
        {
            return Err(ConfigError::ValidationError(
                "SUPABASE_URL and SUPABASE_ANON_KEY are required when BACKEND=supabase"
                    .to_string(),
            ));
        }

        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.server.session_ttl_hours <= 0 {
            return Err(ConfigError::ValidationError(
                "SESSION_TTL_HOURS must be greater than 0".to_string(),
            ));
        }

        if self.backend.kind == BackendKind::Supabase && self.backend.local_admin.is_some() {
            tracing::warn!("LOCAL_ADMIN_* is ignored with BACKEND=supabase");
        }

        Ok(())
    }

    /// Base URL public media links are built against. Empty for the local
    /// backend, whose objects are served by this site.
    pub fn public_media_base(&self) -> &str {
        match self.backend.kind {
            BackendKind::Supabase => self.backend.supabase_url.as_deref().unwrap_or(""),
            BackendKind::Local => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_supabase_requires_credentials() {
        let mut config = Config::default();
        config.backend.kind = BackendKind::Supabase;
        config.backend.supabase_url = Some("https://proj.supabase.co".to_string());
        assert!(config.validate().is_err());

        config.backend.supabase_anon_key = Some("anon".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.public_media_base(), "https://proj.supabase.co");
    }

    #[test]
    fn test_zero_upload_size_rejected() {
        let mut config = Config::default();
        config.max_upload_size = 0;
        assert!(config.validate().is_err());
    }
}
