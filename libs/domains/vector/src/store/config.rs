use core_config::{ConfigError, FromEnv, env_parse_or, env_parse_required, env_required};

/// Milvus connection configuration
#[derive(Debug, Clone)]
pub struct MilvusConfig {
    pub host: String,
    pub port: u16,
    pub token: Option<String>,
    pub database: Option<String>,
    pub timeout_secs: u64,
}

impl MilvusConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            token: None,
            database: None,
            timeout_secs: 30,
        }
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// REST endpoint root. A host given with a scheme keeps it.
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}:{}", host, self.port)
        } else {
            format!("http://{}:{}", host, self.port)
        }
    }
}

impl FromEnv for MilvusConfig {
    /// - MILVUS_HOST, MILVUS_PORT: required
    /// - MILVUS_TOKEN, MILVUS_DATABASE: optional
    /// - REQUEST_TIMEOUT_SECS: defaults to 30
    fn from_env() -> Result<Self, ConfigError> {
        let host = env_required("MILVUS_HOST")?;
        let port = env_parse_required("MILVUS_PORT")?;
        let token = optional("MILVUS_TOKEN");
        let database = optional("MILVUS_DATABASE");
        let timeout_secs = env_parse_or("REQUEST_TIMEOUT_SECS", 30u64)?;

        Ok(Self {
            host,
            port,
            token,
            database,
            timeout_secs,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Default for MilvusConfig {
    fn default() -> Self {
        Self::new("localhost", 19530)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_adds_scheme() {
        assert_eq!(MilvusConfig::default().base_url(), "http://localhost:19530");
        assert_eq!(
            MilvusConfig::new("https://milvus.internal/", 443).base_url(),
            "https://milvus.internal:443"
        );
    }

    #[test]
    fn test_from_env_requires_host_and_port() {
        temp_env::with_vars(
            [("MILVUS_HOST", None::<&str>), ("MILVUS_PORT", Some("19530"))],
            || {
                let err = MilvusConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("MILVUS_HOST"));
            },
        );

        temp_env::with_vars(
            [("MILVUS_HOST", Some("milvus")), ("MILVUS_PORT", Some("abc"))],
            || {
                let err = MilvusConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("MILVUS_PORT"));
            },
        );
    }

    #[test]
    fn test_from_env_reads_optional_values() {
        temp_env::with_vars(
            [
                ("MILVUS_HOST", Some("milvus")),
                ("MILVUS_PORT", Some("19530")),
                ("MILVUS_TOKEN", Some("root:Milvus")),
                ("MILVUS_DATABASE", Some("")),
                ("REQUEST_TIMEOUT_SECS", Some("5")),
            ],
            || {
                let config = MilvusConfig::from_env().unwrap();
                assert_eq!(config.base_url(), "http://milvus:19530");
                assert_eq!(config.token.as_deref(), Some("root:Milvus"));
                assert_eq!(config.database, None);
                assert_eq!(config.timeout_secs, 5);
            },
        );
    }
}
