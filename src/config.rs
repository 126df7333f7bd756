use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    /// Emails granted the coordinator bit at registration
    pub coordinators: Vec<String>,
    pub hashing: HashingConfig,
    pub node: NodeConfig,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_address: String,
    pub data_dir: String,
    /// Base URL embedded in password-reset links
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub reset_token_ttl_minutes: i64,
    pub session_ttl_days: i64,
    pub signing_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            reset_token_ttl_minutes: 20,
            session_ttl_days: 30,
            signing_key: "secret".to_string(),
        }
    }
}

/// Argon2 work factor. Raising it only affects newly stored digests.
#[derive(Debug, Clone)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub time_cost: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            time_cost: 2,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let public_url =
            std::env::var("PUBLIC_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

        let signing_key = std::env::var("SIGNING_KEY").unwrap_or_else(|_| "secret".to_string());

        let session_ttl_days = std::env::var("SESSION_TTL_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let reset_token_ttl_minutes = std::env::var("RESET_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);

        let coordinators: Vec<String> = std::env::var("COORDINATOR_EMAILS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let memory_kib = std::env::var("HASH_MEMORY_KIB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| HashingConfig::default().memory_kib);

        let time_cost = std::env::var("HASH_TIME_COST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| HashingConfig::default().time_cost);

        let config = Config {
            auth: AuthConfig {
                reset_token_ttl_minutes,
                session_ttl_days,
                signing_key,
            },
            coordinators,
            hashing: HashingConfig {
                memory_kib,
                time_cost,
            },
            node: NodeConfig {
                bind_address,
                data_dir,
                public_url,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.signing_key == "secret" {
            tracing::warn!(
                "SIGNING_KEY is the built-in default. Set a real key before exposing this service."
            );
        }
        if self.auth.session_ttl_days <= 0 {
            return Err(ConfigError::ValidationError(
                "SESSION_TTL_DAYS must be positive".to_string(),
            ));
        }
        if self.auth.reset_token_ttl_minutes <= 0 {
            return Err(ConfigError::ValidationError(
                "RESET_TOKEN_TTL_MINUTES must be positive".to_string(),
            ));
        }
        if self.hashing.time_cost == 0 {
            return Err(ConfigError::ValidationError(
                "HASH_TIME_COST must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
