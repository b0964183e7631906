use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: Option<DatabaseConfig>,
    pub swagger: SwaggerConfig,
    pub district: DistrictConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Which persistence mechanism backs the legal district store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "DISTRICT_STORE_BACKEND must be 'postgres' or 'memory', got '{}'",
                other
            )),
        }
    }
}

/// Legal district search and bulk-load settings
#[derive(Debug, Clone)]
pub struct DistrictConfig {
    pub store_backend: StoreBackend,
    /// Delimited source file used by the bulk loader
    pub source_path: String,
    pub load_on_startup: bool,
    pub load_batch_size: usize,
    /// Try the dedicated full-text query before the substring fallback
    pub full_text_enabled: bool,
    /// Per-tier query timeout; an elapsed timeout counts as a tier failure
    pub tier_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let district = DistrictConfig::from_env()?;

        // The in-memory backend runs without a database
        let database = match district.store_backend {
            StoreBackend::Postgres => Some(DatabaseConfig::from_env()?),
            StoreBackend::Memory => None,
        };

        Ok(Config {
            app: AppConfig::from_env()?,
            database,
            swagger: SwaggerConfig::from_env()?,
            district,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Legal District API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Administrative district search API".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl DistrictConfig {
    pub const DEFAULT_SOURCE_PATH: &'static str = "data/legal_districts.csv";
    pub const DEFAULT_LOAD_BATCH_SIZE: usize = 1000;
    const MAX_LOAD_BATCH_SIZE: usize = 5000;
    const DEFAULT_TIER_TIMEOUT_MS: u64 = 2000;

    pub fn from_env() -> Result<Self, String> {
        let store_backend = StoreBackend::parse(
            &env::var("DISTRICT_STORE_BACKEND").unwrap_or_else(|_| "postgres".to_string()),
        )?;

        let source_path = env::var("DISTRICT_SOURCE_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_SOURCE_PATH.to_string());

        let load_on_startup = parse_bool("DISTRICT_LOAD_ON_STARTUP", true)?;

        let load_batch_size = env::var("DISTRICT_LOAD_BATCH_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_LOAD_BATCH_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "DISTRICT_LOAD_BATCH_SIZE must be a valid number".to_string())?;
        if load_batch_size == 0 || load_batch_size > Self::MAX_LOAD_BATCH_SIZE {
            return Err(format!(
                "DISTRICT_LOAD_BATCH_SIZE must be between 1 and {}",
                Self::MAX_LOAD_BATCH_SIZE
            ));
        }

        let full_text_enabled = parse_bool("DISTRICT_FULL_TEXT_ENABLED", true)?;

        let tier_timeout_ms = env::var("DISTRICT_TIER_TIMEOUT_MS")
            .unwrap_or_else(|_| Self::DEFAULT_TIER_TIMEOUT_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "DISTRICT_TIER_TIMEOUT_MS must be a valid number".to_string())?;

        Ok(Self {
            store_backend,
            source_path,
            load_on_startup,
            load_batch_size,
            full_text_enabled,
            tier_timeout: Duration::from_millis(tier_timeout_ms),
        })
    }
}

impl Default for DistrictConfig {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::Postgres,
            source_path: Self::DEFAULT_SOURCE_PATH.to_string(),
            load_on_startup: true,
            load_batch_size: Self::DEFAULT_LOAD_BATCH_SIZE,
            full_text_enabled: true,
            tier_timeout: Duration::from_millis(Self::DEFAULT_TIER_TIMEOUT_MS),
        }
    }
}

fn parse_bool(key: &str, default: bool) -> Result<bool, String> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(format!("{} must be a boolean", key)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parse() {
        assert_eq!(StoreBackend::parse("postgres"), Ok(StoreBackend::Postgres));
        assert_eq!(StoreBackend::parse(" Memory "), Ok(StoreBackend::Memory));
        assert!(StoreBackend::parse("sqlite").is_err());
    }

    #[test]
    fn test_district_config_defaults() {
        let config = DistrictConfig::default();
        assert_eq!(config.load_batch_size, 1000);
        assert_eq!(config.source_path, "data/legal_districts.csv");
        assert!(config.full_text_enabled);
    }
}
