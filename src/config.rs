use std::env;

pub const DEFAULT_AVATAR_BASE_URL: &str = "https://ui-avatars.com/api/";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub avatar_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: 10,
            host: "0.0.0.0".to_string(),
            port: 8080,
            avatar_base_url: DEFAULT_AVATAR_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Reads `.env` (when present) and the process environment.
    pub fn init() -> Config {
        dotenv::dotenv().ok();
        let defaults = Config::default();

        Config {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.db_max_connections),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            avatar_base_url: env::var("AVATAR_BASE_URL").unwrap_or(defaults.avatar_base_url),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
