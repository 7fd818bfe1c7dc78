use chrono::Duration;

/// Runtime configuration, read once at startup and carried in `AppState`.
/// No ambient globals: everything request handlers need travels through here.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub symbol: String,
    pub port: u16,
    pub database_url: String,
    pub freshness_window_secs: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            symbol: std::env::var("SYMBOL").unwrap_or_else(|_| "QQQ".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite::memory:".to_string()),
            freshness_window_secs: std::env::var("FRESHNESS_WINDOW_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.symbol.trim().is_empty() {
            return Err("SYMBOL must not be empty".to_string());
        }
        if self.freshness_window_secs <= 0 {
            return Err("FRESHNESS_WINDOW_SECS must be a positive number of seconds".to_string());
        }
        Ok(())
    }

    /// Staleness window: a stored snapshot younger than this is served without
    /// a refresh.
    pub fn freshness_window(&self) -> Duration {
        Duration::seconds(self.freshness_window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_window(secs: i64) -> AppConfig {
        AppConfig {
            symbol: "QQQ".to_string(),
            port: 8000,
            database_url: "sqlite::memory:".to_string(),
            freshness_window_secs: secs,
        }
    }

    #[test]
    fn test_validate_rejects_nonpositive_window() {
        assert!(config_with_window(0).validate().is_err());
        assert!(config_with_window(-5).validate().is_err());
        assert!(config_with_window(60).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_symbol() {
        let mut config = config_with_window(60);
        config.symbol = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
