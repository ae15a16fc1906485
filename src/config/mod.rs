use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// SQLite database URL holding the `empresas` table
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Port the backend listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL the terminal front end sends its requests to
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// bcrypt work factor used when hashing new passwords
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Directory printed invoices are written to
    #[serde(default = "default_invoice_dir")]
    pub invoice_dir: String,
}

fn default_database_url() -> String {
    "sqlite://SQLite.db".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_api_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_invoice_dir() -> String {
    "facturas".to_string()
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct, falling back
    ///    to defaults for anything unset
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Address the backend binds to
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    let config = Config::load()?;

    Ok(config)
}

/// Defaults with a cheap bcrypt cost, for tests that hash passwords
#[cfg(test)]
pub(crate) fn test_config() -> Config {
    envy::from_iter(vec![("BCRYPT_COST".to_string(), "4".to_string())])
        .expect("test configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();

        assert_eq!(config.database_url(), "sqlite://SQLite.db");
        assert_eq!(config.port, 3000);
        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.invoice_dir, "facturas");
    }

    #[test]
    fn environment_values_override_defaults() {
        let vars = vec![
            ("DATABASE_URL".to_string(), "sqlite://other.db".to_string()),
            ("PORT".to_string(), "8081".to_string()),
            ("BCRYPT_COST".to_string(), "4".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.database_url(), "sqlite://other.db");
        assert_eq!(config.bind_address(), "0.0.0.0:8081");
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.api_base_url, "http://localhost:3000");
    }

    #[test]
    fn malformed_port_is_rejected() {
        let vars = vec![("PORT".to_string(), "not-a-port".to_string())];

        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }
}
