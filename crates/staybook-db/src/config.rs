//! Ledger configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                   | Default          |
//! |----------------------------|------------------|
//! | `STAYBOOK_DB_PATH`         | `./staybook.db`  |
//! | `STAYBOOK_ADMIN`           | required         |
//! | `STAYBOOK_MAX_CONNECTIONS` | `5`              |

use std::env;
use std::path::PathBuf;

use staybook_core::Principal;

use crate::pool::DbConfig;

/// Runtime configuration for a persistent ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// The only principal allowed to create listings
    pub administrator: Principal,

    /// Pool size
    pub max_connections: u32,
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (environment, test map, ...).
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let administrator = lookup("STAYBOOK_ADMIN")
            .map(|admin| admin.trim().to_string())
            .filter(|admin| !admin.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired("STAYBOOK_ADMIN".to_string()))?;

        let config = LedgerConfig {
            database_path: lookup("STAYBOOK_DB_PATH")
                .unwrap_or_else(|| "./staybook.db".to_string())
                .into(),

            administrator: Principal::new(administrator),

            max_connections: lookup("STAYBOOK_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STAYBOOK_MAX_CONNECTIONS".to_string()))?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STAYBOOK_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Pool configuration derived from this config.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<LedgerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LedgerConfig::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("STAYBOOK_ADMIN", "0xadmin")]).unwrap();
        assert_eq!(config.administrator, Principal::new("0xadmin"));
        assert_eq!(config.database_path, PathBuf::from("./staybook.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.db_config().max_connections, 5);
    }

    #[test]
    fn test_admin_required() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingRequired(_))));
        assert!(matches!(
            load(&[("STAYBOOK_ADMIN", "   ")]),
            Err(ConfigError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_invalid_pool_size() {
        for bad in ["zero", "0", "-1"] {
            let result = load(&[("STAYBOOK_ADMIN", "0xadmin"), ("STAYBOOK_MAX_CONNECTIONS", bad)]);
            assert!(matches!(result, Err(ConfigError::InvalidValue(_))), "{bad}");
        }
    }
}
