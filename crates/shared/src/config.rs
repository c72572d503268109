//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Petty cash desk configuration.
    #[serde(default)]
    pub petty_cash: PettyCashConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Petty cash desk configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PettyCashConfig {
    /// Code of the cash journal holding the advances.
    #[serde(default = "default_journal_code")]
    pub journal_code: String,
    /// Code of the company suspense account used as the default operation account.
    #[serde(default = "default_suspense_account_code")]
    pub suspense_account_code: String,
    /// Request name sequence.
    #[serde(default)]
    pub sequence: SequenceConfig,
}

fn default_journal_code() -> String {
    "PTC".to_string()
}

fn default_suspense_account_code() -> String {
    "499000".to_string()
}

impl Default for PettyCashConfig {
    fn default() -> Self {
        Self {
            journal_code: default_journal_code(),
            suspense_account_code: default_suspense_account_code(),
            sequence: SequenceConfig::default(),
        }
    }
}

/// Request name sequence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceConfig {
    /// Prefix put before the year, e.g. `PC/` gives `PC/2026/00001`.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Zero padding of the running number.
    #[serde(default = "default_padding")]
    pub padding: usize,
}

fn default_prefix() -> String {
    "PC/".to_string()
}

fn default_padding() -> usize {
    5
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            padding: default_padding(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "pettycash=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PETTYCASH").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Parses configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid configuration.
    pub fn from_toml(document: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(document, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        let config = temp_env::with_vars(
            [
                ("RUN_MODE", Some("unit-test")),
                ("PETTYCASH__PETTY_CASH__JOURNAL_CODE", None::<&str>),
            ],
            AppConfig::load,
        )
        .unwrap();

        assert_eq!(config.petty_cash.journal_code, "PTC");
        assert_eq!(config.petty_cash.suspense_account_code, "499000");
        assert_eq!(config.petty_cash.sequence.prefix, "PC/");
        assert_eq!(config.petty_cash.sequence.padding, 5);
        assert_eq!(config.logging.filter, "pettycash=info");
    }

    #[test]
    fn test_environment_overrides() {
        let config = temp_env::with_vars(
            [
                ("RUN_MODE", Some("unit-test")),
                ("PETTYCASH__PETTY_CASH__JOURNAL_CODE", Some("CASH2")),
            ],
            AppConfig::load,
        )
        .unwrap();

        assert_eq!(config.petty_cash.journal_code, "CASH2");
        assert_eq!(config.petty_cash.sequence.prefix, "PC/");
    }

    #[test]
    fn test_from_toml_partial_document() {
        let config = AppConfig::from_toml(
            r#"
            [petty_cash]
            suspense_account_code = "101402"

            [petty_cash.sequence]
            prefix = "PETTY/"
            padding = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.petty_cash.journal_code, "PTC");
        assert_eq!(config.petty_cash.suspense_account_code, "101402");
        assert_eq!(config.petty_cash.sequence.prefix, "PETTY/");
        assert_eq!(config.petty_cash.sequence.padding, 3);
    }

    #[test]
    fn test_from_toml_rejects_wrong_types() {
        let result = AppConfig::from_toml(
            r#"
            [petty_cash.sequence]
            padding = "wide"
            "#,
        );
        assert!(result.is_err());
    }
}
