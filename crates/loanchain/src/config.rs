//! Ledger configuration.

use loanchain_core::LoanIdWidth;
use loanchain_envelope::DEFAULT_ITERATIONS;

use crate::error::ConfigError;

/// Configuration for the Ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Deployment-wide value mixed into every link hash.
    ///
    /// Changing it invalidates every existing chain.
    pub hash_salt: String,
    /// PBKDF2 iteration count.
    pub kdf_iterations: u32,
    /// Maximum number of key derivations running at once.
    pub kdf_concurrency: usize,
    /// Width of newly generated loan ids.
    pub loan_id_width: LoanIdWidth,
}

impl LedgerConfig {
    pub const DEFAULT_HASH_SALT: &'static str = "app-wide-hash-salt";
    pub const DEFAULT_KDF_CONCURRENCY: usize = 4;

    pub const ENV_HASH_SALT: &'static str = "LOANCHAIN_HASH_SALT";
    pub const ENV_KDF_ITERATIONS: &'static str = "LOANCHAIN_KDF_ITERATIONS";
    pub const ENV_KDF_CONCURRENCY: &'static str = "LOANCHAIN_KDF_CONCURRENCY";
    pub const ENV_LOAN_ID_WIDTH: &'static str = "LOANCHAIN_LOAN_ID_WIDTH";

    /// Defaults overridden by any `LOANCHAIN_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(salt) = lookup(Self::ENV_HASH_SALT) {
            config.hash_salt = salt;
        }
        if let Some(value) = lookup(Self::ENV_KDF_ITERATIONS) {
            config.kdf_iterations = parse(Self::ENV_KDF_ITERATIONS, &value)?;
        }
        if let Some(value) = lookup(Self::ENV_KDF_CONCURRENCY) {
            config.kdf_concurrency = parse(Self::ENV_KDF_CONCURRENCY, &value)?;
        }
        if let Some(value) = lookup(Self::ENV_LOAN_ID_WIDTH) {
            config.loan_id_width = match value.trim() {
                "64" => LoanIdWidth::Legacy64,
                "128" => LoanIdWidth::Wide128,
                _ => {
                    return Err(ConfigError::Unparseable {
                        var: Self::ENV_LOAN_ID_WIDTH,
                        value,
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Check every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hash_salt.is_empty() {
            return Err(ConfigError::Empty("hash_salt"));
        }
        if self.kdf_iterations == 0 {
            return Err(ConfigError::NotPositive("kdf_iterations"));
        }
        if self.kdf_concurrency == 0 {
            return Err(ConfigError::NotPositive("kdf_concurrency"));
        }
        Ok(())
    }

    pub fn with_hash_salt(mut self, salt: impl Into<String>) -> Self {
        self.hash_salt = salt.into();
        self
    }

    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations;
        self
    }

    pub fn with_kdf_concurrency(mut self, permits: usize) -> Self {
        self.kdf_concurrency = permits;
        self
    }

    pub fn with_loan_id_width(mut self, width: LoanIdWidth) -> Self {
        self.loan_id_width = width;
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            hash_salt: Self::DEFAULT_HASH_SALT.to_owned(),
            kdf_iterations: DEFAULT_ITERATIONS,
            kdf_concurrency: Self::DEFAULT_KDF_CONCURRENCY,
            loan_id_width: LoanIdWidth::default(),
        }
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Unparseable {
        var,
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.hash_salt, "app-wide-hash-salt");
        assert_eq!(config.kdf_iterations, 200_000);
        assert_eq!(config.loan_id_width, LoanIdWidth::Wide128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        assert_eq!(
            LedgerConfig::from_lookup(lookup(&[])).unwrap(),
            LedgerConfig::default()
        );
    }

    #[test]
    fn test_overrides() {
        let config = LedgerConfig::from_lookup(lookup(&[
            ("LOANCHAIN_HASH_SALT", "prod-salt"),
            ("LOANCHAIN_KDF_ITERATIONS", "1000"),
            ("LOANCHAIN_KDF_CONCURRENCY", "2"),
            ("LOANCHAIN_LOAN_ID_WIDTH", "64"),
        ]))
        .unwrap();

        assert_eq!(config.hash_salt, "prod-salt");
        assert_eq!(config.kdf_iterations, 1000);
        assert_eq!(config.kdf_concurrency, 2);
        assert_eq!(config.loan_id_width, LoanIdWidth::Legacy64);
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(matches!(
            LedgerConfig::from_lookup(lookup(&[("LOANCHAIN_KDF_ITERATIONS", "lots")])),
            Err(ConfigError::Unparseable { var: "LOANCHAIN_KDF_ITERATIONS", .. })
        ));
        assert_eq!(
            LedgerConfig::from_lookup(lookup(&[("LOANCHAIN_KDF_ITERATIONS", "0")])),
            Err(ConfigError::NotPositive("kdf_iterations"))
        );
        assert_eq!(
            LedgerConfig::from_lookup(lookup(&[("LOANCHAIN_HASH_SALT", "")])),
            Err(ConfigError::Empty("hash_salt"))
        );
        assert!(LedgerConfig::from_lookup(lookup(&[("LOANCHAIN_LOAN_ID_WIDTH", "96")])).is_err());
    }
}
