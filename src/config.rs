use std::env;
use std::path::PathBuf;

use log::debug;

pub const TOKEN_VAR: &str = "TELOXIDE_TOKEN";
pub const BANK_PATH_VAR: &str = "QUIZ_BANK_PATH";
pub const DEFAULT_BANK_PATH: &str = "bank.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{0} is set but empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub token: String,
    pub bank_path: PathBuf,
}

impl Config {
    /// Reads the process environment, after loading `.env` when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenv::dotenv() {
            debug!("No .env file loaded: {}", err);
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_VAR).ok_or(ConfigError::Missing(TOKEN_VAR))?;
        if token.trim().is_empty() {
            return Err(ConfigError::Empty(TOKEN_VAR));
        }
        let bank_path = lookup(BANK_PATH_VAR)
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BANK_PATH.to_string());
        Ok(Self {
            token,
            bank_path: PathBuf::from(bank_path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn bank_path_defaults() {
        let config = Config::from_lookup(lookup(&[(TOKEN_VAR, "123:abc")])).unwrap();
        assert_eq!(config.bank_path, PathBuf::from(DEFAULT_BANK_PATH));
        assert_eq!(config.token, "123:abc");
    }

    #[test]
    fn bank_path_can_be_overridden() {
        let config = Config::from_lookup(lookup(&[
            (TOKEN_VAR, "123:abc"),
            (BANK_PATH_VAR, "data/bank.json"),
        ]))
        .unwrap();
        assert_eq!(config.bank_path, PathBuf::from("data/bank.json"));
    }

    #[test]
    fn token_is_required() {
        assert!(matches!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::Missing(TOKEN_VAR))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[(TOKEN_VAR, " ")])),
            Err(ConfigError::Empty(TOKEN_VAR))
        ));
    }
}
