use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_ACCT_FILE: &str = "/var/account/pacct";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    /// Accounting file read when -f is not given
    pub acct_file: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    /// Field separator for delimited output
    pub delimiter: char,
    /// Always prepend the user column
    pub show_user: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            acct_file: PathBuf::from(DEFAULT_ACCT_FILE),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            delimiter: '|',
            show_user: false,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_path();

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path();
        let config_dir = config_path.parent().unwrap();

        fs::create_dir_all(config_dir)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    fn get_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pacct")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_tool() {
        let config = Config::default();
        assert_eq!(config.input.acct_file, PathBuf::from(DEFAULT_ACCT_FILE));
        assert_eq!(config.display.delimiter, '|');
        assert!(!config.display.show_user);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: Config = toml::from_str("[display]\ndelimiter = \";\"\n").unwrap();
        assert_eq!(config.display.delimiter, ';');
        assert_eq!(config.input.acct_file, PathBuf::from(DEFAULT_ACCT_FILE));
    }
}
