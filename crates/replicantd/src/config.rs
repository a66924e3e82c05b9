//! TOML configuration file support
//!
//! Every field is optional; CLI flags take precedence over the file, and
//! built-in defaults apply last.

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub bind: Option<String>,
    pub ws_port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub ephemeral: Option<bool>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            bind = "0.0.0.0"
            ws_port = 9090
            data_dir = "/var/lib/replicant"
            log_level = "debug"
            ephemeral = false
            "#,
        )
        .unwrap();

        assert_eq!(config.bind.as_deref(), Some("0.0.0.0"));
        assert_eq!(config.ws_port, Some(9090));
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/replicant")));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.ephemeral, Some(false));
    }

    #[test]
    fn test_empty_config_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.bind.is_none());
        assert!(config.ws_port.is_none());
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("tcp_port = 6380").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ws_port = 7001").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.ws_port, Some(7001));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(Config::load(Path::new("/definitely/not/here.toml")).is_err());
    }
}
