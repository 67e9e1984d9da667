//! Client configuration: server base URL and API token.
//!
//! Stored as JSON under `~/.taskdeck/config.json`. Loading is lenient (a
//! missing or unreadable file yields defaults) and saving goes through a
//! temp file + rename.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Persistent client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub token: Option<String>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: default_api_base(),
            token: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults if the
    /// file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Config::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("Error parsing config, using defaults: {e}");
                    Config::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading config, using defaults: {e}");
                Config::default()
            }
        }
    }

    /// Save configuration using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self).expect("config serialises");
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Default config file location: `~/.taskdeck/config.json`.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".taskdeck").join("config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("nope.json"));
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert!(cfg.token.is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let cfg = Config {
            api_base: "https://deck.example.com".into(),
            token: Some("secret".into()),
        };
        cfg.save(&path).unwrap();
        let loaded = Config::load(&path);
        assert_eq!(loaded.api_base, "https://deck.example.com");
        assert_eq!(loaded.token.as_deref(), Some("secret"));
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        let cfg = Config::load(&path);
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
    }
}
