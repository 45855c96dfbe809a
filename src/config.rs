// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::Session;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Bondclip", "bondclip"));

pub const ENV_BASE_URL: &str = "BONDCLIP_BASE_URL";
pub const ENV_TOKEN: &str = "BONDCLIP_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "BONDCLIP_TIMEOUT_SECS";

pub fn config_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific config dir")?;
    Ok(proj.config_dir().join("config.toml"))
}

/// Where the bond service lives and who is talking to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token; requests go out unauthenticated without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default)]
    pub session: Session,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token: None,
            session: Session::default(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Read config at {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Parse config at {}", path.display()))
    }

    /// Defaults when the file does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config dir")?;
        }
        let body = toml::to_string_pretty(self).context("Serialize config")?;
        fs::write(path, body).with_context(|| format!("Write config at {}", path.display()))?;
        Ok(())
    }

    /// Apply `BONDCLIP_*` variables; `lookup` is `std::env::var` outside tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.token = Some(token).filter(|t| !t.trim().is_empty());
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {} '{}'", ENV_TIMEOUT_SECS, raw))?;
        }
        Ok(())
    }

    /// Global command-line flags win over file and environment.
    pub fn apply_cli(&mut self, m: &clap::ArgMatches) {
        if let Some(url) = m.get_one::<String>("base-url") {
            self.base_url = url.clone();
        }
        if let Some(token) = m.get_one::<String>("token") {
            self.token = Some(token.clone());
        }
        if let Some(secs) = m.get_one::<u64>("timeout") {
            self.timeout_secs = *secs;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            bail!(
                "Invalid base URL '{}', expected http:// or https://",
                self.base_url
            );
        }
        if self.timeout_secs == 0 {
            bail!("Timeout must be at least one second");
        }
        Ok(())
    }

    /// File (from `--config` or the platform dir), then environment, then flags.
    pub fn resolve(m: &clap::ArgMatches) -> Result<Self> {
        let path = match m.get_one::<String>("config") {
            Some(p) => PathBuf::from(p),
            None => config_path()?,
        };
        let mut cfg = Self::load_or_default(&path)?;
        cfg.apply_env(|k| std::env::var(k).ok())?;
        cfg.apply_cli(m);
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let cfg = ClientConfig::load_or_default(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn save_and_reload_keeps_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = ClientConfig {
            base_url: "https://bonds.example.com".into(),
            session: Session {
                user_id: 42,
                username: "ana".into(),
            },
            ..ClientConfig::default()
        };
        cfg.save(&path).unwrap();
        assert_eq!(ClientConfig::from_file(&path).unwrap(), cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = 5\n[session]\nusername = \"ana\"\n").unwrap();
        let cfg = ClientConfig::from_file(&path).unwrap();
        assert_eq!(cfg.base_url, "http://localhost:8080");
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.session.user_id, 1);
        assert_eq!(cfg.session.username, "ana");
    }

    #[test]
    fn env_overrides_and_blank_token_clears() {
        let mut cfg = ClientConfig {
            token: Some("old".into()),
            ..ClientConfig::default()
        };
        cfg.apply_env(|k| match k {
            ENV_BASE_URL => Some("http://10.0.0.2:9000".into()),
            ENV_TOKEN => Some(" ".into()),
            ENV_TIMEOUT_SECS => Some("12".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.base_url, "http://10.0.0.2:9000");
        assert_eq!(cfg.token, None);
        assert_eq!(cfg.timeout_secs, 12);

        assert!(cfg.apply_env(|k| (k == ENV_TIMEOUT_SECS).then(|| "soon".into())).is_err());
    }

    #[test]
    fn validate_rejects_bad_url_and_zero_timeout() {
        let mut cfg = ClientConfig {
            base_url: "localhost:8080".into(),
            ..ClientConfig::default()
        };
        assert!(cfg.validate().is_err());
        cfg.base_url = default_base_url();
        cfg.timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }
}
