//! Connection settings for the report run.
//!
//! Read from a YAML file:
//!
//! ```yaml
//! aap_url: https://aap.example.com
//! verify_ssl: true
//! token: <oauth token>
//! ```
//!
//! `AAP_URL`, `AAP_TOKEN` and `AAP_VERIFY_SSL` (from the environment or a
//! `.env` file) override the file. When both `AAP_URL` and `AAP_TOKEN` are
//! set the file may be absent.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use aap_client::AapConfig;
use dotenvy::dotenv;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ReportError, Result};

/// Raw contents of the YAML config file.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub aap_url: Option<String>,
    #[serde(default)]
    pub verify_ssl: Option<bool>,
    #[serde(default)]
    pub token: Option<String>,
}

impl ConfigFile {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // an empty document parses to unit, not a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Load settings from `path` plus environment overrides.
pub fn load(path: &Path) -> Result<AapConfig> {
    // Load .env file if present (development)
    dotenv().ok();

    let file = if path.exists() {
        debug!(path = %path.display(), "Reading config file");
        ConfigFile::from_yaml(&fs::read_to_string(path)?)?
    } else {
        debug!(path = %path.display(), "Config file not found, using environment only");
        ConfigFile::default()
    };

    resolve(file, |key| env::var(key).ok()).map_err(|e| match e {
        ReportError::Config(msg) => {
            ReportError::Config(format!("{} (config file: {})", msg, path.display()))
        }
        other => other,
    })
}

/// Merge file values with overrides looked up through `var`.
pub fn resolve(file: ConfigFile, var: impl Fn(&str) -> Option<String>) -> Result<AapConfig> {
    let aap_url = var("AAP_URL")
        .or(file.aap_url)
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ReportError::Config("aap_url must be set".into()))?;

    let token = var("AAP_TOKEN")
        .or(file.token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ReportError::Config("token must be set".into()))?;

    let verify_ssl = match var("AAP_VERIFY_SSL") {
        Some(raw) => parse_bool(&raw).ok_or_else(|| {
            ReportError::Config(format!("AAP_VERIFY_SSL must be true or false, got {:?}", raw))
        })?,
        None => file.verify_ssl.unwrap_or(true),
    };

    Ok(AapConfig::new(aap_url.trim(), token).with_verify_ssl(verify_ssl))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand a leading `~` to `$HOME`.
pub fn expand_home(path: &str) -> PathBuf {
    let home = env::var_os("HOME").map(PathBuf::from);
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}
