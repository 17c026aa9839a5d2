use anyhow::{Context, Result};
use keyring::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::LinkhutError;

const SERVICE_NAME: &str = "linkhut-cli";
const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_API_URL: &str = "https://api.ln.ht";
pub const DEFAULT_PREVIEW_URL: &str = "https://api.linkpreview.net";

/// A secret the CLI needs, looked up in the environment first and the OS
/// keyring second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    LinkhutToken,
    PreviewKey,
}

impl Credential {
    pub fn env_var(self) -> &'static str {
        match self {
            Credential::LinkhutToken => "LH_PAT",
            Credential::PreviewKey => "LINK_PREVIEW_API_KEY",
        }
    }

    fn keyring_user(self) -> &'static str {
        match self {
            Credential::LinkhutToken => "lh_pat",
            Credential::PreviewKey => "link_preview_api_key",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Credential::LinkhutToken => "LinkHut API Token",
            Credential::PreviewKey => "Link Preview API Key",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Keyring,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Keyring => write!(f, "keyring"),
        }
    }
}

/// Log the outcome of `dotenvy::dotenv()`, which runs before the subscriber
/// exists. A missing file is not an error.
pub fn report_dotenv(result: &dotenvy::Result<PathBuf>) {
    match result {
        Ok(path) => debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("no .env file found"),
        Err(e) => warn!("failed to load .env file: {}", e),
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    config_dir: PathBuf,
    pub api_url: Option<String>,
    pub preview_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Self::load_from(config_dir)
    }

    pub fn load_from(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        let table = read_table(&config_dir.join(CONFIG_FILE))?;

        Ok(Self {
            api_url: lookup(&table, "api.url"),
            preview_url: lookup(&table, "preview.url"),
            config_dir,
        })
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join("linkhut"))
            .context("Failed to determine config directory")
    }

    /// Resolve a base URL: explicit flag or env first, then config file, then default.
    pub fn resolve_api_url(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn resolve_preview_url(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.preview_url.clone())
            .unwrap_or_else(|| DEFAULT_PREVIEW_URL.to_string())
    }

    pub fn credential(&self, credential: Credential) -> Result<Option<(String, CredentialSource)>> {
        let from_env = std::env::var(credential.env_var()).ok();
        if let Some(value) = from_env.as_deref().and_then(non_blank) {
            return Ok(Some((value, CredentialSource::Environment)));
        }

        let entry = Entry::new(SERVICE_NAME, credential.keyring_user())?;
        Ok(keyring_value(credential, entry.get_password()).map(|v| (v, CredentialSource::Keyring)))
    }

    pub fn require(&self, credential: Credential) -> Result<String> {
        required(credential, self.credential(credential)?)
    }

    pub fn store_credential(&self, credential: Credential, value: &str) -> Result<()> {
        let value = non_blank(value)
            .with_context(|| format!("{} cannot be empty", credential.label()))?;
        let entry = Entry::new(SERVICE_NAME, credential.keyring_user())?;
        entry
            .set_password(&value)
            .with_context(|| format!("Failed to store {}", credential.label()))?;
        Ok(())
    }

    pub fn remove_credential(&self, credential: Credential) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, credential.keyring_user())?;
        match entry.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to remove {}: {}",
                credential.label(),
                e
            )),
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let config_file = self.config_dir.join(CONFIG_FILE);
        let mut config = read_table(&config_file).unwrap_or_default();

        // Dotted keys like "api.url" address a table
        if let Some((section, subkey)) = key.split_once('.') {
            let section_map = config
                .entry(section.to_string())
                .or_insert_with(|| toml::Value::Table(toml::value::Table::new()))
                .as_table_mut()
                .with_context(|| format!("'{}' is not a section in the config file", section))?;

            section_map.insert(subkey.to_string(), toml::Value::String(value.to_string()));
        } else {
            config.insert(key.to_string(), toml::Value::String(value.to_string()));
        }

        let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
        fs::write(&config_file, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let config = read_table(&self.config_dir.join(CONFIG_FILE))?;
        Ok(lookup(&config, key))
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// A blank keyring entry counts as no entry.
fn keyring_value(credential: Credential, result: keyring::Result<String>) -> Option<String> {
    match result {
        Ok(value) => {
            let value = non_blank(&value);
            if value.is_none() {
                debug!("keyring entry for {} is blank", credential.env_var());
            }
            value
        }
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!("keyring lookup for {} failed: {}", credential.env_var(), e);
            None
        }
    }
}

fn required(credential: Credential, found: Option<(String, CredentialSource)>) -> Result<String> {
    match found {
        Some((value, _)) => Ok(value),
        None => Err(LinkhutError::MissingCredential(credential.env_var()).into()),
    }
}

fn read_table(path: &Path) -> Result<HashMap<String, toml::Value>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn lookup(config: &HashMap<String, toml::Value>, key: &str) -> Option<String> {
    let value = match key.split_once('.') {
        Some((section, subkey)) => config.get(section)?.as_table()?.get(subkey)?,
        None => config.get(key)?,
    };
    value.as_str().map(|s| s.to_string())
}
