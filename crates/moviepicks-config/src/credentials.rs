use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use crate::error::ConfigError;

pub const TMDB_API_KEY: &str = "TMDB_API_KEY";
pub const ULTRA_INSTANCE_ID: &str = "ULTRA_INSTANCE_ID";
pub const ULTRA_TOKEN: &str = "ULTRA_TOKEN";
pub const WHATSAPP_TO: &str = "WHATSAPP_TO";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Every setting the credentials file may hold
pub const KNOWN_SETTINGS: [&str; 5] = [TMDB_API_KEY, ULTRA_INSTANCE_ID, ULTRA_TOKEN, WHATSAPP_TO, OPENAI_API_KEY];

/// File key for a setting name given in any case (`tmdb_api_key` for `TMDB_API_KEY`)
fn file_key(name: &str) -> Result<String, ConfigError> {
    let upper = name.trim().to_uppercase();
    if KNOWN_SETTINGS.contains(&upper.as_str()) {
        Ok(upper.to_lowercase())
    } else {
        Err(ConfigError::Invalid(format!(
            "unknown setting '{}', expected one of {}",
            name.trim(),
            KNOWN_SETTINGS.join(", ")
        )))
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Flat key/value TOML file holding secrets that are not in the environment.
/// Keys are the lowercase setting names (`tmdb_api_key = "..."`).
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrites the whole file; the file is owner-only on unix
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    /// Stores `value` for a known setting. Blank values are rejected so a
    /// typo can't silently unset a key.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let key = file_key(name)?;
        let value = value.trim();
        if value.is_empty() {
            return Err(ConfigError::Invalid(format!("value for {} is empty", key.to_uppercase())));
        }
        self.credentials.insert(key, value.to_string());
        Ok(())
    }

    /// Whether the setting was present
    pub fn remove(&mut self, name: &str) -> Result<bool, ConfigError> {
        let key = file_key(name)?;
        Ok(self.credentials.remove(&key).is_some())
    }
}

/// Resolved secrets and destination ids.
///
/// Built once at startup and handed to each collaborator at construction
/// time; nothing below the CLI reads the environment.
#[derive(Clone, Default)]
pub struct Credentials {
    pub tmdb_api_key: Option<String>,
    pub ultra_instance_id: Option<String>,
    pub ultra_token: Option<String>,
    pub whatsapp_to: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Credentials {
    /// Environment first, then the credentials file
    pub fn resolve(store: &CredentialStore) -> Self {
        Self::resolve_with(|name| std::env::var(name).ok(), store)
    }

    pub fn resolve_with<F>(lookup: F, store: &CredentialStore) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .or_else(|| store.get(&name.to_lowercase()).cloned())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            tmdb_api_key: get(TMDB_API_KEY),
            ultra_instance_id: get(ULTRA_INSTANCE_ID),
            ultra_token: get(ULTRA_TOKEN),
            whatsapp_to: get(WHATSAPP_TO),
            openai_api_key: get(OPENAI_API_KEY),
        }
    }

    /// Names of required settings that are absent. Delivery settings are
    /// only required when a message will actually be sent.
    pub fn missing(&self, delivery_required: bool) -> Vec<String> {
        let mut missing = Vec::new();
        if self.tmdb_api_key.is_none() {
            missing.push(TMDB_API_KEY.to_string());
        }
        if delivery_required {
            let delivery = [
                (ULTRA_INSTANCE_ID, &self.ultra_instance_id),
                (ULTRA_TOKEN, &self.ultra_token),
                (WHATSAPP_TO, &self.whatsapp_to),
            ];
            for (name, value) in delivery {
                if value.is_none() {
                    missing.push(name.to_string());
                }
            }
        }
        missing
    }

    pub fn validate(&self, delivery_required: bool) -> Result<(), ConfigError> {
        let missing = self.missing(delivery_required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingSettings(missing))
        }
    }

    /// Listing with secrets masked, for `config show`
    pub fn masked(&self) -> Vec<(&'static str, String)> {
        let mask = |v: &Option<String>| match v {
            Some(s) if s.chars().count() > 4 => format!("{}****", s.chars().take(4).collect::<String>()),
            Some(_) => "****".to_string(),
            None => "(not set)".to_string(),
        };
        vec![
            (TMDB_API_KEY, mask(&self.tmdb_api_key)),
            (ULTRA_INSTANCE_ID, mask(&self.ultra_instance_id)),
            (ULTRA_TOKEN, mask(&self.ultra_token)),
            (WHATSAPP_TO, mask(&self.whatsapp_to)),
            (OPENAI_API_KEY, mask(&self.openai_api_key)),
        ]
    }
}
