pub mod config;
pub mod daemon;
pub mod history;
pub mod run;

use color_eyre::Result;
use moviepicks_config::{Config, CredentialStore, Credentials, PathManager};
use std::path::PathBuf;

/// A missing config file means all defaults
pub fn load_config(path_manager: &PathManager) -> Result<Config> {
    let config_file = path_manager.config_file();
    Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))
}

pub fn load_credentials(path_manager: &PathManager) -> Result<Credentials> {
    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
    Ok(Credentials::resolve(&cred_store))
}

pub fn history_path(config: &Config, path_manager: &PathManager) -> PathBuf {
    config
        .history
        .file
        .clone()
        .unwrap_or_else(|| path_manager.history_file())
}
