use anyhow::Result;
use std::path::PathBuf;

/// Get the container base path from environment variable, defaulting to "/app"
pub fn container_base_path() -> PathBuf {
    std::env::var("MOVIEPICKS_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("moviepicks");

        Ok(Self::with_base(base_dir))
    }

    /// Config files at the base, data and logs in subdirectories
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn from_docker_env() -> Self {
        Self::with_base(container_base_path())
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.toml")
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join("movie_history.json")
    }

    pub fn daemon_log_file(&self) -> PathBuf {
        self.log_dir.join("moviepicks.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // The container image creates the base directory; its presence means Docker
        let base = container_base_path();
        if base.exists() {
            return Self::from_docker_env();
        }

        Self::new().unwrap_or_else(|_| Self::from_docker_env())
    }
}
