use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required external settings are absent; the run must not start
    #[error("missing required settings: {}", .0.join(", "))]
    MissingSettings(Vec<String>),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
