use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("No IP given! Provide it with 'ip=XX.XX.XX.XX' as an env var")]
    MissingIp,

    #[error("invalid image {field} {value:?}: {reason}")]
    InvalidImage {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}
