use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short label used in log fields so failures can be grouped without
    /// matching on message text.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Api { status, .. } if *status == 429 => "rate_limited",
            Self::Api { status, .. } if *status == 401 || *status == 403 => "unauthorized",
            Self::Api { .. } => "api",
            Self::Http(_) => "network",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Json(_) | Self::TomlDe(_) => "decode",
            Self::Store(_) => "store",
        }
    }
}
