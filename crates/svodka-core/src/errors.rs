/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the core can
/// handle failures consistently (user-facing message vs silently logged).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error: {service}: {message}")]
    Provider {
        service: &'static str,
        message: String,
    },

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn provider(service: &'static str, message: impl Into<String>) -> Self {
        Error::Provider {
            service,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
