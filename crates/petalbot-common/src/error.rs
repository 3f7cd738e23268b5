use thiserror::Error;

/// Cross-crate error type. Variants carry a human-readable detail string;
/// user-facing text is never built from these (see the fallback policy in
/// `petalbot-agents`).
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("channel error: {0}")]
    Channel(String),

    #[error("agent error: {0}")]
    Agent(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("media error: {0}")]
    Media(String),
}

pub type Result<T> = std::result::Result<T, Error>;
