use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("not initialized: run 'slotdesk init'")]
    NotInitialized,

    #[error("authentication required")]
    NotAuthenticated,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("user already exists: {0}")]
    UserExists(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("text is empty")]
    EmptyText,

    #[error("invalid slot: {0}")]
    InvalidSlot(String),

    #[error("unknown page: {0}")]
    UnknownPage(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("session error: {0}")]
    Session(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SlotError>;
