//! Error types for Postplan

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PostplanError>;

#[derive(Error, Debug)]
pub enum PostplanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid state: cannot {action} a {from} post")]
    InvalidState {
        from: &'static str,
        action: &'static str,
    },

    #[error("No active {platform} connection for this account")]
    PlatformNotConnected { platform: String },

    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Post already exists: {0}")]
    DuplicateId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PostplanError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PostplanError::Validation(_) | PostplanError::InvalidInput(_) => 3,
            PostplanError::PlatformNotConnected { .. } => 2,
            PostplanError::Config(_) => 2,
            PostplanError::Store(_) => 2,
            PostplanError::InvalidState { .. } => 1,
            PostplanError::NotFound(_) => 1,
            PostplanError::DuplicateId(_) => 1,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Content is {length} characters, above the {limit} character limit")]
    ContentTooLong { limit: usize, length: usize },

    #[error("Post must have content or at least one media attachment")]
    EmptyPost,

    #[error("Too many media attachments: {count} (maximum is 4)")]
    TooManyMedia { count: usize },

    #[error("Media URLs must be non-empty strings")]
    EmptyMediaUrl,

    #[error("Scheduled time must be in the future")]
    ScheduleInPast,

    #[error("A scheduled time is required")]
    MissingSchedule,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database operation failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Concurrent update conflict on post {0}")]
    VersionConflict(String),
}
