use thiserror::Error;

// === ValidationError ===

/// Rejection reasons for a candidate (title, url) pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Title or URL is empty after trimming.
    #[error("Both fields are required.")]
    Required,
    /// URL does not start with `http://` or `https://`.
    #[error("URL must start with http:// or https://")]
    InvalidScheme,
}

// === StoreError ===

/// Errors related to record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No bookmark with the given ID is visible to the caller.
    #[error("Bookmark not found: {0}")]
    NotFound(String),
    /// The record would violate a stored invariant (empty title or url).
    #[error("Invalid bookmark record: {0}")]
    Invalid(String),
    /// Database operation failed.
    #[error("Bookmark database error: {0}")]
    DatabaseError(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

// === FeedError ===

/// Errors surfaced by a change feed subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The subscriber fell behind and this many events were dropped.
    #[error("Change feed lagged, {0} events dropped")]
    Lagged(u64),
    /// The feed was shut down.
    #[error("Change feed closed")]
    Closed,
}

// === IdentityError ===

/// Errors related to sessions and viewer records.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Database operation failed.
    #[error("Identity database error: {0}")]
    DatabaseError(String),
    /// Failed to generate a session token.
    #[error("Random generation failed: {0}")]
    RandomGeneration(String),
    /// Provider or subject was empty.
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),
}

impl From<rusqlite::Error> for IdentityError {
    fn from(e: rusqlite::Error) -> Self {
        IdentityError::DatabaseError(e.to_string())
    }
}

// === ViewError ===

/// Errors reported by a bookmark view to whoever triggered the action.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The candidate values were rejected before any write.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The store rejected the write. Only the generic message is shown.
    #[error("{0}")]
    WriteFailed(String),
    /// The initial snapshot could not be loaded.
    #[error("Failed to load bookmarks: {0}")]
    LoadFailed(String),
    /// No signed-in viewer.
    #[error("Not signed in")]
    NotSignedIn,
}

// === ConfigError ===

/// Errors related to configuration loading and saving.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading or writing the config file.
    #[error("Config I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize the config.
    #[error("Config serialization error: {0}")]
    SerializationError(String),
    /// A field holds a value the application cannot run with.
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}
