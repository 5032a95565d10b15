use thiserror::Error;

/// Errors surfaced by registry operations.
///
/// None of these are fatal to the service: invalid input and unknown names
/// are rejected at the boundary, and persistence failures degrade to
/// in-memory state until the next successful save.
#[derive(Debug, Error)]
pub enum BirthdayError {
    /// The date string does not match the `MM-DD` shape.
    #[error("invalid date {0:?}, expected MM-DD")]
    InvalidFormat(String),

    /// The name could not be resolved to a player identity.
    #[error("player not found: {0}")]
    PlayerNotFound(String),

    /// Reading or writing the registry file failed.
    #[error("registry persistence failed: {0}")]
    Persistence(#[from] std::io::Error),
}
