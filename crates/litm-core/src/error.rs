//! Error types for the roll engine.
//!
//! The power, might, and classifier paths never fail. Errors only surface at
//! the boundary: committing a roll, and reading or writing JSON state.

/// Errors that can occur at the edges of the roll engine.
#[derive(Debug, thiserror::Error)]
pub enum LitmError {
    /// The roll needs GM moderation and the user may not skip it.
    #[error("roll by '{actor}' requires moderation")]
    ModerationRequired {
        /// Actor whose roll was held back.
        actor: String,
    },

    /// A roll type string did not name a known roll type.
    #[error("unknown roll type: {0}")]
    UnknownRollType(String),

    /// Session, delta, or configuration JSON could not be read or written.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type for roll engine operations.
pub type LitmResult<T> = Result<T, LitmError>;
