//! Error type for assessment operations.

use brewqa_storage::StorageError;

/// Result type for assessment operations.
pub type Result<T> = std::result::Result<T, QualityError>;

/// Kind of record a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Production batch
    Batch,
    /// Recipe
    Recipe,
    /// User (inspector)
    User,
    /// Quality check
    QualityCheck,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Batch => "batch",
            Self::Recipe => "recipe",
            Self::User => "user",
            Self::QualityCheck => "quality check",
        };
        f.write_str(s)
    }
}

/// Errors that can occur during assessment operations.
#[derive(Debug, thiserror::Error)]
pub enum QualityError {
    /// A referenced record does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up
        kind: EntityKind,
        /// The id that did not resolve
        id: String,
    },

    /// Caller supplied an invalid argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Store failure, passed through unchanged
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QualityError {
    pub(crate) fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// HTTP status an API layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidInput(_) => 400,
            Self::Storage(_) => 500,
        }
    }
}
