use thiserror::Error;

/// Errors that abort a whole pipeline run before any notification is sent.
///
/// Per-recipient delivery problems are never represented here; they end up
/// as failed dispatch outcomes in the batch report instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WasteError {
    /// Caller input or store data failed validation (bad period, negative
    /// threshold, malformed recipient id, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The waste-log or recipient store could not be queried.
    #[error("Store error: {0}")]
    Store(String),
}

impl WasteError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn store(msg: impl std::fmt::Display) -> Self {
        Self::Store(msg.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, WasteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category() {
        let err = WasteError::validation("unknown period 'Smarch'");
        assert_eq!(err.to_string(), "Validation error: unknown period 'Smarch'");

        let err = WasteError::store("connection refused");
        assert_eq!(err.to_string(), "Store error: connection refused");
        assert!(!err.is_validation());
    }
}
