//! Error taxonomy for composition operations.

/// Composition result type
pub type CompositionResult<T> = Result<T, CompositionError>;

/// Errors raised by registry mutations and patch processing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
    /// A panel with this id is already registered
    #[error("Panel already exists: {id}")]
    DuplicateId {
        /// Offending panel id
        id: String,
    },

    /// No panel with this id is registered
    #[error("Panel not found: {id}")]
    NotFound {
        /// Missing panel id
        id: String,
    },

    /// A payload failed structural checks
    #[error("Validation failed for {field}: {reason}")]
    Validation {
        /// Field that failed
        field: String,
        /// Why it failed
        reason: String,
    },

    /// A patch carried an `op` discriminator nobody recognizes
    #[error("Unknown patch op: {op}")]
    UnknownOp {
        /// The unrecognized discriminator
        op: String,
    },

    /// A message could not be decoded at all
    #[error("Decode error: {reason}")]
    Decode {
        /// Decoder message
        reason: String,
    },
}

impl CompositionError {
    /// Shorthand for a validation error
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a missing panel
    #[must_use]
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Registry-level errors reference panel identity (missing or duplicate)
    /// rather than a malformed payload.
    #[must_use]
    pub const fn is_registry_error(&self) -> bool {
        matches!(self, Self::DuplicateId { .. } | Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for CompositionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompositionError::NotFound {
            id: "map".to_string(),
        };
        assert_eq!(format!("{}", err), "Panel not found: map");

        let err = CompositionError::DuplicateId {
            id: "table".to_string(),
        };
        assert_eq!(format!("{}", err), "Panel already exists: table");
    }

    #[test]
    fn test_validation_shorthand() {
        let err = CompositionError::validation("visible", "expected a boolean");
        let s = format!("{}", err);
        assert!(s.contains("visible"));
        assert!(s.contains("expected a boolean"));
    }

    #[test]
    fn test_registry_error_classification() {
        assert!(CompositionError::not_found("a").is_registry_error());
        assert!(CompositionError::DuplicateId { id: "a".into() }.is_registry_error());
        assert!(!CompositionError::validation("f", "r").is_registry_error());
        assert!(!CompositionError::UnknownOp { op: "x".into() }.is_registry_error());
    }

    #[test]
    fn test_from_serde_error() {
        let err: CompositionError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, CompositionError::Decode { .. }));
    }
}
