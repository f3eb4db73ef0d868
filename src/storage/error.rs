use std::fmt;

/// Error type for store operations.
///
/// `NotFound` and `AlreadyExists` are no-op signals rather than failures:
/// the mutation did not happen and the store is unchanged. `Corrupt` and
/// `Write` carry the underlying cause as text so values stay cheap to
/// clone and compare in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The mutation target is absent; nothing was written.
    NotFound { title: String },
    /// The title is already present and the store rejects duplicates;
    /// nothing was written.
    AlreadyExists { title: String },
    /// The store was unreadable, unparsable, or the wrong shape.
    Corrupt(String),
    /// The store could not be written back.
    Write(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { title } => write!(f, "movie '{}' not found", title),
            StoreError::AlreadyExists { title } => {
                write!(f, "movie '{}' already exists", title)
            }
            StoreError::Corrupt(msg) => write!(f, "corrupt store: {}", msg),
            StoreError::Write(msg) => write!(f, "store write failed: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_title() {
        let err = StoreError::NotFound {
            title: "Matrix".to_string(),
        };
        assert_eq!(err.to_string(), "movie 'Matrix' not found");

        let err = StoreError::AlreadyExists {
            title: "Matrix".to_string(),
        };
        assert_eq!(err.to_string(), "movie 'Matrix' already exists");
    }

    #[test]
    fn display_includes_cause() {
        let err = StoreError::Corrupt("expected a map".to_string());
        assert_eq!(err.to_string(), "corrupt store: expected a map");
    }
}
