use std::fmt;

use crate::types::Kind;

/// Source error produced by a factory or disposer collaborator.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type for repool operations
#[derive(Debug)]
pub enum Error {
    /// The factory failed to produce a new instance
    Factory(CollaboratorError),

    /// The disposer failed to release an instance
    Disposer(CollaboratorError),

    /// A member was requested for a kind with no registered pool and
    /// no default settings to create one from
    UnknownKind(Kind),
}

impl Error {
    /// Wrap a factory failure
    pub fn factory<E>(source: E) -> Self
    where
        E: Into<CollaboratorError>,
    {
        Error::Factory(source.into())
    }

    /// Wrap a disposer failure
    pub fn disposer<E>(source: E) -> Self
    where
        E: Into<CollaboratorError>,
    {
        Error::Disposer(source.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Factory(e) => write!(f, "Factory error: {}", e),
            Error::Disposer(e) => write!(f, "Disposer error: {}", e),
            Error::UnknownKind(kind) => write!(
                f,
                "No pool for kind '{}' and no default settings configured",
                kind
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Factory(e) | Error::Disposer(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias for repool operations
pub type Result<T> = std::result::Result<T, Error>;
