// Error types for the document store, path mutation and catalog operations

use thiserror::Error;

/// Errors raised while setting a value at a dot path
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The path was the empty string
    #[error("path cannot be empty")]
    EmptyPath,

    /// The path contained an empty segment, e.g. `a..b` or a trailing dot
    #[error("path {path:?} contains an empty segment")]
    EmptySegment { path: String },

    /// An intermediate value was not an object and the policy forbids replacing it
    #[error("value at {path:?} is not an object")]
    NotAnObject { path: String },
}

/// Errors raised at the document store boundary
///
/// A missing document is not an error; reads return `Ok(None)` for that case.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid document name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("failed to access document {name}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse document {name}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("document {name} is not a JSON array")]
    NotACollection { name: String },
}

/// Errors raised by catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The submitted record failed the presence checks
    #[error("invalid product data: {0}")]
    Invalid(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
