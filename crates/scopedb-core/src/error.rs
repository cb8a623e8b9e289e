use std::fmt;
use thiserror::Error as ThisError;

///
/// ErrorClass
///
/// Stable classification shared by every error this crate returns.
/// Validation errors are fatal to the call and must not be retried.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Validation,
    Store,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}

///
/// CompileError
///
/// Descriptor validation failures raised while compiling a query for any
/// backend. Each variant names the offending attribute or value.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    #[error(
        "invalid sort attribute '{attribute}'; supported attributes are: {}",
        .supported.join(", ")
    )]
    UnknownSortAttribute {
        attribute: String,
        supported: Vec<String>,
    },

    #[error("invalid sort direction '{direction}'; expected 'asc' or 'desc'")]
    InvalidSortDirection { direction: String },

    #[error(
        "cannot combine non-distincts with multi-column distincts: distinct [{}], non-distinct [{}]",
        .distinct.join(", "),
        .conflicting.join(", ")
    )]
    MultiColumnDistinct {
        distinct: Vec<String>,
        conflicting: Vec<String>,
    },

    #[error("invalid {context} identifier '{ident}'")]
    InvalidIdentifier { ident: String, context: &'static str },

    #[error("'contains' cannot be used on the seed filter '{attribute}'; seed filters must be index-backed")]
    UnsupportedSeedFilter { attribute: String },
}

impl CompileError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Validation
    }
}

///
/// StoreError
///
/// Failures reported by a local store while a compiled collection query runs.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("collection '{collection}' does not exist in the local store")]
    UnknownCollection { collection: String },

    #[error("local store failure: {message}")]
    Backend { message: String },
}

impl StoreError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Store
    }

    /// Construct a backend failure from any displayable message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

///
/// QueryError
///
/// Error surface of the collection query engine: compilation or execution.
///

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl QueryError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Compile(_) => ErrorClass::Validation,
            Self::Store(_) => ErrorClass::Store,
        }
    }
}
