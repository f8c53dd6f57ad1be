use thiserror::Error;

use crate::AccessError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("the root chain has no parent")]
    RootHasNoParent,

    /// Reading a member failed in the middle of a traversal.
    #[error("cannot read `{path}`: {source}")]
    Access {
        path: String,
        #[source]
        source: AccessError,
    },

    #[error("`{ty}` has no field `{field}`")]
    NoSuchField { ty: &'static str, field: String },

    #[error("`{target}` expects a value of type `{expected}`, got `{actual}`")]
    TypeMismatch {
        target: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("`{0}` is not a class")]
    NotAClass(&'static str),

    #[error("`{0}` is not an array type")]
    NotAnArray(&'static str),

    #[error("instrumentation is already installed")]
    AlreadyInstalled,

    #[error(
        "instrumentation is not set up, \
         install one before querying object sizes"
    )]
    InstrumentationNotInstalled,
}
