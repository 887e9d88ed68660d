//! Error kinds for the type generation pipeline.
//!
//! Every error aborts the current invocation; none are retried. Variants
//! carry enough context (the offending path) for a host to attribute the
//! failure to a source GraphQL document.

/// Fatal errors raised while lowering or raising a generated types file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypegenError {
    /// A union member object carries no `__typename: "X"` string literal.
    #[error("union member at `{path}` has no `__typename` string literal")]
    MissingTypenameOnUnion { path: String },

    /// Reserved for when `Int` and `Float` must be told apart. All numerics
    /// currently map to `Float`, so this is never constructed.
    #[error("could not map numeric type at `{path}`")]
    CouldNotMapNumber { path: String },

    /// Extraction finished but produced neither variables, response nor
    /// fragment. Raised at emit time.
    #[error("no variables, response or fragment found in input")]
    NoExtractableOperationsFound,

    /// A record name was requested from an empty path. Always a naming bug.
    #[error("cannot derive a record name from an empty path")]
    ObjectPathEmpty,
}
