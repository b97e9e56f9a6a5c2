//! Selection error types and diagnostics.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::query::QueryError;
use crate::core::ReferenceError;
use crate::util::diagnostic::Diagnostic;

/// Arguments that cannot be combined in one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryConflict {
    /// A package query together with a concrete package id.
    PackageQueryWithExactId,
    /// An LRU bound together with a remote.
    LruWithRemote,
    /// A package query for a pattern that does not reach packages.
    PackageQueryWithoutPackages,
}

impl fmt::Display for QueryConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryConflict::PackageQueryWithExactId => {
                write!(f, "cannot specify a package query if 'package_id' is not a pattern")
            }
            QueryConflict::LruWithRemote => {
                write!(f, "'--lru' cannot be used in remotes, only in the local cache")
            }
            QueryConflict::PackageQueryWithoutPackages => {
                write!(f, "a package query was given but the pattern does not match packages")
            }
        }
    }
}

/// Error during reference selection.
///
/// Every variant aborts the whole selection; no partial result is returned.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum SelectError {
    #[error(transparent)]
    #[diagnostic(code(berth::select::malformed))]
    Malformed(#[from] ReferenceError),

    #[error(transparent)]
    #[diagnostic(
        code(berth::select::query_syntax),
        help("Queries look like: os=Windows AND (arch=x86 OR compiler=gcc)")
    )]
    InvalidQuerySyntax(#[from] QueryError),

    #[error("{0}")]
    #[diagnostic(code(berth::select::invalid_combination))]
    InvalidQueryCombination(QueryConflict),

    #[error("{0}")]
    #[diagnostic(
        code(berth::select::recipe_not_found),
        help("Use a `*` wildcard to list what exists")
    )]
    ReferenceNotFound(String),

    #[error("{0}")]
    #[diagnostic(
        code(berth::select::binary_not_found),
        help("Use `:*` to list the available binaries")
    )]
    BinaryNotFound(String),

    #[error("error querying `{source_name}`: {source:#}")]
    #[diagnostic(code(berth::select::backend))]
    Backend {
        source_name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl SelectError {
    /// Wrap a backend failure with the name of the source it came from.
    pub fn backend(source_name: impl Into<String>, source: anyhow::Error) -> Self {
        SelectError::Backend {
            source_name: source_name.into(),
            source,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());

        if let Some(help) = MietteDiagnostic::help(self) {
            diag = diag.with_suggestion(help.to_string());
        }

        match self {
            SelectError::InvalidQueryCombination(QueryConflict::PackageQueryWithExactId) => diag
                .with_context("the package id is already fully specified")
                .with_suggestion("Drop the package query, or use `:*` as the package id"),
            SelectError::InvalidQueryCombination(QueryConflict::LruWithRemote) => {
                diag.with_suggestion("Remove `--lru`, or select from the local cache")
            }
            SelectError::InvalidQueryCombination(QueryConflict::PackageQueryWithoutPackages) => {
                diag.with_suggestion("Add a package scope to the pattern, e.g. `zlib/*:*`")
            }
            SelectError::Backend { .. } => diag
                .with_suggestion("Check your network connection")
                .with_suggestion("Verify the remote URL in config.toml"),
            _ => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combination_diagnostic() {
        let err = SelectError::InvalidQueryCombination(QueryConflict::PackageQueryWithExactId);
        let output = err.to_diagnostic().format(false);

        assert!(output.contains("package query"));
        assert!(output.contains("already fully specified"));
        assert!(output.contains("help: consider:"));
    }

    #[test]
    fn test_not_found_carries_help() {
        let err = SelectError::ReferenceNotFound("Recipe 'zlib/9.9' not found".to_string());
        let output = err.to_diagnostic().format(false);

        assert!(output.contains("Recipe 'zlib/9.9' not found"));
        assert!(output.contains("wildcard"));
    }
}
