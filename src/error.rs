//! The error taxonomy shared by both solver cores and their collaborators.
//!
//! Every kind here is fatal by policy (§7): callers never retry, and a
//! binary's `main` translates any `SolverError` into a single-line
//! diagnostic on stderr followed by a nonzero exit.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("invalid argument: {detail}")]
    InvalidArgument { detail: String },

    #[error("cannot split {rows} row(s) across {participants} participant(s)")]
    InvalidDecomposition { participants: usize, rows: usize },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("resource error: {detail}")]
    Resource { detail: String },

    #[error("communication error: {detail}")]
    Communication { detail: String },
}
