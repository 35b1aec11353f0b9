use crate::data::WriteError;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a descriptor cannot be turned into a relative path
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("artifact resolves to an empty path")]
    EmptyPath,
    #[error("path '{}' escapes the destination root", .0.display())]
    UnsafePath(PathBuf),
}

/// Errors surfaced by the extraction pipeline
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No files manifest with accompanying content was found in the document")]
    NotFound,
    #[error("invalid source pattern for language profile: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Write(#[from] WriteError),
}
