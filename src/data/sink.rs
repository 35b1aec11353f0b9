use crate::data::ResolvedFile;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to persist a single artifact
#[derive(Debug, Error)]
#[error("Failed to write {}: {source}", path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Destination for resolved artifacts.
///
/// Implementations persist the file somewhere below their own root and
/// report the location they wrote to.
pub trait ArtifactSink {
    /// Persists `file`, overwriting anything already at its path.
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - The location written to
    /// * `Err(WriteError)` - Directory creation or the write itself failed
    fn write(&mut self, file: &ResolvedFile) -> Result<PathBuf, WriteError>;
}
