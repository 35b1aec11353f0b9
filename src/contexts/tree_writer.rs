use crate::data::{ArtifactSink, ResolvedFile, WriteError};
use std::fs;
use std::path::{Path, PathBuf};

/// FileTreeWriter is an implementation of the ArtifactSink trait that writes
/// each artifact below a destination root, mirroring its relative path.
///
/// Written content is always right-trimmed and terminated by exactly one newline.
#[derive(Debug, Clone)]
pub struct FileTreeWriter {
    /// The destination root (defaults to "extracted_src")
    root: PathBuf,
    /// When set, paths are reported but nothing touches the disk
    dry_run: bool,
}

impl FileTreeWriter {
    /// Creates a new FileTreeWriter
    ///
    /// # Arguments
    /// * `root` - Optional destination root. If None, defaults to "extracted_src"
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root: root.unwrap_or_else(|| PathBuf::from("extracted_src")),
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination of a relative path below the root
    fn target_path(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}

/// Right-trims `content` and appends a single newline.
pub fn normalize_content(content: &str) -> String {
    format!("{}\n", content.trim_end())
}

impl ArtifactSink for FileTreeWriter {
    /// Writes the file, creating intermediate directories first.
    /// An existing file at the same path is overwritten.
    fn write(&mut self, file: &ResolvedFile) -> Result<PathBuf, WriteError> {
        let path = self.target_path(&file.relative_path);
        if self.dry_run {
            tracing::debug!(path = %path.display(), "dry run, skipping write");
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| WriteError {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&path, normalize_content(&file.content)).map_err(|source| WriteError {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), bytes = file.content.len(), "wrote artifact");
        Ok(path)
    }
}
