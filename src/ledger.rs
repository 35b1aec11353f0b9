//! Extraction ledger
//!
//! Records what a materialization run wrote (with SHA-256 digests) and what
//! failed, so a run can be audited or diffed against a later one.

use crate::contexts::{FailedWrite, WrittenFile};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// A file the run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Path relative to the destination root
    pub relative_path: String,
    /// SHA-256 of the written bytes
    pub sha256: String,
    pub bytes: usize,
    /// Whether the content is a synthesized placeholder
    pub stubbed: bool,
    pub written_at: String,
}

/// A file the run failed to write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFailure {
    pub relative_path: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionLedger {
    /// Document the artifacts were extracted from
    pub input: String,
    pub destination: String,
    pub language: String,
    pub started_at: String,
    pub entries: Vec<LedgerEntry>,
    pub failures: Vec<LedgerFailure>,
}

impl ExtractionLedger {
    pub fn new(input: &Path, destination: &Path, language: &str) -> Self {
        Self {
            input: input.display().to_string(),
            destination: destination.display().to_string(),
            language: language.to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            ..Default::default()
        }
    }

    /// Record a successful write
    pub fn record(&mut self, file: &WrittenFile) {
        self.entries.push(LedgerEntry {
            relative_path: file.relative_path.display().to_string(),
            sha256: Self::hash_content(&file.content),
            bytes: file.content.len(),
            stubbed: file.stubbed,
            written_at: chrono::Utc::now().to_rfc3339(),
        });
    }

    /// Record a failed write
    pub fn record_failure(&mut self, failure: &FailedWrite) {
        self.failures.push(LedgerFailure {
            relative_path: failure.relative_path.display().to_string(),
            error: failure.error.to_string(),
        });
    }

    /// Load a ledger written by an earlier run
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read ledger: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse ledger: {}", path.display()))
    }

    /// Save the ledger as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create ledger directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize ledger")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write ledger: {}", path.display()))?;

        Ok(())
    }

    /// Compute SHA256 hash of written content
    fn hash_content(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Paths whose digest differs between `previous` and this ledger, plus new paths
    pub fn changed_since(&self, previous: &ExtractionLedger) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|entry| {
                !previous
                    .entries
                    .iter()
                    .any(|old| {
                        old.relative_path == entry.relative_path && old.sha256 == entry.sha256
                    })
            })
            .map(|entry| PathBuf::from(&entry.relative_path))
            .collect()
    }

    /// Get a summary of the run
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("Extraction Ledger ({} -> {}):", self.input, self.destination));

        for entry in &self.entries {
            let marker = if entry.stubbed { " [stub]" } else { "" };
            let short = &entry.sha256[..12.min(entry.sha256.len())];
            lines.push(format!("  {} {}{}", short, entry.relative_path, marker));
        }

        for failure in &self.failures {
            lines.push(format!("  FAILED {}: {}", failure.relative_path, failure.error));
        }

        if self.entries.is_empty() && self.failures.is_empty() {
            lines.push("  No files written".to_string());
        }

        lines.join("\n")
    }
}
