use crate::contexts::artifact_scanner::{select_primary, ArtifactScanner};
use crate::contexts::error::{ExtractError, ResolveError};
use crate::contexts::path_resolver::{stub_identity, PathResolver};
use crate::contexts::stub_synthesizer::StubSynthesizer;
use crate::contexts::tree_writer::normalize_content;
use crate::data::{
    ArtifactDescriptor, ArtifactSink, LanguageProfile, ManifestEntry, ManifestOrigin, ResolvedFile,
    WriteError,
};
use std::path::PathBuf;

/// A file that reached its sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub relative_path: PathBuf,
    /// Where the sink put it
    pub location: PathBuf,
    /// Content exactly as written (right-trimmed, newline-terminated)
    pub content: String,
    /// True when the content is a synthesized placeholder
    pub stubbed: bool,
}

#[derive(Debug)]
pub struct FailedWrite {
    pub relative_path: PathBuf,
    pub error: WriteError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct MaterializeReport {
    pub written: Vec<WrittenFile>,
    pub failures: Vec<FailedWrite>,
    /// Artifacts dropped because their path could not be resolved safely
    pub skipped: usize,
}

impl MaterializeReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn stub_count(&self) -> usize {
        self.written.iter().filter(|w| w.stubbed).count()
    }
}

/// Outcome of a single-artifact run.
#[derive(Debug)]
pub struct PrimaryOutcome {
    pub primary: WrittenFile,
    /// Build files written next to the primary artifact
    pub companions: Vec<WrittenFile>,
}

/// Drives scanner, resolver, stub synthesizer and sink for one document.
#[derive(Debug, Clone)]
pub struct Materializer {
    scanner: ArtifactScanner,
}

impl Materializer {
    pub fn new(profile: LanguageProfile) -> Result<Self, ExtractError> {
        Ok(Self {
            scanner: ArtifactScanner::new(profile)?,
        })
    }

    pub fn profile(&self) -> &LanguageProfile {
        self.scanner.profile()
    }

    /// Turns a descriptor into the file to write, synthesizing a stub for a
    /// class descriptor that came without code.
    pub fn resolve_file(
        &self,
        descriptor: &ArtifactDescriptor,
    ) -> Result<(ResolvedFile, bool), ResolveError> {
        let relative_path = PathResolver::new(self.profile()).resolve(descriptor)?;
        let (content, stubbed) = match descriptor {
            ArtifactDescriptor::InlineCode(code) => (code.body.clone(), false),
            ArtifactDescriptor::Manifest(entry) => match (&entry.content, entry.origin) {
                (Some(content), _) => (content.clone(), false),
                (None, ManifestOrigin::ClassDescriptor) => {
                    let (name, namespace) = stub_identity(&relative_path);
                    let stub = StubSynthesizer::new(self.profile())
                        .synthesize(&name, namespace.as_deref());
                    (stub, true)
                }
                (None, ManifestOrigin::FileList { .. }) => (String::new(), false),
            },
        };
        Ok((
            ResolvedFile {
                relative_path,
                content,
            },
            stubbed,
        ))
    }

    /// Writes every inline source block and every class descriptor found in
    /// `text`. A failed write is recorded and the remaining artifacts are
    /// still processed.
    pub fn materialize_all(&self, text: &str, sink: &mut dyn ArtifactSink) -> MaterializeReport {
        let mut report = MaterializeReport::default();

        for descriptor in self.scanner.scan(text) {
            if let ArtifactDescriptor::Manifest(ManifestEntry {
                origin: ManifestOrigin::FileList { .. },
                ..
            }) = descriptor
            {
                continue;
            }

            let (file, stubbed) = match self.resolve_file(&descriptor) {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping artifact");
                    report.skipped += 1;
                    continue;
                }
            };

            match sink.write(&file) {
                Ok(location) => {
                    tracing::info!(
                        path = %file.relative_path.display(),
                        stubbed,
                        "materialized artifact"
                    );
                    report.written.push(written(file, location, stubbed));
                }
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        "write failed, continuing with remaining artifacts"
                    );
                    report.failures.push(FailedWrite {
                        relative_path: file.relative_path,
                        error,
                    });
                }
            }
        }

        report
    }

    /// Writes the primary file of the first files manifest in `text`, plus
    /// any companion build file listed alongside it.
    ///
    /// Returns `ExtractError::NotFound` when the document holds no files manifest.
    pub fn materialize_primary(
        &self,
        text: &str,
        sink: &mut dyn ArtifactSink,
    ) -> Result<PrimaryOutcome, ExtractError> {
        let entries = first_file_list(self.scanner.scan(text));
        let selected = select_primary(&entries, self.profile()).ok_or(ExtractError::NotFound)?;

        let descriptor = ArtifactDescriptor::Manifest(selected.clone());
        let (file, _) = self.resolve_file(&descriptor)?;
        let location = sink.write(&file)?;
        tracing::info!(path = %file.relative_path.display(), "materialized primary artifact");
        let primary = written(file, location, false);

        let mut companions = Vec::new();
        for companion in &self.profile().companion_files {
            let Some(entry) = entries
                .iter()
                .find(|e| is_companion_entry(e.path.as_deref(), companion))
            else {
                continue;
            };
            let relative_path = PathBuf::from(companion);
            if relative_path == primary.relative_path {
                continue;
            }
            let file = ResolvedFile {
                relative_path,
                content: entry.content.clone().unwrap_or_default(),
            };
            let location = sink.write(&file)?;
            tracing::info!(path = %file.relative_path.display(), "materialized companion file");
            companions.push(written(file, location, false));
        }

        Ok(PrimaryOutcome {
            primary,
            companions,
        })
    }
}

fn written(file: ResolvedFile, location: PathBuf, stubbed: bool) -> WrittenFile {
    WrittenFile {
        content: normalize_content(&file.content),
        relative_path: file.relative_path,
        location,
        stubbed,
    }
}

/// Entries of the first files manifest, in listing order.
fn first_file_list(descriptors: impl Iterator<Item = ArtifactDescriptor>) -> Vec<ManifestEntry> {
    let mut first_block = None;
    let mut entries = Vec::new();
    for descriptor in descriptors {
        let ArtifactDescriptor::Manifest(entry) = descriptor else {
            continue;
        };
        let ManifestOrigin::FileList { block, .. } = entry.origin else {
            continue;
        };
        match first_block {
            None => first_block = Some(block),
            Some(b) if b != block => break,
            Some(_) => {}
        }
        entries.push(entry);
    }
    entries
}

/// Companions are only taken from entries listed at the manifest root.
fn is_companion_entry(path: Option<&str>, companion: &str) -> bool {
    path.is_some_and(|p| p.trim() == companion)
}
