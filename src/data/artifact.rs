use serde::Deserialize;
use std::path::PathBuf;

/// One contiguous span of transcript text attributed to a single speaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: String,
    pub body: String,
}

impl Turn {
    pub fn new(speaker: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            body: body.into(),
        }
    }
}

/// Ordered turns of a normalized conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalDocument {
    turns: Vec<Turn>,
}

impl CanonicalDocument {
    pub(crate) fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Renders the document in its durable markdown form:
    /// `### speaker`, blank line, body, with turns separated by a blank line.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|turn| format!("### {}\n\n{}\n", turn.speaker, turn.body))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A source file found verbatim inside a fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineCode {
    pub body: String,
    pub declared_namespace: Option<String>,
    pub declared_type_name: String,
}

/// Which manifest shape an entry was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestOrigin {
    /// Entry `index` of the `files` list in the `block`-th manifest of the document.
    FileList { block: usize, index: usize },
    /// The single descriptor keyed by the profile's manifest key.
    ClassDescriptor,
}

/// A file described by a JSON manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub path: Option<String>,
    pub name: Option<String>,
    pub content: Option<String>,
    pub origin: ManifestOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactDescriptor {
    InlineCode(InlineCode),
    Manifest(ManifestEntry),
}

/// The two JSON shapes a manifest block can take, decided by which keys are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Manifest {
    FileList(Vec<FileEntry>),
    ClassDescriptor(ClassDescriptor),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileEntry {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClassDescriptor {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Manifest {
    /// Interprets a parsed JSON value as a manifest.
    ///
    /// A non-empty `files` array wins over `manifest_key`; anything else is not a manifest.
    pub fn from_value(value: &serde_json::Value, manifest_key: &str) -> Option<Self> {
        let object = value.as_object()?;

        if let Some(files) = object.get("files").and_then(|f| f.as_array()) {
            let entries: Vec<FileEntry> = files
                .iter()
                .filter_map(|f| serde_json::from_value::<FileEntry>(f.clone()).ok())
                .filter(|f| f.path.as_deref().is_some_and(|p| !p.trim().is_empty()))
                .collect();
            if !entries.is_empty() {
                return Some(Manifest::FileList(entries));
            }
        }

        let descriptor = object.get(manifest_key)?;
        if !descriptor.is_object() {
            return None;
        }
        serde_json::from_value::<ClassDescriptor>(descriptor.clone())
            .ok()
            .map(Manifest::ClassDescriptor)
    }
}

/// The final unit handed to a sink: a safe relative path and its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub relative_path: PathBuf,
    pub content: String,
}
