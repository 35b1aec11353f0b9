mod artifact;
mod language;
mod sink;

pub use artifact::{
    ArtifactDescriptor, CanonicalDocument, ClassDescriptor, FileEntry, InlineCode, Manifest,
    ManifestEntry, ManifestOrigin, ResolvedFile, Turn,
};
pub use language::{LanguageProfile, LanguageRegistry, RegistryError, DEFAULT_LANGUAGE};
pub use sink::{ArtifactSink, WriteError};
