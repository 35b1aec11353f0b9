use crate::contexts::error::ResolveError;
use crate::data::{ArtifactDescriptor, InlineCode, LanguageProfile, ManifestEntry};
use std::path::{Component, Path, PathBuf};

const UNNAMED_TYPE: &str = "UnnamedClass";

/// Computes where an artifact lives relative to the destination root.
#[derive(Debug, Clone)]
pub struct PathResolver<'a> {
    profile: &'a LanguageProfile,
}

impl<'a> PathResolver<'a> {
    pub fn new(profile: &'a LanguageProfile) -> Self {
        Self { profile }
    }

    pub fn resolve(&self, descriptor: &ArtifactDescriptor) -> Result<PathBuf, ResolveError> {
        let path = match descriptor {
            ArtifactDescriptor::InlineCode(code) => self.inline_path(code),
            ArtifactDescriptor::Manifest(entry) => self.manifest_path(entry),
        };
        ensure_relative(path)
    }

    /// `package a.b.c;` + `Foo` -> `a/b/c/Foo.<ext>`, otherwise `Foo.<ext>`.
    fn inline_path(&self, code: &InlineCode) -> PathBuf {
        let file_name = self.profile.file_name_for(&code.declared_type_name);
        match code.declared_namespace.as_deref() {
            Some(namespace) => namespace
                .split('.')
                .filter(|segment| !segment.is_empty())
                .collect::<PathBuf>()
                .join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// An explicit path is taken verbatim; a bare name stays at the root.
    fn manifest_path(&self, entry: &ManifestEntry) -> PathBuf {
        if let Some(path) = entry.path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        let name = entry
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNNAMED_TYPE);
        PathBuf::from(self.profile.file_name_for(name))
    }
}

/// Rejects paths that are empty, absolute or climb out of the root.
/// `.` components are dropped.
pub fn ensure_relative(path: PathBuf) -> Result<PathBuf, ResolveError> {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ResolveError::UnsafePath(path.clone()));
            }
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(ResolveError::EmptyPath);
    }
    Ok(clean)
}

/// Splits a resolved path into the type name and dotted namespace a stub should declare.
pub fn stub_identity(path: &Path) -> (String, Option<String>) {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(UNNAMED_TYPE)
        .to_string();
    let namespace = path
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => part.to_str(),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(".")
        })
        .filter(|ns| !ns.is_empty());
    (name, namespace)
}
