use thiserror::Error;

pub const DEFAULT_LANGUAGE: &str = "java";

/// Language-specific knobs for locating and placing source artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageProfile {
    pub name: String,
    /// File extension without the leading dot.
    pub extension: String,
    /// Fence info strings that mark a source block, compared case-insensitively.
    pub fence_tags: Vec<String>,
    /// Keyword opening a namespace declaration (`package`, `namespace`).
    pub namespace_keyword: String,
    /// Token that must follow the namespace path, if the language has one.
    pub namespace_terminator: Option<String>,
    /// Keywords that introduce a type declaration (`class`, `interface`, ...).
    pub type_keywords: Vec<String>,
    /// JSON key of the single-class manifest shape.
    pub manifest_key: String,
    /// Build files written next to the primary artifact in single-artifact mode.
    pub companion_files: Vec<String>,
}

impl LanguageProfile {
    pub fn java() -> Self {
        Self {
            name: "java".to_string(),
            extension: "java".to_string(),
            fence_tags: vec!["java".to_string()],
            namespace_keyword: "package".to_string(),
            namespace_terminator: Some(";".to_string()),
            type_keywords: strings(&["class", "interface", "enum", "record"]),
            manifest_key: "javaClass".to_string(),
            companion_files: vec!["pom.xml".to_string()],
        }
    }

    pub fn kotlin() -> Self {
        Self {
            name: "kotlin".to_string(),
            extension: "kt".to_string(),
            fence_tags: strings(&["kotlin", "kt"]),
            namespace_keyword: "package".to_string(),
            namespace_terminator: None,
            type_keywords: strings(&["class", "interface", "object"]),
            manifest_key: "kotlinClass".to_string(),
            companion_files: strings(&["build.gradle.kts", "settings.gradle.kts"]),
        }
    }

    pub fn csharp() -> Self {
        Self {
            name: "csharp".to_string(),
            extension: "cs".to_string(),
            fence_tags: strings(&["csharp", "cs", "c#"]),
            namespace_keyword: "namespace".to_string(),
            namespace_terminator: None,
            type_keywords: strings(&["class", "interface", "struct", "enum", "record"]),
            manifest_key: "csharpClass".to_string(),
            companion_files: Vec::new(),
        }
    }

    /// Returns the built-in profile registered under `name`, if any.
    pub fn builtin(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "java" => Some(Self::java()),
            "kotlin" => Some(Self::kotlin()),
            "csharp" | "c#" => Some(Self::csharp()),
            _ => None,
        }
    }

    pub fn builtin_names() -> &'static [&'static str] {
        &["java", "kotlin", "csharp"]
    }

    /// `Foo` -> `Foo.java`; a name that already carries the extension is kept.
    pub fn file_name_for(&self, type_name: &str) -> String {
        let suffix = format!(".{}", self.extension);
        if type_name.ends_with(&suffix) {
            type_name.to_string()
        } else {
            format!("{}{}", type_name, suffix)
        }
    }

    pub fn has_source_extension(&self, path: &str) -> bool {
        path.trim().ends_with(&format!(".{}", self.extension))
    }

    pub fn is_source_tag(&self, tag: &str) -> bool {
        self.fence_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

impl Default for LanguageProfile {
    fn default() -> Self {
        Self::java()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Errors raised while looking up a language profile
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown language '{0}'")]
    UnknownLanguage(String),
    #[error("Failed to read language registry: {0}")]
    Unreadable(String),
    #[error("Invalid language registry: {0}")]
    Invalid(String),
}

/// Source of language profiles.
pub trait LanguageRegistry {
    /// Returns the profile registered under `name`.
    fn get_profile(&self, name: &str) -> Result<LanguageProfile, RegistryError>;
}
