use crate::data::{LanguageProfile, LanguageRegistry, RegistryError, DEFAULT_LANGUAGE};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use yaml_rust::{Yaml, YamlLoader};

/// File-based implementation of LanguageRegistry
/// Loads language profiles from a YAML file, layered over the built-in profiles
#[derive(Clone, Debug)]
pub struct FileLanguageRegistry {
    registry_path: PathBuf,
}

impl FileLanguageRegistry {
    /// Creates a new FileLanguageRegistry
    ///
    /// # Arguments
    /// * `registry_path` - Optional path to registry file (defaults to "scrivener/languages.yml")
    pub fn new(registry_path: Option<PathBuf>) -> Self {
        Self {
            registry_path: registry_path
                .unwrap_or_else(|| PathBuf::from("scrivener/languages.yml")),
        }
    }

    /// Loads the registry from the file; a missing file means built-ins only
    fn load_registry(&self) -> Result<HashMap<String, LanguageProfile>, RegistryError> {
        if !self.registry_path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.registry_path).map_err(|e| {
            RegistryError::Unreadable(format!("{}: {}", self.registry_path.display(), e))
        })?;

        parse_registry(&content)
    }

    /// Names of every profile available, built-in or configured
    pub fn available(&self) -> Result<Vec<String>, RegistryError> {
        let mut names: Vec<String> = LanguageProfile::builtin_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        for name in self.load_registry()?.into_keys() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

impl LanguageRegistry for FileLanguageRegistry {
    fn get_profile(&self, name: &str) -> Result<LanguageProfile, RegistryError> {
        let mut registry = self.load_registry()?;
        let key = name.to_ascii_lowercase();

        registry
            .remove(&key)
            .or_else(|| LanguageProfile::builtin(&key))
            .ok_or_else(|| RegistryError::UnknownLanguage(name.to_string()))
    }
}

/// Parses the YAML registry file into a HashMap.
/// Every field is optional; missing ones come from the built-in profile of
/// the same name, or from the default language.
fn parse_registry(yaml_content: &str) -> Result<HashMap<String, LanguageProfile>, RegistryError> {
    let docs = YamlLoader::load_from_str(yaml_content)
        .map_err(|e| RegistryError::Invalid(format!("Invalid registry YAML: {}", e)))?;

    if docs.is_empty() {
        return Ok(HashMap::new());
    }

    let doc = &docs[0];
    let mut registry = HashMap::new();

    let Some(hash) = doc.as_hash() else {
        return Ok(registry);
    };

    for (key, value) in hash {
        let Some(name) = key.as_str() else {
            continue;
        };
        let name = name.to_ascii_lowercase();
        let mut profile = LanguageProfile::builtin(&name)
            .or_else(|| LanguageProfile::builtin(DEFAULT_LANGUAGE))
            .unwrap_or_default();
        profile.name = name.clone();

        if let Some(extension) = value.as_str() {
            // Short form: `name: extension`
            profile.extension = extension.trim_start_matches('.').to_string();
        } else if value.as_hash().is_some() {
            apply_overrides(&mut profile, value)?;
        } else {
            return Err(RegistryError::Invalid(format!(
                "Entry '{}' must be a string or a mapping",
                name
            )));
        }

        registry.insert(name, profile);
    }

    Ok(registry)
}

fn apply_overrides(profile: &mut LanguageProfile, value: &Yaml) -> Result<(), RegistryError> {
    if let Some(extension) = value["extension"].as_str() {
        profile.extension = extension.trim_start_matches('.').to_string();
    }
    if let Some(tags) = string_list(&value["fence_tags"]) {
        profile.fence_tags = tags;
    }
    if let Some(keyword) = value["namespace_keyword"].as_str() {
        profile.namespace_keyword = keyword.to_string();
    }
    match &value["namespace_terminator"] {
        Yaml::String(t) if t.is_empty() => profile.namespace_terminator = None,
        Yaml::String(t) => profile.namespace_terminator = Some(t.clone()),
        Yaml::Null => profile.namespace_terminator = None,
        _ => {}
    }
    if let Some(keywords) = string_list(&value["type_keywords"]) {
        if keywords.is_empty() {
            return Err(RegistryError::Invalid(format!(
                "Profile '{}' needs at least one type keyword",
                profile.name
            )));
        }
        profile.type_keywords = keywords;
    }
    if let Some(key) = value["manifest_key"].as_str() {
        profile.manifest_key = key.to_string();
    }
    if let Some(files) = string_list(&value["companion_files"]) {
        profile.companion_files = files;
    }
    Ok(())
}

fn string_list(value: &Yaml) -> Option<Vec<String>> {
    value.as_vec().map(|items| {
        items
            .iter()
            .filter_map(|item| item.as_str().map(|s| s.to_string()))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_registry_short_format() {
        let yaml = r#"
groovy: .groovy
"#;

        let registry = parse_registry(yaml).unwrap();
        let groovy = registry.get("groovy").unwrap();
        assert_eq!(groovy.extension, "groovy");
        assert_eq!(groovy.namespace_keyword, "package");
        assert_eq!(groovy.name, "groovy");
    }

    #[test]
    fn test_parse_registry_full_format() {
        let yaml = r#"
scala:
  extension: scala
  fence_tags: [scala]
  namespace_keyword: package
  namespace_terminator: ""
  type_keywords: [class, object, trait]
  manifest_key: scalaClass
  companion_files: [build.sbt]
"#;

        let registry = parse_registry(yaml).unwrap();
        let scala = registry.get("scala").unwrap();
        assert_eq!(scala.extension, "scala");
        assert_eq!(scala.namespace_terminator, None);
        assert_eq!(scala.type_keywords, vec!["class", "object", "trait"]);
        assert_eq!(scala.companion_files, vec!["build.sbt"]);
    }

    #[test]
    fn test_partial_override_keeps_builtin_fields() {
        let yaml = r#"
java:
  companion_files: [pom.xml, build.gradle]
"#;

        let registry = parse_registry(yaml).unwrap();
        let java = registry.get("java").unwrap();
        assert_eq!(java.manifest_key, "javaClass");
        assert_eq!(java.namespace_terminator.as_deref(), Some(";"));
        assert_eq!(java.companion_files, vec!["pom.xml", "build.gradle"]);
    }

    #[test]
    fn test_parse_empty_registry() {
        assert!(parse_registry("").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_empty_type_keywords() {
        let yaml = "java:\n  type_keywords: []\n";
        assert!(matches!(parse_registry(yaml), Err(RegistryError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_builtins() {
        let registry = FileLanguageRegistry::new(Some(PathBuf::from("/nonexistent/languages.yml")));
        assert_eq!(registry.get_profile("java").unwrap(), LanguageProfile::java());
        assert_eq!(registry.get_profile("Kotlin").unwrap().extension, "kt");
        assert!(matches!(
            registry.get_profile("cobol"),
            Err(RegistryError::UnknownLanguage(_))
        ));
    }

    #[test]
    fn test_file_profiles_are_listed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("languages.yml");
        fs::write(&path, "groovy: groovy\n").unwrap();

        let registry = FileLanguageRegistry::new(Some(path));
        assert_eq!(registry.get_profile("groovy").unwrap().extension, "groovy");
        assert_eq!(
            registry.available().unwrap(),
            vec!["csharp", "groovy", "java", "kotlin"]
        );
    }
}
