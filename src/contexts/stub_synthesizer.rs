use crate::data::LanguageProfile;

/// Builds placeholder sources for artifacts that were named but never written out.
#[derive(Debug, Clone)]
pub struct StubSynthesizer<'a> {
    profile: &'a LanguageProfile,
}

impl<'a> StubSynthesizer<'a> {
    pub fn new(profile: &'a LanguageProfile) -> Self {
        Self { profile }
    }

    /// Returns a minimal public type named `name`, preceded by a namespace
    /// declaration when `namespace` is non-empty.
    pub fn synthesize(&self, name: &str, namespace: Option<&str>) -> String {
        let mut out = String::new();
        if let Some(ns) = namespace.map(str::trim).filter(|ns| !ns.is_empty()) {
            out.push_str(&self.profile.namespace_keyword);
            out.push(' ');
            out.push_str(ns);
            out.push_str(self.profile.namespace_terminator.as_deref().unwrap_or(""));
            out.push_str("\n\n");
        }
        out.push_str(&self.type_body(name));
        out
    }

    fn type_body(&self, name: &str) -> String {
        match self.profile.name.as_str() {
            "kotlin" => format!(
                "class {name} {{\n    fun main() {{\n        // TODO: implement\n    }}\n}}"
            ),
            "csharp" => format!(
                "public class {name}\n{{\n    public static void Main(string[] args)\n    {{\n        // TODO: implement\n    }}\n}}"
            ),
            _ => format!(
                "public class {name} {{\n    public static void main(String[] args) {{\n        // TODO: implement\n    }}\n}}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn java_stub_with_package() {
        let profile = LanguageProfile::java();
        let stub = StubSynthesizer::new(&profile).synthesize("Widget", Some("com.acme"));
        assert_eq!(
            stub,
            "package com.acme;\n\npublic class Widget {\n    public static void main(String[] args) {\n        // TODO: implement\n    }\n}"
        );
    }

    #[test]
    fn java_stub_without_package() {
        let profile = LanguageProfile::java();
        let stub = StubSynthesizer::new(&profile).synthesize("Widget", None);
        assert!(stub.starts_with("public class Widget {"));
        assert_eq!(StubSynthesizer::new(&profile).synthesize("Widget", Some("  ")), stub);
    }

    #[test]
    fn kotlin_stub_has_no_terminator() {
        let profile = LanguageProfile::kotlin();
        let stub = StubSynthesizer::new(&profile).synthesize("Widget", Some("com.acme"));
        assert!(stub.starts_with("package com.acme\n\nclass Widget {"));
    }

    #[test]
    fn stub_is_deterministic() {
        let profile = LanguageProfile::csharp();
        let synth = StubSynthesizer::new(&profile);
        assert_eq!(synth.synthesize("Api", Some("Acme.Web")), synth.synthesize("Api", Some("Acme.Web")));
        assert!(synth.synthesize("Api", Some("Acme.Web")).starts_with("namespace Acme.Web\n\npublic class Api"));
    }
}
