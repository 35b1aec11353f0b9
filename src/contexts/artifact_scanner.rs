use crate::contexts::error::ExtractError;
use crate::contexts::tokenizer::{fence_blocks, sections, FenceBlock};
use crate::data::{
    ArtifactDescriptor, InlineCode, LanguageProfile, Manifest, ManifestEntry, ManifestOrigin,
};
use regex::Regex;

const ANNOTATIONS: &str = r"(?:@[\w.]+(?:\([^)]*\))?\s+)*";

/// Finds source artifacts embedded in a markdown document.
///
/// Two sweeps are made over the text: fenced source blocks first, JSON
/// manifests second. Candidates that do not qualify are skipped silently.
#[derive(Debug, Clone)]
pub struct ArtifactScanner {
    profile: LanguageProfile,
    declaration_re: Regex,
    type_re: Regex,
    namespace_re: Regex,
}

/// A JSON object found in the document, with the source fence that follows it.
struct ManifestCandidate {
    json: String,
    following_source: Option<String>,
}

impl ArtifactScanner {
    pub fn new(profile: LanguageProfile) -> Result<Self, ExtractError> {
        let keywords = profile
            .type_keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        // Declarations start a line, optionally after annotations and lowercase modifiers.
        let declaration_re = Regex::new(&format!(
            r"(?m)^\s*{}(?:[a-z-]+\s+)*?(?:{})\s+([A-Za-z_][A-Za-z0-9_]*)",
            ANNOTATIONS, keywords
        ))?;
        let type_re = Regex::new(&format!(r"\b(?:{})\s+([A-Za-z_][A-Za-z0-9_]*)", keywords))?;

        let terminator = profile
            .namespace_terminator
            .as_deref()
            .map(|t| format!(r"\s*{}", regex::escape(t)))
            .unwrap_or_default();
        let namespace_re = Regex::new(&format!(
            r"(?m)^\s*{}\s+([A-Za-z0-9_.]+){}",
            regex::escape(&profile.namespace_keyword),
            terminator
        ))?;

        Ok(Self {
            profile,
            declaration_re,
            type_re,
            namespace_re,
        })
    }

    pub fn profile(&self) -> &LanguageProfile {
        &self.profile
    }

    /// Name of the first type declared in `body`. Line-leading declarations
    /// win over a keyword found anywhere else, such as inside a comment.
    pub fn declared_type(&self, body: &str) -> Option<String> {
        self.declaration_re
            .captures(body)
            .or_else(|| self.type_re.captures(body))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Namespace path of the first namespace declaration line in `body`.
    pub fn declared_namespace(&self, body: &str) -> Option<String> {
        self.namespace_re
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim_matches('.').to_string())
            .filter(|ns| !ns.is_empty())
    }

    fn inline_code(&self, block: &FenceBlock) -> Option<InlineCode> {
        let type_name = self.declared_type(&block.body)?;
        Some(InlineCode {
            declared_namespace: self.declared_namespace(&block.body),
            declared_type_name: type_name,
            body: block.body.clone(),
        })
    }

    fn is_json_tag(tag: &str) -> bool {
        tag.is_empty() || tag.eq_ignore_ascii_case("json")
    }

    /// Fenced JSON blocks and bare JSON sections, in document order.
    fn manifest_candidates(&self, text: &str, blocks: &[FenceBlock]) -> Vec<ManifestCandidate> {
        let mut found: Vec<(usize, usize, String)> = blocks
            .iter()
            .filter(|b| Self::is_json_tag(&b.tag) && b.body.trim_start().starts_with('{'))
            .map(|b| (b.start_line, b.end_line, b.body.clone()))
            .collect();

        for section in sections(text) {
            if section.is_bare_json() {
                let end_line = section.start_line + section.body.lines().count();
                found.push((section.start_line, end_line, section.body.trim().to_string()));
            }
        }
        found.sort_by_key(|(start, _, _)| *start);

        found
            .into_iter()
            .map(|(_, end_line, json)| ManifestCandidate {
                json,
                following_source: blocks
                    .iter()
                    .find(|b| b.start_line > end_line && self.profile.is_source_tag(&b.tag))
                    .map(|b| b.body.clone()),
            })
            .collect()
    }

    fn parse_manifest(&self, candidate: &ManifestCandidate) -> Option<Manifest> {
        match serde_json::from_str::<serde_json::Value>(&candidate.json) {
            Ok(value) => Manifest::from_value(&value, &self.profile.manifest_key),
            Err(e) => {
                tracing::debug!(error = %e, "skipping fenced block that is not valid JSON");
                None
            }
        }
    }

    /// Scans `text` and yields every qualifying artifact: inline source blocks
    /// first, then manifest entries, each in document order.
    pub fn scan<'a>(&'a self, text: &'a str) -> impl Iterator<Item = ArtifactDescriptor> + 'a {
        let blocks = fence_blocks(text);
        let candidates = self.manifest_candidates(text, &blocks);

        let inline = blocks
            .into_iter()
            .filter(move |b| self.profile.is_source_tag(&b.tag))
            .filter_map(move |b| {
                let code = self.inline_code(&b);
                if code.is_none() {
                    tracing::debug!(
                        line = b.start_line + 1,
                        "skipping source block without a type declaration"
                    );
                }
                code
            })
            .map(ArtifactDescriptor::InlineCode);

        let manifests = candidates
            .into_iter()
            .filter_map(move |c| self.parse_manifest(&c).map(|m| (m, c.following_source)))
            .enumerate()
            .flat_map(|(block, (manifest, following_source))| {
                manifest_entries(block, manifest, following_source)
            })
            .map(ArtifactDescriptor::Manifest);

        inline.chain(manifests)
    }
}

fn manifest_entries(
    block: usize,
    manifest: Manifest,
    following_source: Option<String>,
) -> Vec<ManifestEntry> {
    match manifest {
        Manifest::FileList(files) => files
            .into_iter()
            .enumerate()
            .map(|(index, file)| ManifestEntry {
                path: file.path,
                name: None,
                content: file.content,
                origin: ManifestOrigin::FileList { block, index },
            })
            .collect(),
        Manifest::ClassDescriptor(descriptor) => vec![ManifestEntry {
            path: descriptor.path,
            name: descriptor.name,
            content: descriptor.content.or(following_source),
            origin: ManifestOrigin::ClassDescriptor,
        }],
    }
}

/// Picks the entry a single-artifact caller should write: the first one
/// whose path carries the profile's source extension, else the first entry.
pub fn select_primary<'a>(
    entries: &'a [ManifestEntry],
    profile: &LanguageProfile,
) -> Option<&'a ManifestEntry> {
    entries
        .iter()
        .find(|e| {
            e.path
                .as_deref()
                .is_some_and(|p| profile.has_source_extension(p))
        })
        .or_else(|| entries.first())
}
