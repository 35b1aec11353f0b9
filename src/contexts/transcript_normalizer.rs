use crate::contexts::tokenizer::{tokenize_transcript, HeaderGrammar, TranscriptToken};
use crate::data::{CanonicalDocument, Turn};

/// Regroups a raw transcript into speaker turns.
#[derive(Debug, Clone)]
pub struct TranscriptNormalizer {
    grammars: Vec<HeaderGrammar>,
}

impl Default for TranscriptNormalizer {
    fn default() -> Self {
        Self {
            grammars: HeaderGrammar::DEFAULT.to_vec(),
        }
    }
}

impl TranscriptNormalizer {
    /// Creates a normalizer recognizing the given header grammars.
    /// An empty list falls back to the defaults.
    pub fn new(grammars: Vec<HeaderGrammar>) -> Self {
        if grammars.is_empty() {
            Self::default()
        } else {
            Self { grammars }
        }
    }

    pub fn grammars(&self) -> &[HeaderGrammar] {
        &self.grammars
    }

    /// Splits `raw` into turns. Text before the first header is discarded
    /// and turns without content are dropped.
    pub fn normalize(&self, raw: &str) -> CanonicalDocument {
        let mut turns = Vec::new();
        let mut speaker: Option<&str> = None;
        let mut buffer: Vec<&str> = Vec::new();

        for token in tokenize_transcript(raw, &self.grammars) {
            match token {
                TranscriptToken::Header(name) => {
                    if let Some(current) = speaker {
                        push_turn(&mut turns, current, &buffer);
                    }
                    speaker = Some(name);
                    buffer.clear();
                }
                TranscriptToken::Body(line) => {
                    if speaker.is_some() {
                        buffer.push(line);
                    }
                }
            }
        }

        if let Some(current) = speaker {
            push_turn(&mut turns, current, &buffer);
        }

        CanonicalDocument::from_turns(turns)
    }
}

fn push_turn(turns: &mut Vec<Turn>, speaker: &str, lines: &[&str]) {
    let body = finalize_body(lines);
    if !body.is_empty() {
        turns.push(Turn::new(speaker, body));
    }
}

/// Drops leading blank lines and trailing whitespace; indentation of the
/// first content line is kept.
fn finalize_body(lines: &[&str]) -> String {
    let first = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    lines[first..].join("\n").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(doc: &CanonicalDocument) -> Vec<(String, String)> {
        doc.turns()
            .iter()
            .map(|t| (t.speaker.clone(), t.body.clone()))
            .collect()
    }

    #[test]
    fn splits_bracketed_speakers() {
        let doc = TranscriptNormalizer::default().normalize("[PM]\nWe need login.\n[Architect]\nUse JWT.\n");
        assert_eq!(
            pairs(&doc),
            vec![
                ("PM".to_string(), "We need login.".to_string()),
                ("Architect".to_string(), "Use JWT.".to_string()),
            ]
        );
    }

    #[test]
    fn splits_next_speaker_headers() {
        let raw = "boot noise\nNext speaker: Coder\n\n{\"files\": []}\n\nNext speaker: Reviewer\nLGTM\n";
        let doc = TranscriptNormalizer::default().normalize(raw);
        assert_eq!(
            pairs(&doc),
            vec![
                ("Coder".to_string(), "{\"files\": []}".to_string()),
                ("Reviewer".to_string(), "LGTM".to_string()),
            ]
        );
    }

    #[test]
    fn text_before_first_header_is_discarded() {
        let doc = TranscriptNormalizer::default().normalize("preamble\nmore\n[User]\nhi");
        assert_eq!(pairs(&doc), vec![("User".to_string(), "hi".to_string())]);
    }

    #[test]
    fn empty_and_whitespace_turns_are_dropped() {
        let doc = TranscriptNormalizer::default().normalize("[A]\n\n   \n[B]\n[C]\nok\n[D]");
        assert_eq!(pairs(&doc), vec![("C".to_string(), "ok".to_string())]);
    }

    #[test]
    fn repeated_speakers_keep_separate_turns() {
        let doc = TranscriptNormalizer::default().normalize("[A]\none\n[B]\ntwo\n[A]\nthree");
        let speakers: Vec<_> = doc.turns().iter().map(|t| t.speaker.as_str()).collect();
        assert_eq!(speakers, vec!["A", "B", "A"]);
    }

    #[test]
    fn keeps_indentation_of_code_bodies() {
        let doc = TranscriptNormalizer::default().normalize("[Coder]\n\n    int x = 1;\n  \n");
        assert_eq!(doc.turns()[0].body, "    int x = 1;");
    }

    #[test]
    fn headerless_input_yields_empty_document() {
        assert!(TranscriptNormalizer::default().normalize("just text\nmore text").is_empty());
        assert!(TranscriptNormalizer::default().normalize("").is_empty());
    }

    #[test]
    fn rendered_document_round_trips_through_heading_grammar() {
        let raw = "[PM]\nWe need login.\n\n- story one\n[Architect]\nUse JWT.\n[Coder]\n```java\nclass A {}\n```\n";
        let first = TranscriptNormalizer::default().normalize(raw);
        let rendered = first.render();

        let again = TranscriptNormalizer::new(vec![HeaderGrammar::Heading]).normalize(&rendered);
        assert_eq!(pairs(&again), pairs(&first));
        assert_eq!(again.render(), rendered);
    }

    #[test]
    fn empty_grammar_list_uses_defaults() {
        let normalizer = TranscriptNormalizer::new(Vec::new());
        assert_eq!(normalizer.grammars(), &HeaderGrammar::DEFAULT);
    }
}
