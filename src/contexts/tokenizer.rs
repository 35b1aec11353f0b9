//! Line-level tokenization of transcripts and markdown documents.
//!
//! The normalizer and the scanner never look at raw patterns; they consume
//! the tokens produced here.

use regex::Regex;
use std::sync::OnceLock;

const FENCE: &str = "```";

/// Recognized forms of a speaker header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderGrammar {
    /// `[Name]`
    Bracket,
    /// `Next speaker: Name`
    NextSpeaker,
    /// `### Name`, the canonical document heading
    Heading,
}

impl HeaderGrammar {
    /// Grammars used when none are requested explicitly.
    pub const DEFAULT: [HeaderGrammar; 2] = [HeaderGrammar::Bracket, HeaderGrammar::NextSpeaker];

    fn pattern(self) -> &'static Regex {
        match self {
            HeaderGrammar::Bracket => bracket_re(),
            HeaderGrammar::NextSpeaker => next_speaker_re(),
            HeaderGrammar::Heading => heading_re(),
        }
    }

    /// Returns the speaker name if `line` is a header in this grammar.
    pub fn speaker<'a>(self, line: &'a str) -> Option<&'a str> {
        let captures = self.pattern().captures(line.trim())?;
        let name = captures.get(1)?.as_str().trim();
        if name.is_empty() { None } else { Some(name) }
    }
}

fn bracket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[([^\[\]]+)\]$").expect("valid regex"))
}

fn next_speaker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Next speaker:\s*(.+)$").expect("valid regex"))
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^###\s+(.+)$").expect("valid regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptToken<'a> {
    Header(&'a str),
    Body(&'a str),
}

/// Classifies every line of `raw` as a header (first matching grammar wins) or a body line.
pub fn tokenize_transcript<'a>(
    raw: &'a str,
    grammars: &'a [HeaderGrammar],
) -> impl Iterator<Item = TranscriptToken<'a>> + 'a {
    raw.lines().map(move |line| {
        grammars
            .iter()
            .find_map(|g| g.speaker(line))
            .map(TranscriptToken::Header)
            .unwrap_or(TranscriptToken::Body(line))
    })
}

/// A fenced block of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceBlock {
    /// Info string of the opening fence, empty for untagged fences.
    pub tag: String,
    pub body: String,
    /// Zero-based line of the opening fence.
    pub start_line: usize,
    /// Zero-based line of the closing fence.
    pub end_line: usize,
}

/// A run of lines under one `### ` heading, or the whole document when it has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub body: String,
    pub start_line: usize,
}

impl Section {
    /// True when the section, trimmed, is a single bare JSON object.
    pub fn is_bare_json(&self) -> bool {
        let trimmed = self.body.trim();
        trimmed.starts_with('{') && trimmed.ends_with('}')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DocumentToken<'a> {
    /// Opening fence with its tag and any content following the tag on the same line.
    FenceOpen { tag: &'a str, rest: &'a str },
    /// A fence opened and closed on one line.
    FenceInline { tag: &'a str, body: &'a str },
    /// Closing fence, with any content preceding it on the same line.
    FenceClose { before: &'a str },
    Line(&'a str),
}

fn split_tag(rest: &str) -> (&str, &str) {
    let rest = rest.trim();
    if rest.starts_with('{') {
        return ("", rest);
    }
    match rest.split_once(char::is_whitespace) {
        Some((tag, body)) => (tag, body.trim()),
        None => (rest, ""),
    }
}

/// Classifies document lines into fence boundaries and plain lines.
fn tokenize_document(text: &str) -> Vec<DocumentToken<'_>> {
    let mut tokens = Vec::new();
    let mut in_fence = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if in_fence {
            if trimmed.starts_with(FENCE) {
                tokens.push(DocumentToken::FenceClose { before: "" });
                in_fence = false;
            } else if let Some(before) = trimmed.strip_suffix(FENCE) {
                tokens.push(DocumentToken::FenceClose { before });
                in_fence = false;
            } else {
                tokens.push(DocumentToken::Line(line));
            }
            continue;
        }

        let Some(rest) = trimmed.strip_prefix(FENCE) else {
            tokens.push(DocumentToken::Line(line));
            continue;
        };

        match rest.trim_end().strip_suffix(FENCE) {
            Some(inner) if !inner.trim().is_empty() => {
                let (tag, body) = split_tag(inner);
                tokens.push(DocumentToken::FenceInline { tag, body });
            }
            // A backtick fence's info string never holds backticks: this is an inline span.
            _ if rest.contains('`') => tokens.push(DocumentToken::Line(line)),
            _ => {
                let (tag, rest) = split_tag(rest);
                tokens.push(DocumentToken::FenceOpen { tag, rest });
                in_fence = true;
            }
        }
    }

    tokens
}

/// Collects every closed fence block in document order. A fence left open
/// at the end of the text is dropped.
pub fn fence_blocks(text: &str) -> Vec<FenceBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<(String, usize, Vec<&str>)> = None;

    for (line_no, token) in tokenize_document(text).into_iter().enumerate() {
        match token {
            DocumentToken::FenceOpen { tag, rest } => {
                let mut lines = Vec::new();
                if !rest.is_empty() {
                    lines.push(rest);
                }
                open = Some((tag.to_string(), line_no, lines));
            }
            DocumentToken::FenceInline { tag, body } => blocks.push(FenceBlock {
                tag: tag.to_string(),
                body: body.to_string(),
                start_line: line_no,
                end_line: line_no,
            }),
            DocumentToken::FenceClose { before } => {
                if let Some((tag, start_line, mut lines)) = open.take() {
                    if !before.is_empty() {
                        lines.push(before);
                    }
                    blocks.push(FenceBlock {
                        tag,
                        body: lines.join("\n"),
                        start_line,
                        end_line: line_no,
                    });
                }
            }
            DocumentToken::Line(line) => {
                if let Some((_, _, lines)) = open.as_mut() {
                    lines.push(line);
                }
            }
        }
    }

    blocks
}

/// Splits the document at canonical `### ` headings that sit outside fences.
pub fn sections(text: &str) -> Vec<Section> {
    let mut result = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut start_line = 0;
    let mut in_fence = false;
    let raw_lines: Vec<&str> = text.lines().collect();

    for (line_no, token) in tokenize_document(text).into_iter().enumerate() {
        let raw = raw_lines[line_no];
        match token {
            DocumentToken::FenceOpen { .. } => in_fence = true,
            DocumentToken::FenceClose { .. } => in_fence = false,
            DocumentToken::Line(line)
                if !in_fence && HeaderGrammar::Heading.speaker(line).is_some() =>
            {
                if !current.is_empty() {
                    result.push(Section {
                        body: current.join("\n"),
                        start_line,
                    });
                }
                current.clear();
                start_line = line_no + 1;
                continue;
            }
            _ => {}
        }
        current.push(raw);
    }

    if !current.is_empty() {
        result.push(Section {
            body: current.join("\n"),
            start_line,
        });
    }

    result
}
