mod artifact_scanner;
mod error;
mod materializer;
mod path_resolver;
mod stub_synthesizer;
mod tokenizer;
mod transcript_normalizer;
mod tree_writer;

pub use artifact_scanner::{select_primary, ArtifactScanner};
pub use error::{ExtractError, ResolveError};
pub use materializer::{FailedWrite, MaterializeReport, Materializer, PrimaryOutcome, WrittenFile};
pub use path_resolver::{ensure_relative, stub_identity, PathResolver};
pub use stub_synthesizer::StubSynthesizer;
pub use tokenizer::{fence_blocks, sections, FenceBlock, HeaderGrammar, Section};
pub use transcript_normalizer::TranscriptNormalizer;
pub use tree_writer::{normalize_content, FileTreeWriter};
