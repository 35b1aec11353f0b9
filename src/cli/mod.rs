use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

mod progress;

use progress::ProgressIndicator;
use scrivener::contexts::{
    ExtractError, FileTreeWriter, HeaderGrammar, Materializer, TranscriptNormalizer,
};
use scrivener::data::{LanguageProfile, LanguageRegistry, DEFAULT_LANGUAGE};
use scrivener::ledger::ExtractionLedger;
use scrivener::log_sink::LogSession;
use scrivener::registries::FileLanguageRegistry;

#[derive(Clone, Debug)]
pub struct Config {
    pub verbose: bool,
    pub dry_run: bool,
    pub language: String,
    pub languages_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub ledger: Option<PathBuf>,
}

const DEFAULT_EXTRACT_DIR: &str = "extracted_src";
const DEFAULT_DUMP_FILE: &str = "coder_raw_dump.txt";
const LANGUAGE_ENV: &str = "SCRIVENER_LANGUAGE";
const LANGUAGES_FILE_ENV: &str = "SCRIVENER_LANGUAGES_FILE";

impl Config {
    /// Command-line values win; the environment (and `.env`) fills the gaps.
    pub fn resolve(
        verbose: bool,
        dry_run: bool,
        language: Option<String>,
        languages_file: Option<PathBuf>,
        log_file: Option<PathBuf>,
        ledger: Option<PathBuf>,
    ) -> Self {
        Self {
            verbose,
            dry_run,
            language: language
                .or_else(|| std::env::var(LANGUAGE_ENV).ok())
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            languages_file: languages_file
                .or_else(|| std::env::var(LANGUAGES_FILE_ENV).ok().map(PathBuf::from)),
            log_file,
            ledger,
        }
    }

    fn profile(&self) -> Result<LanguageProfile> {
        let registry = FileLanguageRegistry::new(self.languages_file.clone());
        registry.get_profile(&self.language).with_context(|| {
            let known = registry.available().unwrap_or_default().join(", ");
            format!("Failed to load language profile (known: {})", known)
        })
    }
}

/// Reads a text file, replacing invalid UTF-8 instead of failing on it.
fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn log_to_markdown(
    log_file: &Path,
    md_out: &Path,
    grammars: Vec<HeaderGrammar>,
    config: &Config,
    session: &LogSession,
) -> Result<()> {
    let raw = read_lossy(log_file)?;
    let normalizer = TranscriptNormalizer::new(grammars);
    let document = normalizer.normalize(&raw);

    if config.verbose {
        println!(
            "Recognized {} turn(s) using {:?}",
            document.len(),
            normalizer.grammars()
        );
    }
    if document.is_empty() {
        tracing::warn!(
            log = %log_file.display(),
            "no speaker headers found; writing an empty document"
        );
    }

    if config.dry_run {
        session.report(format!(
            "[DRY RUN] Would write {} turn(s) to {}",
            document.len(),
            md_out.display()
        ));
        return Ok(());
    }

    if let Some(parent) = md_out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(md_out, document.render())
        .with_context(|| format!("Failed to write markdown to {}", md_out.display()))?;

    session.report(format!(
        "[log2md] wrote {} ({} turns)",
        md_out.display(),
        document.len()
    ));
    Ok(())
}

pub fn extract(
    markdown: &Path,
    dest: Option<PathBuf>,
    config: &Config,
    session: &LogSession,
) -> Result<()> {
    let text = read_lossy(markdown)?;
    let profile = config.profile()?;
    let materializer = Materializer::new(profile).context("Failed to prepare source scanner")?;
    let dest = dest.unwrap_or_else(|| PathBuf::from(DEFAULT_EXTRACT_DIR));
    let mut writer = FileTreeWriter::new(Some(dest)).dry_run(config.dry_run);

    let report = materializer.materialize_all(&text, &mut writer);

    let total = report.written.len() + report.failures.len();
    let mut progress = ProgressIndicator::new(total);
    let mut ledger = ExtractionLedger::new(markdown, writer.root(), &config.language);

    for file in &report.written {
        let marker = if file.stubbed { " (stub)" } else { "" };
        let prefix = if config.dry_run { "[DRY RUN] would write" } else { "✔" };
        session.report(format!("  {} {}{}", prefix, file.relative_path.display(), marker));
        progress.complete_item(&file.relative_path.display().to_string(), true);
        ledger.record(file);
    }
    for failure in &report.failures {
        session.report(format!("  ✘ {}", failure.error));
        progress.complete_item(&failure.relative_path.display().to_string(), false);
        ledger.record_failure(failure);
    }
    if report.skipped > 0 {
        session.report(format!("  skipped {} artifact(s) with unsafe paths", report.skipped));
    }

    if config.verbose {
        progress.finish(session);
    }
    session.report(format!(
        "[extract] {} file(s) written ({} stub) → {}",
        report.written.len(),
        report.stub_count(),
        writer.root().display()
    ));

    save_ledger(&ledger, config, session)?;

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} artifact(s) could not be written",
            report.failures.len(),
            total
        );
    }
    Ok(())
}

pub fn messages(
    markdown: &Path,
    dest: Option<PathBuf>,
    dump: Option<PathBuf>,
    config: &Config,
    session: &LogSession,
) -> Result<()> {
    let text = read_lossy(markdown)?;
    let profile = config.profile()?;
    let materializer = Materializer::new(profile).context("Failed to prepare source scanner")?;
    let dest = dest.unwrap_or_else(default_output_dir);
    let mut writer = FileTreeWriter::new(Some(dest)).dry_run(config.dry_run);

    match materializer.materialize_primary(&text, &mut writer) {
        Ok(outcome) => {
            let mut ledger = ExtractionLedger::new(markdown, writer.root(), &config.language);
            for file in std::iter::once(&outcome.primary).chain(outcome.companions.iter()) {
                session.report(format!("  ✔ {}", file.relative_path.display()));
                ledger.record(file);
            }
            session.report(format!("Output directory: {}", writer.root().display()));
            save_ledger(&ledger, config, session)
        }
        Err(ExtractError::NotFound) => {
            let dump_path = dump.unwrap_or_else(|| PathBuf::from(DEFAULT_DUMP_FILE));
            fs::write(&dump_path, &text)
                .with_context(|| format!("Failed to dump raw input to {}", dump_path.display()))?;
            let message = format!(
                "Coder did not return a valid JSON payload in {}. See {}",
                markdown.display(),
                dump_path.display()
            );
            tracing::info!(dump = %dump_path.display(), "no files manifest found");
            anyhow::bail!(message)
        }
        Err(e) => Err(e).context("Failed to materialize primary artifact"),
    }
}

fn save_ledger(ledger: &ExtractionLedger, config: &Config, session: &LogSession) -> Result<()> {
    let Some(path) = config.ledger.as_deref() else {
        return Ok(());
    };
    if path.exists() {
        report_changes(ledger, path, session);
    }
    if config.dry_run {
        session.report(format!("[DRY RUN] Would write ledger to {}", path.display()));
        return Ok(());
    }
    ledger.save(path)?;
    if config.verbose {
        println!("{}", ledger.summary());
    }
    session.report(format!("Ledger written to {}", path.display()));
    Ok(())
}

/// Compares this run against the ledger a previous run left at `path`.
fn report_changes(ledger: &ExtractionLedger, path: &Path, session: &LogSession) {
    let previous = match ExtractionLedger::load(path) {
        Ok(previous) => previous,
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "ignoring previous ledger");
            return;
        }
    };
    let changed = ledger.changed_since(&previous);
    if changed.is_empty() {
        session.report("  no changes since previous ledger");
        return;
    }
    session.report(format!("  {} file(s) changed since previous ledger:", changed.len()));
    for path in changed {
        session.report(format!("    ~ {}", path.display()));
    }
}

/// `out_<YYYYmmdd_HHMMSS>` in the working directory
fn default_output_dir() -> PathBuf {
    PathBuf::from(format!("out_{}", chrono::Local::now().format("%Y%m%d_%H%M%S")))
}
