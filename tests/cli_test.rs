//! Drives the `scrivener` binary end to end against the fixtures in `tests/fixtures`.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(relative)
}

fn scrivener(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scrivener"))
        .current_dir(workdir)
        .env_remove("SCRIVENER_LANGUAGE")
        .env_remove("SCRIVENER_LANGUAGES_FILE")
        .env_remove("SCRIVENER_LOG")
        .args(args)
        .output()
        .expect("run scrivener")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "scrivener exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn log2md_renders_canonical_markdown() {
    let dir = TempDir::new().unwrap();
    let md_out = dir.path().join("docs/session.md");
    let log = fixture("transcripts/session.log");

    let output = scrivener(dir.path(), &["log2md", path_arg(&log), path_arg(&md_out)]);
    assert_success(&output);

    let expected = include_str!("fixtures/expected/session.md");
    assert_eq!(fs::read_to_string(&md_out).unwrap(), expected);
    assert!(String::from_utf8_lossy(&output.stdout).contains("3 turns"));
}

#[test]
fn log2md_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let md_out = dir.path().join("session.md");
    let log = fixture("transcripts/session.log");

    let output = scrivener(
        dir.path(),
        &["--dry-run", "log2md", path_arg(&log), path_arg(&md_out)],
    );
    assert_success(&output);
    assert!(!md_out.exists());
}

#[test]
fn log2md_heading_grammar_reads_its_own_output() {
    let dir = TempDir::new().unwrap();
    let md_out = dir.path().join("again.md");
    let markdown = fixture("expected/session.md");

    let output = scrivener(
        dir.path(),
        &[
            "log2md",
            path_arg(&markdown),
            path_arg(&md_out),
            "--header",
            "heading",
        ],
    );
    assert_success(&output);
    assert_eq!(
        fs::read_to_string(&md_out).unwrap(),
        fs::read_to_string(&markdown).unwrap()
    );
}

#[test]
fn extract_writes_inline_sources_and_stubs() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("src");
    let ledger = dir.path().join("ledger.json");
    let markdown = fixture("expected/session.md");

    let output = scrivener(
        dir.path(),
        &[
            "extract",
            path_arg(&markdown),
            "--dest",
            path_arg(&dest),
            "--ledger",
            path_arg(&ledger),
        ],
    );
    assert_success(&output);

    assert_eq!(
        fs::read_to_string(dest.join("com/acme/Widget.java")).unwrap(),
        "package com.acme;\n\npublic class Widget { }\n"
    );

    let stub = fs::read_to_string(dest.join("com/acme/Gadget.java")).unwrap();
    assert!(stub.starts_with("package com.acme;"));
    assert!(stub.contains("public class Gadget"));

    let recorded: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&ledger).unwrap()).unwrap();
    let entries = recorded["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().any(|e| e["stubbed"] == true));
}

#[test]
fn extract_defaults_to_extracted_src() {
    let dir = TempDir::new().unwrap();
    let markdown = fixture("expected/session.md");

    let output = scrivener(dir.path(), &["extract", path_arg(&markdown)]);
    assert_success(&output);
    assert!(
        dir.path()
            .join("extracted_src/com/acme/Widget.java")
            .exists()
    );
}

#[test]
fn extract_with_nothing_to_write_succeeds() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("out");
    let markdown = fixture("markdown/no_artifacts.md");

    let output = scrivener(
        dir.path(),
        &["extract", path_arg(&markdown), "--dest", path_arg(&dest)],
    );
    assert_success(&output);
    assert!(!dest.join("com").exists());
}

#[test]
fn messages_writes_primary_and_companion() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("project");
    let markdown = fixture("markdown/files_manifest.md");

    let output = scrivener(
        dir.path(),
        &["messages", path_arg(&markdown), "--dest", path_arg(&dest)],
    );
    assert_success(&output);

    assert_eq!(
        fs::read_to_string(dest.join("src/main/java/com/acme/App.java")).unwrap(),
        "package com.acme;\n\npublic class App { }\n"
    );
    assert_eq!(
        fs::read_to_string(dest.join("pom.xml")).unwrap(),
        "<project/>\n"
    );
}

#[test]
fn messages_falls_back_to_first_entry() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("project");
    let markdown = fixture("markdown/pom_only.md");

    let output = scrivener(
        dir.path(),
        &["messages", path_arg(&markdown), "--dest", path_arg(&dest)],
    );
    assert_success(&output);
    assert_eq!(
        fs::read_to_string(dest.join("pom.xml")).unwrap(),
        "<project/>\n"
    );
}

#[test]
fn messages_dumps_input_when_nothing_found() {
    let dir = TempDir::new().unwrap();
    let markdown = fixture("markdown/no_artifacts.md");

    let output = scrivener(dir.path(), &["messages", path_arg(&markdown)]);
    assert!(!output.status.success());

    let dump = dir.path().join("coder_raw_dump.txt");
    assert_eq!(
        fs::read_to_string(dump).unwrap(),
        fs::read_to_string(&markdown).unwrap()
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("coder_raw_dump.txt").count(), 1);
    assert!(!String::from_utf8_lossy(&output.stdout).contains("coder_raw_dump.txt"));
}

#[test]
fn log_file_receives_report_lines() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("src");
    let log_file = dir.path().join("run.log");
    let markdown = fixture("expected/session.md");

    let output = scrivener(
        dir.path(),
        &[
            "--log-file",
            path_arg(&log_file),
            "extract",
            path_arg(&markdown),
            "--dest",
            path_arg(&dest),
        ],
    );
    assert_success(&output);

    let log = fs::read_to_string(&log_file).unwrap();
    assert!(log.contains("com/acme/Widget.java"));
    assert!(log.contains("materialized artifact"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Log written to"));
}

#[test]
fn extract_compares_against_previous_ledger() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("src");
    let ledger = dir.path().join("ledger.json");
    let markdown = fixture("expected/session.md");
    let args = [
        "--ledger",
        path_arg(&ledger),
        "extract",
        path_arg(&markdown),
        "--dest",
        path_arg(&dest),
    ];

    let first = scrivener(dir.path(), &args);
    assert_success(&first);
    assert!(!String::from_utf8_lossy(&first.stdout).contains("previous ledger"));

    let second = scrivener(dir.path(), &args);
    assert_success(&second);
    assert!(String::from_utf8_lossy(&second.stdout).contains("no changes since previous ledger"));

    let edited = dir.path().join("edited.md");
    let text = fs::read_to_string(&markdown)
        .unwrap()
        .replace("public class Widget { }", "public class Widget { int size; }");
    fs::write(&edited, text).unwrap();

    let third = scrivener(
        dir.path(),
        &[
            "--ledger",
            path_arg(&ledger),
            "extract",
            path_arg(&edited),
            "--dest",
            path_arg(&dest),
        ],
    );
    assert_success(&third);
    let stdout = String::from_utf8_lossy(&third.stdout);
    assert!(stdout.contains("1 file(s) changed since previous ledger"));
    assert!(stdout.contains("~ com/acme/Widget.java"));
}

#[test]
fn invalid_utf8_input_is_replaced_not_rejected() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("raw.log");
    let md_out = dir.path().join("raw.md");
    fs::write(&log, b"[PM]\nna\xefve \xff bytes\n[Coder]\ndone\n".as_slice()).unwrap();

    let output = scrivener(dir.path(), &["log2md", path_arg(&log), path_arg(&md_out)]);
    assert_success(&output);

    let markdown = fs::read_to_string(&md_out).unwrap();
    assert!(markdown.contains("### PM\n\nna\u{FFFD}ve \u{FFFD} bytes\n"));
    assert!(markdown.contains("### Coder\n\ndone\n"));

    let dest = dir.path().join("src");
    let source = dir.path().join("source.md");
    fs::write(
        &source,
        b"```java\n// caf\xe9\npublic class Menu { }\n```\n".as_slice(),
    )
    .unwrap();
    let output = scrivener(
        dir.path(),
        &["extract", path_arg(&source), "--dest", path_arg(&dest)],
    );
    assert_success(&output);
    assert_eq!(
        fs::read_to_string(dest.join("Menu.java")).unwrap(),
        "// caf\u{FFFD}\npublic class Menu { }\n"
    );
}

#[test]
fn unknown_language_is_rejected() {
    let dir = TempDir::new().unwrap();
    let markdown = fixture("expected/session.md");

    let output = scrivener(
        dir.path(),
        &["--language", "cobol", "extract", path_arg(&markdown)],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cobol"));
}
