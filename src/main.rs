use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use scrivener::contexts::HeaderGrammar;
use scrivener::log_sink::LogSession;

mod cli;

#[derive(Parser)]
#[command(name = "scrivener")]
#[command(
    about = "Turn agent conversation logs into markdown and materialize the source files they contain",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Enable verbose debug output")]
    verbose: bool,

    #[arg(long, global = true, help = "Perform a dry run without writing files")]
    dry_run: bool,

    #[arg(
        long,
        global = true,
        help = "Language profile used to recognize source code (default: java)"
    )]
    language: Option<String>,

    #[arg(long, global = true, help = "YAML file with additional language profiles")]
    languages_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Also write all output to this log file")]
    log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Write a JSON ledger of materialized files to this path"
    )]
    ledger: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "log2md",
        alias = "export-log",
        about = "Convert a raw conversation log into a canonical markdown document"
    )]
    Log2Md {
        #[arg(id = "transcript_log", value_name = "LOG_FILE", help = "Raw transcript log")]
        log_file: PathBuf,
        #[arg(help = "Markdown document to write")]
        md_out: PathBuf,
        #[arg(
            long = "header",
            value_enum,
            help = "Speaker header grammar to recognize (repeatable; default: bracket and next-speaker)"
        )]
        headers: Vec<HeaderArg>,
    },

    #[command(
        alias = "md2java",
        about = "Materialize every source block and class manifest found in a markdown document"
    )]
    Extract {
        #[arg(help = "Markdown document to scan")]
        markdown: PathBuf,
        #[arg(long, help = "Destination root (default: extracted_src)")]
        dest: Option<PathBuf>,
    },

    #[command(
        about = "Materialize the primary file of the first files manifest in a markdown document"
    )]
    Messages {
        #[arg(help = "Markdown document to scan")]
        markdown: PathBuf,
        #[arg(long, help = "Destination root (default: out_<timestamp>)")]
        dest: Option<PathBuf>,
        #[arg(
            long,
            help = "Where to dump the raw input when nothing is found (default: coder_raw_dump.txt)"
        )]
        dump: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum HeaderArg {
    Bracket,
    NextSpeaker,
    Heading,
}

impl From<HeaderArg> for HeaderGrammar {
    fn from(arg: HeaderArg) -> Self {
        match arg {
            HeaderArg::Bracket => HeaderGrammar::Bracket,
            HeaderArg::NextSpeaker => HeaderGrammar::NextSpeaker,
            HeaderArg::Heading => HeaderGrammar::Heading,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = cli::Config::resolve(
        cli.verbose,
        cli.dry_run,
        cli.language,
        cli.languages_file,
        cli.log_file,
        cli.ledger,
    );
    let session = LogSession::install(config.verbose, config.log_file.as_deref())?;

    let result = match cli.command {
        Commands::Log2Md {
            log_file,
            md_out,
            headers,
        } => {
            let grammars = headers.into_iter().map(HeaderGrammar::from).collect();
            cli::log_to_markdown(&log_file, &md_out, grammars, &config, &session)
        }
        Commands::Extract { markdown, dest } => cli::extract(&markdown, dest, &config, &session),
        Commands::Messages {
            markdown,
            dest,
            dump,
        } => cli::messages(&markdown, dest, dump, &config, &session),
    };

    if let Some(path) = session.log_path() {
        println!("Log written to {}", path.display());
    }

    result
}
