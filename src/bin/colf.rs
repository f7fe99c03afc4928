//! `colf`: reads a resolved schema document and emits generated source for
//! one or both target languages. Thin shell over [`colfer::gen`] — all the
//! logic lives in the library so it stays testable without a process.
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use colfer::gen::{generate_all, TargetSelection};
use colfer::schema_doc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Lang {
    Java,
    Ecma,
    All,
}

impl From<Lang> for TargetSelection {
    fn from(lang: Lang) -> Self {
        match lang {
            Lang::Java => TargetSelection::Java,
            Lang::Ecma => TargetSelection::Ecma,
            Lang::All => TargetSelection::All,
        }
    }
}

/// Colfer code generator: schema document in, marshal-aware sources out.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the resolved schema document (JSON).
    schema: PathBuf,

    /// Directory generated sources are written under, one subdirectory per package.
    out_dir: PathBuf,

    /// Target language(s) to emit.
    #[arg(long, value_enum, default_value_t = Lang::All)]
    lang: Lang,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "colf: generation failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!(schema = %args.schema.display(), "reading schema document");
    let raw = std::fs::read_to_string(&args.schema)?;
    let doc = schema_doc::parse(&raw)?;
    let schema = schema_doc::resolve(doc)?;

    tracing::info!(
        packages = schema.packages.len(),
        out_dir = %args.out_dir.display(),
        lang = ?args.lang,
        "generating sources"
    );
    generate_all(&schema, &args.out_dir, args.lang.into())?;

    tracing::info!("generation complete");
    Ok(())
}
