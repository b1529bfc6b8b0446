// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for transcript2md.
//!
//! This binary provides the `convert` command for turning JSONL conversation
//! transcripts into Markdown, one file at a time or a whole directory at once.

use lexopt::prelude::*;
use snafu::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use transcript2md::convert::{self, ConvertError, Report};
use transcript2md::renderer::RenderOptions;
use transcript2md::sessions::{CatalogError, SessionCatalog};
use tracing_subscriber::EnvFilter;

/// What to convert.
enum Mode {
    /// One input, with an optional explicit output path.
    Single {
        input: PathBuf,
        output: Option<PathBuf>,
    },
    /// Every transcript in a directory.
    All(PathBuf),
}

struct Cli {
    mode: Option<Mode>,
    sessions: Option<PathBuf>,
    render: RenderOptions,
    quiet: bool,
    verbose: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("missing input file"))]
    MissingInput,

    #[snafu(display("{source}"))]
    LoadCatalog { source: CatalogError },

    #[snafu(display("{source}"))]
    Convert { source: ConvertError },

    #[snafu(display("{failed} of {total} files failed to convert"))]
    BatchFailed { failed: usize, total: usize },
}

fn usage() -> String {
    format!(
        "\
Usage: {name} [OPTIONS] <INPUT> [OUTPUT]
       {name} [OPTIONS] --all [DIR]",
        name = env!("CARGO_BIN_NAME"),
    )
}

fn print_help() {
    println!(
        "\
{name} {version}
Convert JSONL conversation transcripts to Markdown

{usage}

Arguments:
  <INPUT>     Transcript to convert (.jsonl)
  [OUTPUT]    Markdown file to write (default: INPUT with .md extension)
  [DIR]       Directory to scan with --all (default: current directory)

Options:
      --all                   Convert every .jsonl file in DIR
      --sessions <FILE>       JSON table of session dates and titles
      --title <TITLE>         Document heading
      --max-code-lines <N>    Lines kept per code block (default: 50)
      --max-output-lines <N>  Lines kept per tool output (default: 30)
  -q, --quiet                 Suppress progress messages
  -v, --verbose               Log diagnostics to stderr
  -h, --help                  Print help
  -V, --version               Print version",
        name = env!("CARGO_BIN_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        usage = usage(),
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    let mut all = false;
    let mut positional: Vec<PathBuf> = Vec::new();
    let mut sessions = None;
    let mut render = RenderOptions::default();
    let mut quiet = false;
    let mut verbose = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Long("all") => all = true,
            Long("sessions") => sessions = Some(parser.value()?.parse()?),
            Long("title") => render.document_title = parser.value()?.string()?,
            Long("max-code-lines") => render.max_code_lines = parser.value()?.parse()?,
            Long("max-output-lines") => render.max_output_lines = parser.value()?.parse()?,
            Short('q') | Long("quiet") => quiet = true,
            Short('v') | Long("verbose") => verbose = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_BIN_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) if positional.len() < 2 => positional.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    let mut positional = positional.into_iter();
    let mode = if all {
        if positional.len() > 1 {
            return Err("--all takes at most one directory".into());
        }
        Some(Mode::All(positional.next().unwrap_or_else(|| PathBuf::from("."))))
    } else {
        positional.next().map(|input| Mode::Single {
            input,
            output: positional.next(),
        })
    };

    Ok(Cli {
        mode,
        sessions,
        render,
        quiet,
        verbose,
    })
}

fn init_logging(verbose: bool) {
    let default = if verbose { "transcript2md=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_catalog(path: Option<&Path>) -> Result<SessionCatalog, Error> {
    let mut catalog = SessionCatalog::builtin();
    if let Some(path) = path {
        catalog.extend(SessionCatalog::from_path(path).context(LoadCatalogSnafu)?);
    }
    Ok(catalog)
}

fn print_report(report: &Report) {
    let name = |path: &Path| {
        path.file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
    };
    println!("Converted: {} -> {}", name(&report.input), name(&report.output));
    println!("  {} conversation blocks", report.blocks);
    if report.skipped_lines > 0 {
        println!("  {} malformed lines skipped", report.skipped_lines);
    }
}

fn run(cli: Cli, mode: Mode) -> Result<(), Error> {
    let catalog = load_catalog(cli.sessions.as_deref())?;

    match mode {
        Mode::Single { input, output } => {
            let report = convert::convert_file(&input, output.as_deref(), &catalog, &cli.render)
                .context(ConvertSnafu)?;
            if !cli.quiet {
                print_report(&report);
            }
        }
        Mode::All(dir) => {
            let batch = convert::convert_dir(&dir, &catalog, &cli.render).context(ConvertSnafu)?;
            if batch.total() == 0 {
                println!("No .{} files found in {}", convert::INPUT_EXTENSION, dir.display());
                return Ok(());
            }
            if !cli.quiet {
                batch.converted.iter().for_each(print_report);
            }
            for (path, err) in &batch.failed {
                eprintln!("Failed: {}: {err}", path.display());
            }
            ensure!(
                batch.failed.is_empty(),
                BatchFailedSnafu {
                    failed: batch.failed.len(),
                    total: batch.total(),
                }
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let mut cli = match parse_args().context(ParseArgsSnafu) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("error: {err}\n\n{}", usage());
            return ExitCode::from(2);
        }
    };
    init_logging(cli.verbose);

    let Some(mode) = cli.mode.take() else {
        eprintln!("error: {}\n\n{}", Error::MissingInput, usage());
        return ExitCode::from(2);
    };

    match run(cli, mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
