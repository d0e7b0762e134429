use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use nft_delta::input::{read_input, InputSource};
use nft_delta::path_guard;
use nft_delta::report::render_summary;
use nft_delta_core::{
    delta, format_json, format_summary, normalize_with_options, parse, summarize, write_delta,
    write_file, NormalizeOptions, Ruleset,
};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;

use cli::{Cli, OutputFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();
    check_usage(&cli);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let opts = NormalizeOptions {
        infer_dnat: !cli.no_infer_dnat,
    };

    match &cli.second {
        None => run_clean(&cli, &opts),
        Some(second) => run_delta(&cli, second, &opts),
    }
}

/// Reject argument combinations clap cannot express; exits with status 2.
fn check_usage(cli: &Cli) {
    let mut cmd = Cli::command();
    match &cli.second {
        Some(second) if cli.first == "-" && second == "-" => cmd
            .error(
                ErrorKind::ArgumentConflict,
                "stdin ('-') can be used for only one input",
            )
            .exit(),
        None if cli.summary || cli.format == OutputFormat::Json => cmd
            .error(
                ErrorKind::MissingRequiredArgument,
                "--summary and --format json need both GLOBAL and COMPLETE",
            )
            .exit(),
        _ => {}
    }
}

fn run_clean(cli: &Cli, opts: &NormalizeOptions) -> Result<()> {
    let source = InputSource::from_arg(&cli.first);
    let text = read_input(&source)?;
    debug!(input = %source, bytes = text.len(), "normalizing single input");

    let normalized = normalize_with_options(&text, opts);
    emit(cli.output.as_deref(), &normalized, &[&source])
}

fn run_delta(cli: &Cli, second: &str, opts: &NormalizeOptions) -> Result<()> {
    let base_source = InputSource::from_arg(&cli.first);
    let current_source = InputSource::from_arg(second);
    let base_text = read_input(&base_source)?;
    let current_text = read_input(&current_source)?;

    let base = load_ruleset(&base_source, &base_text, opts)?;
    let current = load_ruleset(&current_source, &current_text, opts)?;

    let tables = delta(&current, &base);
    let summary = summarize(&tables);
    debug!(
        tables_new = summary.tables_new,
        tables_changed = summary.tables_changed,
        rules = summary.rules,
        "delta computed"
    );

    let rendered = if cli.summary {
        let line = if cli.output.is_some() {
            format_summary(&summary)
        } else {
            render_summary(&summary)
        };
        format!("{line}\n")
    } else {
        match cli.format {
            OutputFormat::Text => write_delta(&tables),
            OutputFormat::Json => format!("{}\n", format_json(&tables)),
        }
    };

    emit(
        cli.output.as_deref(),
        &rendered,
        &[&base_source, &current_source],
    )
}

fn load_ruleset(source: &InputSource, text: &str, opts: &NormalizeOptions) -> Result<Ruleset> {
    let ruleset = parse(&normalize_with_options(text, opts))
        .with_context(|| format!("failed to parse {source}"))?;
    debug!(input = %source, tables = ruleset.len(), "parsed input");
    Ok(ruleset)
}

fn emit(output: Option<&Path>, text: &str, inputs: &[&InputSource]) -> Result<()> {
    if let Some(path) = output {
        path_guard::ensure_output_not_same(path, inputs)?;
        write_file(path, text).with_context(|| format!("failed to write {}", path.display()))?;
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write to stdout")
}
