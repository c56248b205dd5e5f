//! `annofilter` - filter annotation JSON from the command line.
//!
//! Reads annotations (a JSON array, or a search response with a `rows`
//! array) from a file or stdin and prints the ids of those matching a search
//! query and/or a JSON filter specification.
//!
//! ```text
//! annofilter annotations.json -q 'tag:poetry since:1week tiger'
//! annofilter -f '{"user": {"terms": ["poe"], "operator": "or"}}' --json < rows.json
//! ```

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use annotation_filter::{parse_search, Annotation, Evaluator, FilterSpec};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Deserialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Filter annotations by field-aware search terms
#[derive(Debug, Parser)]
#[command(name = "annofilter")]
#[command(version, about)]
struct Cli {
    /// Annotation JSON file (reads stdin when omitted or '-')
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Search text, e.g. 'tag:poetry user:poe since:1day tiger'
    #[arg(short, long, value_name = "TEXT")]
    query: Option<String>,

    /// User to focus on; always the first `user` term of the query
    #[arg(long, value_name = "USER")]
    focus_user: Option<String>,

    /// Filter specification as JSON; its fields override the query's
    #[arg(short, long, value_name = "JSON", conflicts_with = "filter_file")]
    filter: Option<String>,

    /// Read the filter specification from a file
    #[arg(long, value_name = "PATH")]
    filter_file: Option<PathBuf>,

    /// Measure `since` ages from this RFC 3339 instant instead of now
    #[arg(long, value_name = "RFC3339", value_parser = parse_instant)]
    now: Option<DateTime<Utc>>,

    /// Print a JSON array of ids instead of one id per line
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Accepted input shapes. Rows stay untyped so one odd row cannot fail the rest.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Input {
    Rows { rows: Vec<Value> },
    List(Vec<Value>),
}

impl Input {
    fn into_annotations(self) -> Vec<Annotation> {
        let rows = match self {
            Input::Rows { rows } => rows,
            Input::List(list) => list,
        };
        rows.into_iter()
            .enumerate()
            .filter_map(|(index, row)| match serde_json::from_value(row) {
                Ok(annotation) => Some(annotation),
                Err(err) => {
                    tracing::warn!(index, error = %err, "skipping malformed annotation row");
                    None
                }
            })
            .collect()
    }
}

fn parse_instant(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Combines `--query` and `--filter`/`--filter-file` into one specification.
fn build_spec(cli: &Cli) -> Result<FilterSpec> {
    let mut spec = match &cli.query {
        Some(query) => parse_search(query, cli.focus_user.as_deref()),
        None => parse_search("", cli.focus_user.as_deref()),
    };

    let explicit = match (&cli.filter, &cli.filter_file) {
        (Some(json), _) => Some(json.clone()),
        (None, Some(path)) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read filter file {}", path.display()))?,
        ),
        (None, None) => None,
    };
    if let Some(json) = explicit {
        let overlay = FilterSpec::from_json(&json).context("invalid filter specification")?;
        spec = spec.merge(overlay);
    }
    Ok(spec)
}

fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("failed to read annotations from {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read annotations from stdin")?;
            Ok(buf)
        }
    }
}

fn parse_annotations(json: &str) -> Result<Vec<Annotation>> {
    let input: Input =
        serde_json::from_str(json).context("annotations must be a JSON array or an object with `rows`")?;
    Ok(input.into_annotations())
}

/// Evaluates and writes the matching ids.
fn run(cli: &Cli, annotations: &[Annotation], out: &mut impl Write) -> Result<usize> {
    let spec = build_spec(cli)?;
    let mut evaluator = Evaluator::new();
    if let Some(now) = cli.now {
        evaluator = evaluator.at(now);
    }

    let ids = evaluator.filter(annotations, &spec)?;
    tracing::info!(total = annotations.len(), matched = ids.len(), "filter complete");

    if cli.json {
        serde_json::to_writer(&mut *out, &ids)?;
        writeln!(out)?;
    } else {
        for id in &ids {
            writeln!(out, "{id}")?;
        }
    }
    Ok(ids.len())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let raw = read_input(cli.input.as_ref())?;
    let annotations = parse_annotations(&raw)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli, &annotations, &mut out)?;
    Ok(())
}
