//! Command-line interface for participants-demographics
//! Reads JSON-lines records `{"text": ..., "metadata": ...}` and writes one result per record.
//!
//! Usage:
//!   participants-demographics extract [`<input>`] [--format json|yaml]   - Demographics of each record
//!   participants-demographics annotate [`<input>`]                      - Labelling-tool documents
//!   participants-demographics count [`<input>`]                         - Participant count of each record
//!
//! Records are read from stdin when no input file is given and processed one line at a
//! time. `--config <file>` layers a TOML file over the built-in defaults and
//! `--set key=value` overrides single keys, e.g. `--set reading.max_details_len=200`.
//! Logs go to stderr; set `RUST_LOG` to see them.

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use participants_demographics::demographics::annotation::Document;
use participants_demographics::demographics::{
    DemographicsError, Extractor, Loader, ParticipantsInfo,
};

#[derive(Serialize)]
struct ExtractedRecord<'a> {
    metadata: &'a serde_json::Value,
    demographics: &'a ParticipantsInfo,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn input_arg() -> Arg {
    Arg::new("input")
        .help("JSON-lines file of {text, metadata} records (default: stdin)")
        .index(1)
}

fn command() -> Command {
    Command::new("participants-demographics")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract participant counts, sex and age from article text")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .global(true)
                .action(ArgAction::Append)
                .value_name("KEY=VALUE")
                .help("Override one configuration key, e.g. reading.max_snippet_len=120"),
        )
        .subcommand(
            Command::new("extract")
                .about("Write {metadata, demographics} for each record")
                .arg(input_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["json", "yaml"])
                        .default_value("json"),
                ),
        )
        .subcommand(
            Command::new("annotate")
                .about("Write a labelling-tool document for each record")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("count")
                .about("Write the participant count (or null) for each record")
                .arg(input_arg()),
        )
}

fn load_extractor(matches: &ArgMatches) -> anyhow::Result<Extractor> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    for assignment in matches.get_many::<String>("set").into_iter().flatten() {
        let Some((key, value)) = assignment.split_once('=') else {
            anyhow::bail!("invalid --set {:?}, expected KEY=VALUE", assignment);
        };
        loader = loader
            .set_override(key.trim(), value.trim())
            .map_err(DemographicsError::from)
            .with_context(|| format!("applying --set {}", assignment))?;
    }
    let config = loader
        .build()
        .map_err(DemographicsError::from)
        .context("loading configuration")?;
    Ok(Extractor::with_config(config.reading))
}

/// Call `handle` on each record of `input` as soon as its line is read.
fn for_each_document<F>(input: Option<&String>, mut handle: F) -> anyhow::Result<()>
where
    F: FnMut(&Document) -> anyhow::Result<()>,
{
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut documents = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(DemographicsError::from)?;
        if line.trim().is_empty() {
            continue;
        }
        let document: Document =
            serde_json::from_str(&line).map_err(|source| DemographicsError::Json {
                line: index + 1,
                source,
            })?;
        handle(&document)?;
        documents += 1;
    }
    info!(documents, "processed input");
    Ok(())
}

fn write_json_line<T: Serialize>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn handle_extract(extractor: &Extractor, input: Option<&String>, format: &str) -> anyhow::Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    for_each_document(input, |document| {
        let demographics = extractor.extract(&document.text);
        let record = ExtractedRecord {
            metadata: &document.metadata,
            demographics: &demographics,
        };
        match format {
            "yaml" => {
                let yaml = serde_yaml::to_string(&record).map_err(DemographicsError::from)?;
                write!(out, "---\n{}", yaml)?;
            }
            _ => write_json_line(&mut out, &record)?,
        }
        Ok(())
    })?;
    out.flush()?;
    Ok(())
}

fn handle_annotate(extractor: &Extractor, input: Option<&String>) -> anyhow::Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    for_each_document(input, |document| {
        write_json_line(&mut out, &extractor.annotate(document))
    })?;
    out.flush()?;
    Ok(())
}

fn handle_count(extractor: &Extractor, input: Option<&String>) -> anyhow::Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    for_each_document(input, |document| {
        write_json_line(&mut out, &extractor.extract(&document.text).count)
    })?;
    out.flush()?;
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let matches = command().get_matches();
    let Some((name, sub_matches)) = matches.subcommand() else {
        anyhow::bail!("a subcommand is required");
    };

    let extractor = load_extractor(sub_matches)?;
    let input = sub_matches.get_one::<String>("input");

    match name {
        "extract" => {
            let format = sub_matches
                .get_one::<String>("format")
                .map(String::as_str)
                .unwrap_or("json");
            handle_extract(&extractor, input, format)
        }
        "annotate" => handle_annotate(&extractor, input),
        "count" => handle_count(&extractor, input),
        other => anyhow::bail!("unknown subcommand {}", other),
    }
}

fn main() {
    init_logging();

    if let Err(error) = run() {
        eprintln!("Error: {:#}", error);
        std::process::exit(1);
    }
}
