//! linkformat: parse, filter and convert CoRE Link Format documents.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use linkformat_core::LinkFormatConfig;
use linkformat_protocol::{LinkFormat, WebLink};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "linkformat")]
#[command(about = "Parse, filter and convert CoRE Link Format documents")]
#[command(version)]
struct Cli {
    /// JSON codec configuration (attribute tables, strict mode)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reject repeated single-occurrence attributes
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every link of a document as one JSON object per line
    Parse {
        /// Document to read (stdin if omitted)
        file: Option<PathBuf>,
    },

    /// Re-serialize the links that match the given queries
    #[command(visible_alias = "f")]
    Filter {
        /// Document to read (stdin if omitted)
        file: Option<PathBuf>,

        /// Query such as `rt=temp*`, `obs` or `href=/sensors/*` (repeatable)
        #[arg(short = 'q', long = "query")]
        queries: Vec<String>,

        /// Output encoding
        #[arg(short = 'f', long = "format", value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Validate a document and report the number of links
    Check {
        /// Document to read (stdin if omitted)
        file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Cbor,
    Json,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,linkformat_protocol=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LinkFormatConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => LinkFormatConfig::default(),
    };
    if cli.strict {
        config.strict = true;
    }
    let codec = LinkFormat::new(config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Parse { file } => parse_links(&codec, &read_input(file.as_ref())?, &mut out)?,
        Commands::Filter {
            file,
            queries,
            format,
        } => filter_links(&codec, &read_input(file.as_ref())?, &queries, format, &mut out)?,
        Commands::Check { file } => check_links(&codec, &read_input(file.as_ref())?, &mut out)?,
    }

    Ok(())
}

/// Write every link as one JSON object per line.
fn parse_links<W: Write>(codec: &LinkFormat, text: &str, out: &mut W) -> anyhow::Result<()> {
    for link in codec.parse(text) {
        let link = link.context("failed to parse link-format document")?;
        writeln!(out, "{}", link_to_json(&link))?;
    }
    Ok(())
}

/// Re-serialize the matching links. CBOR is written as lowercase hex.
fn filter_links<W: Write>(
    codec: &LinkFormat,
    text: &str,
    queries: &[String],
    format: Format,
    out: &mut W,
) -> anyhow::Result<()> {
    let tree = codec
        .deserialize(text)
        .context("failed to parse link-format document")?;
    tracing::debug!(queries = ?queries, "filtering document");

    match format {
        Format::Text => writeln!(out, "{}", codec.serialize(&tree, queries))?,
        Format::Json => writeln!(out, "{}", codec.serialize_json(&tree, queries)?)?,
        Format::Cbor => writeln!(out, "{}", hex::encode(codec.serialize_cbor(&tree, queries)?))?,
    }
    Ok(())
}

fn check_links<W: Write>(codec: &LinkFormat, text: &str, out: &mut W) -> anyhow::Result<()> {
    let links = codec
        .parse_all(text)
        .context("link-format document is invalid")?;
    tracing::info!(links = links.len(), "document is valid");
    writeln!(out, "ok: {} links", links.len())?;
    Ok(())
}

/// Read the whole document from `file`, or stdin if none is given.
fn read_input(file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn link_to_json(link: &WebLink) -> serde_json::Value {
    let attributes: serde_json::Map<String, serde_json::Value> = link
        .attributes
        .iter()
        .map(|(name, values)| (name.to_string(), serde_json::json!(values)))
        .collect();
    serde_json::json!({
        "target": link.target,
        "attributes": attributes,
    })
}
