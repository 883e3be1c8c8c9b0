use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use divider_chunking::Chunker;
use divider_core::{ChunkReport, ChunkerConfig, DividerSettings};
use divider_observability::init_tracing;

#[derive(Debug, Parser)]
#[command(name = "divider")]
#[command(about = "Split long prompts into parts that fit a chat input limit")]
struct Cli {
    /// Text attached to the first part, asking the reader to wait for more.
    #[arg(long, global = true, env = "DIVIDER_LEADING_MARKER")]
    leading_marker: Option<String>,

    /// Text closing the last part.
    #[arg(long, global = true, env = "DIVIDER_TRAILING_MARKER")]
    trailing_marker: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Divide a prompt read from FILE, or stdin when FILE is `-` or absent.
    Split {
        file: Option<PathBuf>,
        #[arg(long, env = "DIVIDER_MAX_CHUNK_SIZE")]
        size: Option<usize>,
        /// Print only this part (1-based), ready to paste.
        #[arg(long, conflicts_with = "json")]
        part: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Show the effective markers and default size.
    Markers,
}

fn main() -> Result<()> {
    init_tracing("divider_cli");
    let cli = Cli::parse();

    let mut settings = DividerSettings::from_env().context("invalid DIVIDER_* environment")?;
    settings.chunker = ChunkerConfig::new(
        cli.leading_marker.unwrap_or(settings.chunker.leading_marker),
        cli.trailing_marker.unwrap_or(settings.chunker.trailing_marker),
    );

    match cli.command {
        Command::Split { file, size, part, json } => {
            let chunker = Chunker::new(settings.chunker);
            let max_chunk_size = resolve_size(&chunker, size, settings.max_chunk_size)?;

            let text = read_input(file.as_ref())?;
            let report = chunker
                .report(&text, max_chunk_size)
                .context("failed to divide prompt")?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            } else if let Some(number) = part {
                writeln!(out, "{}", select_part(&report, number)?)?;
            } else {
                write_parts(&mut out, &report)?;
            }
        }
        Command::Markers => {
            let payload = serde_json::json!({
                "leading_marker": settings.chunker.leading_marker,
                "trailing_marker": settings.chunker.trailing_marker,
                "default_max_chunk_size": settings.max_chunk_size,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}

/// Picks `--size` over the configured default and checks it against the
/// leading marker before any input is read.
fn resolve_size(chunker: &Chunker, flag: Option<usize>, default: usize) -> Result<usize> {
    let (size, source) = match flag {
        Some(size) => (size, "--size (or DIVIDER_MAX_CHUNK_SIZE)"),
        None => (default, "default max chunk size"),
    };
    chunker
        .check_size(size)
        .with_context(|| format!("invalid {source}: {size}"))?;
    Ok(size)
}

fn select_part(report: &ChunkReport, number: usize) -> Result<&str> {
    match report.part(number) {
        Some(chunk) => Ok(chunk),
        None => bail!(
            "part {} does not exist; the prompt has {} part(s)",
            number,
            report.total_chunks
        ),
    }
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("failed reading prompt file: {}", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed reading prompt from stdin")?;
            Ok(text)
        }
    }
}

fn write_parts(out: &mut impl Write, report: &ChunkReport) -> Result<()> {
    for (idx, chunk) in report.chunks.iter().enumerate() {
        if idx > 0 {
            writeln!(out)?;
        }
        writeln!(
            out,
            "--- part {}/{} ({} chars) ---",
            idx + 1,
            report.total_chunks,
            chunk.chars().count()
        )?;
        writeln!(out, "{chunk}")?;
    }
    Ok(())
}
