#[path = "huffcode/progress.rs"]
mod progress;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use console::style;
use huffcode::{decode_file_with, encode_file_with, load_code_table, Pass};
use indicatif::{HumanBytes, ProgressStyle};
use progress::{bar_style, ProgressMonitor};
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(version, about = "Compress and decompress files with a Huffman code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log more, repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Don't draw progress bars
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a code table and a packed bit file
    Encode {
        original: PathBuf,
        code_table: PathBuf,
        compressed: PathBuf,
    },
    /// Restore a file from its packed bits and code table
    Decode {
        compressed: PathBuf,
        code_table: PathBuf,
        output: PathBuf,
    },
    /// Show the codes stored in a code table
    Codes { code_table: PathBuf },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(&cli);

    match &cli.command {
        Commands::Encode {
            original,
            code_table,
            compressed,
        } => encode(original, code_table, compressed, cli.quiet),
        Commands::Decode {
            compressed,
            code_table,
            output,
        } => decode(compressed, code_table, output, cli.quiet),
        Commands::Codes { code_table } => codes(code_table),
    }
}

fn init_tracing(cli: &Cli) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => LevelFilter::WARN,
        (false, 0) => LevelFilter::INFO,
        (false, 1) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };
    let registry = tracing_subscriber::registry().with(level);
    if cli.no_progress {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        let indicatif_layer = IndicatifLayer::new();
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(indicatif_layer.get_stderr_writer()),
            )
            .with(indicatif_layer)
            .init();
    }
}

/// Reader hook for the codec's file passes: draws a bar per pass.
fn monitored(
    bars: &ProgressStyle,
) -> impl FnMut(BufReader<File>, u64, Pass) -> ProgressMonitor<BufReader<File>> + '_ {
    move |reader, len, pass| ProgressMonitor::new(reader, len, pass.name(), bars)
}

fn encode(original: &Path, code_table: &Path, compressed: &Path, quiet: bool) -> Result<()> {
    let bars = bar_style()?;
    let summary = encode_file_with(original, code_table, compressed, monitored(&bars))
        .wrap_err_with(|| format!("failed to encode {}", original.display()))?;

    if !quiet {
        let ratio = summary.compressed_bytes() as f64 / summary.symbols as f64 * 100.0;
        println!(
            "{} {} -> {} ({:.2}% of original, {} bits of codes)",
            style("encoded").green().bold(),
            HumanBytes(summary.symbols),
            HumanBytes(summary.compressed_bytes()),
            ratio,
            summary.bits
        );
    }
    Ok(())
}

fn read_code_table(code_table: &Path) -> Result<(huffcode::HuffmanTree, huffcode::CodeTable)> {
    let file = File::open(code_table)
        .wrap_err_with(|| format!("failed to open {}", code_table.display()))?;
    load_code_table(BufReader::new(file))
        .wrap_err_with(|| format!("invalid code table {}", code_table.display()))
}

fn decode(compressed: &Path, code_table: &Path, output: &Path, quiet: bool) -> Result<()> {
    let bars = bar_style()?;
    let summary = decode_file_with(compressed, code_table, output, monitored(&bars))
        .wrap_err_with(|| format!("failed to decode {}", compressed.display()))?;

    if !summary.is_complete() {
        warn!(
            "{} is truncated: restored {} of {} bytes",
            compressed.display(),
            summary.symbols,
            summary.expected
        );
    }
    if !quiet {
        println!(
            "{} {} -> {}",
            style("decoded").green().bold(),
            HumanBytes(summary.bits.div_ceil(8)),
            HumanBytes(summary.symbols)
        );
    }
    Ok(())
}

fn codes(code_table: &Path) -> Result<()> {
    let (tree, table) = read_code_table(code_table)?;
    for (symbol, entry) in table.iter() {
        let shown = if symbol.is_ascii_graphic() {
            format!("'{}'", symbol as char)
        } else {
            format!("{symbol:#04x}")
        };
        println!(
            "{:>3} {:>6} {:>12} {}",
            symbol,
            style(shown).dim(),
            entry.frequency,
            entry.code
        );
    }

    let packed = match table.expected_bits() {
        Some(bits) => HumanBytes(bits.div_ceil(8)).to_string(),
        None => "more than 2^64 bits".to_owned(),
    };
    println!(
        "{} symbols, {} bytes of input, {} of packed bits, tree depth {}",
        table.distinct(),
        tree.frequency(),
        packed,
        tree.max_depth()
    );
    Ok(())
}
