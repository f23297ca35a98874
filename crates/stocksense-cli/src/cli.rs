//! CLI argument definitions.
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--model-dir` | `models` | Directory of per-symbol model artifacts |
//! | `--timeout-ms` | `10000` | Per-request and per-call timeout |
//! | `--format` | `text` | Output format (text, json) |
//! | `--mock` | `false` | Serve deterministic offline data |
//! | `--log-dir` | `logs` | Directory for `stocksense.log` |
//!
//! ```bash
//! stocksense RELIANCE
//! stocksense RELIANCE,TCS --format json
//! ```

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stocksense_core::Symbol;

use crate::error::CliError;

/// StockSense: next-close predictions and insights for NSE-listed stocks.
#[derive(Debug, Parser)]
#[command(name = "stocksense", author, version, about)]
pub struct Cli {
    /// Comma-separated stock symbols (e.g. RELIANCE,TCS,INFY).
    ///
    /// Prompted for on stdin when omitted.
    pub symbols: Option<String>,

    /// Directory holding `{SYMBOL}_model` artifacts.
    #[arg(long, default_value = stocksense_ml::config::DEFAULT_MODEL_DIR)]
    pub model_dir: PathBuf,

    /// Request timeout budget in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Use deterministic offline data instead of the live providers.
    #[arg(long, default_value_t = false)]
    pub mock: bool,

    /// Directory for the log file.
    #[arg(long, default_value = stocksense_core::logging::DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Symbols from the argument, or from one prompted line of `input`.
    pub fn resolve_symbols(
        &self,
        input: &mut impl BufRead,
        prompt: &mut impl Write,
    ) -> Result<Vec<Symbol>, CliError> {
        let raw = match &self.symbols {
            Some(symbols) => symbols.clone(),
            None => {
                write!(prompt, "Enter stock symbols (comma separated): ")?;
                prompt.flush()?;
                let mut line = String::new();
                input.read_line(&mut line)?;
                line
            }
        };
        parse_symbols(&raw)
    }
}

/// Split a comma-separated list, ignoring whitespace anywhere in it.
pub fn parse_symbols(raw: &str) -> Result<Vec<Symbol>, CliError> {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    let symbols = Symbol::parse_list(&compact)?;
    if symbols.is_empty() {
        return Err(CliError::NoSymbols);
    }
    Ok(symbols)
}
