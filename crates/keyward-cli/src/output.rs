//! Terminal rendering for command results.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Writes command results to stdout in the chosen format.
///
/// Status lines (`notice`, `warn`, `field`) are only shown in table mode so
/// that `--format json` output stays machine-readable.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render one record as a single-row table or a JSON object.
    pub fn record<T: Serialize + Tabled>(&self, record: &T) {
        match self.format {
            OutputFormat::Table => {
                let mut table = Table::new([record]);
                table.with(Style::rounded());
                println!("{table}");
            }
            OutputFormat::Json => match serde_json::to_string_pretty(record) {
                Ok(json) => println!("{json}"),
                Err(e) => fail(&format!("Failed to encode output: {e}")),
            },
        }
    }

    pub fn notice(&self, msg: &str) {
        if self.format == OutputFormat::Table {
            println!("✓ {msg}");
        }
    }

    pub fn warn(&self, msg: &str) {
        if self.format == OutputFormat::Table {
            println!("⚠ {msg}");
        }
    }

    /// Aligned `key: value` line.
    pub fn field(&self, key: &str, value: &str) {
        if self.format == OutputFormat::Table {
            println!("  {:<10} {value}", format!("{key}:"));
        }
    }
}

/// Report a fatal error on stderr.
pub fn fail(msg: &str) {
    eprintln!("✗ {msg}");
}
