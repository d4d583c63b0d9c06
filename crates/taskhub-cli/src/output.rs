//! Rendering helpers shared by the CLI commands.
//!
//! Listing commands honor `--format`; tables go through `tabled` with a
//! psql-style header rule, JSON through `serde_json`.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// How a command renders its results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Render a slice of rows in the selected format.
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table if items.is_empty() => println!("No results found."),
        OutputFormat::Table => {
            let mut table = Table::new(items);
            table.with(Style::psql());
            println!("{table}");
        }
        OutputFormat::Json => print_json(items),
    }
}

/// Render one value as pretty-printed JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{json}");
}

/// Confirmation line for a completed action.
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Non-fatal notice.
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Aligned `key: value` line for detail views.
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}
