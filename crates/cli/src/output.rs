// Output formatting for CLI
//
// Every command hands its value plus a text renderer to `OutputFormat::emit`;
// JSON is produced here, text by the command.

use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Render `value` to stdout
    pub fn emit<T, F>(self, value: &T, text: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&mut dyn Write, &T) -> io::Result<()>,
    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.emit_to(&mut out, value, text)
    }

    pub fn emit_to<T, F>(self, out: &mut dyn Write, value: &T, text: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&mut dyn Write, &T) -> io::Result<()>,
    {
        match self {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, value)?;
                writeln!(out)?;
            }
            OutputFormat::Text => text(out, value)?,
        }
        Ok(())
    }
}

/// Key-value line for text output
pub fn write_field(out: &mut dyn Write, label: &str, value: &str) -> io::Result<()> {
    writeln!(out, "{:<14} {}", format!("{}:", label), value)
}

pub fn write_table_header(out: &mut dyn Write, columns: &[(&str, usize)]) -> io::Result<()> {
    let header = columns
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", header.trim_end())
}

/// Table row; cells wider than their column are cut with `...`
pub fn write_table_row(out: &mut dyn Write, cells: &[(&str, usize)]) -> io::Result<()> {
    let row = cells
        .iter()
        .map(|(cell, width)| format!("{:<width$}", truncate(cell, *width), width = width))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", row.trim_end())
}

fn truncate(cell: &str, width: usize) -> String {
    if cell.chars().count() <= width {
        return cell.to_string();
    }
    let kept: String = cell.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
