//! Output formatting and writing utilities
//!
//! This module writes command results in the selected format (human,
//! JSON, pretty JSON or YAML). Human output adds colors, section headers
//! and tables; machine formats print only the serialized data.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

/// Serialize a value in one of the machine formats
pub trait OutputFormatter {
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // Human output falls back to pretty JSON for structured data
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self::with_writer(format, use_color, quiet, verbose, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            verbose,
            writer,
        }
    }

    /// Whether results are rendered for people rather than programs
    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Get verbosity level
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");

        if formatted.ends_with('\n') {
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }

    /// Write a table (human format only)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(header_row.trim_end().bold().to_string().as_str())?;
        } else {
            self.writeln(header_row.trim_end())?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| match widths.get(i) {
                    Some(width) => format!("{:width$}", cell, width = *width),
                    None => cell.clone(),
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}
