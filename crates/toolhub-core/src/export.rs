use crate::report::ReportLayout;
use crate::{models::Tool, Error, Result};
use chrono::{Local, NaiveDate};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CSV_FILE_NAME: &str = "ai-tools-checklist.csv";
pub const PDF_FILE_NAME: &str = "ai-tools-checklist.pdf";

const CSV_HEADERS: [&str; 6] = ["Name", "Category", "Pricing", "Link", "Description", "Status"];

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Fixed name of the generated file
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_FILE_NAME,
            ExportFormat::Pdf => PDF_FILE_NAME,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Pdf => "PDF",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s)
            .ok_or_else(|| Error::ExportError(format!("Unknown export format '{}'. Use csv or pdf", s)))
    }
}

/// Exporter for the filtered checklist
pub struct Exporter;

impl Exporter {
    /// Generate the file and write it under its fixed name into `dir`.
    /// Returns the path that was written.
    pub fn export_to_dir<P: AsRef<Path>>(
        format: ExportFormat,
        tools: &[Tool],
        tried: &BTreeSet<String>,
        saved: &BTreeSet<String>,
        dir: P,
    ) -> Result<PathBuf> {
        let path = dir.as_ref().join(format.file_name());
        let bytes = Self::generate(format, tools, tried, saved, Local::now().date_naive())?;

        let mut file = File::create(&path).map_err(|e| {
            Error::ExportError(format!("Failed to create {}: {}", path.display(), e))
        })?;
        file.write_all(&bytes).map_err(|e| {
            Error::ExportError(format!("Failed to write {}: {}", path.display(), e))
        })?;

        info!(
            "Exported {} tools as {} to {}",
            tools.len(),
            format.label(),
            path.display()
        );
        Ok(path)
    }

    /// File contents for a format, with the report date pinned
    pub fn generate(
        format: ExportFormat,
        tools: &[Tool],
        tried: &BTreeSet<String>,
        saved: &BTreeSet<String>,
        generated_on: NaiveDate,
    ) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Csv => Ok(Self::to_csv(tools, tried, saved).into_bytes()),
            ExportFormat::Pdf => Self::to_pdf(tools, tried, saved, generated_on),
        }
    }

    /// One quoted row per tool under a quoted header, newline separated
    pub fn to_csv(tools: &[Tool], tried: &BTreeSet<String>, saved: &BTreeSet<String>) -> String {
        let mut rows = Vec::with_capacity(tools.len() + 1);
        rows.push(Self::csv_row(&CSV_HEADERS));

        for tool in tools {
            // Commas in descriptions become semicolons; lossy on purpose
            let description = tool.description.replace(',', ";");
            let status = csv_status(&tool.id, tried, saved);

            rows.push(Self::csv_row(&[
                tool.name.as_str(),
                tool.category.as_str(),
                tool.pricing.as_str(),
                tool.link.as_str(),
                description.as_str(),
                status.as_str(),
            ]));
        }

        rows.join("\n")
    }

    /// Paginated PDF report
    pub fn to_pdf(
        tools: &[Tool],
        tried: &BTreeSet<String>,
        saved: &BTreeSet<String>,
        generated_on: NaiveDate,
    ) -> Result<Vec<u8>> {
        ReportLayout::build(tools, tried, saved, generated_on).render()
    }

    fn csv_row(fields: &[&str]) -> String {
        fields
            .iter()
            .map(|f| Self::quote_csv(f))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Every field is wrapped as-is, quotes inside are left alone
    fn quote_csv(s: &str) -> String {
        format!("\"{}\"", s)
    }
}

/// "Tried", "Saved", "Tried Saved" or "Not marked"
pub fn csv_status(tool_id: &str, tried: &BTreeSet<String>, saved: &BTreeSet<String>) -> String {
    let mut status = String::new();
    if tried.contains(tool_id) {
        status.push_str("Tried ");
    }
    if saved.contains(tool_id) {
        status.push_str("Saved");
    }

    match status.trim() {
        "" => "Not marked".to_string(),
        s => s.to_string(),
    }
}
