//! CSV parser for catalog exports
//!
//! Reads the bulk "courses report" export. Fields may be quoted and quoted
//! fields may contain commas, doubled quotes and line breaks.

use super::{CourseSource, FetchReport, RecordOutcome, SkipReason};
use crate::core::models::course::{format_units, title_from_description};
use crate::core::models::CourseRecord;
use crate::core::normalize::normalize_parts;
use crate::error::{CatalogError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const SUBJECT: &str = "Subject";
const COURSE_NUMBER: &str = "Course Number";
const DESCRIPTION: &str = "Course Description";
const MIN_UNITS: &str = "Credits - Units - Minimum Units";
const MAX_UNITS: &str = "Credits - Units - Maximum Units";
const TERMS_OFFERED: &str = "Terms Offered";
const CROSS_LISTED: &str = "Cross-Listed Course(s)";

/// Bulk CSV catalog export on disk
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    /// Create a source for the export at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the export
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CourseSource for CsvSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<FetchReport> {
        let content = fs::read_to_string(&self.path).map_err(|e| CatalogError::io(&self.path, e))?;
        parse_catalog_csv(&content)
    }
}

/// Column positions resolved from the header row
struct Columns {
    subject: usize,
    number: usize,
    description: Option<usize>,
    min_units: Option<usize>,
    max_units: Option<usize>,
    terms_offered: Option<usize>,
    cross_listed: Option<usize>,
}

impl Columns {
    fn resolve(headers: &[String]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| {
            find(name).ok_or_else(|| CatalogError::csv(format!("missing '{name}' column")))
        };

        Ok(Self {
            subject: required(SUBJECT)?,
            number: required(COURSE_NUMBER)?,
            description: find(DESCRIPTION),
            min_units: find(MIN_UNITS),
            max_units: find(MAX_UNITS),
            terms_offered: find(TERMS_OFFERED),
            cross_listed: find(CROSS_LISTED),
        })
    }
}

/// Parse a catalog export into a fetch report
///
/// # Errors
/// Returns an error if the content has no header row or lacks the `Subject`
/// or `Course Number` column. Individual bad rows are skipped, not errors.
pub fn parse_catalog_csv(content: &str) -> Result<FetchReport> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut rows = parse_csv_records(content).into_iter();

    let headers = rows
        .next()
        .ok_or_else(|| CatalogError::csv("no header row found"))?;
    let columns = Columns::resolve(&headers)?;

    let mut report = FetchReport::new();
    for (idx, row) in rows.enumerate() {
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        // Data rows start on line 2
        report.record(parse_course_row(&row, &columns, idx + 2));
    }

    crate::info!("Loaded {} courses from CSV ({})", report.records.len(), report.summary);
    Ok(report)
}

fn field<'a>(row: &'a [String], idx: Option<usize>) -> &'a str {
    idx.and_then(|i| row.get(i)).map_or("", |value| value.trim())
}

fn optional_field(row: &[String], idx: Option<usize>) -> Option<String> {
    let value = field(row, idx);
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_course_row(row: &[String], columns: &Columns, row_number: usize) -> RecordOutcome {
    let subject = field(row, Some(columns.subject));
    let number = field(row, Some(columns.number));

    if subject.is_empty() || number.is_empty() {
        return RecordOutcome::skipped(SkipReason::MissingIdentifier, format!("row {row_number}"));
    }

    let Some(id) = normalize_parts(subject, number) else {
        return RecordOutcome::skipped(
            SkipReason::InvalidIdentifier,
            format!("row {row_number}: '{subject} {number}'"),
        );
    };

    let description = field(row, columns.description).to_string();
    let units = format_units(field(row, columns.min_units), field(row, columns.max_units));

    let course = CourseRecord::new(id, title_from_description(&description), units, description)
        .with_terms_offered(optional_field(row, columns.terms_offered))
        .with_cross_listed(optional_field(row, columns.cross_listed));

    RecordOutcome::Accepted(course)
}

/// Split CSV text into records of fields
///
/// Handles quoted fields with embedded commas, line breaks and `""` escapes,
/// and both `\n` and `\r\n` line endings. An unterminated quote runs to the
/// end of the input.
fn parse_csv_records(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => current.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut current)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut current));
                records.push(std::mem::take(&mut record));
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() || !record.is_empty() {
        record.push(current);
        records.push(record);
    }

    records
}
