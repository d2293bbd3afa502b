//! Course record sources
//!
//! A source turns catalog data into [`RecordOutcome`]s: either an accepted
//! [`CourseRecord`] or the reason a raw record was dropped. Outcomes are
//! collected into a [`FetchReport`] so a run can show how much it skipped and
//! why instead of silently losing records.

pub mod api_source;
pub mod csv_source;

pub use api_source::{parse_department_response, ApiSource, ApiSourceConfig};
pub use csv_source::{parse_catalog_csv, CsvSource};

use crate::core::models::CourseRecord;
use crate::error::Result;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Why a raw record did not make it into the node set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// Department or course number missing
    MissingIdentifier,
    /// Department + number present but not course-code shaped
    InvalidIdentifier,
    /// Another record with the same normalized id was accepted first
    DuplicateIdentifier,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIdentifier => write!(f, "missing identifier"),
            Self::InvalidIdentifier => write!(f, "invalid identifier"),
            Self::DuplicateIdentifier => write!(f, "duplicate identifier"),
        }
    }
}

/// Result of turning one raw record into a course
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Record accepted with a normalized id
    Accepted(CourseRecord),
    /// Record dropped
    Skipped {
        /// Why the record was dropped
        reason: SkipReason,
        /// The raw identifier (or row description) for diagnostics
        detail: String,
    },
}

impl RecordOutcome {
    /// Shorthand for a skipped outcome
    pub fn skipped(reason: SkipReason, detail: impl Into<String>) -> Self {
        Self::Skipped {
            reason,
            detail: detail.into(),
        }
    }
}

/// A unit of work (department request) that failed as a whole
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUnit {
    /// Unit name, e.g. the department code
    pub unit: String,
    /// Error message
    pub error: String,
}

/// Counts of what a source produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Records accepted into the node set
    pub accepted: usize,
    /// Dropped records by reason
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Units that failed entirely and were skipped
    pub failed_units: Vec<FailedUnit>,
}

impl FetchSummary {
    /// Total number of dropped records
    #[must_use]
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Number of records dropped for one reason
    #[must_use]
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}

impl fmt::Display for FetchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} accepted, {} skipped",
            self.accepted,
            self.skipped_total()
        )?;
        if !self.skipped.is_empty() {
            let parts: Vec<String> = self
                .skipped
                .iter()
                .map(|(reason, count)| format!("{reason}: {count}"))
                .collect();
            write!(f, " ({})", parts.join(", "))?;
        }
        if !self.failed_units.is_empty() {
            write!(f, ", {} failed units", self.failed_units.len())?;
        }
        Ok(())
    }
}

/// Accepted records plus the summary of everything a source produced
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Accepted records in source order, ids unique
    pub records: Vec<CourseRecord>,
    /// What was accepted, skipped and failed
    pub summary: FetchSummary,
    seen: HashSet<String>,
}

impl FetchReport {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the report
    ///
    /// A record whose id was already accepted is counted as
    /// [`SkipReason::DuplicateIdentifier`]; the first one wins.
    pub fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Accepted(course) => {
                if self.seen.insert(course.id.clone()) {
                    self.summary.accepted += 1;
                    self.records.push(course);
                } else {
                    crate::debug!("Duplicate course id skipped: {}", course.id);
                    *self
                        .summary
                        .skipped
                        .entry(SkipReason::DuplicateIdentifier)
                        .or_default() += 1;
                }
            }
            RecordOutcome::Skipped { reason, detail } => {
                crate::debug!("Record skipped ({reason}): {detail}");
                *self.summary.skipped.entry(reason).or_default() += 1;
            }
        }
    }

    /// Record a unit of work that failed as a whole
    pub fn fail_unit(&mut self, unit: impl Into<String>, error: impl fmt::Display) {
        self.summary.failed_units.push(FailedUnit {
            unit: unit.into(),
            error: error.to_string(),
        });
    }
}

impl Extend<RecordOutcome> for FetchReport {
    fn extend<I: IntoIterator<Item = RecordOutcome>>(&mut self, iter: I) {
        for outcome in iter {
            self.record(outcome);
        }
    }
}

/// A provider of course records
pub trait CourseSource {
    /// Short name used in logs and reports (file path, endpoint, ...)
    fn describe(&self) -> String;

    /// Fetch all records
    ///
    /// Per-record and per-unit problems are reported in the returned summary;
    /// only a failure that makes the whole source unusable is an error.
    ///
    /// # Errors
    /// Returns an error when the source cannot be read at all
    fn fetch(&self) -> Result<FetchReport>;
}
