//! Hourly aggregation of impression records into per-arm buckets.
//!
//! Input is the AdSmart impression export:
//!
//! ```text
//! auction_id,experiment,date,hour,device_make,platform_os,browser,yes,no
//! 0008ef63-77a7-448b-bd1e-075f42c55e39,exposed,2020-07-10,8,Generic Smartphone,6,Chrome Mobile,0,0
//! ```
//!
//! Each record answers the questionnaire at most once (`yes` or `no`), so a
//! bucket's engagement is the number of answers and its success the number
//! of `yes` answers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use abseq_common::{AggregateBucket, Arm, ArmBuckets};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const REQUIRED_COLUMNS: [&str; 5] = ["experiment", "date", "hour", "yes", "no"];

/// Errors raised while reading impression or bucket files.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input is empty: no header line")]
    MissingHeader,

    #[error("header is missing column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid {column} '{value}': {message}")]
    InvalidField {
        line: usize,
        column: &'static str,
        value: String,
        message: String,
    },

    #[error("{arm} counts for {date} hour {hour} overflow a 64-bit total")]
    CountOverflow { arm: Arm, date: NaiveDate, hour: u32 },

    #[error("invalid bucket file {path}: {source}")]
    BucketFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<AggregateError> for abseq_common::Error {
    fn from(err: AggregateError) -> Self {
        match err {
            AggregateError::Io { source, .. } => abseq_common::Error::Io(source),
            other => abseq_common::Error::Input(other.to_string()),
        }
    }
}

/// One impression row, reduced to the fields the test needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpressionRecord {
    #[serde(default)]
    pub auction_id: Option<String>,
    pub arm: Arm,
    pub date: NaiveDate,
    pub hour: u32,
    pub yes: u64,
    pub no: u64,
}

impl ImpressionRecord {
    /// Answers recorded on this impression, `None` on overflow.
    pub fn engagement(&self) -> Option<u64> {
        self.yes.checked_add(self.no)
    }
}

/// Read impression records from a CSV file.
pub fn read_impressions(path: &Path) -> Result<Vec<ImpressionRecord>, AggregateError> {
    let content = std::fs::read_to_string(path).map_err(|source| AggregateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_impressions_content(&content)
}

/// Parse impression CSV content. Columns are located by header name;
/// line numbers in errors are 1-based and count the header.
pub fn parse_impressions_content(content: &str) -> Result<Vec<ImpressionRecord>, AggregateError> {
    let mut lines = content.lines().enumerate();
    let header = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((_, line)) => break split_fields(line),
            None => return Err(AggregateError::MissingHeader),
        }
    };
    let index_of = |column: &'static str| {
        header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))
            .ok_or(AggregateError::MissingColumn { column })
    };
    let mut columns = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, column) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = index_of(column)?;
    }
    let [experiment_col, date_col, hour_col, yes_col, no_col] = columns;
    let auction_col = index_of("auction_id").ok();

    let mut records = Vec::new();
    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let fields = split_fields(line);
        if fields.len() != header.len() {
            return Err(AggregateError::FieldCount {
                line: line_no,
                expected: header.len(),
                found: fields.len(),
            });
        }

        let arm = fields[experiment_col]
            .parse::<Arm>()
            .map_err(|message| invalid(line_no, "experiment", &fields[experiment_col], message))?;
        let date = NaiveDate::parse_from_str(fields[date_col].trim(), "%Y-%m-%d")
            .map_err(|e| invalid(line_no, "date", &fields[date_col], e.to_string()))?;
        let hour: u32 = parse_number(line_no, "hour", &fields[hour_col])?;
        if hour > 23 {
            return Err(invalid(line_no, "hour", &fields[hour_col], "must be 0-23".into()));
        }
        let yes: u64 = parse_number(line_no, "yes", &fields[yes_col])?;
        let no: u64 = parse_number(line_no, "no", &fields[no_col])?;
        if yes.checked_add(no).is_none() {
            return Err(invalid(
                line_no,
                "no",
                &fields[no_col],
                "yes + no overflows a 64-bit count".into(),
            ));
        }

        records.push(ImpressionRecord {
            auction_id: auction_col.map(|c| fields[c].trim().to_string()),
            arm,
            date,
            hour,
            yes,
            no,
        });
    }
    Ok(records)
}

fn invalid(line: usize, column: &'static str, value: &str, message: String) -> AggregateError {
    AggregateError::InvalidField {
        line,
        column,
        value: value.to_string(),
        message,
    }
}

fn parse_number<T>(line: usize, column: &'static str, value: &str) -> Result<T, AggregateError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| invalid(line, column, value, e.to_string()))
}

/// Split one CSV line, honouring double-quoted fields and `""` escapes.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Group records into chronological hourly buckets per arm.
///
/// `engagement = sum(yes + no)` and `success = sum(yes)` per (arm, date,
/// hour). Buckets without any answer are dropped. Totals that do not fit
/// in a `u64` are an error.
pub fn aggregate_hourly(records: &[ImpressionRecord]) -> Result<ArmBuckets, AggregateError> {
    let mut grouped: BTreeMap<(Arm, NaiveDate, u32), AggregateBucket> = BTreeMap::new();
    for record in records {
        let bucket = grouped
            .entry((record.arm, record.date, record.hour))
            .or_default();
        let totals = record.engagement().and_then(|engagement| {
            Some((
                bucket.engagement.checked_add(engagement)?,
                bucket.success.checked_add(record.yes)?,
            ))
        });
        let Some((engagement, success)) = totals else {
            return Err(AggregateError::CountOverflow {
                arm: record.arm,
                date: record.date,
                hour: record.hour,
            });
        };
        bucket.engagement = engagement;
        bucket.success = success;
    }

    let mut buckets = ArmBuckets::default();
    for ((arm, _, _), bucket) in grouped {
        if !bucket.is_empty() {
            buckets.arm_mut(arm).push(bucket);
        }
    }
    Ok(buckets)
}

/// Read a JSON bucket file: `{"treatment": [...], "control": [...]}`.
pub fn read_bucket_file(path: &Path) -> Result<ArmBuckets, AggregateError> {
    let content = std::fs::read_to_string(path).map_err(|source| AggregateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| AggregateError::BucketFile {
        path: path.to_path_buf(),
        source,
    })
}
