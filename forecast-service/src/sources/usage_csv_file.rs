use std::{fs::File, io::Read, path::PathBuf};

use csv::StringRecord;
use time::{format_description::FormatItem, macros::format_description, Date, PrimitiveDateTime, Time};
use usage_domain::{store::StoreError, Appliance, DomainError, UsageRecord, UsageStore};

use crate::transform;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to open usage dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read CSV headers: {0}")]
    Headers(#[source] csv::Error),
    #[error("usage dataset is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(thiserror::Error, Debug)]
pub enum RowError {
    #[error("failed to read CSV record: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid timestamp '{0}'")]
    Timestamp(String),
    #[error("invalid value '{value}' in column '{column}'")]
    Number { column: &'static str, value: String },
    #[error("empty '{0}' field")]
    Empty(&'static str),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("{0}")]
    Rejected(String),
}

/// Day-first forms first; ISO forms are unambiguous and accepted too.
const DATETIME_FORMATS: &[&[FormatItem<'static>]] = &[
    format_description!("[day padding:none]-[month padding:none]-[year] [hour padding:none]:[minute]:[second]"),
    format_description!("[day padding:none]-[month padding:none]-[year] [hour padding:none]:[minute]"),
    format_description!("[day padding:none]/[month padding:none]/[year] [hour padding:none]:[minute]:[second]"),
    format_description!("[day padding:none]/[month padding:none]/[year] [hour padding:none]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

const DATE_FORMATS: &[&[FormatItem<'static>]] = &[
    format_description!("[day padding:none]-[month padding:none]-[year]"),
    format_description!("[day padding:none]/[month padding:none]/[year]"),
    format_description!("[year]-[month]-[day]"),
];

/// Parses a dataset timestamp, reading ambiguous dates as day-before-month.
pub fn parse_day_first(s: &str) -> Option<PrimitiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| PrimitiveDateTime::parse(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| Date::parse(s, fmt).ok())
                .map(|d| PrimitiveDateTime::new(d, Time::MIDNIGHT))
        })
}

/// Resolved positions of the columns the store needs.
struct ColumnIndex {
    timestamp: usize,
    house_id: usize,
    season: usize,
    festival: Option<usize>,
    usage: [usize; Appliance::COUNT],
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |name: &'static str| -> Result<usize, LoadError> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(LoadError::MissingColumn(name))
        };

        let mut usage = [0usize; Appliance::COUNT];
        for a in Appliance::ALL {
            usage[a.index()] = find(a.column())?;
        }

        Ok(Self {
            timestamp: find("timestamp")?,
            house_id: find("house_id")?,
            season: find("season")?,
            festival: find("festival").ok(),
            usage,
        })
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize, name: &'static str) -> Result<&'r str, RowError> {
    let v = record.get(idx).map(str::trim).unwrap_or("");
    if v.is_empty() {
        Err(RowError::Empty(name))
    } else {
        Ok(v)
    }
}

fn record_to_usage(record: &StringRecord, cols: &ColumnIndex) -> Result<UsageRecord, RowError> {
    let ts_str = field(record, cols.timestamp, "timestamp")?;
    let ts = parse_day_first(ts_str).ok_or_else(|| RowError::Timestamp(ts_str.to_string()))?;

    let house_id = field(record, cols.house_id, "house_id")?;
    let season = field(record, cols.season, "season")?;
    let festival = cols
        .festival
        .and_then(|idx| record.get(idx))
        .map(|s| s.to_string());

    let mut usage = [0.0; Appliance::COUNT];
    for a in Appliance::ALL {
        let raw = field(record, cols.usage[a.index()], a.column())?;
        usage[a.index()] = raw.parse().map_err(|_| RowError::Number {
            column: a.column(),
            value: raw.to_string(),
        })?;
    }

    Ok(UsageRecord::new(ts, house_id, season, festival, usage)?)
}

/// Loads the historical usage table into a [`UsageStore`].
///
/// Expected header columns (by name):
/// - timestamp (day-first date and time)
/// - house_id
/// - season
/// - festival (optional, blank means no festival)
/// - one column per catalog appliance (see [`Appliance::column`])
///
/// Other columns are ignored. Rows that fail to parse or validate are skipped.
pub struct UsageCsvFileSource {
    path: PathBuf,
}

impl UsageCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<UsageStore, LoadError> {
        let file = File::open(&self.path).map_err(|source| LoadError::Open {
            path: self.path.clone(),
            source,
        })?;
        let (records, rejected) = read_records(file)?;

        tracing::info!(
            path = %self.path.display(),
            rows = records.len(),
            rejected,
            "usage dataset loaded"
        );

        Ok(UsageStore::from_records(records)?)
    }
}

/// Reads every valid row; returns the records and the number of rejected rows.
pub fn read_records<R: Read>(reader: R) -> Result<(Vec<UsageRecord>, usize), LoadError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().map_err(LoadError::Headers)?.clone();
    let cols = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::new();
    let mut rejected = 0usize;

    for (line, result) in rdr.records().enumerate() {
        let parsed = result
            .map_err(RowError::from)
            .and_then(|record| record_to_usage(&record, &cols))
            .and_then(|usage| transform::validate_usage_record(&usage).map(|()| usage));

        match parsed {
            Ok(usage) => records.push(usage),
            Err(e) => {
                rejected += 1;
                metrics::counter!("usage_csv_rows_rejected_total").increment(1);
                // header is line 1
                tracing::warn!(line = line + 2, error = %e, "skipping usage row");
            }
        }
    }

    Ok((records, rejected))
}
