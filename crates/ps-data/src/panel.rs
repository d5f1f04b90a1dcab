//! Raw panel ingestion.
//!
//! The input is a headered CSV with (at least) the columns listed in
//! [`REQUIRED_COLUMNS`]. Column order is free and extra columns are ignored.
//! Every problem is reported as [`Error::Validation`] naming the offending
//! row (1-based, header excluded) and column.

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use ps_core::{Assignment, Error, Observation, Panel, Period, Result};

/// Columns the loader requires.
pub const REQUIRED_COLUMNS: [&str; 5] =
    ["date", "dma", "revenue", "treatment_period", "search_stays_on"];

/// Date formats accepted in the `date` column, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%y", "%d-%b-%Y", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Column positions resolved from the header row.
struct ColumnIndex {
    date: usize,
    dma: usize,
    revenue: usize,
    treatment_period: usize,
    search_stays_on: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);
        let missing: Vec<&str> =
            REQUIRED_COLUMNS.iter().copied().filter(|c| position(c).is_none()).collect();
        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }
        let find = |name: &str| {
            position(name).ok_or_else(|| Error::Validation(format!("missing column {name}")))
        };
        Ok(Self {
            date: find("date")?,
            dma: find("dma")?,
            revenue: find("revenue")?,
            treatment_period: find("treatment_period")?,
            search_stays_on: find("search_stays_on")?,
        })
    }
}

/// Load the raw panel from a CSV file.
pub fn load_panel(path: &Path) -> Result<Panel> {
    let file = std::fs::File::open(path)?;
    let panel = read_panel(file)?;
    tracing::info!(path = %path.display(), rows = panel.len(), "panel loaded");
    Ok(panel)
}

/// Read the raw panel from any CSV source.
pub fn read_panel<R: Read>(reader: R) -> Result<Panel> {
    let mut rdr =
        csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);
    let cols = ColumnIndex::resolve(rdr.headers()?)?;

    let mut observations = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let raw = field(&record, row, cols.date, "date")?;
        let date = parse_date(raw).ok_or_else(|| bad_value(row, "date", raw))?;

        let raw = field(&record, row, cols.dma, "dma")?;
        let dma = raw.parse::<u32>().map_err(|_| bad_value(row, "dma", raw))?;

        let raw = field(&record, row, cols.revenue, "revenue")?;
        let revenue = raw.parse::<f64>().map_err(|_| bad_value(row, "revenue", raw))?;
        if !(revenue.is_finite() && revenue > 0.0) {
            return Err(Error::Validation(format!(
                "row {row}: revenue must be positive (log undefined), got {raw}"
            )));
        }

        let flag = flag_field(&record, row, cols.treatment_period, "treatment_period")?;
        let period = Period::from_flag(flag).map_err(|e| row_context(row, e))?;
        let flag = flag_field(&record, row, cols.search_stays_on, "search_stays_on")?;
        let assignment = Assignment::from_search_stays_on(flag).map_err(|e| row_context(row, e))?;

        observations.push(Observation { dma, date, revenue, period, assignment });
    }

    if observations.is_empty() {
        return Err(Error::Validation("panel CSV contains no data rows".into()));
    }
    Panel::new(observations)
}

fn field<'r>(
    record: &'r csv::StringRecord,
    row: usize,
    idx: usize,
    name: &str,
) -> Result<&'r str> {
    record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Validation(format!("row {row}: empty value in column {name}")))
}

fn flag_field(record: &csv::StringRecord, row: usize, idx: usize, name: &str) -> Result<u8> {
    let raw = field(record, row, idx, name)?;
    parse_flag(raw).ok_or_else(|| bad_value(row, name, raw))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Accepts `0`/`1` and their float spellings (`0.0`, `1.0`).
fn parse_flag(s: &str) -> Option<u8> {
    if let Ok(v) = s.parse::<u8>() {
        return Some(v);
    }
    match s.parse::<f64>().ok()? {
        v if v == 0.0 => Some(0),
        v if v == 1.0 => Some(1),
        v if v.fract() == 0.0 && (0.0..=255.0).contains(&v) => Some(v as u8),
        _ => None,
    }
}

fn bad_value(row: usize, column: &str, value: &str) -> Error {
    Error::Validation(format!("row {row}: cannot parse column {column} from '{value}'"))
}

fn row_context(row: usize, err: Error) -> Error {
    match err {
        Error::Validation(msg) => Error::Validation(format!("row {row}: {msg}")),
        other => other,
    }
}
