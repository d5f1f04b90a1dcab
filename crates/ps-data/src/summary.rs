//! Intermediate per-market summary tables.
//!
//! These CSV files are the contract between the aggregation stage and the
//! estimation stage. Header: `dma,log_revenue_pre,log_revenue_post,log_revenue_diff`.

use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::Path;

use ps_core::{Assignment, Error, MarketSummary, Result, SummaryTable};

/// Column header of a summary table, in write order.
pub const SUMMARY_COLUMNS: [&str; 4] =
    ["dma", "log_revenue_pre", "log_revenue_post", "log_revenue_diff"];

/// Write a summary table, creating parent directories as needed.
pub fn write_summary_table(path: &Path, table: &SummaryTable) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_summary(file, table)?;
    tracing::info!(
        path = %path.display(),
        group = %table.assignment,
        markets = table.len(),
        "summary table written"
    );
    Ok(())
}

/// Serialize a summary table to any writer.
pub fn write_summary<W: Write>(writer: W, table: &SummaryTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in &table.rows {
        wtr.serialize(row)?;
    }
    if table.rows.is_empty() {
        wtr.write_record(SUMMARY_COLUMNS)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a summary table written by [`write_summary_table`] (or an equivalent tool).
pub fn read_summary_table(path: &Path, assignment: Assignment) -> Result<SummaryTable> {
    let file = std::fs::File::open(path)?;
    let table = read_summary(file, assignment)?;
    tracing::info!(
        path = %path.display(),
        group = %assignment,
        markets = table.len(),
        "summary table read"
    );
    Ok(table)
}

/// Parse a summary table from any CSV source.
pub fn read_summary<R: Read>(reader: R, assignment: Assignment) -> Result<SummaryTable> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let missing: Vec<&str> = SUMMARY_COLUMNS
        .iter()
        .copied()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .collect();
    if !missing.is_empty() {
        return Err(Error::Validation(format!(
            "{assignment} summary table is missing column(s): {}",
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    let mut seen = BTreeSet::new();
    for (i, record) in rdr.deserialize::<MarketSummary>().enumerate() {
        let row = record.map_err(|e| {
            Error::Validation(format!("{assignment} summary table, row {}: {e}", i + 1))
        })?;
        if !row.log_revenue_diff.is_finite() {
            return Err(Error::Validation(format!(
                "{assignment} summary table: market {} has non-finite log_revenue_diff",
                row.dma
            )));
        }
        if !seen.insert(row.dma) {
            return Err(Error::Validation(format!(
                "{assignment} summary table: market {} appears more than once",
                row.dma
            )));
        }
        rows.push(row);
    }
    Ok(SummaryTable::new(assignment, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_pandas_compatible_header() {
        let table = SummaryTable::new(
            Assignment::Treated,
            vec![MarketSummary::new(501, 1.0, 1.25), MarketSummary::new(500, 2.0, 1.5)],
        );
        let mut buf = Vec::new();
        write_summary(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("dma,log_revenue_pre,log_revenue_post,log_revenue_diff"));
        assert_eq!(lines.next(), Some("500,2.0,1.5,-0.5"));
        assert_eq!(lines.next(), Some("501,1.0,1.25,0.25"));
    }

    #[test]
    fn reads_reordered_columns() {
        let csv = "log_revenue_diff,dma,log_revenue_post,log_revenue_pre\n\
                   0.3,9,1.3,1.0\n\
                   0.1,4,2.1,2.0\n";
        let table = read_summary(csv.as_bytes(), Assignment::Control).unwrap();
        assert_eq!(table.assignment, Assignment::Control);
        assert_eq!(table.rows.iter().map(|r| r.dma).collect::<Vec<_>>(), vec![4, 9]);
        assert_eq!(table.diffs(), vec![0.1, 0.3]);
    }

    #[test]
    fn missing_diff_column_rejected() {
        let csv = "dma,log_revenue_pre,log_revenue_post\n1,1.0,2.0\n";
        let err = read_summary(csv.as_bytes(), Assignment::Treated).unwrap_err();
        assert!(err.to_string().contains("missing column(s): log_revenue_diff"), "{err}");
    }

    #[test]
    fn bad_rows_rejected() {
        let header = "dma,log_revenue_pre,log_revenue_post,log_revenue_diff\n";
        let err = read_summary(format!("{header}1,1.0,2.0,\n").as_bytes(), Assignment::Treated)
            .unwrap_err();
        assert!(err.to_string().contains("row 1"), "{err}");
        let err = read_summary(format!("{header}1,1.0,2.0,NaN\n").as_bytes(), Assignment::Treated)
            .unwrap_err();
        assert!(err.to_string().contains("non-finite"), "{err}");
    }

    #[test]
    fn duplicate_market_rejected() {
        let csv = "dma,log_revenue_pre,log_revenue_post,log_revenue_diff\n\
                   1,1.0,1.1,0.1\n\
                   1,1.0,1.1,0.1\n\
                   2,1.0,1.3,0.3\n";
        let err = read_summary(csv.as_bytes(), Assignment::Treated).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("market 1 appears more than once"), "{err}");
    }

    #[test]
    fn file_round_trip_creates_dirs() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir()
            .join(format!("ps_data_summary_{}_{nanos}", std::process::id()));
        let path = dir.join("nested").join("treated_pivot.csv");
        let table = SummaryTable::new(Assignment::Treated, vec![MarketSummary::new(7, 3.5, 3.75)]);
        write_summary_table(&path, &table).unwrap();
        let back = read_summary_table(&path, Assignment::Treated).unwrap();
        assert_eq!(back, table);
        std::fs::remove_dir_all(&dir).ok();
    }
}
