//! Column projection and row filtering for OpenPowerlifting-style CSV exports.
//!
//! Every column is read as text so values are written back exactly as read,
//! without Arrow's numeric or date inference reformatting them.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, BooleanArray, StringArray};
use arrow::compute::filter_record_batch;
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use geoclean_core::atomic::write_atomically;
use tracing::{info, warn};

use crate::RecordsError;

const BATCH_SIZE: usize = 8192;

const DEFAULT_COLUMNS: &[&str] = &[
    "Name",
    "Sex",
    "Event",
    "Equipment",
    "Age",
    "BodyweightKg",
    "Best3SquatKg",
    "Best3BenchKg",
    "Best3DeadliftKg",
    "TotalKg",
    "Dots",
    "Wilks",
    "Glossbrenner",
    "Goodlift",
    "Tested",
    "Country",
    "State",
    "Date",
];

// OpenPowerlifting spells the United States "USA", so both forms are listed.
const DEFAULT_COUNTRIES: &[&str] = &[
    "Argentina",
    "Australia",
    "Brazil",
    "Canada",
    "China",
    "Germany",
    "India",
    "Mexico",
    "Netherlands",
    "New Zealand",
    "South Africa",
    "United Kingdom",
    "United States of America",
    "USA",
];

/// Which columns to keep and which rows survive.
///
/// A row survives when its country is in `countries` and its state cell is
/// present. Empty and missing cells count as absent; a state of only spaces
/// is kept as written.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFilter {
    /// Output columns, in output order.
    pub columns: Vec<String>,
    /// Allowed values of the country column.
    pub countries: Vec<String>,
    pub country_column: String,
    pub state_column: String,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS.iter().map(|s| s.to_string()).collect(),
            countries: DEFAULT_COUNTRIES.iter().map(|s| s.to_string()).collect(),
            country_column: "Country".to_string(),
            state_column: "State".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStats {
    pub total_rows: usize,
    /// Rows left after the country filter; `None` when the column is absent.
    pub after_country: Option<usize>,
    /// Rows left after the state filter; `None` when the column is absent.
    pub after_state: Option<usize>,
    pub written_rows: usize,
    /// Requested columns the input does not have.
    pub missing_columns: Vec<String>,
}

/// Filter `input` into `output`.
///
/// The output is only replaced once the whole input has been read and
/// filtered.
pub fn filter_records(
    input: &Path,
    output: &Path,
    filter: &RecordFilter,
) -> Result<RecordStats, RecordsError> {
    let schema = Arc::new(read_header(input)?);

    let mut projection = Vec::with_capacity(filter.columns.len());
    let mut stats = RecordStats::default();
    for column in &filter.columns {
        match schema.index_of(column) {
            Ok(i) => projection.push(i),
            Err(_) => stats.missing_columns.push(column.clone()),
        }
    }
    if !stats.missing_columns.is_empty() {
        warn!(columns = ?stats.missing_columns, "requested columns not found");
    }

    let projected: SchemaRef = Arc::new(schema.project(&projection)?);
    let country_idx = projected.index_of(&filter.country_column).ok();
    let state_idx = projected.index_of(&filter.state_column).ok();
    if state_idx.is_none() {
        warn!(column = %filter.state_column, "state column missing, skipping state filter");
    }
    stats.after_country = country_idx.map(|_| 0);
    stats.after_state = state_idx.map(|_| 0);

    let allowed: HashSet<&str> = filter.countries.iter().map(String::as_str).collect();

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .with_truncated_rows(true)
        .build(open(input)?)?;

    let mut kept = Vec::new();
    for batch in reader {
        let batch = batch?.project(&projection)?;
        let rows = batch.num_rows();
        stats.total_rows += rows;

        let country_ok: Vec<bool> = match country_idx {
            Some(i) => {
                let countries = text_column(&batch, i)?;
                (0..rows)
                    .map(|r| countries.is_valid(r) && allowed.contains(countries.value(r)))
                    .collect()
            }
            None => vec![true; rows],
        };
        let state_ok: Vec<bool> = match state_idx {
            Some(i) => {
                let states = text_column(&batch, i)?;
                (0..rows)
                    .map(|r| states.is_valid(r) && !states.value(r).is_empty())
                    .collect()
            }
            None => vec![true; rows],
        };

        let keep: Vec<bool> = country_ok
            .iter()
            .zip(&state_ok)
            .map(|(c, s)| *c && *s)
            .collect();

        if let Some(n) = stats.after_country.as_mut() {
            *n += country_ok.iter().filter(|ok| **ok).count();
        }
        let survivors = keep.iter().filter(|ok| **ok).count();
        if let Some(n) = stats.after_state.as_mut() {
            *n += survivors;
        }
        stats.written_rows += survivors;

        if survivors > 0 {
            kept.push(filter_record_batch(&batch, &BooleanArray::from(keep))?);
        }
    }

    write_atomically(output, |out| {
        let mut writer = WriterBuilder::new().with_header(true).build(out);
        if kept.is_empty() {
            // Still emit the header row.
            writer
                .write(&RecordBatch::new_empty(projected.clone()))
                .map_err(io::Error::other)?;
        }
        for batch in &kept {
            writer.write(batch).map_err(io::Error::other)?;
        }
        Ok(())
    })
    .map_err(|source| RecordsError::Io {
        path: output.to_path_buf(),
        source,
    })?;

    info!(
        total = stats.total_rows,
        written = stats.written_rows,
        path = %output.display(),
        "filtered records"
    );
    Ok(stats)
}

fn open(path: &Path) -> Result<File, RecordsError> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RecordsError::FileNotFound(path.to_path_buf()),
        _ => RecordsError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

/// Column names from the header row, all typed as nullable text.
fn read_header(path: &Path) -> Result<Schema, RecordsError> {
    let mut file = open(path)?;
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut file, Some(1))?;
    if inferred.fields().is_empty() {
        return Err(RecordsError::EmptyInput(path.to_path_buf()));
    }
    Ok(Schema::new(
        inferred
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ))
}

fn text_column(batch: &RecordBatch, idx: usize) -> Result<&StringArray, RecordsError> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| RecordsError::UnexpectedType(batch.schema().field(idx).name().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const MEETS: &str = "\
Name,Sex,Country,State,TotalKg,MeetName
Alice,F,USA,CA,400.5,Nationals
Bob,M,France,,300,Open
Carol,F,Germany,,350,Cup
Dan,M,New Zealand,AKL,500.0,Champs
\"Eve, Jr\",F,Canada,ON,410,Classic
";

    fn run(csv: &str, filter: &RecordFilter) -> (RecordStats, String) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("meets.csv");
        let output = dir.path().join("out/filtered.csv");
        fs::write(&input, csv).unwrap();
        let stats = filter_records(&input, &output, filter).unwrap();
        (stats, fs::read_to_string(&output).unwrap())
    }

    #[test]
    fn default_filter_projects_and_filters() {
        let (stats, out) = run(MEETS, &RecordFilter::default());

        assert_eq!(
            out,
            "Name,Sex,TotalKg,Country,State\n\
             Alice,F,400.5,USA,CA\n\
             Dan,M,500.0,New Zealand,AKL\n\
             \"Eve, Jr\",F,410,Canada,ON\n"
        );
        assert_eq!(stats.total_rows, 5);
        assert_eq!(stats.after_country, Some(4));
        assert_eq!(stats.after_state, Some(3));
        assert_eq!(stats.written_rows, 3);
        assert_eq!(stats.missing_columns.len(), 13);
        assert!(stats.missing_columns.contains(&"Date".to_string()));
    }

    #[test]
    fn missing_state_column_skips_state_filter() {
        let csv = "Name,Country\nAlice,USA\nBob,France\nCarol,\n";
        let (stats, out) = run(csv, &RecordFilter::default());
        assert_eq!(out, "Name,Country\nAlice,USA\n");
        assert_eq!(stats.after_country, Some(1));
        assert_eq!(stats.after_state, None);
    }

    #[test]
    fn missing_country_column_skips_country_filter() {
        let csv = "Name,State\nAlice,CA\nBob,\n";
        let (stats, out) = run(csv, &RecordFilter::default());
        assert_eq!(out, "Name,State\nAlice,CA\n");
        assert_eq!(stats.after_country, None);
        assert_eq!(stats.after_state, Some(1));
    }

    #[test]
    fn nothing_survives_still_writes_header() {
        let csv = "Name,Country,State\nBob,France,IDF\n";
        let (stats, out) = run(csv, &RecordFilter::default());
        assert_eq!(out, "Name,Country,State\n");
        assert_eq!(stats.written_rows, 0);
    }

    #[test]
    fn custom_columns_keep_requested_order() {
        let filter = RecordFilter {
            columns: vec!["State".into(), "Name".into(), "Country".into()],
            countries: vec!["Germany".into(), "USA".into()],
            ..RecordFilter::default()
        };
        let (_, out) = run(MEETS, &filter);
        assert_eq!(out, "State,Name,Country\nCA,Alice,USA\n");
    }

    #[test]
    fn short_rows_read_missing_cells_as_absent() {
        let csv = "Name,Country,State\nA,USA\nB,USA,TX\nC\n";
        let (stats, out) = run(csv, &RecordFilter::default());
        assert_eq!(out, "Name,Country,State\nB,USA,TX\n");
        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.after_country, Some(2));
        assert_eq!(stats.after_state, Some(1));
    }

    #[test]
    fn blank_state_is_kept() {
        let csv = "Name,Country,State\nA,USA, \nB,USA,\n";
        let (stats, out) = run(csv, &RecordFilter::default());
        assert_eq!(out, "Name,Country,State\nA,USA, \n");
        assert_eq!(stats.written_rows, 1);
    }

    #[test]
    fn missing_input_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = filter_records(
            &dir.path().join("absent.csv"),
            &dir.path().join("out.csv"),
            &RecordFilter::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RecordsError::FileNotFound(_)));
        assert!(!dir.path().join("out.csv").exists());
    }
}
