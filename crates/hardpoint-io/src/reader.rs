//! CSV match export reader.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{RawValue, Record};
use crate::features::{GAME_TYPE_FIELD, MAP_FIELD, OUTCOME_FIELD, STAT_FIELDS};

const BOM: char = '\u{feff}';

/// Reads match rows from a CSV export.
///
/// Expected CSV format:
/// - UTF-8, header row required (a leading byte-order mark is stripped)
/// - Every required column present in the header, in any order
/// - All rows have the same number of columns as the header
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | A required column is absent from the header |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
pub struct RecordReader {
    path: PathBuf,
    required: Vec<String>,
}

impl RecordReader {
    /// Create a reader requiring the filter columns and the ten statistic
    /// columns, as needed for training.
    pub fn new(path: &Path) -> Self {
        let required = [GAME_TYPE_FIELD, MAP_FIELD, OUTCOME_FIELD]
            .into_iter()
            .chain(STAT_FIELDS)
            .map(String::from)
            .collect();
        Self {
            path: path.to_path_buf(),
            required,
        }
    }

    /// Create a reader requiring only the statistic columns, as needed for
    /// prediction on unlabeled rows.
    pub fn unlabeled(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            required: STAT_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the required column list.
    #[must_use]
    pub fn with_required_columns(mut self, required: Vec<String>) -> Self {
        self.required = required;
        self
    }

    /// Read and validate the CSV file, returning records in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<Record>, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets the InconsistentRowLength check below fire
        // instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header: Vec<String> = rdr
            .headers()
            .map_err(|e| self.csv_error(e))?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches(BOM).to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();
        debug!(n_columns = header.len(), "read CSV header");

        if let Some(missing) = self.required.iter().find(|c| !header.contains(c)) {
            return Err(IoError::MissingColumn {
                path: self.path.clone(),
                column: missing.clone(),
            });
        }

        let mut records = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let row = result.map_err(|e| self.csv_error(e))?;
            if row.len() != header.len() {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: header.len(),
                    got: row.len(),
                });
            }
            records.push(Record::new(
                header
                    .iter()
                    .map(String::as_str)
                    .zip(row.iter().map(RawValue::from_cell)),
            ));
        }

        if records.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_records = records.len(), "records loaded");
        Ok(records)
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}
