//! JSON result writer for training reports and predictions.

use std::fs;
use std::path::{Path, PathBuf};

use hardpoint_tree::{Outcome, Prediction, Report};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;
use crate::features::UnlabeledRows;

/// File name the match dashboard loads its statistics from.
pub const DASHBOARD_REPORT: &str = "model_stats.json";

/// Writes training and prediction results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_model_stats.json` and
/// `{experiment}_predict.json`; the model itself lives at
/// `{experiment}_model.bin`. [`ResultWriter::write_dashboard_report`]
/// additionally writes the unprefixed [`DASHBOARD_REPORT`].
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write a training report to `{experiment}_model_stats.json`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | JSON encoding failed |
    /// | [`IoError::WriteFile`] | file write failed |
    #[instrument(skip_all)]
    pub fn write_report(&self, report: &Report) -> Result<PathBuf, IoError> {
        let path = self.file("model_stats.json");
        write_json(&path, "model report", report)?;
        info!(path = %path.display(), "model report written");
        Ok(path)
    }

    /// Write a training report to the unprefixed `model_stats.json`.
    ///
    /// This is the fixed name the match dashboard fetches. A later call for
    /// another experiment in the same directory overwrites it.
    ///
    /// # Errors
    ///
    /// Same as [`ResultWriter::write_report`].
    #[instrument(skip_all)]
    pub fn write_dashboard_report(&self, report: &Report) -> Result<PathBuf, IoError> {
        let path = self.output_dir.join(DASHBOARD_REPORT);
        write_json(&path, "dashboard report", report)?;
        info!(path = %path.display(), "dashboard report written");
        Ok(path)
    }

    /// Write predictions to `{experiment}_predict.json`.
    ///
    /// `predictions[i]` belongs to the record at `rows.row_indices[i]`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | JSON encoding failed |
    /// | [`IoError::WriteFile`] | file write failed |
    #[instrument(skip_all, fields(n_predictions = predictions.len()))]
    pub fn write_predictions(
        &self,
        rows: &UnlabeledRows,
        predictions: &[Prediction],
    ) -> Result<PathBuf, IoError> {
        let path = self.file("predict.json");

        let entries: Vec<PredictionEntry> = rows
            .row_indices
            .iter()
            .zip(predictions)
            .map(|(&row, p)| PredictionEntry {
                row,
                prediction: p.outcome,
                confidence: p.confidence,
            })
            .collect();

        let artifact = PredictArtifact {
            experiment: self.experiment.as_str(),
            total_rows: rows.summary.total,
            skipped_rows: rows.summary.excluded,
            predicted_wins: entries.iter().filter(|e| e.prediction == Outcome::Win).count(),
            predicted_losses: entries.iter().filter(|e| e.prediction == Outcome::Loss).count(),
            predictions: entries,
        };

        write_json(&path, "predictions", &artifact)?;
        info!(path = %path.display(), "predictions written");
        Ok(path)
    }

    /// Return the model file path: `{output_dir}/{experiment}_model.bin`.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.file("model.bin")
    }

    fn file(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{suffix}", self.experiment.as_str()))
    }
}

fn write_json<T: Serialize>(path: &Path, what: &'static str, value: &T) -> Result<(), IoError> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| IoError::Serialize { what, source: e })?;
    fs::write(path, &json).map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct PredictArtifact<'a> {
    experiment: &'a str,
    total_rows: usize,
    skipped_rows: usize,
    predicted_wins: usize,
    predicted_losses: usize,
    predictions: Vec<PredictionEntry>,
}

#[derive(Serialize)]
struct PredictionEntry {
    row: usize,
    prediction: Outcome,
    confidence: f64,
}
