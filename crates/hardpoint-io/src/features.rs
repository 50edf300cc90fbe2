//! Feature engineering: record filter, value cleaning, derived ratios.

use hardpoint_tree::{Dataset, Outcome};
use tracing::{debug, info, instrument, warn};

use crate::IoError;
use crate::domain::{RawValue, Record};

pub const GAME_TYPE_FIELD: &str = "Game Type";
pub const MAP_FIELD: &str = "Map";
pub const OUTCOME_FIELD: &str = "Match Outcome";

/// Raw statistic columns cleaned before feature derivation.
pub const STAT_FIELDS: [&str; 10] = [
    "Kills",
    "Deaths",
    "Damage Done",
    "Assists",
    "Score",
    "Damage Taken",
    "Hits",
    "Shots",
    "Skill",
    "Percentage Of Time Moving",
];

/// Feature vector layout, in the order the model sees it.
pub const FEATURE_NAMES: [&str; 10] = [
    "Kills",
    "Deaths",
    "Damage Done",
    "Assists",
    "Score",
    "Skill",
    "Percentage Of Time Moving",
    "Kill_Death_Ratio",
    "Damage_Efficiency",
    "Accuracy",
];

/// Game mode kept by default.
pub const DEFAULT_MODE: &str = "Hardpoint";

/// Ranked map pool kept by default.
pub const DEFAULT_MAPS: [&str; 6] = ["Skyline", "Hacienda", "Vault", "Protocol", "Red Card", "Rewind"];

/// Clean one statistic into a finite number.
///
/// Numbers pass through. Text is trimmed, `%` is removed, `yes`/`no`
/// (any case) become 1/0, and the rest must parse as a finite float.
///
/// # Errors
///
/// Returns [`IoError::MalformedFeatureValue`] when the value is absent or
/// cannot be cleaned.
pub fn clean_value(field: &str, value: Option<&RawValue>) -> Result<f64, IoError> {
    let malformed = |raw: String| IoError::MalformedFeatureValue {
        field: field.to_string(),
        raw,
    };
    match value {
        None => Err(malformed(String::new())),
        Some(RawValue::Number(v)) if v.is_finite() => Ok(*v),
        Some(RawValue::Number(v)) => Err(malformed(v.to_string())),
        Some(RawValue::Text(raw)) => {
            let stripped = raw.trim().replace('%', "");
            let parsed = if stripped.eq_ignore_ascii_case("yes") {
                Some(1.0)
            } else if stripped.eq_ignore_ascii_case("no") {
                Some(0.0)
            } else {
                stripped.parse::<f64>().ok()
            };
            parsed
                .filter(|v| v.is_finite())
                .ok_or_else(|| malformed(raw.clone()))
        }
    }
}

/// Build the ten-dimension feature vector for one record.
///
/// # Errors
///
/// Returns [`IoError::MalformedFeatureValue`] for the first statistic that
/// cannot be cleaned, or for a derived ratio that is not finite.
pub fn feature_vector(record: &Record) -> Result<Vec<f64>, IoError> {
    let mut stats = [0.0f64; STAT_FIELDS.len()];
    for (slot, field) in stats.iter_mut().zip(STAT_FIELDS) {
        *slot = clean_value(field, record.get(field))?;
    }
    let [kills, deaths, damage_done, assists, score, damage_taken, hits, shots, skill, moving] =
        stats;

    let ratio = |name: &str, num: f64, den: f64| -> Result<f64, IoError> {
        let v = num / (den + 1.0);
        if v.is_finite() {
            Ok(v)
        } else {
            Err(IoError::MalformedFeatureValue {
                field: name.to_string(),
                raw: v.to_string(),
            })
        }
    };

    Ok(vec![
        kills,
        deaths,
        damage_done,
        assists,
        score,
        skill,
        moving,
        ratio("Kill_Death_Ratio", kills, deaths)?,
        ratio("Damage_Efficiency", damage_done, damage_taken)?,
        ratio("Accuracy", hits, shots)?,
    ])
}

/// Which records are eligible for training.
///
/// # Defaults
///
/// | Parameter | Default                                                 |
/// |-----------|---------------------------------------------------------|
/// | `mode`    | `Hardpoint`                                             |
/// | `maps`    | Skyline, Hacienda, Vault, Protocol, Red Card, Rewind    |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    mode: String,
    maps: Vec<String>,
}

impl RecordFilter {
    /// Create a filter with the default mode and map pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: DEFAULT_MODE.to_string(),
            maps: DEFAULT_MAPS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Set the required game mode.
    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Set the allowed maps.
    #[must_use]
    pub fn with_maps(mut self, maps: Vec<String>) -> Self {
        self.maps = maps;
        self
    }

    /// Return the required game mode.
    #[must_use]
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Return the allowed maps.
    #[must_use]
    pub fn maps(&self) -> &[String] {
        &self.maps
    }

    /// Return the record's label if it passes the mode, map, and outcome
    /// checks. The outcome must be exactly `win` or `loss`.
    #[must_use]
    pub fn accept(&self, record: &Record) -> Option<Outcome> {
        if record.text(GAME_TYPE_FIELD) != Some(self.mode.as_str()) {
            return None;
        }
        let map = record.text(MAP_FIELD)?;
        if !self.maps.iter().any(|m| m == map) {
            return None;
        }
        record.text(OUTCOME_FIELD)?.parse().ok()
    }
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts from one extraction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExtractionSummary {
    /// Records seen.
    pub total: usize,
    /// Records rejected by the filter.
    pub filtered_out: usize,
    /// Records that passed the filter but had a missing feature value.
    pub excluded: usize,
    /// Records that became samples.
    pub kept: usize,
}

/// Unlabeled feature vectors with the positions of the records they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct UnlabeledRows {
    /// Index into the input record slice for each vector.
    pub row_indices: Vec<usize>,
    /// One ten-dimension vector per usable record.
    pub features: Vec<Vec<f64>>,
    /// Counts; `filtered_out` is always zero.
    pub summary: ExtractionSummary,
}

/// Turns raw records into model inputs.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    filter: RecordFilter,
}

impl FeatureExtractor {
    /// Create an extractor with the given record filter.
    #[must_use]
    pub fn new(filter: RecordFilter) -> Self {
        Self { filter }
    }

    /// Return the record filter.
    #[must_use]
    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }

    /// Filter, clean, and derive features for labeled training data.
    ///
    /// Records with a missing feature value are excluded and counted, never
    /// fatal.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::NoUsableRecords`] | Nothing survived filtering and cleaning |
    /// | [`IoError::Dataset`] | The extracted matrix failed dataset validation |
    #[instrument(skip_all, fields(n_records = records.len(), mode = %self.filter.mode))]
    pub fn build_dataset(&self, records: &[Record]) -> Result<(Dataset, ExtractionSummary), IoError> {
        let mut summary = ExtractionSummary {
            total: records.len(),
            ..ExtractionSummary::default()
        };
        let mut features = Vec::new();
        let mut labels = Vec::new();

        for (row_index, record) in records.iter().enumerate() {
            let Some(label) = self.filter.accept(record) else {
                summary.filtered_out += 1;
                continue;
            };
            match feature_vector(record) {
                Ok(v) => {
                    features.push(v);
                    labels.push(label);
                }
                Err(e) => {
                    debug!(row_index, error = %e, "record excluded");
                    summary.excluded += 1;
                }
            }
        }
        summary.kept = features.len();

        if summary.excluded > 0 {
            warn!(excluded = summary.excluded, "records excluded for missing values");
        }
        if summary.kept == 0 {
            return Err(IoError::NoUsableRecords {
                total: summary.total,
                filtered_out: summary.filtered_out,
                excluded: summary.excluded,
            });
        }

        let names = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        let dataset = Dataset::new(names, features, labels)?;
        info!(
            kept = summary.kept,
            filtered_out = summary.filtered_out,
            wins = dataset.count(Outcome::Win),
            losses = dataset.count(Outcome::Loss),
            "dataset built"
        );
        Ok((dataset, summary))
    }

    /// Clean and derive features without filtering on mode, map, or outcome.
    ///
    /// Records with a missing feature value are skipped and counted.
    #[instrument(skip_all, fields(n_records = records.len()))]
    pub fn extract_unlabeled(&self, records: &[Record]) -> UnlabeledRows {
        let mut rows = UnlabeledRows {
            row_indices: Vec::new(),
            features: Vec::new(),
            summary: ExtractionSummary {
                total: records.len(),
                ..ExtractionSummary::default()
            },
        };
        for (row_index, record) in records.iter().enumerate() {
            match feature_vector(record) {
                Ok(v) => {
                    rows.row_indices.push(row_index);
                    rows.features.push(v);
                }
                Err(e) => {
                    debug!(row_index, error = %e, "record skipped");
                    rows.summary.excluded += 1;
                }
            }
        }
        rows.summary.kept = rows.features.len();
        if rows.summary.excluded > 0 {
            warn!(excluded = rows.summary.excluded, "rows skipped for missing values");
        }
        rows
    }
}
