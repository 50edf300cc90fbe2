//! File I/O, feature engineering, and serialization for the hardpoint pipeline.

mod domain;
mod error;
mod features;
mod reader;
mod writer;

pub use domain::{ExperimentName, RawValue, Record};
pub use error::IoError;
pub use features::{
    DEFAULT_MAPS, DEFAULT_MODE, ExtractionSummary, FEATURE_NAMES, FeatureExtractor,
    GAME_TYPE_FIELD, MAP_FIELD, OUTCOME_FIELD, RecordFilter, STAT_FIELDS, UnlabeledRows,
    clean_value, feature_vector,
};
pub use reader::RecordReader;
pub use writer::{DASHBOARD_REPORT, ResultWriter};
