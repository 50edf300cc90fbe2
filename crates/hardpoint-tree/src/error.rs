use std::path::PathBuf;

/// Errors from dataset handling, tree training, prediction, and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Returned when a dataset or training set has zero samples.
    #[error("dataset has zero samples")]
    EmptyDataset,

    /// Returned when the dataset has zero feature columns.
    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when the maximum depth is negative.
    #[error("max_depth must be non-negative, got {max_depth}")]
    InvalidDepth {
        /// The invalid max_depth value provided.
        max_depth: i64,
    },

    /// Returned when a class weight is not a positive finite number.
    #[error("class weight for {class} must be positive and finite, got {weight}")]
    InvalidClassWeight {
        /// Name of the class whose weight is invalid.
        class: &'static str,
        /// The invalid weight.
        weight: f64,
    },

    /// Returned when the holdout fraction is not in (0.0, 1.0).
    #[error("test fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidTestFraction {
        /// The invalid fraction provided.
        fraction: f64,
    },

    /// Returned when a holdout split would leave the train or test side empty.
    #[error("cannot hold out {n_test} of {n_samples} samples: both subsets must be non-empty")]
    InsufficientSamples {
        /// Total number of samples in the dataset.
        n_samples: usize,
        /// Number of samples the holdout would assign to the test side.
        n_test: usize,
    },

    /// Returned when a depth sweep is requested with no candidate depths.
    #[error("depth sweep requires at least one candidate depth")]
    EmptyDepthGrid,

    /// Returned when a sample has a different number of features than the dataset header.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when a dataset value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when a prediction input has a different dimensionality than the model.
    #[error("prediction input has {got} features, model expects {expected}")]
    DimensionMismatch {
        /// The number of features the model was trained on.
        expected: usize,
        /// The number of features in the prediction input.
        got: usize,
    },

    /// Returned when two parallel sequences differ in length.
    #[error("sequence length mismatch: {predicted} predictions vs {actual} true labels")]
    LengthMismatch {
        /// Length of the predicted (or feature) sequence.
        predicted: usize,
        /// Length of the ground-truth label sequence.
        actual: usize,
    },

    /// Returned when evaluation receives zero labels.
    #[error("evaluation requires at least one label")]
    EmptyInput,

    /// Returned when model serialization fails.
    #[error("failed to serialize model")]
    SerializeModel {
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when model deserialization fails.
    #[error("failed to deserialize model from {path}")]
    DeserializeModel {
        /// Path to the model file that could not be deserialized.
        path: PathBuf,
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when writing the model file fails.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading the model file fails.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a model file decodes but its contents are inconsistent.
    #[error("inconsistent model in {path}: {reason}")]
    CorruptModel {
        /// Path to the model file.
        path: PathBuf,
        /// Which consistency check failed.
        reason: String,
    },

    /// Returned when loading a model with an incompatible format version.
    #[error("incompatible model version in {path}: expected {expected}, found {found}")]
    IncompatibleModelVersion {
        /// The model format version this build expects.
        expected: u32,
        /// The model format version found in the file.
        found: u32,
        /// Path to the model file with the incompatible version.
        path: PathBuf,
    },
}
