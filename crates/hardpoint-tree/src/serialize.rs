//! Model persistence via bincode.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::TreeError;
use crate::tree::DecisionTree;

/// Current binary format version.
const FORMAT_VERSION: u32 = 1;

/// Versioned envelope for the serialized model.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope {
    format_version: u32,
    /// Number of features the model was trained on.
    n_features: usize,
    /// Feature column names, in the order `predict` expects them.
    feature_names: Vec<String>,
    tree: DecisionTree,
}

impl ModelEnvelope {
    /// Check that the header matches the tree and every split is addressable.
    fn validate(&self) -> Result<(), String> {
        let tree = &self.tree;
        if self.n_features != tree.n_features() || self.feature_names != tree.feature_names {
            return Err(format!(
                "header lists {} features {:?}, tree has {:?}",
                self.n_features, self.feature_names, tree.feature_names
            ));
        }
        if tree.importances.len() != self.n_features {
            return Err(format!(
                "{} importances for {} features",
                tree.importances.len(),
                self.n_features
            ));
        }
        let mut out_of_range = None;
        tree.root.for_each_split(&mut |feature, _| {
            if feature.index() >= self.n_features {
                out_of_range.get_or_insert(feature);
            }
        });
        match out_of_range {
            Some(feature) => Err(format!(
                "split on feature {feature} but the model has {} features",
                self.n_features
            )),
            None => Ok(()),
        }
    }
}

impl DecisionTree {
    /// Save the model to a binary file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::SerializeModel`] | bincode encoding failed |
    /// | [`TreeError::WriteModel`] | file write failed |
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TreeError> {
        let path = path.as_ref();

        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            n_features: self.n_features(),
            feature_names: self.feature_names.clone(),
            tree: self.clone(),
        };

        let bytes =
            bincode::serialize(&envelope).map_err(|e| TreeError::SerializeModel { source: e })?;

        std::fs::write(path, &bytes).map_err(|e| TreeError::WriteModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            size_bytes = bytes.len(),
            n_nodes = self.n_nodes(),
            "model saved"
        );

        Ok(())
    }

    /// Load a model from a binary file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::ReadModel`] | file read failed |
    /// | [`TreeError::DeserializeModel`] | bincode decoding failed |
    /// | [`TreeError::IncompatibleModelVersion`] | format version mismatch |
    /// | [`TreeError::CorruptModel`] | header disagrees with the tree, or a split references a missing feature |
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|e| TreeError::ReadModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        let envelope: ModelEnvelope =
            bincode::deserialize(&bytes).map_err(|e| TreeError::DeserializeModel {
                path: path.to_path_buf(),
                source: e,
            })?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(TreeError::IncompatibleModelVersion {
                expected: FORMAT_VERSION,
                found: envelope.format_version,
                path: path.to_path_buf(),
            });
        }

        envelope.validate().map_err(|reason| TreeError::CorruptModel {
            path: path.to_path_buf(),
            reason,
        })?;

        debug!(
            n_features = envelope.n_features,
            features = ?envelope.feature_names,
            depth = envelope.tree.depth(),
            "model loaded"
        );

        Ok(envelope.tree)
    }
}
