use std::fmt;
use std::str::FromStr;

use crate::error::TreeError;

/// Number of outcome classes. The label space is fixed to `[loss, win]`.
pub const N_CLASSES: usize = 2;

/// Match outcome label.
///
/// Ordering follows the fixed class order `[Loss, Win]`, which is also the
/// row/column order of the confusion matrix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The player's team lost the match.
    Loss,
    /// The player's team won the match.
    Win,
}

impl Outcome {
    /// Both outcomes in class-index order.
    pub const ALL: [Outcome; N_CLASSES] = [Outcome::Loss, Outcome::Win];

    /// Return the zero-based class index (`loss` = 0, `win` = 1).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Outcome::Loss => 0,
            Outcome::Win => 1,
        }
    }

    /// Return the outcome for a class index, if it is in range.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Return the lowercase label text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Loss => "loss",
            Outcome::Win => "win",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for text that is not exactly `win` or `loss`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized outcome label \"{0}\"")]
pub struct ParseOutcomeError(pub String);

impl FromStr for Outcome {
    type Err = ParseOutcomeError;

    /// Parse a label. Matching is case-sensitive: only `win` and `loss` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loss" => Ok(Outcome::Loss),
            "win" => Ok(Outcome::Win),
            other => Err(ParseOutcomeError(other.to_string())),
        }
    }
}

/// Per-class sample weights used by the splitting criterion and leaf majority.
///
/// Defaults to `loss = 1.0`, `win = 2.0`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClassWeights {
    loss: f64,
    win: f64,
}

impl ClassWeights {
    /// Create a weight pair.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidClassWeight`] if either weight is not
    /// finite or not strictly positive.
    pub fn new(loss: f64, win: f64) -> Result<Self, TreeError> {
        for (class, weight) in [("loss", loss), ("win", win)] {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(TreeError::InvalidClassWeight { class, weight });
            }
        }
        Ok(Self { loss, win })
    }

    /// Return the weight for `outcome`.
    #[must_use]
    pub fn weight(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Loss => self.loss,
            Outcome::Win => self.win,
        }
    }

    /// Return the weights in class-index order.
    #[must_use]
    pub fn as_array(&self) -> [f64; N_CLASSES] {
        [self.loss, self.win]
    }
}

impl Default for ClassWeights {
    fn default() -> Self {
        Self { loss: 1.0, win: 2.0 }
    }
}
