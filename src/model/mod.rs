//! Model specifications and fitted models.
//!
//! Two traits split the lifecycle the same way fitted and unfitted
//! transformers are split in [`blueprint`](crate::blueprint):
//!
//! - [`ModelSpec`]: hyperparameters only; trains on molded predictors and
//!   outcomes and returns a fitted model.
//! - [`Predictable`]: a trained model. Free of training hyperparameters; it
//!   only knows how to turn a predictor table into a prediction table.
//!
//! Prediction output columns follow one naming scheme across all models:
//!
//! | type      | columns                        |
//! |-----------|--------------------------------|
//! | `numeric` | `.pred`                        |
//! | `class`   | `.pred_class`                  |
//! | `prob`    | `.pred_{level}` for each level |
//! | `raw`     | `.pred_raw`                    |

pub mod linear;
pub mod logistic;
pub mod null;

pub use linear::{FittedLinearRegression, LinearRegression, LinearRegressionConfig};
pub use logistic::{FittedLogisticRegression, LogisticRegression, LogisticRegressionConfig};
pub use null::{FittedNullModel, NullModel};

use crate::error::{ModelError, TableError};
use crate::table::{Column, ColumnData, Table};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Extra named arguments forwarded verbatim to a model's predict routine.
pub type Opts = BTreeMap<String, serde_json::Value>;

/// What a model is trained to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Regression,
    Classification,
}

impl Mode {
    /// Prediction type used when the caller does not ask for one.
    pub fn default_prediction_type(self) -> PredictionType {
        match self {
            Mode::Regression => PredictionType::Numeric,
            Mode::Classification => PredictionType::Class,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Regression => f.write_str("regression"),
            Mode::Classification => f.write_str("classification"),
        }
    }
}

/// Flavor of prediction requested from a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionType {
    /// Numeric estimate (regression).
    Numeric,
    /// Hard class label (classification).
    Class,
    /// Class probabilities (classification).
    Prob,
    /// Confidence interval around the mean estimate.
    ConfInt,
    /// Prediction interval for new observations.
    PredInt,
    /// Model-specific raw output, e.g. a linear predictor.
    Raw,
}

impl PredictionType {
    pub fn as_str(self) -> &'static str {
        match self {
            PredictionType::Numeric => "numeric",
            PredictionType::Class => "class",
            PredictionType::Prob => "prob",
            PredictionType::ConfInt => "conf_int",
            PredictionType::PredInt => "pred_int",
            PredictionType::Raw => "raw",
        }
    }
}

impl fmt::Display for PredictionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredictionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "numeric" => Ok(PredictionType::Numeric),
            "class" => Ok(PredictionType::Class),
            "prob" => Ok(PredictionType::Prob),
            "conf_int" => Ok(PredictionType::ConfInt),
            "pred_int" => Ok(PredictionType::PredInt),
            "raw" => Ok(PredictionType::Raw),
            other => Err(format!("unknown prediction type `{}`", other)),
        }
    }
}

/// Arguments handed to [`Predictable::predict`].
///
/// Nothing here is interpreted by the workflow; each model decides what the
/// prediction type, `opts` and `extra` mean for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictArgs {
    /// Requested prediction type; `None` means the model's default for its mode.
    pub kind: Option<PredictionType>,
    /// Options for the underlying predict routine.
    pub opts: Opts,
    /// Open-ended passthrough arguments.
    pub extra: Opts,
}

impl PredictArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, kind: PredictionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_opt(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.opts.insert(name.into(), value.into());
        self
    }

    pub fn with_extra(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Resolve the requested type against what a model supports.
    ///
    /// # Errors
    /// [`ModelError::UnsupportedType`] if the resolved type is not in `supported`.
    pub fn resolve_type(
        &self,
        mode: Mode,
        model: &'static str,
        supported: &[PredictionType],
    ) -> Result<PredictionType, ModelError> {
        let kind = self.kind.unwrap_or_else(|| mode.default_prediction_type());
        if supported.contains(&kind) {
            Ok(kind)
        } else {
            Err(ModelError::UnsupportedType {
                kind,
                model,
                supported: supported.to_vec(),
            })
        }
    }

    /// Read a numeric entry from `opts`.
    pub fn opt_f64(&self, name: &str) -> Result<Option<f64>, ModelError> {
        match self.opts.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| ModelError::InvalidOption {
                    name: name.to_string(),
                    reason: format!("expected a number, got {}", value),
                }),
        }
    }
}

/// Unfitted model: hyperparameters plus a training routine.
pub trait ModelSpec: fmt::Debug + Send + Sync {
    fn mode(&self) -> Mode;

    /// Train on molded predictors and outcomes.
    fn fit(&self, predictors: &Table, outcomes: &Table)
        -> Result<Box<dyn Predictable>, ModelError>;
}

/// A trained model exposing one generic predict entry point.
pub trait Predictable: fmt::Debug + Send + Sync {
    fn mode(&self) -> Mode;

    /// Produce one output row per predictor row.
    fn predict(&self, predictors: &Table, args: &PredictArgs) -> Result<Table, ModelError>;
}

/// Predictors as a matrix, rejecting text columns.
pub(crate) fn predictor_matrix(predictors: &Table) -> Result<Array2<f64>, ModelError> {
    predictors.to_matrix().map_err(|e| match e {
        TableError::NotNumeric(name) => ModelError::NonNumericPredictor(name),
        other => ModelError::Table(other),
    })
}

/// Reject numeric columns holding `NaN` or infinite values.
pub(crate) fn require_complete(table: &Table) -> Result<(), ModelError> {
    let incomplete = table.columns().iter().find(|c| {
        c.data()
            .as_numeric()
            .is_some_and(|values| values.iter().any(|v| !v.is_finite()))
    });
    match incomplete {
        Some(column) => Err(ModelError::MissingValues(column.name().to_string())),
        None => Ok(()),
    }
}

/// The single outcome column models in this crate are trained on.
pub(crate) fn single_outcome(outcomes: &Table) -> Result<&Column, ModelError> {
    match outcomes.columns() {
        [column] => Ok(column),
        cols => Err(ModelError::OutcomeShape(format!(
            "expected exactly one outcome column, got {}",
            cols.len()
        ))),
    }
}

pub(crate) fn check_features(expected: usize, got: usize) -> Result<(), ModelError> {
    if expected != got {
        return Err(ModelError::FeatureMismatch { expected, got });
    }
    Ok(())
}

/// Prediction table with a single numeric column.
pub(crate) fn numeric_output(name: &str, values: Vec<f64>) -> Result<Table, ModelError> {
    Ok(Table::new(vec![Column::numeric(name, values)])?)
}

/// Prediction table with one `.pred_{level}` column per level.
pub(crate) fn prob_output(levels: &[String], probs: Vec<Vec<f64>>) -> Result<Table, ModelError> {
    let columns = levels
        .iter()
        .zip(probs)
        .map(|(level, p)| Column::new(format!(".pred_{}", level), ColumnData::Numeric(p)))
        .collect();
    Ok(Table::new(columns)?)
}
