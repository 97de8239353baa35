//! Null model: ignores the predictors.
//!
//! Regression predicts the training mean; classification predicts the most
//! frequent training level and the observed level frequencies. Useful as a
//! baseline and for workflows whose preprocessor yields no predictors.

use super::{
    numeric_output, prob_output, single_outcome, Mode, ModelSpec, PredictArgs, Predictable,
    PredictionType,
};
use crate::error::ModelError;
use crate::table::{Column, ColumnData, Table};

const MODEL_NAME: &str = "null model";

/// Null model specification.
#[derive(Clone, Copy, Debug)]
pub struct NullModel {
    mode: Mode,
}

impl NullModel {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn regression() -> Self {
        Self::new(Mode::Regression)
    }

    pub fn classification() -> Self {
        Self::new(Mode::Classification)
    }
}

impl ModelSpec for NullModel {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn fit(
        &self,
        _predictors: &Table,
        outcomes: &Table,
    ) -> Result<Box<dyn Predictable>, ModelError> {
        let outcome = single_outcome(outcomes)?;
        if outcome.is_empty() {
            return Err(ModelError::EmptyData(
                "cannot fit a null model on zero rows".to_string(),
            ));
        }
        let fitted = match (self.mode, outcome.data()) {
            (Mode::Regression, ColumnData::Numeric(values)) => {
                let observed: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
                if observed.is_empty() {
                    return Err(ModelError::EmptyData(
                        "outcome has no observed values".to_string(),
                    ));
                }
                FittedNullModel::Regression {
                    mean: observed.iter().sum::<f64>() / observed.len() as f64,
                }
            }
            (Mode::Classification, ColumnData::Text(labels)) => {
                let levels = outcome.data().levels();
                let total = labels.len() as f64;
                let probs = levels
                    .iter()
                    .map(|level| labels.iter().filter(|l| *l == level).count() as f64 / total)
                    .collect();
                FittedNullModel::Classification { levels, probs }
            }
            (mode, data) => {
                return Err(ModelError::OutcomeShape(format!(
                    "a {} null model cannot use a {} outcome",
                    mode,
                    data.kind()
                )))
            }
        };
        Ok(Box::new(fitted))
    }
}

/// Trained null model.
#[derive(Clone, Debug, PartialEq)]
pub enum FittedNullModel {
    Regression { mean: f64 },
    Classification { levels: Vec<String>, probs: Vec<f64> },
}

impl Predictable for FittedNullModel {
    fn mode(&self) -> Mode {
        match self {
            FittedNullModel::Regression { .. } => Mode::Regression,
            FittedNullModel::Classification { .. } => Mode::Classification,
        }
    }

    fn predict(&self, predictors: &Table, args: &PredictArgs) -> Result<Table, ModelError> {
        let n = predictors.n_rows();
        match self {
            FittedNullModel::Regression { mean } => {
                args.resolve_type(Mode::Regression, MODEL_NAME, &[PredictionType::Numeric])?;
                numeric_output(".pred", vec![*mean; n])
            }
            FittedNullModel::Classification { levels, probs } => {
                let kind = args.resolve_type(
                    Mode::Classification,
                    MODEL_NAME,
                    &[PredictionType::Class, PredictionType::Prob],
                )?;
                if kind == PredictionType::Prob {
                    return prob_output(levels, probs.iter().map(|&p| vec![p; n]).collect());
                }
                // Ties go to the first level in sorted order.
                let mut best = 0;
                for (i, p) in probs.iter().enumerate() {
                    if *p > probs[best] {
                        best = i;
                    }
                }
                let majority = &levels[best];
                Ok(Table::new(vec![Column::text(
                    ".pred_class",
                    std::iter::repeat(majority.as_str()).take(n),
                )])?)
            }
        }
    }
}
