//! Binary logistic regression.
//!
//! Trained by full-batch gradient descent on the mean binary cross-entropy
//! with logits, plus an optional L2 penalty. Predictors are standardized
//! internally during training and the coefficients are mapped back to the
//! original scale, so the fitted model works on raw predictor values.
//!
//! The outcome must be a text column with exactly two levels. Levels are
//! sorted and the second one is the modelled event.

use super::{
    check_features, predictor_matrix, prob_output, require_complete, single_outcome, Mode,
    ModelSpec, PredictArgs, Predictable, PredictionType,
};
use crate::error::{ModelError, SerializationError};
use crate::serialization::Persistable;
use crate::table::{Column, Table};
use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};

const MODEL_NAME: &str = "logistic regression";
const SUPPORTED: &[PredictionType] = &[
    PredictionType::Class,
    PredictionType::Prob,
    PredictionType::Raw,
];
const DEFAULT_THRESHOLD: f64 = 0.5;

/// Configuration for [`LogisticRegression`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionConfig {
    /// Step size of each gradient descent update.
    pub learning_rate: f64,
    /// Upper bound on the number of full passes over the data.
    pub max_epochs: usize,
    /// L2 penalty on the (standardized) weights.
    pub penalty: f64,
    /// Stop once the loss improves by less than this between epochs.
    pub tolerance: f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            max_epochs: 2000,
            penalty: 0.0,
            tolerance: 1e-10,
        }
    }
}

/// Logistic regression model specification (unfitted).
#[derive(Clone, Debug, Default)]
pub struct LogisticRegression {
    config: LogisticRegressionConfig,
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LogisticRegressionConfig) -> Self {
        Self { config }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.config.learning_rate = learning_rate;
        self
    }

    pub fn with_max_epochs(mut self, max_epochs: usize) -> Self {
        self.config.max_epochs = max_epochs;
        self
    }

    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.config.penalty = penalty;
        self
    }

    pub fn config(&self) -> &LogisticRegressionConfig {
        &self.config
    }

    /// Fit and return the concrete fitted type.
    pub fn fit_logistic(
        &self,
        predictors: &Table,
        outcomes: &Table,
    ) -> Result<FittedLogisticRegression, ModelError> {
        let config = &self.config;
        if config.learning_rate <= 0.0 || config.penalty < 0.0 {
            return Err(ModelError::InvalidOption {
                name: "learning_rate/penalty".to_string(),
                reason: format!(
                    "learning_rate must be positive and penalty non-negative, got {} and {}",
                    config.learning_rate, config.penalty
                ),
            });
        }

        let outcome = single_outcome(outcomes)?;
        let labels = outcome.data().as_text().ok_or_else(|| {
            ModelError::OutcomeShape("logistic regression needs a text outcome".to_string())
        })?;
        let levels = outcome.data().levels();
        if levels.len() != 2 {
            return Err(ModelError::OutcomeShape(format!(
                "logistic regression needs exactly two outcome levels, got {}",
                levels.len()
            )));
        }

        require_complete(predictors)?;
        let x = predictor_matrix(predictors)?;
        let (n, p) = x.dim();
        if n == 0 {
            return Err(ModelError::EmptyData(
                "cannot fit logistic regression on zero rows".to_string(),
            ));
        }
        let y: Array1<f64> = labels
            .iter()
            .map(|l| if *l == levels[1] { 1.0 } else { 0.0 })
            .collect();

        let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(p));
        let std = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 0.0 { s } else { 1.0 });
        let z = (&x - &mean) / &std;

        let mut weights = Array1::<f64>::zeros(p);
        let mut bias = 0.0;
        let mut prev_loss = f64::INFINITY;
        let n_f = n as f64;

        for epoch in 0..config.max_epochs {
            let logits = z.dot(&weights) + bias;
            let loss = bce_with_logits(&logits, &y)
                + 0.5 * config.penalty * weights.dot(&weights);

            // d/dz BCE = sigmoid(z) - t
            let residual = logits.mapv(sigmoid) - &y;
            let grad_w = z.t().dot(&residual) / n_f + &weights * config.penalty;
            let grad_b = residual.sum() / n_f;

            weights = weights - grad_w * config.learning_rate;
            bias -= config.learning_rate * grad_b;

            tracing::trace!(epoch, loss, "logistic regression epoch");
            if (prev_loss - loss).abs() < config.tolerance {
                tracing::debug!(epoch, loss, "logistic regression converged");
                break;
            }
            prev_loss = loss;
        }

        // Undo the standardization: w_j / s_j and b - sum(w_j * m_j / s_j).
        let raw_weights = &weights / &std;
        let intercept = bias - raw_weights.dot(&mean);

        tracing::debug!(rows = n, features = p, "fitted logistic regression");

        Ok(FittedLogisticRegression {
            feature_names: predictors.names().into_iter().map(String::from).collect(),
            levels,
            weights: raw_weights.to_vec(),
            intercept,
        })
    }
}

impl ModelSpec for LogisticRegression {
    fn mode(&self) -> Mode {
        Mode::Classification
    }

    fn fit(
        &self,
        predictors: &Table,
        outcomes: &Table,
    ) -> Result<Box<dyn Predictable>, ModelError> {
        Ok(Box::new(self.fit_logistic(predictors, outcomes)?))
    }
}

/// Trained binary logistic regression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedLogisticRegression {
    feature_names: Vec<String>,
    /// `[reference, event]`
    levels: Vec<String>,
    weights: Vec<f64>,
    intercept: f64,
}

impl FittedLogisticRegression {
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    fn logits(&self, predictors: &Table) -> Result<Array1<f64>, ModelError> {
        check_features(self.weights.len(), predictors.n_cols())?;
        let x = predictor_matrix(predictors)?;
        Ok(x.dot(&Array1::from(self.weights.clone())) + self.intercept)
    }

    fn threshold(args: &PredictArgs) -> Result<f64, ModelError> {
        let threshold = args.opt_f64("threshold")?.unwrap_or(DEFAULT_THRESHOLD);
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(ModelError::InvalidOption {
                name: "threshold".to_string(),
                reason: format!("must be in (0, 1), got {}", threshold),
            });
        }
        Ok(threshold)
    }
}

impl Predictable for FittedLogisticRegression {
    fn mode(&self) -> Mode {
        Mode::Classification
    }

    fn predict(&self, predictors: &Table, args: &PredictArgs) -> Result<Table, ModelError> {
        let kind = args.resolve_type(Mode::Classification, MODEL_NAME, SUPPORTED)?;
        let logits = self.logits(predictors)?;
        match kind {
            PredictionType::Raw => Ok(Table::new(vec![Column::numeric(
                ".pred_raw",
                logits.to_vec(),
            )])?),
            PredictionType::Prob => {
                let event: Vec<f64> = logits.iter().map(|&z| sigmoid(z)).collect();
                let reference: Vec<f64> = event.iter().map(|p| 1.0 - p).collect();
                prob_output(&self.levels, vec![reference, event])
            }
            _ => {
                let threshold = Self::threshold(args)?;
                let classes = logits.iter().map(|&z| {
                    let idx = usize::from(sigmoid(z) >= threshold);
                    self.levels[idx].clone()
                });
                Ok(Table::new(vec![Column::text(".pred_class", classes)])?)
            }
        }
    }
}

impl Persistable for FittedLogisticRegression {
    type Params = FittedLogisticRegression;

    fn extract_params(&self) -> Self::Params {
        self.clone()
    }

    fn from_params(params: Self::Params) -> Result<Self, SerializationError> {
        if params.levels.len() != 2 {
            return Err(SerializationError::InvalidParams(format!(
                "expected two levels, got {}",
                params.levels.len()
            )));
        }
        if params.weights.len() != params.feature_names.len() {
            return Err(SerializationError::InvalidParams(format!(
                "{} weights for {} features",
                params.weights.len(),
                params.feature_names.len()
            )));
        }
        Ok(params)
    }
}

/// Numerically stable sigmoid.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let ez = z.exp();
        ez / (1.0 + ez)
    }
}

/// Mean BCE with logits: `max(z, 0) - z * t + ln(1 + exp(-|z|))`.
fn bce_with_logits(logits: &Array1<f64>, targets: &Array1<f64>) -> f64 {
    let n = logits.len().max(1) as f64;
    logits
        .iter()
        .zip(targets)
        .map(|(&z, &t)| z.max(0.0) - z * t + (-z.abs()).exp().ln_1p())
        .sum::<f64>()
        / n
}
