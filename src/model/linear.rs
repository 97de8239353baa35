//! Least-squares linear regression.
//!
//! [`LinearRegression`] holds hyperparameters only. Fitting solves the
//! (optionally ridge-penalised) normal equations in closed form and yields a
//! [`FittedLinearRegression`] carrying nothing but coefficients:
//!
//! ```text
//! y = w^T x + b
//! ```
//!
//! When the predictors already carry a formula's
//! [`(Intercept)`](crate::blueprint::formula::INTERCEPT) column, that column
//! is the intercept: no second ones column is added and it is not penalised.

use super::{
    check_features, numeric_output, predictor_matrix, require_complete, single_outcome, Mode, ModelSpec,
    PredictArgs, Predictable, PredictionType,
};
use crate::blueprint::formula::INTERCEPT;
use crate::error::{ModelError, SerializationError};
use crate::serialization::Persistable;
use crate::table::Table;
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};

const MODEL_NAME: &str = "linear regression";
const SUPPORTED: &[PredictionType] = &[PredictionType::Numeric, PredictionType::Raw];
const PIVOT_EPS: f64 = 1e-12;

/// Configuration for [`LinearRegression`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressionConfig {
    /// L2 penalty on the weights. The intercept is never penalised.
    pub penalty: f64,
    /// Estimate an intercept term.
    pub fit_intercept: bool,
}

impl Default for LinearRegressionConfig {
    fn default() -> Self {
        Self {
            penalty: 0.0,
            fit_intercept: true,
        }
    }
}

/// Linear regression model specification (unfitted).
#[derive(Clone, Debug, Default)]
pub struct LinearRegression {
    config: LinearRegressionConfig,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LinearRegressionConfig) -> Self {
        Self { config }
    }

    /// Set the ridge penalty.
    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.config.penalty = penalty;
        self
    }

    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.config.fit_intercept = fit_intercept;
        self
    }

    pub fn config(&self) -> &LinearRegressionConfig {
        &self.config
    }

    /// Fit and return the concrete fitted type.
    pub fn fit_linear(
        &self,
        predictors: &Table,
        outcomes: &Table,
    ) -> Result<FittedLinearRegression, ModelError> {
        if self.config.penalty < 0.0 {
            return Err(ModelError::InvalidOption {
                name: "penalty".to_string(),
                reason: format!("must be non-negative, got {}", self.config.penalty),
            });
        }
        require_complete(predictors)?;
        require_complete(outcomes)?;
        let x = predictor_matrix(predictors)?;
        let y = single_outcome(outcomes)?
            .data()
            .as_numeric()
            .map(|v| Array1::from(v.to_vec()))
            .ok_or_else(|| {
                ModelError::OutcomeShape("linear regression needs a numeric outcome".to_string())
            })?;
        let (n, p) = x.dim();
        if n == 0 {
            return Err(ModelError::EmptyData(
                "cannot fit linear regression on zero rows".to_string(),
            ));
        }

        let names = predictors.names();
        let intercept_column = names.iter().position(|name| *name == INTERCEPT);
        let fit_intercept = self.config.fit_intercept && intercept_column.is_none();

        // Design matrix with a leading column of ones when fitting an intercept.
        let offset = usize::from(fit_intercept);
        let mut design = Array2::<f64>::ones((n, p + offset));
        design.slice_mut(s![.., offset..]).assign(&x);

        let mut gram = design.t().dot(&design);
        for j in offset..p + offset {
            if Some(j - offset) != intercept_column {
                gram[[j, j]] += self.config.penalty;
            }
        }
        let rhs = design.t().dot(&y);
        let beta = solve(gram, rhs)?;

        let intercept = if fit_intercept { beta[0] } else { 0.0 };
        let weights = beta.iter().skip(offset).copied().collect();

        tracing::debug!(
            rows = n,
            features = p,
            penalty = self.config.penalty,
            "fitted linear regression"
        );

        Ok(FittedLinearRegression {
            feature_names: names.into_iter().map(String::from).collect(),
            weights,
            intercept,
        })
    }
}

impl ModelSpec for LinearRegression {
    fn mode(&self) -> Mode {
        Mode::Regression
    }

    fn fit(
        &self,
        predictors: &Table,
        outcomes: &Table,
    ) -> Result<Box<dyn Predictable>, ModelError> {
        Ok(Box::new(self.fit_linear(predictors, outcomes)?))
    }
}

/// Trained linear regression: weights and intercept only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedLinearRegression {
    feature_names: Vec<String>,
    weights: Vec<f64>,
    intercept: f64,
}

impl FittedLinearRegression {
    /// Build a fitted model from known coefficients.
    pub fn new(feature_names: Vec<String>, weights: Vec<f64>, intercept: f64) -> Self {
        Self {
            feature_names,
            weights,
            intercept,
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn linear_predictor(&self, predictors: &Table) -> Result<Vec<f64>, ModelError> {
        check_features(self.weights.len(), predictors.n_cols())?;
        let x = predictor_matrix(predictors)?;
        let w = Array1::from(self.weights.clone());
        Ok((x.dot(&w) + self.intercept).to_vec())
    }
}

impl Predictable for FittedLinearRegression {
    fn mode(&self) -> Mode {
        Mode::Regression
    }

    fn predict(&self, predictors: &Table, args: &PredictArgs) -> Result<Table, ModelError> {
        let kind = args.resolve_type(Mode::Regression, MODEL_NAME, SUPPORTED)?;
        let values = self.linear_predictor(predictors)?;
        match kind {
            PredictionType::Raw => numeric_output(".pred_raw", values),
            _ => numeric_output(".pred", values),
        }
    }
}

impl Persistable for FittedLinearRegression {
    type Params = FittedLinearRegression;

    fn extract_params(&self) -> Self::Params {
        self.clone()
    }

    fn from_params(params: Self::Params) -> Result<Self, SerializationError> {
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

/// Solve `a x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>, ModelError> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        if a[[pivot, col]].abs() < PIVOT_EPS {
            return Err(ModelError::Singular);
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }
        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Ok(x)
}
