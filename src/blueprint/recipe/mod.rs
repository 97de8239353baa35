//! Recipes: ordered preprocessing steps learned on training predictors.
//!
//! Each [`RecipeStep`] is prepped (fitted) on the output of the step before
//! it, producing a [`PreparedStep`] that bakes (applies) the learned
//! transformation. Steps only ever see predictor columns; outcomes pass
//! through untouched.
//!
//! # Example
//!
//! ```rust
//! use ml_workflows::blueprint::{DummyStep, ImputeStep, NormalizeStep, Recipe, Selector};
//!
//! let recipe = Recipe::new(["y"])
//!     .step(ImputeStep::mean(Selector::AllNumericPredictors))
//!     .step(DummyStep::new(Selector::AllTextPredictors))
//!     .step(NormalizeStep::new(Selector::AllNumericPredictors));
//!
//! assert_eq!(recipe.n_steps(), 3);
//! ```

mod dummy;
mod impute;
mod normalize;
mod range;

pub use dummy::{DummyStep, PreparedDummy};
pub use impute::{ImputeStep, ImputeStrategy, PreparedImpute};
pub use normalize::{NormalizeStep, PreparedNormalize};
pub use range::{PreparedRange, RangeStep};

use super::{check_roles, forge_outcomes, require_rows, validate};
use super::{Forgeable, Forged, Molded, Preprocessor, Schema};
use crate::error::BlueprintError;
use crate::table::{ColumnKind, Table};
use std::fmt;

/// Unfitted recipe step.
pub trait RecipeStep: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Learn the step's parameters from the current predictors.
    fn prep(&self, data: &Table) -> Result<Box<dyn PreparedStep>, BlueprintError>;
}

/// Fitted recipe step.
pub trait PreparedStep: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Apply the learned transformation. Row count is preserved.
    fn bake(&self, data: Table) -> Result<Table, BlueprintError>;
}

/// Which predictor columns a step applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    AllNumericPredictors,
    AllTextPredictors,
    Columns(Vec<String>),
}

impl Selector {
    pub fn columns<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Selector::Columns(names.into_iter().map(Into::into).collect())
    }

    /// Resolve to column names of `data`, in table order for the kind
    /// selectors and in the given order for [`Selector::Columns`].
    pub fn resolve(&self, data: &Table) -> Result<Vec<String>, BlueprintError> {
        let of_kind = |kind: ColumnKind| -> Vec<String> {
            data.columns()
                .iter()
                .filter(|c| c.kind() == kind)
                .map(|c| c.name().to_string())
                .collect()
        };
        match self {
            Selector::AllNumericPredictors => Ok(of_kind(ColumnKind::Numeric)),
            Selector::AllTextPredictors => Ok(of_kind(ColumnKind::Text)),
            Selector::Columns(names) => {
                let missing = data.missing(names);
                if !missing.is_empty() {
                    return Err(BlueprintError::MissingColumns(missing));
                }
                Ok(names.clone())
            }
        }
    }
}

/// Numeric values of a selected column, or a step error naming it.
pub(crate) fn numeric_column<'a>(
    data: &'a Table,
    name: &str,
    step: &'static str,
) -> Result<&'a [f64], BlueprintError> {
    let column = data
        .column(name)
        .ok_or_else(|| BlueprintError::MissingColumns(vec![name.to_string()]))?;
    column.data().as_numeric().ok_or_else(|| BlueprintError::Step {
        step,
        reason: format!("column `{}` is not numeric", name),
    })
}

/// Non-missing values of a column.
pub(crate) fn observed(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

/// Preprocessor made of an outcome list and ordered steps.
#[derive(Debug, Default)]
pub struct Recipe {
    outcomes: Vec<String>,
    steps: Vec<Box<dyn RecipeStep>>,
}

impl Recipe {
    /// A recipe with the given outcomes; every other column is a predictor.
    pub fn new<S: Into<String>>(outcomes: impl IntoIterator<Item = S>) -> Self {
        Self {
            outcomes: outcomes.into_iter().map(Into::into).collect(),
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn step<T: RecipeStep + 'static>(mut self, step: T) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn n_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn outcome_names(&self) -> &[String] {
        &self.outcomes
    }
}

impl Preprocessor for Recipe {
    fn kind(&self) -> &'static str {
        "recipe"
    }

    fn mold(&self, data: &Table) -> Result<Molded, BlueprintError> {
        require_rows(data, self.kind())?;
        let predictor_names: Vec<String> = data
            .names()
            .into_iter()
            .filter(|n| !self.outcomes.iter().any(|o| o == n))
            .map(str::to_string)
            .collect();
        check_roles(&self.outcomes, &predictor_names)?;

        let predictors = Schema::capture(data, &predictor_names)?;
        let outcomes = Schema::capture(data, &self.outcomes)?;

        let mut current = data.select(&predictor_names)?;
        let mut prepared = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let fitted = step.prep(&current)?;
            current = fitted.bake(current)?;
            tracing::trace!(
                step = step.name(),
                n_columns = current.n_cols(),
                "prepped recipe step"
            );
            prepared.push(fitted);
        }
        tracing::debug!(
            n_steps = prepared.len(),
            n_columns = current.n_cols(),
            "molded recipe preprocessor"
        );

        Ok(Molded {
            predictors: current,
            outcomes: data.select(&self.outcomes)?,
            blueprint: Box::new(RecipeBlueprint {
                predictors,
                outcomes,
                steps: prepared,
            }),
        })
    }
}

/// Fitted [`Recipe`].
#[derive(Debug)]
pub struct RecipeBlueprint {
    predictors: Schema,
    outcomes: Schema,
    steps: Vec<Box<dyn PreparedStep>>,
}

impl RecipeBlueprint {
    pub fn steps(&self) -> &[Box<dyn PreparedStep>] {
        &self.steps
    }
}

impl Forgeable for RecipeBlueprint {
    fn kind(&self) -> &'static str {
        "recipe"
    }

    fn predictors(&self) -> &Schema {
        &self.predictors
    }

    fn outcomes(&self) -> &Schema {
        &self.outcomes
    }

    fn forge(&self, new_data: &Table, outcomes: bool) -> Result<Forged, BlueprintError> {
        validate(new_data, &self.predictors, outcomes.then_some(&self.outcomes))?;
        let mut current = new_data.select(&self.predictors.names())?;
        for step in &self.steps {
            current = step.bake(current)?;
        }
        Ok(Forged {
            predictors: current,
            outcomes: forge_outcomes(new_data, &self.outcomes, outcomes)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use approx::assert_abs_diff_eq;

    fn data() -> Table {
        Table::new(vec![
            Column::numeric("x", vec![1.0, f64::NAN, 3.0, 4.0]),
            Column::text("g", ["a", "b", "a", "c"]),
            Column::numeric("y", vec![10.0, 20.0, 30.0, 40.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_selector_resolve() {
        let t = data();
        assert_eq!(
            Selector::AllNumericPredictors.resolve(&t).unwrap(),
            vec!["x", "y"]
        );
        assert_eq!(Selector::AllTextPredictors.resolve(&t).unwrap(), vec!["g"]);
        assert!(matches!(
            Selector::columns(["x", "nope"]).resolve(&t),
            Err(BlueprintError::MissingColumns(_))
        ));
    }

    #[test]
    fn test_steps_chain_and_outcomes_untouched() {
        let recipe = Recipe::new(["y"])
            .step(ImputeStep::mean(Selector::AllNumericPredictors))
            .step(DummyStep::new(Selector::AllTextPredictors));
        let molded = recipe.mold(&data()).unwrap();

        assert_eq!(molded.predictors.names(), vec!["x", "g_b", "g_c"]);
        let x = molded.predictors.numeric("x").unwrap();
        assert_abs_diff_eq!(x[1], 8.0 / 3.0, epsilon = 1e-12);
        assert_eq!(
            molded.outcomes.numeric("y"),
            Some(&[10.0, 20.0, 30.0, 40.0][..])
        );
    }

    #[test]
    fn test_forge_replays_training_statistics() {
        let recipe = Recipe::new(["y"]).step(ImputeStep::mean(Selector::columns(["x"])));
        let molded = recipe.mold(&data()).unwrap();

        let new = Table::new(vec![
            Column::numeric("x", vec![f64::NAN]),
            Column::text("g", ["b"]),
        ])
        .unwrap();
        let forged = molded.blueprint.forge(&new, false).unwrap();
        assert_abs_diff_eq!(forged.predictors.numeric("x").unwrap()[0], 8.0 / 3.0, epsilon = 1e-12);
        assert_eq!(forged.predictors.names(), vec!["x", "g"]);
    }

    #[test]
    fn test_missing_outcome_column() {
        let result = Recipe::new(["nope"]).mold(&data());
        assert_eq!(
            result.unwrap_err(),
            BlueprintError::MissingColumns(vec!["nope".into()])
        );
    }
}
