//! Preprocessors and the blueprints they produce.
//!
//! A [`Preprocessor`] is the unfitted half: it knows which columns play
//! which role and what transformations to learn. Molding it on training
//! data yields a [`Molded`] result carrying the processed training
//! predictors and outcomes plus a [`Forgeable`] blueprint, the fitted half,
//! which replays the same processing on new data.
//!
//! Three preprocessors are provided:
//!
//! - [`Variables`]: columns by name, passed through unchanged.
//! - [`Formula`]: `y ~ a + b + a:b` with dummy encoding and interactions.
//! - [`Recipe`]: an ordered list of steps (impute, normalize, range, dummy).
//!
//! # Forging contract
//!
//! [`Forgeable::forge`] validates `new_data` against the schema captured at
//! mold time before touching any values:
//!
//! - every required column present, otherwise
//!   [`BlueprintError::MissingColumns`] listing all absent names;
//! - every column of the recorded kind ([`BlueprintError::KindMismatch`]);
//! - no text values outside the training levels ([`BlueprintError::NovelLevels`]).
//!
//! Outcome columns are required only when outcomes are requested.

pub mod formula;
pub mod recipe;
pub mod schema;
pub mod variables;

pub use formula::{Formula, FormulaBlueprint};
pub use recipe::{
    DummyStep, ImputeStep, ImputeStrategy, NormalizeStep, PreparedStep, RangeStep, Recipe,
    RecipeBlueprint, RecipeStep, Selector,
};
pub use schema::{ColumnSchema, Schema};
pub use variables::{Variables, XyBlueprint};

use crate::error::BlueprintError;
use crate::table::Table;
use std::fmt;

/// Processed data produced by forging a blueprint on new data.
#[derive(Debug, Clone, PartialEq)]
pub struct Forged {
    pub predictors: Table,
    /// Present only when outcomes were requested.
    pub outcomes: Option<Table>,
}

/// Result of molding a preprocessor on training data.
#[derive(Debug)]
pub struct Molded {
    pub predictors: Table,
    pub outcomes: Table,
    pub blueprint: Box<dyn Forgeable>,
}

/// Unfitted preprocessor.
pub trait Preprocessor: fmt::Debug + Send + Sync {
    /// Short name used in logs and error messages, e.g. `"formula"`.
    fn kind(&self) -> &'static str;

    /// Learn the blueprint from training data.
    fn mold(&self, data: &Table) -> Result<Molded, BlueprintError>;
}

/// Fitted preprocessor that can be replayed on new data.
pub trait Forgeable: fmt::Debug + Send + Sync {
    fn kind(&self) -> &'static str;

    /// Raw predictor columns expected in new data.
    fn predictors(&self) -> &Schema;

    /// Raw outcome columns expected when outcomes are requested.
    fn outcomes(&self) -> &Schema;

    /// Process `new_data` the way the training data was processed.
    ///
    /// Row count and row order are preserved.
    fn forge(&self, new_data: &Table, outcomes: bool) -> Result<Forged, BlueprintError>;
}

/// Reject training data without rows.
pub(crate) fn require_rows(data: &Table, what: &str) -> Result<(), BlueprintError> {
    if data.n_rows() == 0 {
        return Err(BlueprintError::EmptyData(format!(
            "cannot mold a {} preprocessor on zero rows",
            what
        )));
    }
    Ok(())
}

/// Check `new_data` against the predictor schema, and the outcome schema when
/// `outcomes` is set, reporting every missing column at once.
pub(crate) fn validate(
    new_data: &Table,
    predictors: &Schema,
    outcomes: Option<&Schema>,
) -> Result<(), BlueprintError> {
    let mut required = predictors.names();
    if let Some(schema) = outcomes {
        required.extend(schema.names());
    }
    let missing = new_data.missing(&required);
    if !missing.is_empty() {
        return Err(BlueprintError::MissingColumns(missing));
    }
    predictors.check(new_data)?;
    if let Some(schema) = outcomes {
        schema.check(new_data)?;
    }
    Ok(())
}

/// Outcome columns from `new_data` in schema order, if requested.
pub(crate) fn forge_outcomes(
    new_data: &Table,
    schema: &Schema,
    outcomes: bool,
) -> Result<Option<Table>, BlueprintError> {
    if !outcomes {
        return Ok(None);
    }
    Ok(Some(new_data.select(&schema.names())?))
}

/// Outcome names must be given, unique, and disjoint from the predictors.
pub(crate) fn check_roles(outcomes: &[String], predictors: &[String]) -> Result<(), BlueprintError> {
    if outcomes.is_empty() {
        return Err(BlueprintError::Roles(
            "at least one outcome column is required".to_string(),
        ));
    }
    for (i, name) in outcomes.iter().enumerate() {
        if outcomes[..i].contains(name) {
            return Err(BlueprintError::Roles(format!(
                "outcome `{}` is listed twice",
                name
            )));
        }
        if predictors.contains(name) {
            return Err(BlueprintError::Roles(format!(
                "`{}` cannot be both an outcome and a predictor",
                name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_validate_lists_predictor_and_outcome_gaps() {
        let train = Table::new(vec![
            Column::numeric("x", vec![1.0]),
            Column::numeric("z", vec![1.0]),
            Column::numeric("y", vec![1.0]),
        ])
        .unwrap();
        let predictors = Schema::capture(&train, &["x", "z"]).unwrap();
        let outcomes = Schema::capture(&train, &["y"]).unwrap();
        let new = Table::new(vec![Column::numeric("x", vec![2.0])]).unwrap();

        assert_eq!(
            validate(&new, &predictors, None),
            Err(BlueprintError::MissingColumns(vec!["z".into()]))
        );
        assert_eq!(
            validate(&new, &predictors, Some(&outcomes)),
            Err(BlueprintError::MissingColumns(vec!["z".into(), "y".into()]))
        );
    }

    #[test]
    fn test_check_roles() {
        let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(check_roles(&names(&["y"]), &names(&["x"])).is_ok());
        assert!(check_roles(&[], &names(&["x"])).is_err());
        assert!(check_roles(&names(&["y", "y"]), &[]).is_err());
        assert!(check_roles(&names(&["y"]), &names(&["y"])).is_err());
    }
}
