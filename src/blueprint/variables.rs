//! Columns selected by name, passed through unchanged.

use super::{check_roles, forge_outcomes, require_rows, validate};
use super::{Forgeable, Forged, Molded, Preprocessor, Schema};
use crate::error::{BlueprintError, SerializationError};
use crate::serialization::Persistable;
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// Preprocessor naming outcome and predictor columns directly.
///
/// When no predictors are given, every non-outcome column of the training
/// data is a predictor, in table order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variables {
    outcomes: Vec<String>,
    predictors: Option<Vec<String>>,
}

impl Variables {
    pub fn new<S: Into<String>>(outcomes: impl IntoIterator<Item = S>) -> Self {
        Self {
            outcomes: outcomes.into_iter().map(Into::into).collect(),
            predictors: None,
        }
    }

    /// Restrict predictors to the named columns.
    pub fn with_predictors<S: Into<String>>(mut self, predictors: impl IntoIterator<Item = S>) -> Self {
        self.predictors = Some(predictors.into_iter().map(Into::into).collect());
        self
    }

    pub fn outcome_names(&self) -> &[String] {
        &self.outcomes
    }

    /// Learn the concrete blueprint from training data.
    pub fn fit_blueprint(&self, data: &Table) -> Result<XyBlueprint, BlueprintError> {
        require_rows(data, "variables")?;
        let predictors: Vec<String> = match &self.predictors {
            Some(names) => names.clone(),
            None => data
                .names()
                .into_iter()
                .filter(|n| !self.outcomes.iter().any(|o| o == n))
                .map(str::to_string)
                .collect(),
        };
        check_roles(&self.outcomes, &predictors)?;

        Ok(XyBlueprint {
            predictors: Schema::capture(data, &predictors)?,
            outcomes: Schema::capture(data, &self.outcomes)?,
        })
    }
}

impl Preprocessor for Variables {
    fn kind(&self) -> &'static str {
        "variables"
    }

    fn mold(&self, data: &Table) -> Result<Molded, BlueprintError> {
        let blueprint = self.fit_blueprint(data)?;
        tracing::debug!(
            n_predictors = blueprint.predictors.len(),
            n_outcomes = blueprint.outcomes.len(),
            "molded variables preprocessor"
        );
        Ok(Molded {
            predictors: data.select(&blueprint.predictors.names())?,
            outcomes: data.select(&self.outcomes)?,
            blueprint: Box::new(blueprint),
        })
    }
}

/// Fitted [`Variables`] preprocessor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XyBlueprint {
    predictors: Schema,
    outcomes: Schema,
}

impl Forgeable for XyBlueprint {
    fn kind(&self) -> &'static str {
        "variables"
    }

    fn predictors(&self) -> &Schema {
        &self.predictors
    }

    fn outcomes(&self) -> &Schema {
        &self.outcomes
    }

    fn forge(&self, new_data: &Table, outcomes: bool) -> Result<Forged, BlueprintError> {
        validate(new_data, &self.predictors, outcomes.then_some(&self.outcomes))?;
        Ok(Forged {
            predictors: new_data.select(&self.predictors.names())?,
            outcomes: forge_outcomes(new_data, &self.outcomes, outcomes)?,
        })
    }
}

impl Persistable for XyBlueprint {
    type Params = XyBlueprint;

    fn extract_params(&self) -> Self::Params {
        self.clone()
    }

    fn from_params(params: Self::Params) -> Result<Self, SerializationError> {
        let outcomes: Vec<String> = params.outcomes.names().iter().map(|s| s.to_string()).collect();
        let predictors: Vec<String> = params
            .predictors
            .names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        check_roles(&outcomes, &predictors)
            .map_err(|e| SerializationError::InvalidParams(e.to_string()))?;
        Ok(params)
    }
}
