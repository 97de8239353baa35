use super::Workflow;
use crate::error::WorkflowError;
use crate::model::{PredictArgs, PredictionType};
use crate::table::Table;

/// Arguments for [`Workflow::predict`].
///
/// `args` reach the fitted model untouched. `outcomes` asks the blueprint to
/// also process the outcome columns of the new data and append them to the
/// predictions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictRequest {
    pub args: PredictArgs,
    pub outcomes: bool,
}

impl PredictRequest {
    /// Model-default prediction type, no options, no outcomes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, kind: PredictionType) -> Self {
        self.args = self.args.with_type(kind);
        self
    }

    pub fn with_opt(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.args = self.args.with_opt(name, value);
        self
    }

    pub fn with_extra(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.args = self.args.with_extra(name, value);
        self
    }

    pub fn with_outcomes(mut self, outcomes: bool) -> Self {
        self.outcomes = outcomes;
        self
    }
}

impl From<PredictArgs> for PredictRequest {
    fn from(args: PredictArgs) -> Self {
        Self {
            args,
            outcomes: false,
        }
    }
}

impl Workflow {
    /// Predict on new data with the fitted blueprint and model.
    ///
    /// The new data is forged with the blueprint learned at fit time, the
    /// resulting predictors go to the fitted model's predict routine, and,
    /// when `request.outcomes` is set, the forged outcome columns are bound
    /// after the prediction columns. The output has one row per row of
    /// `new_data`, in the same order.
    ///
    /// # Errors
    /// - [`WorkflowError::Untrained`] if the workflow has not been fitted.
    ///   This is the only check made here.
    /// - Forge errors (missing columns, kind mismatches, novel levels) and
    ///   model errors (unsupported type, invalid options) unchanged.
    /// - [`WorkflowError::Table`] if the predictions and outcomes cannot be
    ///   bound (row count mismatch or a shared column name).
    pub fn predict(
        &self,
        new_data: &Table,
        request: &PredictRequest,
    ) -> Result<Table, WorkflowError> {
        let fit = self.fit.as_ref().ok_or(WorkflowError::Untrained)?;

        let forged = fit.blueprint().forge(new_data, request.outcomes)?;
        let predictions = fit.model().predict(&forged.predictors, &request.args)?;
        tracing::debug!(
            n_rows = new_data.n_rows(),
            kind = ?request.args.kind,
            outcomes = request.outcomes,
            n_columns = predictions.n_cols(),
            "predicted from workflow"
        );

        match forged.outcomes {
            Some(outcomes) if request.outcomes => Ok(predictions.bind_cols(outcomes)?),
            _ => Ok(predictions),
        }
    }
}
