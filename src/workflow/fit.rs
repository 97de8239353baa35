use super::{Workflow, WorkflowFit};
use crate::error::WorkflowError;
use crate::table::Table;

impl Workflow {
    /// Mold the preprocessor on `data`, then fit the model spec on the
    /// molded predictors and outcomes.
    ///
    /// Refitting a trained workflow replaces its previous fit.
    ///
    /// # Errors
    /// - [`WorkflowError::MissingPreprocessor`] / [`WorkflowError::MissingModel`]
    ///   if either half is absent.
    /// - Any mold or fit error, unchanged.
    pub fn fit(mut self, data: &Table) -> Result<Self, WorkflowError> {
        let preprocessor = self
            .preprocessor
            .as_deref()
            .ok_or(WorkflowError::MissingPreprocessor)?;
        let spec = self.spec.as_deref().ok_or(WorkflowError::MissingModel)?;

        let molded = preprocessor.mold(data)?;
        tracing::debug!(
            preprocessor = preprocessor.kind(),
            mode = %spec.mode(),
            n_rows = data.n_rows(),
            n_predictors = molded.predictors.n_cols(),
            "fitting workflow"
        );
        let model = spec.fit(&molded.predictors, &molded.outcomes)?;

        self.fit = Some(WorkflowFit::new(molded.blueprint, model));
        Ok(self)
    }
}
