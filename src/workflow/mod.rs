//! Workflows: a preprocessor and a model trained and applied as one unit.
//!
//! A [`Workflow`] starts empty and untrained. Add a preprocessor and a model
//! spec, call [`Workflow::fit`], then [`Workflow::predict`] on new data:
//!
//! ```rust
//! use ml_workflows::blueprint::Formula;
//! use ml_workflows::model::LinearRegression;
//! use ml_workflows::table::{Column, Table};
//! use ml_workflows::workflow::{PredictRequest, Workflow};
//!
//! let train = Table::new(vec![
//!     Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0]),
//!     Column::numeric("y", vec![3.0, 5.0, 7.0, 9.0]),
//! ])?;
//!
//! let wf = Workflow::new()
//!     .add_formula(Formula::parse("y ~ x")?)?
//!     .add_model(LinearRegression::new())?
//!     .fit(&train)?;
//!
//! let new = Table::new(vec![Column::numeric("x", vec![10.0])])?;
//! let preds = wf.predict(&new, &PredictRequest::new())?;
//! assert!((preds.numeric(".pred").unwrap()[0] - 21.0).abs() < 1e-9);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The fitted blueprint and fitted model are stored together and only ever
//! produced together, so a trained workflow can never pair a blueprint with a
//! model fitted on different data. Any change to the preprocessor or model
//! discards the fit.

mod fit;
mod predict;

pub use predict::PredictRequest;

use crate::blueprint::{Forgeable, Formula, Preprocessor, Recipe, Variables};
use crate::error::WorkflowError;
use crate::model::{ModelSpec, Predictable};

/// The products of training: fitted blueprint plus fitted model.
#[derive(Debug)]
pub struct WorkflowFit {
    blueprint: Box<dyn Forgeable>,
    model: Box<dyn Predictable>,
}

impl WorkflowFit {
    pub fn new(blueprint: Box<dyn Forgeable>, model: Box<dyn Predictable>) -> Self {
        Self { blueprint, model }
    }

    pub fn blueprint(&self) -> &dyn Forgeable {
        self.blueprint.as_ref()
    }

    pub fn model(&self) -> &dyn Predictable {
        self.model.as_ref()
    }
}

/// A preprocessor, a model spec, and, once trained, their fitted counterparts.
#[derive(Debug, Default)]
pub struct Workflow {
    preprocessor: Option<Box<dyn Preprocessor>>,
    spec: Option<Box<dyn ModelSpec>>,
    fit: Option<WorkflowFit>,
}

impl Workflow {
    /// An empty, untrained workflow.
    pub fn new() -> Self {
        Self::default()
    }

    /// A trained workflow from a blueprint and model fitted elsewhere,
    /// e.g. loaded from disk.
    ///
    /// The workflow has no preprocessor or model spec, so it can predict
    /// but not be refitted until both are added.
    pub fn from_fitted(blueprint: Box<dyn Forgeable>, model: Box<dyn Predictable>) -> Self {
        Self {
            preprocessor: None,
            spec: None,
            fit: Some(WorkflowFit::new(blueprint, model)),
        }
    }

    /// Whether the workflow holds a fitted blueprint and model.
    pub fn is_trained(&self) -> bool {
        self.fit.is_some()
    }

    pub fn add_formula(self, formula: Formula) -> Result<Self, WorkflowError> {
        self.add_preprocessor(formula)
    }

    pub fn add_variables(self, variables: Variables) -> Result<Self, WorkflowError> {
        self.add_preprocessor(variables)
    }

    pub fn add_recipe(self, recipe: Recipe) -> Result<Self, WorkflowError> {
        self.add_preprocessor(recipe)
    }

    /// Add any preprocessor.
    ///
    /// # Errors
    /// [`WorkflowError::PreprocessorExists`] if one was already added.
    pub fn add_preprocessor<P: Preprocessor + 'static>(
        mut self,
        preprocessor: P,
    ) -> Result<Self, WorkflowError> {
        if let Some(existing) = &self.preprocessor {
            return Err(WorkflowError::PreprocessorExists(existing.kind()));
        }
        self.preprocessor = Some(Box::new(preprocessor));
        self.fit = None;
        Ok(self)
    }

    /// # Errors
    /// [`WorkflowError::ModelExists`] if a model was already added.
    pub fn add_model<M: ModelSpec + 'static>(mut self, spec: M) -> Result<Self, WorkflowError> {
        if self.spec.is_some() {
            return Err(WorkflowError::ModelExists);
        }
        self.spec = Some(Box::new(spec));
        self.fit = None;
        Ok(self)
    }

    /// Replace the preprocessor. The workflow becomes untrained.
    pub fn update_preprocessor<P: Preprocessor + 'static>(mut self, preprocessor: P) -> Self {
        self.preprocessor = Some(Box::new(preprocessor));
        self.fit = None;
        self
    }

    /// Replace the model spec. The workflow becomes untrained.
    pub fn update_model<M: ModelSpec + 'static>(mut self, spec: M) -> Self {
        self.spec = Some(Box::new(spec));
        self.fit = None;
        self
    }

    /// Remove the preprocessor. The workflow becomes untrained.
    pub fn remove_preprocessor(mut self) -> Self {
        if self.preprocessor.take().is_some() {
            tracing::debug!("removed preprocessor; workflow reset to untrained");
        }
        self.fit = None;
        self
    }

    /// Remove the model spec. The workflow becomes untrained.
    pub fn remove_model(mut self) -> Self {
        if self.spec.take().is_some() {
            tracing::debug!("removed model; workflow reset to untrained");
        }
        self.fit = None;
        self
    }

    pub fn extract_preprocessor(&self) -> Result<&dyn Preprocessor, WorkflowError> {
        self.preprocessor
            .as_deref()
            .ok_or(WorkflowError::MissingPreprocessor)
    }

    pub fn extract_spec(&self) -> Result<&dyn ModelSpec, WorkflowError> {
        self.spec.as_deref().ok_or(WorkflowError::MissingModel)
    }

    /// The fitted blueprint.
    ///
    /// # Errors
    /// [`WorkflowError::Untrained`] before `fit`.
    pub fn extract_blueprint(&self) -> Result<&dyn Forgeable, WorkflowError> {
        self.fit
            .as_ref()
            .map(WorkflowFit::blueprint)
            .ok_or(WorkflowError::Untrained)
    }

    /// The fitted model.
    ///
    /// # Errors
    /// [`WorkflowError::Untrained`] before `fit`.
    pub fn extract_fit(&self) -> Result<&dyn Predictable, WorkflowError> {
        self.fit
            .as_ref()
            .map(WorkflowFit::model)
            .ok_or(WorkflowError::Untrained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinearRegression, NullModel};
    use crate::table::{Column, Table};

    fn train() -> Table {
        Table::new(vec![
            Column::numeric("x", vec![1.0, 2.0, 3.0]),
            Column::numeric("y", vec![2.0, 4.0, 6.0]),
        ])
        .unwrap()
    }

    fn trained() -> Workflow {
        Workflow::new()
            .add_variables(Variables::new(["y"]))
            .unwrap()
            .add_model(LinearRegression::new())
            .unwrap()
            .fit(&train())
            .unwrap()
    }

    #[test]
    fn test_new_is_untrained() {
        let wf = Workflow::new();
        assert!(!wf.is_trained());
        assert_eq!(wf.extract_blueprint().unwrap_err(), WorkflowError::Untrained);
        assert_eq!(wf.extract_fit().unwrap_err(), WorkflowError::Untrained);
        assert_eq!(
            wf.extract_preprocessor().unwrap_err(),
            WorkflowError::MissingPreprocessor
        );
        assert_eq!(wf.extract_spec().unwrap_err(), WorkflowError::MissingModel);
    }

    #[test]
    fn test_second_preprocessor_rejected() {
        let result = Workflow::new()
            .add_formula(Formula::parse("y ~ x").unwrap())
            .unwrap()
            .add_recipe(Recipe::new(["y"]));
        assert_eq!(
            result.unwrap_err(),
            WorkflowError::PreprocessorExists("formula")
        );
    }

    #[test]
    fn test_second_model_rejected() {
        let result = Workflow::new()
            .add_model(NullModel::regression())
            .unwrap()
            .add_model(LinearRegression::new());
        assert_eq!(result.unwrap_err(), WorkflowError::ModelExists);
    }

    #[test]
    fn test_updates_reset_training() {
        let wf = trained();
        assert!(wf.is_trained());
        assert_eq!(wf.extract_preprocessor().unwrap().kind(), "variables");

        let wf = wf.update_model(NullModel::regression());
        assert!(!wf.is_trained());

        let wf = wf.fit(&train()).unwrap();
        assert!(wf.is_trained());
        let wf = wf.update_preprocessor(Formula::parse("y ~ x").unwrap());
        assert!(!wf.is_trained());
    }

    #[test]
    fn test_removals_reset_training() {
        let wf = trained().remove_preprocessor();
        assert!(!wf.is_trained());
        assert!(wf.extract_spec().is_ok());

        let wf = trained().remove_model();
        assert!(!wf.is_trained());
        assert_eq!(wf.extract_spec().unwrap_err(), WorkflowError::MissingModel);
    }

    #[test]
    fn test_from_fitted_is_trained() {
        let wf = trained();
        let fit = wf.fit.unwrap();
        let rebuilt = Workflow::from_fitted(fit.blueprint, fit.model);
        assert!(rebuilt.is_trained());
        assert_eq!(rebuilt.extract_blueprint().unwrap().kind(), "variables");
        assert!(rebuilt.extract_preprocessor().is_err());
    }

    #[test]
    fn test_workflow_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Workflow>();
    }
}
