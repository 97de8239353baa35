//! # ml-workflows
//!
//! Train a preprocessor and a model together, then predict on new data with
//! exactly the preprocessing learned at training time.
//!
//! ## Core Design Principles
//!
//! - **Fitted/unfitted split**: preprocessors mold into blueprints, model specs
//!   fit into predictable models. Fitted halves carry no training logic.
//! - **Trait-object seams**: a workflow only sees [`blueprint::Forgeable`] and
//!   [`model::Predictable`], so any preprocessor or model plugs in without
//!   type inspection.
//! - **Errors, not panics**: every operation returns a `Result`; collaborator
//!   errors reach the caller with their original message.
//!
//! ## Quick Start
//!
//! ```rust
//! use ml_workflows::blueprint::{NormalizeStep, Recipe, Selector};
//! use ml_workflows::model::LinearRegression;
//! use ml_workflows::table::{Column, Table};
//! use ml_workflows::workflow::{PredictRequest, Workflow};
//!
//! let train = Table::new(vec![
//!     Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
//!     Column::numeric("y", vec![2.1, 3.9, 6.2, 7.8, 10.1]),
//! ])?;
//!
//! let wf = Workflow::new()
//!     .add_recipe(Recipe::new(["y"]).step(NormalizeStep::new(Selector::AllNumericPredictors)))?
//!     .add_model(LinearRegression::new())?
//!     .fit(&train)?;
//!
//! let preds = wf.predict(&train, &PredictRequest::new().with_outcomes(true))?;
//! assert_eq!(preds.names(), vec![".pred", "y"]);
//! assert_eq!(preds.n_rows(), 5);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Structure
//!
//! - `table`: named numeric / text columns
//! - `blueprint`: preprocessors (variables, formula, recipe) and their fitted blueprints
//! - `model`: model specs, fitted models and prediction arguments
//! - `workflow`: the workflow container, `fit` and `predict`
//! - `serialization`: saving and loading fitted parameters
//! - `error`: error types for every layer

/// Column-oriented data tables.
pub mod table;

/// Preprocessors and the blueprints they mold into.
pub mod blueprint;

/// Model specifications and fitted models.
pub mod model;

/// Workflow container, fitting and prediction.
pub mod workflow;

/// Persistence of fitted parameters.
pub mod serialization;

pub mod error;

pub use error::{BlueprintError, ModelError, SerializationError, TableError, WorkflowError};
pub use model::{Mode, PredictArgs, PredictionType};
pub use table::{Column, Table};
pub use workflow::{PredictRequest, Workflow};
