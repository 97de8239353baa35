//! Error types for every layer of a workflow.
//!
//! Each collaborator owns its own error enum. [`WorkflowError`] wraps them
//! transparently so that a failure raised while forging or predicting reaches
//! the caller with its original message intact.

use crate::model::PredictionType;

/// Errors raised while building or combining [`Table`](crate::table::Table)s.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("column `{name}` has {got} rows, expected {expected}")]
    InconsistentRows {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("duplicate column name `{0}`")]
    DuplicateColumn(String),

    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("cannot bind columns: left table has {left} rows, right table has {right}")]
    RowCountMismatch { left: usize, right: usize },

    #[error("column `{0}` is not numeric")]
    NotNumeric(String),
}

/// Errors raised while molding (fitting) or forging (applying) a blueprint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BlueprintError {
    #[error("empty data: {0}")]
    EmptyData(String),

    #[error("column `{0}` has missing values; impute or drop them before fitting")]
    MissingValues(String),

    #[error("the following required columns are missing: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("column `{column}` should be {expected}, found {got}")]
    KindMismatch {
        column: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("novel levels found in column `{column}`: {}", .levels.join(", "))]
    NovelLevels { column: String, levels: Vec<String> },

    #[error("invalid column roles: {0}")]
    Roles(String),

    #[error("invalid formula `{formula}`: {reason}")]
    Formula { formula: String, reason: String },

    #[error("step `{step}` failed: {reason}")]
    Step { step: &'static str, reason: String },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Errors raised by model specs while fitting and by fitted models while predicting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error(
        "prediction type `{kind}` is not available for {model}; supported types: {}",
        join_kinds(.supported)
    )]
    UnsupportedType {
        kind: PredictionType,
        model: &'static str,
        supported: Vec<PredictionType>,
    },

    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("feature mismatch: expected {expected} predictors, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("predictor column `{0}` is not numeric")]
    NonNumericPredictor(String),

    #[error("invalid outcome: {0}")]
    OutcomeShape(String),

    #[error("empty data: {0}")]
    EmptyData(String),

    #[error("column `{0}` has missing values; impute them before fitting")]
    MissingValues(String),

    #[error("normal equations are singular; predictors may be collinear")]
    Singular,

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Errors returned by [`Workflow`](crate::workflow::Workflow) operations.
///
/// [`WorkflowError::Untrained`] is the only variant `predict` raises itself;
/// everything else is passed through from the collaborator that failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkflowError {
    #[error("workflow has not yet been trained; call `fit()` first")]
    Untrained,

    #[error(
        "workflow has no preprocessor; add one with `add_formula()`, `add_recipe()` or `add_variables()`"
    )]
    MissingPreprocessor,

    #[error("workflow has no model; add one with `add_model()`")]
    MissingModel,

    #[error("a {0} preprocessor has already been added to this workflow")]
    PreprocessorExists(&'static str),

    #[error("a model has already been added to this workflow")]
    ModelExists,

    #[error(transparent)]
    Blueprint(#[from] BlueprintError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Errors raised while saving or loading fitted parameters.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

fn join_kinds(kinds: &[PredictionType]) -> String {
    kinds
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
