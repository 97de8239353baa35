use ml_workflows::blueprint::{Formula, FormulaBlueprint, Variables, XyBlueprint};
use ml_workflows::model::{
    FittedLinearRegression, FittedLogisticRegression, LinearRegression, LogisticRegression,
    PredictionType,
};
use ml_workflows::serialization::Persistable;
use ml_workflows::table::{Column, Table};
use ml_workflows::{PredictRequest, SerializationError, Workflow};

fn housing() -> Table {
    Table::new(vec![
        Column::numeric("area", vec![50.0, 65.0, 80.0, 95.0, 120.0, 140.0]),
        Column::text("city", ["lyon", "paris", "lyon", "nice", "paris", "nice"]),
        Column::numeric("price", vec![150.0, 240.0, 230.0, 260.0, 400.0, 380.0]),
    ])
    .unwrap()
}

#[test]
fn test_saved_formula_workflow_predicts_identically() {
    let formula = Formula::parse("price ~ area + city").unwrap();
    let trained = Workflow::new()
        .add_formula(formula.clone())
        .unwrap()
        .add_model(LinearRegression::new())
        .unwrap()
        .fit(&housing())
        .unwrap();

    // Fit the same pieces by hand so their concrete types can be saved.
    let blueprint = formula.fit_blueprint(&housing()).unwrap();
    let model = {
        use ml_workflows::blueprint::Forgeable;
        let forged = blueprint.forge(&housing(), true).unwrap();
        LinearRegression::new()
            .fit_linear(&forged.predictors, &forged.outcomes.unwrap())
            .unwrap()
    };

    let dir = tempfile::tempdir().unwrap();
    let bp_path = dir.path().join("blueprint.bin");
    let model_path = dir.path().join("model.bin");
    blueprint.save_to_file(&bp_path).unwrap();
    model.save_to_file(&model_path).unwrap();

    let restored = Workflow::from_fitted(
        Box::new(FormulaBlueprint::load_from_file(&bp_path).unwrap()),
        Box::new(FittedLinearRegression::load_from_file(&model_path).unwrap()),
    );

    let new = Table::new(vec![
        Column::numeric("area", vec![70.0, 110.0]),
        Column::text("city", ["nice", "lyon"]),
    ])
    .unwrap();
    let request = PredictRequest::new();
    assert_eq!(
        restored.predict(&new, &request).unwrap(),
        trained.predict(&new, &request).unwrap()
    );
}

#[test]
fn test_saved_classifier_keeps_levels() {
    let train = Table::new(vec![
        Column::numeric("dose", vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]),
        Column::text("response", ["none", "none", "cured", "none", "cured", "cured"]),
    ])
    .unwrap();
    let blueprint = Variables::new(["response"]).fit_blueprint(&train).unwrap();
    let model = LogisticRegression::new()
        .fit_logistic(
            &train.select(&["dose"]).unwrap(),
            &train.select(&["response"]).unwrap(),
        )
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    blueprint.save_to_file(dir.path().join("bp")).unwrap();
    model.save_to_file(dir.path().join("model")).unwrap();

    let loaded_model = FittedLogisticRegression::load_from_file(dir.path().join("model")).unwrap();
    assert_eq!(loaded_model, model);
    assert_eq!(loaded_model.levels(), &["cured", "none"]);

    let wf = Workflow::from_fitted(
        Box::new(XyBlueprint::load_from_file(dir.path().join("bp")).unwrap()),
        Box::new(loaded_model),
    );
    let probs = wf
        .predict(
            &train,
            &PredictRequest::new()
                .with_type(PredictionType::Prob)
                .with_outcomes(true),
        )
        .unwrap();
    assert_eq!(probs.names(), vec![".pred_cured", ".pred_none", "response"]);
    assert_eq!(probs.n_rows(), 6);
}

#[test]
fn test_corrupt_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.bin");
    std::fs::write(&path, [1u8, 2, 3]).unwrap();
    assert!(matches!(
        FittedLinearRegression::load_from_file(&path),
        Err(SerializationError::Encoding(_))
    ));
}

#[test]
fn test_inconsistent_params_rejected() {
    let bad = FittedLinearRegression::new(vec!["a".into()], vec![1.0, 2.0], 0.0);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.bin");
    bad.save_to_file(&path).unwrap();
    assert!(matches!(
        FittedLinearRegression::load_from_file(&path),
        Err(SerializationError::InvalidParams(_))
    ));
}
