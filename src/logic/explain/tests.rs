//! Explanations against the fixture model

use crate::logic::error::PipelineError;
use crate::logic::features::{derive_features, FeatureRow, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::logic::model::testing::fixture_handle;
use crate::logic::model::Classifier;
use crate::logic::record::{NormalizedRow, RawRecord, RecordNormalizer};
use super::{Explainer, ImportanceType, TreeShapExplainer};

fn sample_features() -> FeatureRow {
    let normalized = RecordNormalizer::default().normalize(&RawRecord::sample()).unwrap();
    derive_features(&normalized.row)
}

#[test]
fn test_fixture_margin() {
    let handle = fixture_handle();
    // base score 0.5 is margin 0; trees give -0.1, -0.05 and 0.25
    let margin = handle.predict_margin(&sample_features()).unwrap();
    assert!((margin - 0.1).abs() < 1e-6);
}

#[test]
fn test_attributions_reconstruct_margin() {
    let handle = fixture_handle();
    let row = sample_features();
    let explanation = TreeShapExplainer::default().explain(&handle, &row).unwrap();

    assert_eq!(explanation.attributions.len(), FEATURE_COUNT);
    for (attribution, name) in explanation.attributions.iter().zip(FEATURE_LAYOUT) {
        assert_eq!(attribution.name, *name);
    }

    let margin = handle.predict_margin(&row).unwrap();
    assert!((explanation.reconstructed_margin() - margin).abs() < 1e-9);
    assert!((explanation.margin - margin).abs() < 1e-12);
}

#[test]
fn test_reconstruction_holds_across_rows() {
    let handle = fixture_handle();
    let explainer = TreeShapExplainer::default();

    let rows = [
        NormalizedRow::default(),
        NormalizedRow {
            limit_bal: 200000.0,
            age: 22.0,
            pay_status: [3.0, 2.0, 2.0, 0.0, -1.0, -2.0],
            bill_amt: [90000.0, 80000.0, 60000.0, 30000.0, 1000.0, 0.0],
            pay_amt: [0.0; 6],
            ..Default::default()
        },
    ];

    for normalized in rows {
        let row = derive_features(&normalized);
        let explanation = explainer.explain(&handle, &row).unwrap();
        let margin = handle.predict_margin(&row).unwrap();
        assert!((explanation.reconstructed_margin() - margin).abs() < 1e-9);
    }
}

#[test]
fn test_unused_features_get_zero() {
    let handle = fixture_handle();
    let explanation = TreeShapExplainer::default().explain(&handle, &sample_features()).unwrap();

    let sex = explanation.attributions.iter().find(|a| a.name == "SEX").unwrap();
    assert_eq!(sex.contribution, 0.0);

    let top = explanation.top_contributors(3);
    assert_eq!(top.len(), 3);
    assert!(top[0].contribution.abs() >= top[1].contribution.abs());
}

#[test]
fn test_explain_rejects_wrong_shape() {
    let handle = fixture_handle();
    let mut row = sample_features();
    row.values.push(0.0);

    assert!(matches!(
        TreeShapExplainer::default().explain(&handle, &row),
        Err(PipelineError::Explanation(_))
    ));
}

#[test]
fn test_explain_does_not_change_predictions() {
    let handle = fixture_handle();
    let row = sample_features();
    let before = handle.predict_proba(&row).unwrap();
    TreeShapExplainer::default().explain(&handle, &row).unwrap();
    assert_eq!(handle.predict_proba(&row).unwrap(), before);
}

#[test]
fn test_global_importance_fixture() {
    let handle = fixture_handle();
    let importance = TreeShapExplainer::new(ImportanceType::Gain).global_importance(&handle);

    assert_eq!(importance.scores.len(), FEATURE_COUNT);
    // PAY_0: gains 40 and 3 over two splits -> highest mean gain
    assert_eq!(importance.ranked()[0].feature, "PAY_0");
    assert_eq!(importance.get("SEX"), Some(0.0));
    let total: f64 = importance.scores.iter().map(|s| s.score).sum();
    assert!((total - 1.0).abs() < 1e-9);
}
