use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use arrow::array::{Float32Array, Int32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use proptest::prelude::*;
use tempfile::TempDir;

use titanic_dashboard::artifacts::{self, Artifacts};
use titanic_dashboard::classifier::metrics::evaluate;
use titanic_dashboard::classifier::{save_model, Classifier, FeatureRow, GaugeBand, ModelKind, Prediction};
use titanic_dashboard::data::loader::load_file;
use titanic_dashboard::data::model::{
    Dataset, PassengerClass, PassengerFeatures, Port, Sex, FEATURE_COLUMNS,
};
use titanic_dashboard::data::synthetic;
use titanic_dashboard::data::stats::overview;
use titanic_dashboard::error::DashboardError;
use titanic_dashboard::report;

/// Ten passengers, four survivors.
const FIXTURE_CSV: &str = "\
Survived,Pclass,Sex,Age,SibSp,Parch,Fare,Embarked
0,3,0,34.5,0,0,7.8292,1
1,3,1,47.0,1,0,7.0,2
0,2,0,62.0,0,0,9.6875,1
0,3,0,27.0,0,0,8.6625,2
1,3,1,22.0,1,1,12.2875,2
0,3,0,14.0,0,0,9.225,2
1,3,1,30.0,0,0,7.6292,1
0,2,0,26.0,1,1,29.0,2
1,3,1,18.0,0,0,7.2292,0
0,1,0,21.0,2,0,24.15,2
";

fn training_table() -> Dataset {
    Dataset::from_raw(&synthetic::passengers(418, 42)).unwrap()
}

fn logistic() -> &'static Classifier {
    static MODEL: OnceLock<Classifier> = OnceLock::new();
    MODEL.get_or_init(|| Classifier::train(ModelKind::LogisticRegression, &training_table()).unwrap())
}

fn naive_bayes() -> &'static Classifier {
    static MODEL: OnceLock<Classifier> = OnceLock::new();
    MODEL.get_or_init(|| Classifier::train(ModelKind::GaussianNb, &training_table()).unwrap())
}

struct Fixture {
    _dir: TempDir,
    data: PathBuf,
    model: PathBuf,
}

fn fixture(model: &Classifier, model_file: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("tested_cleaned.csv");
    std::fs::write(&data, FIXTURE_CSV).unwrap();
    let model_path = dir.path().join(model_file);
    save_model(&model_path, model).unwrap();
    Fixture {
        _dir: dir,
        data,
        model: model_path,
    }
}

fn harness_inputs() -> Vec<(&'static str, PassengerFeatures)> {
    vec![
        (
            "first class female",
            PassengerFeatures {
                pclass: PassengerClass::First,
                sex: Sex::Female,
                age: 25.0,
                sibsp: 0,
                parch: 0,
                fare: 71.2833,
                embarked: Port::Cherbourg,
            },
        ),
        (
            "third class male",
            PassengerFeatures {
                pclass: PassengerClass::Third,
                sex: Sex::Male,
                age: 22.0,
                sibsp: 1,
                parch: 0,
                fare: 7.25,
                embarked: Port::Queenstown,
            },
        ),
        (
            "second class family",
            PassengerFeatures {
                pclass: PassengerClass::Second,
                sex: Sex::Male,
                age: 38.0,
                sibsp: 1,
                parch: 1,
                fare: 26.0,
                embarked: Port::Southampton,
            },
        ),
    ]
}

#[test]
fn loaded_rows_respect_code_sets() {
    let fx = fixture(logistic(), "model.json");
    let ds = load_file(&fx.data).unwrap();
    assert_eq!(ds.len(), 10);
    for rec in &ds.records {
        assert!((1..=3).contains(&rec.features.pclass.code()));
        assert!(rec.features.embarked.code() <= 2);
        assert!(rec.features.sex.code() <= 1);
    }
}

#[test]
fn survival_rate_of_fixture_is_forty_percent() {
    let fx = fixture(logistic(), "model.json");
    let o = overview(&load_file(&fx.data).unwrap());
    assert_eq!((o.passengers, o.survivors), (10, 4));
    assert!((o.survival_rate - 40.0).abs() < 1e-9);
    assert!((0.0..=100.0).contains(&o.survival_rate));
}

#[test]
fn harness_inputs_produce_bounded_predictions() {
    for model in [logistic(), naive_bayes()] {
        for (name, input) in harness_inputs() {
            let row = input.feature_row();
            let label = model.classify(&row).unwrap();
            let [p0, p1] = model.predict_proba(&row).unwrap();
            assert!(label <= 1, "{name}");
            assert!((0.0..=1.0).contains(&p1), "{name}");
            assert!((p0 + p1 - 1.0).abs() < 1e-6, "{name}");
        }
    }

    // Sex dominates the synthetic survival draw.
    let p_female = logistic()
        .predict(&harness_inputs()[0].1.feature_row())
        .unwrap();
    let p_male = logistic()
        .predict(&harness_inputs()[1].1.feature_row())
        .unwrap();
    assert!(p_female.survived());
    assert!(!p_male.survived());
}

#[test]
fn harness_inputs_without_sex_are_schema_mismatches() {
    let model = logistic();
    for (_, input) in harness_inputs() {
        let mut row = input.feature_row();
        row.remove("Sex");
        match model.predict_proba(&row) {
            Err(DashboardError::SchemaMismatch { missing, .. }) => assert_eq!(missing, vec!["Sex"]),
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }
}

#[test]
fn every_single_missing_column_is_rejected() {
    let model = logistic();
    let full = harness_inputs()[0].1.feature_row();
    for name in FEATURE_COLUMNS {
        let mut row = full.clone();
        row.remove(name);
        assert!(
            matches!(model.classify(&row), Err(DashboardError::SchemaMismatch { .. })),
            "{name}"
        );
    }
    assert!(model.classify(&FeatureRow::default()).is_err());
}

#[test]
fn confusion_matrix_accounts_for_every_row() {
    let fx = fixture(logistic(), "model.json");
    let loaded = Artifacts::load(&fx.data, &fx.model).unwrap();
    let eval = evaluate(&loaded.model, &loaded.dataset).unwrap();
    let m = eval.matrix;
    assert_eq!(m.tn() + m.fp() + m.fn_() + m.tp(), loaded.dataset.len());
    let expected = (m.tp() + m.tn()) as f64 / m.total() as f64;
    assert!((eval.accuracy - expected).abs() < 1e-6);
    assert_eq!(eval.probabilities.len(), 10);
    assert_eq!(eval.report.rows.len(), 5);
    assert_eq!(eval.report.rows[0].support + eval.report.rows[1].support, 10);
}

#[test]
fn non_linear_model_reports_coefficients_as_not_applicable() {
    let fx = fixture(naive_bayes(), "nb.msgpack");
    let loaded = Artifacts::load(&fx.data, &fx.model).unwrap();
    assert!(!loaded.model.exposes_coefficients());
    let text = report::render(&loaded).unwrap();
    assert!(text.contains("not applicable"));
    assert!(text.contains("Survival rate:  40.0%"));
}

#[test]
fn linear_report_lists_coefficients_ascending() {
    let fx = fixture(logistic(), "model.json");
    let loaded = Artifacts::load(&fx.data, &fx.model).unwrap();
    let text = report::render(&loaded).unwrap();
    let weights: Vec<(&str, f64)> = text
        .split("Coefficients:\n")
        .nth(1)
        .unwrap()
        .lines()
        .filter_map(|l| {
            let mut parts = l.split_whitespace();
            Some((parts.next()?, parts.next()?.parse().ok()?))
        })
        .collect();
    assert_eq!(weights.len(), FEATURE_COLUMNS.len());
    assert!(weights.windows(2).all(|w| w[0].1 <= w[1].1));
    assert_eq!(weights.last().unwrap().0, "Sex");
}

#[test]
fn even_odds_are_not_survived_and_low_band() {
    let even = Prediction::from_probabilities([0.5, 0.5]);
    assert_eq!(even.label_text(), "Not Survived");
    assert_eq!(even.gauge_band(), GaugeBand::Low);

    let above = Prediction::from_probabilities([0.4999, 0.5001]);
    assert!(above.survived());
    assert_eq!(above.gauge_band(), GaugeBand::High);
}

#[test]
fn extra_source_columns_count_as_features() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("with_id.csv");
    let mut csv = String::from("PassengerId,");
    for (i, line) in FIXTURE_CSV.lines().enumerate() {
        if i > 0 {
            csv.push_str(&format!("{},", 891 + i));
        }
        csv.push_str(line);
        csv.push('\n');
    }
    std::fs::write(&data, csv).unwrap();

    let ds = load_file(&data).unwrap();
    assert_eq!(ds.len(), 10);
    assert_eq!(overview(&ds).feature_count, 8);
}

#[test]
fn initialisation_is_idempotent() {
    let fx = fixture(logistic(), "model.json");
    let first = artifacts::init(&fx.data, &fx.model).unwrap();
    let second = artifacts::init(Path::new("elsewhere.csv"), Path::new("elsewhere.json")).unwrap();
    assert!(std::ptr::eq(first, second));
    assert!(std::ptr::eq(first, artifacts::get().unwrap()));
    assert!(std::ptr::eq(&first.dataset, &second.dataset));
    assert!(std::ptr::eq(&first.model, &second.model));
}

#[test]
fn missing_artifacts_fail_with_typed_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = Artifacts::load(&dir.path().join("nope.csv"), &dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DashboardError>(),
        Some(DashboardError::FileNotFound(_))
    ));

    let data = dir.path().join("data.csv");
    std::fs::write(&data, FIXTURE_CSV).unwrap();
    let model = dir.path().join("model.json");
    std::fs::write(&model, b"not json").unwrap();
    let err = Artifacts::load(&data, &model).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DashboardError>(),
        Some(DashboardError::Deserialization(_))
    ));
}

#[test]
fn parquet_with_narrow_types_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("passengers.parquet");

    let int = |name: &str| Field::new(name, DataType::Int32, false);
    let float = |name: &str| Field::new(name, DataType::Float32, false);
    let schema = Arc::new(Schema::new(vec![
        int("Survived"),
        int("Pclass"),
        int("Sex"),
        float("Age"),
        int("SibSp"),
        int("Parch"),
        float("Fare"),
        int("Embarked"),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int32Array::from(vec![1, 0])),
            Arc::new(Int32Array::from(vec![1, 3])),
            Arc::new(Int32Array::from(vec![1, 0])),
            Arc::new(Float32Array::from(vec![38.0, 22.0])),
            Arc::new(Int32Array::from(vec![1, 1])),
            Arc::new(Int32Array::from(vec![0, 0])),
            Arc::new(Float32Array::from(vec![71.25, 7.25])),
            Arc::new(Int32Array::from(vec![0, 2])),
        ],
    )
    .unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let ds = load_file(&path).unwrap();
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.records[1].features.pclass, PassengerClass::Third);
    assert_eq!(ds.records[0].features.fare, 71.25);
    assert!(ds.records[0].survived);
}

fn any_passenger() -> impl Strategy<Value = PassengerFeatures> {
    (
        1i64..=3,
        0i64..=1,
        0u8..=80,
        0u32..=10,
        0u32..=10,
        0.0f64..=600.0,
        0i64..=2,
    )
        .prop_map(|(pclass, sex, age, sibsp, parch, fare, embarked)| PassengerFeatures {
            pclass: PassengerClass::from_code(pclass).unwrap(),
            sex: Sex::from_code(sex).unwrap(),
            age: age as f64,
            sibsp,
            parch,
            fare,
            embarked: Port::from_code(embarked).unwrap(),
        })
}

proptest! {
    #[test]
    fn probabilities_sum_to_one(input in any_passenger()) {
        prop_assert!(input.validate().is_ok());
        let row = input.feature_row();
        for model in [logistic(), naive_bayes()] {
            let [p0, p1] = model.predict_proba(&row).unwrap();
            prop_assert!((p0 + p1 - 1.0).abs() < 1e-6);
            prop_assert!((0.0..=1.0).contains(&p1));
            let label = model.classify(&row).unwrap();
            prop_assert_eq!(label, u8::from(p1 > p0));
        }
    }
}
