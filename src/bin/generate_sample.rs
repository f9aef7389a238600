use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use titanic_dashboard::classifier::{save_model, Classifier, ModelKind};
use titanic_dashboard::data::model::{Dataset, RawRecord};
use titanic_dashboard::data::synthetic;

const PASSENGERS: usize = 418;

fn write_parquet(path: &Path, rows: &[RawRecord]) -> Result<()> {
    let int_col = |f: fn(&RawRecord) -> f64| Int64Array::from(rows.iter().map(|r| f(r) as i64).collect::<Vec<_>>());
    let float_col = |f: fn(&RawRecord) -> f64| Float64Array::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("Survived", DataType::Int64, false),
        Field::new("Pclass", DataType::Int64, false),
        Field::new("Sex", DataType::Int64, false),
        Field::new("Age", DataType::Float64, false),
        Field::new("SibSp", DataType::Int64, false),
        Field::new("Parch", DataType::Int64, false),
        Field::new("Fare", DataType::Float64, false),
        Field::new("Embarked", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(int_col(|r| r.survived)),
            Arc::new(int_col(|r| r.pclass)),
            Arc::new(int_col(|r| r.sex)),
            Arc::new(float_col(|r| r.age)),
            Arc::new(int_col(|r| r.sibsp)),
            Arc::new(int_col(|r| r.parch)),
            Arc::new(float_col(|r| r.fare)),
            Arc::new(int_col(|r| r.embarked)),
        ],
    )
    .context("building record batch")?;

    let file = fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let rows = synthetic::passengers(PASSENGERS, 42);
    let survivors = rows.iter().filter(|r| r.survived == 1.0).count();

    fs::create_dir_all("data").context("creating data/")?;
    fs::create_dir_all("models").context("creating models/")?;

    let csv_path = Path::new("data/tested_cleaned.csv");
    let mut csv_writer = csv::Writer::from_path(csv_path).context("creating CSV")?;
    for r in &rows {
        csv_writer.serialize(r).context("writing CSV row")?;
    }
    csv_writer.flush().context("flushing CSV")?;

    write_parquet(Path::new("data/tested_cleaned.parquet"), &rows)?;

    let dataset = Dataset::from_raw(&rows)?;
    let logistic = Classifier::train(ModelKind::LogisticRegression, &dataset)?;
    save_model(Path::new("models/logistic_regression.json"), &logistic)?;
    save_model(Path::new("models/logistic_regression.msgpack"), &logistic)?;

    let nb = Classifier::train(ModelKind::GaussianNb, &dataset)?;
    save_model(Path::new("models/gaussian_nb.json"), &nb)?;

    println!(
        "Wrote {} passengers ({survivors} survivors) to data/ and 3 model artifacts to models/",
        rows.len()
    );
    Ok(())
}
