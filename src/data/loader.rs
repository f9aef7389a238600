use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{Dataset, RawRecord, COLUMNS};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the passenger table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming the columns (the cleaned export)
/// * `.json`    – `[{ "Survived": 0, "Pclass": 3, ... }, ...]`
/// * `.parquet` – one integer or float column per field
///
/// Every row is validated; the first malformed row fails the whole load.
pub fn load_file(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(DashboardError::FileNotFound(path.to_path_buf()).into());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(path),
        "json" => read_json(path),
        "parquet" | "pq" => read_parquet(path),
        other => Err(DashboardError::Parse(format!("unsupported file extension: .{other}")).into()),
    }
    .with_context(|| format!("reading {}", path.display()))?;

    let dataset = Dataset::from_raw(&table.rows)
        .with_context(|| format!("validating {}", path.display()))?
        .with_columns(table.columns);
    log::info!("Loaded {} passengers from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Rows as read from a file, plus every column name the file declared.
struct RawTable {
    columns: Vec<String>,
    rows: Vec<RawRecord>,
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Columns are matched by header name; their order does not matter and
/// unknown columns are skipped.
fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DashboardError::Parse(format!("CSV header: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    check_columns(headers.iter().map(String::as_str))?;

    let rows = reader
        .deserialize::<RawRecord>()
        .enumerate()
        .map(|(row_no, result)| {
            result.map_err(|e| anyhow::Error::from(DashboardError::Parse(format!("CSV row {row_no}: {e}"))))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(RawTable { columns: headers, rows })
}

fn check_columns<'a>(present: impl Iterator<Item = &'a str>) -> Result<()> {
    let present: Vec<&str> = present.collect();
    if let Some(missing) = COLUMNS.iter().find(|c| !present.contains(c)) {
        return Err(DashboardError::Parse(format!("missing required column '{missing}'")).into());
    }
    let extra: Vec<&str> = present
        .iter()
        .copied()
        .filter(|c| !COLUMNS.contains(c))
        .collect();
    if !extra.is_empty() {
        log::warn!("Ignoring unused columns {extra:?}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| DashboardError::Parse(format!("JSON: {e}")))?;

    let records = root
        .as_array()
        .ok_or_else(|| DashboardError::Parse("expected top-level JSON array".into()))?;

    let columns: Vec<String> = match records.first().and_then(JsonValue::as_object) {
        Some(first) => {
            check_columns(first.keys().map(String::as_str))?;
            first.keys().cloned().collect()
        }
        None => COLUMNS.iter().map(|c| c.to_string()).collect(),
    };

    let rows = records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            RawRecord::deserialize(rec)
                .map_err(|e| anyhow::Error::from(DashboardError::Parse(format!("JSON row {i}: {e}"))))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(RawTable { columns, rows })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both Pandas (`df.to_parquet()`) and Polars
/// (`df.write_parquet()`); integer columns are cast to Float64.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DashboardError::Parse(format!("parquet metadata: {e}")))?;

    // A file without row groups yields no batches, so the schema is checked here.
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    check_columns(columns.iter().map(String::as_str))?;

    let reader = builder
        .build()
        .map_err(|e| DashboardError::Parse(format!("parquet reader: {e}")))?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(|e| DashboardError::Parse(format!("parquet batch: {e}")))?;
        let schema = batch.schema();

        let mut arrays = Vec::with_capacity(COLUMNS.len());
        for name in COLUMNS {
            let idx = schema
                .index_of(name)
                .map_err(|_| DashboardError::Parse(format!("missing required column '{name}'")))?;
            let as_f64 = cast(batch.column(idx), &DataType::Float64)
                .map_err(|e| DashboardError::Parse(format!("column '{name}': {e}")))?;
            arrays.push(as_f64);
        }

        let offset = rows.len();
        for row in 0..batch.num_rows() {
            let mut cells = [0.0; 8];
            for (cell, (col, name)) in cells.iter_mut().zip(arrays.iter().zip(COLUMNS)) {
                if col.is_null(row) {
                    return Err(DashboardError::InvalidRecord {
                        row: offset + row,
                        reason: format!("{name} is null"),
                    }
                    .into());
                }
                *cell = col.as_primitive::<Float64Type>().value(row);
            }
            let [survived, pclass, sex, age, sibsp, parch, fare, embarked] = cells;
            rows.push(RawRecord {
                survived,
                pclass,
                sex,
                age,
                sibsp,
                parch,
                fare,
                embarked,
            });
        }
    }

    Ok(RawTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(ext: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn kind(err: &anyhow::Error) -> &DashboardError {
        err.downcast_ref::<DashboardError>().expect("typed error")
    }

    #[test]
    fn csv_columns_may_be_reordered_and_padded() {
        let file = write_temp(
            "csv",
            "PassengerId,Pclass,Survived,Sex,Age,SibSp,Parch,Fare,Embarked\n\
             892,3,0,0,34.5,0,0,7.8292,1\n\
             893,3.0,1,1,47,1,0,7,2\n",
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.labels(), vec![0, 1]);
        assert_eq!(ds.records[1].features.sibsp, 1);
        assert_eq!(ds.columns()[0], "PassengerId");
        assert_eq!(ds.feature_count(), 8);
    }

    #[test]
    fn parquet_without_rows_still_needs_the_columns() {
        use std::sync::Arc;

        use arrow::datatypes::{Field, Schema};
        use parquet::arrow::ArrowWriter;

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let schema = Arc::new(Schema::new(vec![Field::new("Unrelated", DataType::Int64, false)]));
        let writer = ArrowWriter::try_new(std::fs::File::create(file.path()).unwrap(), schema, None).unwrap();
        writer.close().unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(kind(&err), DashboardError::Parse(msg) if msg.contains("Survived")));
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = load_file(Path::new("no/such/passengers.csv")).unwrap_err();
        assert!(matches!(kind(&err), DashboardError::FileNotFound(_)));
    }

    #[test]
    fn missing_column_is_a_parse_error() {
        let file = write_temp("csv", "Survived,Pclass,Sex,SibSp,Parch,Fare,Embarked\n1,1,1,0,0,10,0\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(kind(&err), DashboardError::Parse(msg) if msg.contains("Age")));
    }

    #[test]
    fn empty_cell_is_a_parse_error() {
        let file = write_temp("csv", "Survived,Pclass,Sex,Age,SibSp,Parch,Fare,Embarked\n1,1,1,,0,0,10,0\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(kind(&err), DashboardError::Parse(_)));
    }

    #[test]
    fn invalid_code_rejects_the_load() {
        let file = write_temp(
            "csv",
            "Survived,Pclass,Sex,Age,SibSp,Parch,Fare,Embarked\n1,1,1,20,0,0,10,0\n0,5,0,30,0,0,8,2\n",
        );
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(kind(&err), DashboardError::InvalidRecord { row: 1, .. }));
    }

    #[test]
    fn json_records_load() {
        let file = write_temp(
            "json",
            r#"[{"Survived":1,"Pclass":1,"Sex":1,"Age":38.0,"SibSp":1,"Parch":0,"Fare":71.2833,"Embarked":0}]"#,
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert!(ds.records[0].survived);
    }

    #[test]
    fn unknown_extension_is_a_parse_error() {
        let file = write_temp("xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(kind(&err), DashboardError::Parse(_)));
    }
}
