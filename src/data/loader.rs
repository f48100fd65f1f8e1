use std::io::Read;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type, Schema};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Column, ColumnSet, Record, Table};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Anything that stops the prediction table from loading. All of these are
/// fatal to the render: there is no dashboard without the base table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("prediction file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error(
        "file has none of the expected columns (age, MonthlyIncome, DebtRatio, Predicted_Probability)"
    )]
    NoRequiredColumns,

    #[error("data row {row}, column {column}: '{value}' is not a number")]
    /// `row` is 1-based and counts data rows only (the CSV header is not a row).
    InvalidValue {
        row: usize,
        column: Column,
        value: String,
    },

    #[error("column {column} has type {data_type}, expected a numeric type")]
    UnsupportedColumnType { column: Column, data_type: String },

    #[error("expected a top-level JSON array of row objects")]
    NotJsonRecords,

    #[error("JSON data row {0} is not an object")]
    NotJsonObject(usize),

    #[error("reading CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("parsing JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reading parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("decoding parquet batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type LoadResult<T> = Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a prediction table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – one header row, comma-delimited (the usual export)
/// * `.json`    – `[{ "age": 41, "MonthlyIncome": 5200.0, ... }, ...]`
/// * `.parquet` – flat numeric columns named like the CSV headers
pub fn load_file(path: &Path) -> LoadResult<Table> {
    if !path.is_file() {
        return Err(LoadError::MissingFile(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(std::fs::File::open(path)?)?,
        "json" => read_json(std::fs::File::open(path)?)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    let missing = table.columns.missing();
    if !missing.is_empty() {
        log::warn!(
            "{} lacks columns {:?}; dependent sections will be unavailable",
            path.display(),
            missing.iter().map(|c| c.header()).collect::<Vec<_>>()
        );
    }

    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(table.with_source(source))
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Cell spellings treated as "no value", following the usual dataframe
/// export conventions.
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None"];

fn is_missing(raw: &str) -> bool {
    MISSING_MARKERS.contains(&raw.trim())
}

/// Coerce a text cell into the typed field of `record`.
fn set_text_cell(record: &mut Record, column: Column, raw: &str, row: usize) -> LoadResult<()> {
    if is_missing(raw) {
        return Ok(());
    }
    let text = raw.trim();
    let invalid = || LoadError::InvalidValue {
        row,
        column,
        value: raw.to_string(),
    };

    match column {
        Column::Age => {
            let age = match text.parse::<i64>() {
                Ok(a) => a,
                Err(_) => {
                    let f = text.parse::<f64>().map_err(|_| invalid())?;
                    if !f.is_finite() {
                        return Err(invalid());
                    }
                    f.trunc() as i64
                }
            };
            record.age = Some(age);
        }
        other => {
            let v = text.parse::<f64>().map_err(|_| invalid())?;
            set_number(record, other, v);
        }
    }
    Ok(())
}

fn set_number(record: &mut Record, column: Column, v: f64) {
    if v.is_nan() {
        return;
    }
    match column {
        Column::Age => record.age = Some(v.trunc() as i64),
        Column::MonthlyIncome => record.monthly_income = Some(v),
        Column::DebtRatio => record.debt_ratio = Some(v),
        Column::PredictedProbability => record.predicted_probability = Some(v),
    }
}

fn finish(records: Vec<Record>, columns: ColumnSet, extra_columns: Vec<String>) -> LoadResult<Table> {
    if columns.is_empty() {
        return Err(LoadError::NoRequiredColumns);
    }
    let mut table = Table::new(records, columns);
    table.extra_columns = extra_columns;
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Where a CSV field goes.
enum Slot {
    Required(Column),
    Extra(String),
}

/// CSV layout: header row with column names, comma-delimited fields.
/// The four known columns are coerced; every other column is kept as text.
/// Short rows are allowed: absent trailing cells are missing values.
pub fn read_csv<R: Read>(reader: R) -> LoadResult<Table> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut columns = ColumnSet::default();
    let mut extra_columns = Vec::new();
    let slots: Vec<Slot> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| match Column::from_header(h) {
            Some(c) => {
                columns.insert(c);
                Slot::Required(c)
            }
            None => {
                let name = if h.trim().is_empty() {
                    format!("Unnamed: {idx}")
                } else {
                    h.to_string()
                };
                extra_columns.push(name.clone());
                Slot::Extra(name)
            }
        })
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let fields = result?;
        let mut record = Record::default();
        for (slot, value) in slots.iter().zip(fields.iter()) {
            match slot {
                Slot::Required(c) => set_text_cell(&mut record, *c, value, row_no + 1)?,
                Slot::Extra(name) => {
                    record.extra.insert(name.clone(), value.to_string());
                }
            }
        }
        records.push(record);
    }

    finish(records, columns, extra_columns)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "age": 45, "MonthlyIncome": 9120.0, "DebtRatio": 0.80, "Predicted_Probability": 0.12 },
///   ...
/// ]
/// ```
pub fn read_json<R: Read>(reader: R) -> LoadResult<Table> {
    let root: JsonValue = serde_json::from_reader(reader)?;
    let rows = root.as_array().ok_or(LoadError::NotJsonRecords)?;
    // An empty export has no keys to inspect; load it like a header-only CSV.
    if rows.is_empty() {
        return Ok(Table::new(Vec::new(), ColumnSet::all()));
    }

    let mut columns = ColumnSet::default();
    let mut extra_columns: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row.as_object().ok_or(LoadError::NotJsonObject(i + 1))?;
        let mut record = Record::default();

        for (key, val) in obj {
            match Column::from_header(key) {
                Some(c) => {
                    columns.insert(c);
                    match val {
                        JsonValue::Null => {}
                        JsonValue::Number(n) => match (c, n.as_i64()) {
                            (Column::Age, Some(a)) => record.age = Some(a),
                            _ => set_number(&mut record, c, n.as_f64().unwrap_or(f64::NAN)),
                        },
                        JsonValue::String(s) => set_text_cell(&mut record, c, s, i + 1)?,
                        other => {
                            return Err(LoadError::InvalidValue {
                                row: i + 1,
                                column: c,
                                value: other.to_string(),
                            })
                        }
                    }
                }
                None => {
                    if !extra_columns.contains(key) {
                        extra_columns.push(key.clone());
                    }
                    let text = match val {
                        JsonValue::String(s) => s.clone(),
                        JsonValue::Null => String::new(),
                        other => other.to_string(),
                    };
                    record.extra.insert(key.clone(), text);
                }
            }
        }
        records.push(record);
    }

    finish(records, columns, extra_columns)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Required columns may be Int32, Int64, Float32 or Float64 (an integer
/// column with nulls is commonly written as Float64). Other columns are
/// rendered to text for display.
fn load_parquet(path: &Path) -> LoadResult<Table> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let (columns, required, extras) = parquet_layout(&schema)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;

        for row in 0..batch.num_rows() {
            let mut record = Record::default();
            for (col_idx, column) in &required {
                if let Some(v) = numeric_at(batch.column(*col_idx), row) {
                    set_number(&mut record, *column, v);
                }
            }
            for (col_idx, name) in &extras {
                let col = batch.column(*col_idx);
                let text = if col.is_null(row) {
                    String::new()
                } else {
                    array_value_to_string(col.as_ref(), row)?
                };
                record.extra.insert(name.clone(), text);
            }
            records.push(record);
        }
    }

    let extra_columns = extras.into_iter().map(|(_, name)| name).collect();
    finish(records, columns, extra_columns)
}

type ParquetLayout = (ColumnSet, Vec<(usize, Column)>, Vec<(usize, String)>);

/// Split the schema into required (numeric) and pass-through columns.
fn parquet_layout(schema: &Schema) -> LoadResult<ParquetLayout> {
    let mut columns = ColumnSet::default();
    let mut required = Vec::new();
    let mut extras = Vec::new();

    for (idx, field) in schema.fields().iter().enumerate() {
        match Column::from_header(field.name()) {
            Some(column) => {
                if !is_numeric(field.data_type()) {
                    return Err(LoadError::UnsupportedColumnType {
                        column,
                        data_type: format!("{:?}", field.data_type()),
                    });
                }
                columns.insert(column);
                required.push((idx, column));
            }
            None => extras.push((idx, field.name().clone())),
        }
    }
    Ok((columns, required, extras))
}

fn is_numeric(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int32 | DataType::Int64 | DataType::Float32 | DataType::Float64
    )
}

/// Extract a numeric cell from an Arrow column at a given row.
fn numeric_at(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => col.as_primitive_opt::<Int32Type>().map(|a| a.value(row) as f64),
        DataType::Int64 => col.as_primitive_opt::<Int64Type>().map(|a| a.value(row) as f64),
        DataType::Float32 => col.as_primitive_opt::<Float32Type>().map(|a| a.value(row) as f64),
        DataType::Float64 => col.as_primitive_opt::<Float64Type>().map(|a| a.value(row)),
        _ => None,
    }
}
