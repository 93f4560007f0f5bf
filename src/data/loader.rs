use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::temporal_conversions::date32_to_datetime;
use flate2::read::GzDecoder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;
use zip::ZipArchive;

use super::model::{CellValue, Column, ColumnType, Table};

/// Cell texts read as missing, in addition to the empty string. Same set as
/// pandas' `read_csv` defaults.
const NA_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported file type: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Read(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Input formats, chosen by file name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    ZippedCsv,
    GzippedCsv,
    Json,
    Parquet,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(InputFormat::ZippedCsv)
        } else if name.ends_with(".gz") {
            Some(InputFormat::GzippedCsv)
        } else if name.ends_with(".csv") {
            Some(InputFormat::Csv)
        } else if name.ends_with(".json") {
            Some(InputFormat::Json)
        } else if name.ends_with(".parquet") || name.ends_with(".pq") {
            Some(InputFormat::Parquet)
        } else {
            None
        }
    }
}

/// Load a table from a file. Dispatch by suffix.
///
/// Supported formats:
/// * `.csv`                – header row, empty cells are missing
/// * `.csv.zip` / `.zip`   – first `.csv` entry (by name) of a zip archive
/// * `.csv.gz` / `.gz`     – gzip-compressed CSV
/// * `.json`               – `[{ "title": ..., "journal": ... }, ...]`
/// * `.parquet` / `.pq`    – column types taken from the Arrow schema
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let format = InputFormat::from_path(path)
        .ok_or_else(|| LoadError::Unsupported(path.display().to_string()))?;

    let table = match format {
        InputFormat::Csv => {
            let file = File::open(path).context("opening CSV")?;
            read_csv(file)?
        }
        InputFormat::ZippedCsv => load_zip(path)?,
        InputFormat::GzippedCsv => {
            let file = File::open(path).context("opening gzip file")?;
            read_csv(GzDecoder::new(file)).context("reading gzip-compressed CSV")?
        }
        InputFormat::Json => load_json(path)?,
        InputFormat::Parquet => load_parquet(path)?,
    };

    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.shape().1,
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read CSV with a header row from any reader.
///
/// Each column's type is inferred from the raw text of the whole column:
/// every present cell parses as `i64` → integer, as `f64` → float,
/// is `true`/`false` → bool, otherwise text with the raw strings kept.
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, cells) in raw.iter_mut().enumerate() {
            let cell = record.get(col_idx).unwrap_or("");
            if cell.is_empty() || NA_VALUES.contains(&cell) {
                cells.push(None);
            } else {
                cells.push(Some(cell.to_string()));
            }
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| column_from_strings(name, cells))
        .collect();
    Ok(Table::new(columns)?)
}

fn column_from_strings(name: String, cells: Vec<Option<String>>) -> Column {
    let present = || cells.iter().flatten();

    if present().next().is_none() {
        return Column::with_type(name, ColumnType::Float, vec![CellValue::Null; cells.len()]);
    }

    let parsed: Vec<CellValue> = if present().all(|s| s.parse::<i64>().is_ok()) {
        cells
            .iter()
            .map(|c| match c {
                Some(s) => s.parse::<i64>().map(CellValue::Integer).unwrap_or(CellValue::Null),
                None => CellValue::Null,
            })
            .collect()
    } else if present().all(|s| s.parse::<f64>().is_ok()) {
        cells
            .iter()
            .map(|c| match c {
                Some(s) => s.parse::<f64>().map(CellValue::Float).unwrap_or(CellValue::Null),
                None => CellValue::Null,
            })
            .collect()
    } else if present().all(|s| s == "true" || s == "false") {
        cells
            .iter()
            .map(|c| match c {
                Some(s) => CellValue::Bool(s == "true"),
                None => CellValue::Null,
            })
            .collect()
    } else {
        cells
            .into_iter()
            .map(|c| c.map(CellValue::String).unwrap_or(CellValue::Null))
            .collect()
    };

    Column::infer(name, parsed)
}

fn load_zip(path: &Path) -> Result<Table> {
    let file = File::open(path).context("opening zip archive")?;
    let mut archive = ZipArchive::new(file).context("reading zip archive")?;

    let mut csv_names: Vec<String> = archive
        .file_names()
        .filter(|n| n.to_ascii_lowercase().ends_with(".csv"))
        .map(str::to_string)
        .collect();
    csv_names.sort();
    let Some(name) = csv_names.into_iter().next() else {
        bail!("zip archive {} contains no .csv entry", path.display());
    };

    let entry = archive.by_name(&name).context("opening zip entry")?;
    read_csv(entry).with_context(|| format!("reading {name} from zip archive"))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "title": "Covid Spread Model", "journal": "Nature", "citations": 5 },
///   ...
/// ]
/// ```
///
/// Columns are the union of all record keys; a key missing from a record is
/// a missing cell.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values = records
                .iter()
                .map(|rec| rec.get(&name).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect();
            Column::infer(name, values)
        })
        .collect();

    Ok(Table::new(columns)?)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); schema.fields().len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, cells) in values.iter_mut().enumerate() {
            let col = batch.column(col_idx);
            cells.extend((0..batch.num_rows()).map(|row| extract_cell(col, row)));
        }
    }

    let columns = schema
        .fields()
        .iter()
        .zip(values)
        .map(|(field, cells)| {
            if cells.iter().all(CellValue::is_null) {
                Column::with_type(field.name().clone(), schema_type(field.data_type()), cells)
            } else {
                Column::infer(field.name().clone(), cells)
            }
        })
        .collect();

    Ok(Table::new(columns)?)
}

// -- Parquet / Arrow helpers --

fn schema_type(data_type: &DataType) -> ColumnType {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 => ColumnType::Text,
        DataType::Boolean => ColumnType::Bool,
        DataType::Date32 => ColumnType::Date,
        _ => ColumnType::Float,
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v)
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Float(v as f64))
        }
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => date32_to_datetime(col.as_primitive::<Date32Type>().value(row))
            .map(|dt| CellValue::Date(dt.date()))
            .unwrap_or(CellValue::Null),
        other => CellValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_infers_column_types() {
        let data = "title,citations,score,open\nA,5,1.5,true\nB,,2,false\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.shape(), (2, 4));
        assert_eq!(table.column("title").unwrap().dtype, ColumnType::Text);
        assert_eq!(table.column("citations").unwrap().dtype, ColumnType::Float);
        assert_eq!(table.column("score").unwrap().dtype, ColumnType::Float);
        assert_eq!(table.column("open").unwrap().dtype, ColumnType::Bool);
        assert!(table.column("citations").unwrap().values[1].is_null());
    }

    #[test]
    fn csv_keeps_raw_text_in_mixed_columns() {
        let data = "journal\n1.50\nLancet\nNA\n";
        let table = read_csv(data.as_bytes()).unwrap();
        let col = table.column("journal").unwrap();
        assert_eq!(col.dtype, ColumnType::Text);
        assert_eq!(col.values[0], CellValue::String("1.50".into()));
        assert!(col.values[2].is_null());
    }

    #[test]
    fn csv_na_tokens_are_gaps_not_categories() {
        let data = "journal\nLancet\nn/a\n#N/A\n-nan\nBMJ\n";
        let table = read_csv(data.as_bytes()).unwrap();
        let col = table.column("journal").unwrap();
        assert_eq!(col.null_count(), 3);
        assert_eq!(col.unique_values().len(), 2);
    }

    #[test]
    fn format_detection_by_suffix() {
        assert_eq!(
            InputFormat::from_path(Path::new("metadata.csv.zip")),
            Some(InputFormat::ZippedCsv)
        );
        assert_eq!(
            InputFormat::from_path(Path::new("data/Meta.CSV.GZ")),
            Some(InputFormat::GzippedCsv)
        );
        assert_eq!(InputFormat::from_path(Path::new("notes.txt")), None);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_file(Path::new("definitely/not/here.csv.zip")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }
}
