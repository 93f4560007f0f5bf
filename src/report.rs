//! Console report: dataset overview, cleaning log and aggregate tables.
//!
//! Tables go through Arrow's pretty printer so every section shares one
//! layout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::config::Settings;
use crate::data::analysis::Summary;
use crate::data::clean::Cleaned;
use crate::data::model::Table;

/// Rows shown for each converted column in the cleaning section.
const HEAD_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// `describe()`-style statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1).
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

/// Linear-interpolated quantile of sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Statistics for every numeric column, in table order.
pub fn describe(table: &Table) -> Vec<ColumnStats> {
    table
        .columns()
        .iter()
        .filter(|c| c.dtype.is_numeric())
        .map(|c| {
            let mut values: Vec<f64> = c.present().filter_map(|v| v.as_f64()).collect();
            values.sort_by(f64::total_cmp);
            let n = values.len();
            let mean = if n == 0 {
                f64::NAN
            } else {
                values.iter().sum::<f64>() / n as f64
            };
            let std = if n < 2 {
                f64::NAN
            } else {
                let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
                (ss / (n - 1) as f64).sqrt()
            };
            ColumnStats {
                name: c.name.clone(),
                count: n,
                mean,
                std,
                min: values.first().copied().unwrap_or(f64::NAN),
                q25: quantile(&values, 0.25),
                q50: quantile(&values, 0.50),
                q75: quantile(&values, 0.75),
                max: values.last().copied().unwrap_or(f64::NAN),
            }
        })
        .collect()
}

fn format_stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.4}")
    }
}

// ---------------------------------------------------------------------------
// Table formatting
// ---------------------------------------------------------------------------

/// Render rows of text as a bordered table.
pub fn text_table(headers: &[&str], rows: &[Vec<String>]) -> Result<String> {
    if headers.is_empty() {
        return Ok("(no columns)".to_string());
    }
    let fields: Vec<Field> = headers
        .iter()
        .map(|h| Field::new(*h, DataType::Utf8, false))
        .collect();
    let arrays: Vec<ArrayRef> = (0..headers.len())
        .map(|j| {
            let cells: Vec<&str> = rows
                .iter()
                .map(|r| r.get(j).map(String::as_str).unwrap_or(""))
                .collect();
            Arc::new(StringArray::from(cells)) as ArrayRef
        })
        .collect();
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}

fn counts_table<K: ToString>(key: &str, value: &str, counts: &[(K, usize)]) -> Result<String> {
    let rows: Vec<Vec<String>> = counts
        .iter()
        .map(|(k, n)| vec![k.to_string(), n.to_string()])
        .collect();
    text_table(&[key, value], &rows)
}

fn head_table(table: &Table, column: &str, n: usize) -> Result<Option<String>> {
    let Some(col) = table.column(column) else {
        return Ok(None);
    };
    let rows: Vec<Vec<String>> = col
        .values
        .iter()
        .take(n)
        .enumerate()
        .map(|(i, v)| vec![i.to_string(), v.to_string()])
        .collect();
    text_table(&["row", column], &rows).map(Some)
}

// ---------------------------------------------------------------------------
// Report sections
// ---------------------------------------------------------------------------

/// Shape, column types, null counts and numeric statistics of the raw table.
pub fn write_overview(out: &mut impl Write, raw: &Table) -> Result<()> {
    let (rows, cols) = raw.shape();
    writeln!(out, "DataFrame dimensions (rows, columns):")?;
    writeln!(out, "({rows}, {cols})")?;

    writeln!(out, "Data types of each column:")?;
    let info: Vec<Vec<String>> = raw
        .columns()
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                (c.len() - c.null_count()).to_string(),
                c.null_count().to_string(),
                c.dtype.to_string(),
            ]
        })
        .collect();
    writeln!(
        out,
        "{}",
        text_table(&["column", "non-null", "null", "dtype"], &info)?
    )?;

    writeln!(out, "Basic statistics for numerical columns:")?;
    let stats = describe(raw);
    if stats.is_empty() {
        writeln!(out, "(no numeric columns)")?;
    } else {
        let mut headers = vec!["stat"];
        headers.extend(stats.iter().map(|s| s.name.as_str()));
        let rows: Vec<Vec<String>> = [
            "count", "mean", "std", "min", "25%", "50%", "75%", "max",
        ]
        .iter()
        .map(|label| {
            let mut row = vec![label.to_string()];
            row.extend(stats.iter().map(|s| match *label {
                "count" => s.count.to_string(),
                "mean" => format_stat(s.mean),
                "std" => format_stat(s.std),
                "min" => format_stat(s.min),
                "25%" => format_stat(s.q25),
                "50%" => format_stat(s.q50),
                "75%" => format_stat(s.q75),
                _ => format_stat(s.max),
            }));
            row
        })
        .collect();
        writeln!(out, "{}", text_table(&headers, &rows)?)?;
    }

    writeln!(out, "Columns with missing values:")?;
    let missing: Vec<(String, usize)> = raw
        .columns()
        .iter()
        .filter(|c| c.null_count() > 0)
        .map(|c| (c.name.clone(), c.null_count()))
        .collect();
    writeln!(out, "{}", counts_table("column", "missing", &missing)?)?;
    Ok(())
}

/// What the cleaner changed, the cleaned column info, and the head of each
/// converted date column and of the derived year column.
pub fn write_cleaning(out: &mut impl Write, cleaned: &Cleaned, settings: &Settings) -> Result<()> {
    writeln!(out, "Cleaning steps:")?;
    if cleaned.steps.is_empty() {
        writeln!(out, "  (nothing to clean)")?;
    }
    for step in &cleaned.steps {
        writeln!(out, "  {step}")?;
    }

    writeln!(out, "Cleaned DataFrame info:")?;
    let info: Vec<Vec<String>> = cleaned
        .table
        .columns()
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                (c.len() - c.null_count()).to_string(),
                c.dtype.to_string(),
            ]
        })
        .collect();
    writeln!(out, "{}", text_table(&["column", "non-null", "dtype"], &info)?)?;

    for name in &settings.date_columns {
        if let Some(head) = head_table(&cleaned.table, name, HEAD_ROWS)? {
            writeln!(out, "Converted {name} to date:")?;
            writeln!(out, "{head}")?;
        }
    }
    if let Some(head) = head_table(&cleaned.table, &settings.columns.publication_year, HEAD_ROWS)? {
        writeln!(out, "Extracted publication year:")?;
        writeln!(out, "{head}")?;
    }
    Ok(())
}

/// Aggregate tables, in the same order as the static charts.
pub fn write_summary(out: &mut impl Write, summary: &Summary, settings: &Settings) -> Result<()> {
    let top_n = settings.top_n;
    if let Some(years) = &summary.years {
        writeln!(out, "Number of papers published each year:")?;
        writeln!(out, "{}", counts_table("year", "papers", years)?)?;
    }
    if let Some(journals) = &summary.journals {
        writeln!(out, "Top {top_n} journals:")?;
        writeln!(out, "{}", counts_table("journal", "papers", journals)?)?;
    }
    if let Some(words) = &summary.words {
        writeln!(out, "Most common words in titles:")?;
        writeln!(out, "{}", counts_table("word", "count", words)?)?;
    }
    if let Some(sources) = &summary.sources {
        writeln!(out, "Paper counts by source:")?;
        writeln!(out, "{}", counts_table("source", "papers", sources)?)?;
    }
    Ok(())
}

/// List the chart files written to `dir`, one path per line.
pub fn write_chart_list(out: &mut impl Write, dir: &Path, written: &[PathBuf]) -> Result<()> {
    writeln!(out, "Wrote {} chart(s) to {}:", written.len(), dir.display())?;
    for path in written {
        writeln!(out, "  {}", path.display())?;
    }
    Ok(())
}
