use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};

use super::model::{CellValue, Column, ColumnType, Table};

/// Date-only layouts tried in order. `%B` also accepts abbreviated month names.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%Y %B %d",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanOptions {
    /// Columns normalized to calendar dates (skipped when absent).
    pub date_columns: Vec<String>,
    /// Column the publication year is extracted from.
    pub publication_date: String,
    /// Name of the derived year column.
    pub publication_year: String,
    /// Year used where the publication date does not parse.
    pub default_year: i64,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            date_columns: vec!["release_date".to_string(), "last_modified".to_string()],
            publication_date: "publication_date".to_string(),
            publication_year: "publication_year".to_string(),
            default_year: 2020,
        }
    }
}

/// One change applied by the cleaner, kept for the console report.
#[derive(Debug, Clone, PartialEq)]
pub enum CleaningStep {
    Median {
        column: String,
        filled: usize,
        median: f64,
    },
    /// Numeric column without any present value; gaps stay missing.
    Unset { column: String, missing: usize },
    Mode {
        column: String,
        filled: usize,
        mode: CellValue,
    },
    /// Categorical column without any present value; gaps become "".
    Empty { column: String, filled: usize },
    Dates {
        column: String,
        unparsed: usize,
        median: Option<NaiveDate>,
    },
    Year {
        source: String,
        column: String,
        defaulted: usize,
    },
}

impl fmt::Display for CleaningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleaningStep::Median {
                column,
                filled,
                median,
            } => write!(f, "{column}: filled {filled} missing with median {median}"),
            CleaningStep::Unset { column, missing } => {
                write!(f, "{column}: no values present, {missing} left unset")
            }
            CleaningStep::Mode {
                column,
                filled,
                mode,
            } => write!(f, "{column}: filled {filled} missing with mode '{mode}'"),
            CleaningStep::Empty { column, filled } => {
                write!(f, "{column}: no values present, filled {filled} with ''")
            }
            CleaningStep::Dates {
                column,
                unparsed,
                median: Some(median),
            } => write!(
                f,
                "Converted {column} to date ({unparsed} unparsed, filled with {median})"
            ),
            CleaningStep::Dates {
                column, unparsed, ..
            } => write!(f, "Converted {column} to date ({unparsed} unparsed, left unset)"),
            CleaningStep::Year {
                source,
                column,
                defaulted,
            } => write!(
                f,
                "Extracted {column} from {source} ({defaulted} set to the default year)"
            ),
        }
    }
}

/// Output of [`clean`]: the cleaned table and the steps applied to it.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub table: Table,
    pub steps: Vec<CleaningStep>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Produce a cleaned copy of `raw`.
///
/// 1. every column: numeric gaps → median, categorical gaps → mode
/// 2. each configured date column present → calendar dates, gaps → median date
/// 3. publication date column present → derived integer year column
pub fn clean(raw: &Table, options: &CleanOptions) -> Cleaned {
    let mut table = raw.clone();
    let mut steps = Vec::new();

    for column in table.columns_mut() {
        if let Some(step) = fill_missing(column) {
            log::debug!("{step}");
            steps.push(step);
        }
    }

    for name in &options.date_columns {
        if let Some(column) = table.column_mut(name) {
            let step = normalize_dates(column);
            log::debug!("{step}");
            steps.push(step);
        }
    }

    let derived = table.column(&options.publication_date).map(|source| {
        derive_year(source, &options.publication_year, options.default_year)
    });
    if let Some((year, defaulted)) = derived {
        let step = CleaningStep::Year {
            source: options.publication_date.clone(),
            column: options.publication_year.clone(),
            defaulted,
        };
        match table.set_column(year) {
            Ok(()) => steps.push(step),
            Err(err) => log::warn!("skipping year column: {err}"),
        }
    }

    log::info!(
        "Cleaned {} columns, {} steps applied, {} missing cells left",
        table.shape().1,
        steps.len(),
        table.null_cells()
    );
    Cleaned { table, steps }
}

// ---------------------------------------------------------------------------
// Missing-value imputation
// ---------------------------------------------------------------------------

/// Fill the gaps of one column in place. Returns `None` when nothing was missing.
///
/// The median / mode is computed from the values present before the fill.
pub fn fill_missing(column: &mut Column) -> Option<CleaningStep> {
    let missing = column.null_count();
    if missing == 0 {
        return None;
    }

    if column.dtype.is_numeric() {
        let Some(median) = median(column.present().filter_map(CellValue::as_f64)) else {
            return Some(CleaningStep::Unset {
                column: column.name.clone(),
                missing,
            });
        };
        column.dtype = ColumnType::Float;
        for value in &mut column.values {
            *value = match &*value {
                CellValue::Null => CellValue::Float(median),
                CellValue::Integer(i) => CellValue::Float(*i as f64),
                other => other.clone(),
            };
        }
        return Some(CleaningStep::Median {
            column: column.name.clone(),
            filled: missing,
            median,
        });
    }

    match mode(column) {
        Some(mode) => {
            for value in column.values.iter_mut().filter(|v| v.is_null()) {
                *value = mode.clone();
            }
            Some(CleaningStep::Mode {
                column: column.name.clone(),
                filled: missing,
                mode,
            })
        }
        None => {
            column.dtype = ColumnType::Text;
            for value in &mut column.values {
                *value = CellValue::String(String::new());
            }
            Some(CleaningStep::Empty {
                column: column.name.clone(),
                filled: missing,
            })
        }
    }
}

/// Median of the given values; the mean of the two middle values for even counts.
pub fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut values: Vec<f64> = values.filter(|v| !v.is_nan()).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Most frequent present value; ties go to the smallest value.
pub fn mode(column: &Column) -> Option<CellValue> {
    let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
    for value in column.present() {
        *counts.entry(value).or_default() += 1;
    }
    let mut best: Option<(&CellValue, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.clone())
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse free-form date text. Returns `None` for anything unrecognised.
pub fn parse_date_str(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.date());
    }
    // "2020-03" → first of the month
    if s.len() == 7 && s.as_bytes()[4] == b'-' {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
            return Some(date);
        }
    }
    // "2020" → first of the year
    if s.len() == 4 {
        if let Ok(year) = s.parse::<i32>() {
            return NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }
    None
}

/// Interpret a cell as a calendar date. Whole numbers in 1000..=9999 are
/// years, including floats such as `2018.0` from a column with gaps.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::String(s) => parse_date_str(s),
        other => other
            .as_i64()
            .filter(|y| (1000..=9999).contains(y))
            .and_then(|y| NaiveDate::from_ymd_opt(y as i32, 1, 1)),
    }
}

/// Median date; for even counts the midpoint of the two middle dates,
/// rounded down to a whole day.
pub fn median_date(dates: &[NaiveDate]) -> Option<NaiveDate> {
    if dates.is_empty() {
        return None;
    }
    let mut sorted = dates.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        return Some(sorted[mid]);
    }
    let (lo, hi) = (sorted[mid - 1], sorted[mid]);
    let half = (hi - lo).num_days() / 2;
    lo.checked_add_days(Days::new(half as u64))
}

/// Convert a column to calendar dates in place; unparseable values are
/// treated as missing and replaced by the median parsed date.
pub fn normalize_dates(column: &mut Column) -> CleaningStep {
    let parsed: Vec<Option<NaiveDate>> = column.values.iter().map(parse_date).collect();
    let present: Vec<NaiveDate> = parsed.iter().flatten().copied().collect();
    let unparsed = parsed.len() - present.len();
    let median = median_date(&present);

    column.dtype = ColumnType::Date;
    column.values = parsed
        .into_iter()
        .map(|d| match d.or(median) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Null,
        })
        .collect();

    CleaningStep::Dates {
        column: column.name.clone(),
        unparsed,
        median,
    }
}

/// Derive an integer year column from `source`. Returns the column and the
/// number of rows that fell back to `default_year`.
pub fn derive_year(source: &Column, name: &str, default_year: i64) -> (Column, usize) {
    let mut defaulted = 0;
    let values = source
        .values
        .iter()
        .map(|value| match parse_date(value) {
            Some(date) => CellValue::Integer(date.year() as i64),
            None => {
                defaulted += 1;
                CellValue::Integer(default_year)
            }
        })
        .collect();
    (Column::with_type(name, ColumnType::Integer, values), defaulted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[Option<&str>]) -> Vec<CellValue> {
        values
            .iter()
            .map(|v| v.map(|s| CellValue::String(s.to_string())).unwrap_or(CellValue::Null))
            .collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_table() -> Table {
        Table::new(vec![
            Column::infer(
                "title",
                text(&[Some("Covid Spread Model"), Some("covid vaccine trial"), None]),
            ),
            Column::infer("journal", text(&[Some("Lancet"), None, Some("Lancet")])),
            Column::infer("source", text(&[Some("PMC"), Some("Medline"), Some("PMC")])),
            Column::infer(
                "publication_date",
                text(&[Some("2020-03-01"), Some("not a date"), Some("2021")]),
            ),
            Column::infer(
                "citations",
                vec![CellValue::Integer(5), CellValue::Null, CellValue::Integer(7)],
            ),
            Column::infer(
                "release_date",
                text(&[Some("2020-01-01"), Some("garbage"), Some("2020-01-05")]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn numeric_gap_takes_median_of_present_values() {
        let cleaned = clean(&sample_table(), &CleanOptions::default());
        let citations = cleaned.table.column("citations").unwrap();
        assert_eq!(citations.values[1], CellValue::Float(6.0));
        assert_eq!(citations.dtype, ColumnType::Float);
    }

    #[test]
    fn categorical_gap_takes_mode() {
        let cleaned = clean(&sample_table(), &CleanOptions::default());
        let journal = cleaned.table.column("journal").unwrap();
        assert_eq!(journal.values[1], CellValue::String("Lancet".into()));
    }

    #[test]
    fn mode_ties_resolve_to_smallest_value() {
        let col = Column::infer("j", text(&[Some("b"), Some("a"), Some("b"), Some("a")]));
        assert_eq!(mode(&col), Some(CellValue::String("a".into())));
    }

    #[test]
    fn empty_categorical_column_becomes_empty_strings() {
        let mut col = Column::with_type("notes", ColumnType::Text, vec![CellValue::Null; 2]);
        let step = fill_missing(&mut col).unwrap();
        assert!(matches!(step, CleaningStep::Empty { filled: 2, .. }));
        assert!(col.values.iter().all(|v| *v == CellValue::String(String::new())));
    }

    #[test]
    fn empty_numeric_column_stays_unset() {
        let mut col = Column::infer("score", vec![CellValue::Null; 3]);
        let step = fill_missing(&mut col).unwrap();
        assert!(matches!(step, CleaningStep::Unset { missing: 3, .. }));
        assert_eq!(col.null_count(), 3);
    }

    #[test]
    fn median_handles_even_and_odd_counts() {
        assert_eq!(median([3.0, 1.0, 2.0].into_iter()), Some(2.0));
        assert_eq!(median([4.0, 1.0, 2.0, 3.0].into_iter()), Some(2.5));
        assert_eq!(median(std::iter::empty()), None);
    }

    #[test]
    fn parses_common_date_layouts() {
        assert_eq!(parse_date_str("2020-03-15"), Some(date(2020, 3, 15)));
        assert_eq!(parse_date_str("2020/03/15"), Some(date(2020, 3, 15)));
        assert_eq!(parse_date_str("03/15/2020"), Some(date(2020, 3, 15)));
        assert_eq!(parse_date_str("2020 Mar 15"), Some(date(2020, 3, 15)));
        assert_eq!(parse_date_str("2020-03-15T08:30:00Z"), Some(date(2020, 3, 15)));
        assert_eq!(parse_date_str("2020-03-15 08:30:00"), Some(date(2020, 3, 15)));
        assert_eq!(parse_date_str("2020-03"), Some(date(2020, 3, 1)));
        assert_eq!(parse_date_str("2020"), Some(date(2020, 1, 1)));
        assert_eq!(parse_date_str("yesterday"), None);
        assert_eq!(parse_date_str(""), None);
    }

    #[test]
    fn median_date_rounds_down_between_middle_dates() {
        let dates = [date(2020, 1, 5), date(2020, 1, 1)];
        assert_eq!(median_date(&dates), Some(date(2020, 1, 3)));
        let dates = [date(2020, 1, 1), date(2020, 1, 2)];
        assert_eq!(median_date(&dates), Some(date(2020, 1, 1)));
    }

    #[test]
    fn malformed_dates_take_the_median_date() {
        let cleaned = clean(&sample_table(), &CleanOptions::default());
        let release = cleaned.table.column("release_date").unwrap();
        assert_eq!(release.dtype, ColumnType::Date);
        assert_eq!(release.values[1], CellValue::Date(date(2020, 1, 3)));
    }

    #[test]
    fn year_is_derived_with_default_fallback() {
        let cleaned = clean(&sample_table(), &CleanOptions::default());
        let year = cleaned.table.column("publication_year").unwrap();
        assert_eq!(
            year.values,
            vec![
                CellValue::Integer(2020),
                CellValue::Integer(2020),
                CellValue::Integer(2021)
            ]
        );
        assert!(cleaned.steps.contains(&CleaningStep::Year {
            source: "publication_date".into(),
            column: "publication_year".into(),
            defaulted: 1,
        }));
    }

    fn years_table(years: Vec<CellValue>) -> Table {
        let titles = text(&vec![Some("t"); years.len()]);
        Table::new(vec![
            Column::infer("title", titles),
            Column::infer("publication_date", years),
        ])
        .unwrap()
    }

    fn derived_years(cleaned: &Cleaned) -> Vec<CellValue> {
        cleaned.table.column("publication_year").unwrap().values.clone()
    }

    #[test]
    fn integer_publication_dates_are_years() {
        let table = years_table(vec![
            CellValue::Integer(2018),
            CellValue::Integer(2022),
            CellValue::Integer(2019),
        ]);
        let cleaned = clean(&table, &CleanOptions::default());
        assert_eq!(
            derived_years(&cleaned),
            vec![
                CellValue::Integer(2018),
                CellValue::Integer(2022),
                CellValue::Integer(2019),
            ]
        );
    }

    #[test]
    fn year_column_with_gap_keeps_its_years() {
        let csv = "title,publication_date\nA,2018\nB,\nC,2022\n";
        let raw = crate::data::loader::read_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            raw.column("publication_date").unwrap().dtype,
            ColumnType::Float
        );
        let cleaned = clean(&raw, &CleanOptions::default());
        assert_eq!(
            derived_years(&cleaned),
            vec![
                CellValue::Integer(2018),
                CellValue::Integer(2020),
                CellValue::Integer(2022),
            ]
        );
    }

    #[test]
    fn fractional_median_year_falls_back_to_default() {
        let table = years_table(vec![
            CellValue::Integer(2018),
            CellValue::Null,
            CellValue::Integer(2021),
        ]);
        let options = CleanOptions {
            default_year: 1999,
            ..CleanOptions::default()
        };
        let cleaned = clean(&table, &options);
        assert_eq!(
            derived_years(&cleaned),
            vec![
                CellValue::Integer(2018),
                CellValue::Integer(1999),
                CellValue::Integer(2021),
            ]
        );
    }

    #[test]
    fn no_missing_values_after_cleaning() {
        let cleaned = clean(&sample_table(), &CleanOptions::default());
        assert_eq!(cleaned.table.null_cells(), 0);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let options = CleanOptions::default();
        let once = clean(&sample_table(), &options);
        let twice = clean(&once.table, &options);
        assert_eq!(once.table, twice.table);
    }

    #[test]
    fn absent_columns_are_skipped() {
        let table = Table::new(vec![Column::infer("title", text(&[Some("a")]))]).unwrap();
        let cleaned = clean(&table, &CleanOptions::default());
        assert_eq!(cleaned.table, table);
        assert!(cleaned.steps.is_empty());
    }

    #[test]
    fn raw_table_is_not_mutated() {
        let raw = sample_table();
        let before = raw.clone();
        let _ = clean(&raw, &CleanOptions::default());
        assert_eq!(raw, before);
    }
}
