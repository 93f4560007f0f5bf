use std::fmt;

use super::model::Table;
use crate::config::ColumnNames;

/// Label of the "no journal filter" entry in the journal dropdown.
pub const ALL_JOURNALS: &str = "All";

// ---------------------------------------------------------------------------
// Filter state: year range + journal selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JournalFilter {
    #[default]
    All,
    Only(String),
}

impl JournalFilter {
    /// Map a dropdown label to a filter; [`ALL_JOURNALS`] means no filter.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_JOURNALS {
            JournalFilter::All
        } else {
            JournalFilter::Only(label.to_string())
        }
    }
}

impl fmt::Display for JournalFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalFilter::All => f.write_str(ALL_JOURNALS),
            JournalFilter::Only(j) => f.write_str(j),
        }
    }
}

/// Dashboard selection. The year range is inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub years: (i64, i64),
    pub journal: JournalFilter,
}

impl FilterState {
    /// Initial state: the preferred `window` clamped to `bounds`, all journals.
    /// A window that misses the data entirely falls back to the full bounds.
    pub fn initial(bounds: (i64, i64), window: (i64, i64)) -> Self {
        let lo = window.0.max(bounds.0);
        let hi = window.1.min(bounds.1);
        let years = if lo <= hi { (lo, hi) } else { bounds };
        FilterState {
            years,
            journal: JournalFilter::All,
        }
    }

    /// Set the year range, keeping it ordered and inside `bounds`.
    pub fn set_years(&mut self, lo: i64, hi: i64, bounds: (i64, i64)) {
        let lo = lo.clamp(bounds.0, bounds.1);
        let hi = hi.clamp(bounds.0, bounds.1);
        self.years = if lo <= hi { (lo, hi) } else { (hi, lo) };
    }
}

/// Smallest and largest year in the year column, if any.
pub fn year_bounds(table: &Table, column: &str) -> Option<(i64, i64)> {
    let years = table.column(column)?.present().filter_map(|v| v.as_i64());
    years.fold(None, |acc, y| match acc {
        None => Some((y, y)),
        Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
    })
}

/// Dropdown entries: [`ALL_JOURNALS`] followed by the sorted distinct journals.
pub fn journal_options(table: &Table, column: &str) -> Vec<String> {
    let mut options = vec![ALL_JOURNALS.to_string()];
    if let Some(col) = table.column(column) {
        options.extend(col.unique_values().iter().map(|v| v.to_string()));
    }
    options
}

/// Return indices of rows that pass the filter.
///
/// A row passes when:
/// * the year column is absent, or its year lies within the range
///   (rows with a missing year fail)
/// * the journal filter is `All`, or the journal column is present and equal
pub fn filtered_indices(table: &Table, filter: &FilterState, columns: &ColumnNames) -> Vec<usize> {
    let years = table.column(&columns.publication_year);
    let journals = table.column(&columns.journal);
    let (lo, hi) = filter.years;

    (0..table.n_rows())
        .filter(|&row| {
            if let Some(col) = years {
                match col.values[row].as_i64() {
                    Some(y) if y >= lo && y <= hi => {}
                    _ => return false,
                }
            }
            match &filter.journal {
                JournalFilter::All => true,
                JournalFilter::Only(wanted) => journals
                    .map(|col| {
                        let value = &col.values[row];
                        !value.is_null() && value.to_string() == *wanted
                    })
                    .unwrap_or(false),
            }
        })
        .collect()
}

/// The filtered table itself.
pub fn apply(table: &Table, filter: &FilterState, columns: &ColumnNames) -> Table {
    table.take_rows(&filtered_indices(table, filter, columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn table() -> Table {
        Table::new(vec![
            Column::infer(
                "publication_year",
                [2019, 2020, 2021, 2020]
                    .into_iter()
                    .map(CellValue::Integer)
                    .collect(),
            ),
            Column::infer(
                "journal",
                ["Lancet", "BMJ", "Lancet", "Lancet"]
                    .into_iter()
                    .map(|s| CellValue::String(s.into()))
                    .collect(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn initial_window_is_clamped_to_data() {
        let state = FilterState::initial((2015, 2022), (2019, 2024));
        assert_eq!(state.years, (2019, 2022));
        let state = FilterState::initial((2000, 2005), (2019, 2024));
        assert_eq!(state.years, (2000, 2005));
    }

    #[test]
    fn set_years_orders_and_clamps() {
        let mut state = FilterState::initial((2019, 2021), (2019, 2021));
        state.set_years(2025, 2010, (2019, 2021));
        assert_eq!(state.years, (2019, 2021));
        state.set_years(2021, 2020, (2019, 2021));
        assert_eq!(state.years, (2020, 2021));
    }

    #[test]
    fn year_range_is_inclusive() {
        let state = FilterState {
            years: (2020, 2020),
            journal: JournalFilter::All,
        };
        assert_eq!(filtered_indices(&table(), &state, &ColumnNames::default()), vec![1, 3]);
    }

    #[test]
    fn journal_filter_matches_exactly() {
        let state = FilterState {
            years: (2019, 2021),
            journal: JournalFilter::from_label("Lancet"),
        };
        let filtered = apply(&table(), &state, &ColumnNames::default());
        let journals = filtered.column("journal").unwrap();
        assert_eq!(filtered.n_rows(), 3);
        assert!(journals
            .values
            .iter()
            .all(|v| *v == CellValue::String("Lancet".into())));
    }

    #[test]
    fn all_label_is_no_filter() {
        assert_eq!(JournalFilter::from_label(ALL_JOURNALS), JournalFilter::All);
    }

    #[test]
    fn options_and_bounds() {
        assert_eq!(journal_options(&table(), "journal"), vec!["All", "BMJ", "Lancet"]);
        assert_eq!(year_bounds(&table(), "publication_year"), Some((2019, 2021)));
        assert_eq!(year_bounds(&table(), "missing"), None);
    }
}
