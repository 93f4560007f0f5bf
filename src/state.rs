use std::path::Path;

use crate::color::ColorMap;
use crate::config::Settings;
use crate::data::clean::clean;
use crate::data::filter::{journal_options, year_bounds, FilterState, JournalFilter};
use crate::data::loader::load_file;
use crate::data::model::Table;
use crate::view::{render, DashboardView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Cleaned dataset (None until a file is loaded).
    pub table: Option<Table>,

    /// Year range and journal selection.
    pub filter: FilterState,

    /// Year slider bounds; `None` when the table has no year column.
    pub year_bounds: Option<(i64, i64)>,

    /// Journal dropdown entries, "All" first.
    pub journal_options: Vec<String>,

    /// Output of the last render pass (cached until the filter changes).
    pub view: Option<DashboardView>,

    /// Fixed colour per source, shared by every render pass.
    pub source_colors: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            table: None,
            filter: FilterState {
                years: (0, 0),
                journal: JournalFilter::All,
            },
            year_bounds: None,
            journal_options: Vec::new(),
            view: None,
            source_colors: None,
            status_message: None,
        }
    }

    /// Ingest a cleaned table: reset the filter to its defaults and render.
    pub fn set_table(&mut self, table: Table) {
        let columns = &self.settings.columns;
        self.year_bounds = year_bounds(&table, &columns.publication_year);
        self.journal_options = journal_options(&table, &columns.journal);
        self.source_colors = table
            .column(&columns.source)
            .map(|col| ColorMap::new(col.unique_values().iter().map(|v| v.to_string())));
        self.filter = match self.year_bounds {
            Some(bounds) => FilterState::initial(bounds, self.settings.year_window),
            None => FilterState {
                years: self.settings.year_window,
                journal: JournalFilter::All,
            },
        };
        self.table = Some(table);
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the view from the current filter. The only place render runs.
    pub fn refresh(&mut self) {
        self.view = self
            .table
            .as_ref()
            .map(|table| render(table, &self.filter, &self.settings));
    }

    /// Change the year range; rerenders only when it actually changed.
    pub fn set_year_range(&mut self, lo: i64, hi: i64) {
        let Some(bounds) = self.year_bounds else {
            return;
        };
        let before = self.filter.years;
        self.filter.set_years(lo, hi, bounds);
        if self.filter.years != before {
            self.refresh();
        }
    }

    /// Change the journal selection; rerenders only when it actually changed.
    pub fn set_journal(&mut self, journal: JournalFilter) {
        if self.filter.journal != journal {
            self.filter.journal = journal;
            self.refresh();
        }
    }

    /// Load and clean a different file, keeping the current table on failure.
    pub fn open_file(&mut self, path: &Path) {
        match load_file(path) {
            Ok(raw) => {
                let cleaned = clean(&raw, &self.settings.clean_options());
                log::info!(
                    "Loaded {} papers with columns {:?}",
                    cleaned.table.n_rows(),
                    cleaned.table.column_names()
                );
                self.set_table(cleaned.table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn table() -> Table {
        Table::new(vec![
            Column::infer(
                "publication_year",
                [2018, 2020, 2021, 2020]
                    .into_iter()
                    .map(CellValue::Integer)
                    .collect(),
            ),
            Column::infer(
                "journal",
                ["BMJ", "Lancet", "BMJ", "Cell"]
                    .into_iter()
                    .map(|s| CellValue::String(s.into()))
                    .collect(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn set_table_applies_default_window() {
        let mut state = AppState::new(Settings::default());
        state.set_table(table());
        assert_eq!(state.year_bounds, Some((2018, 2021)));
        assert_eq!(state.filter.years, (2019, 2021));
        assert_eq!(state.journal_options, vec!["All", "BMJ", "Cell", "Lancet"]);
        assert_eq!(state.view.as_ref().unwrap().row_count, 3);
    }

    #[test]
    fn filter_changes_rerender() {
        let mut state = AppState::new(Settings::default());
        state.set_table(table());
        state.set_journal(JournalFilter::Only("BMJ".into()));
        assert_eq!(state.view.as_ref().unwrap().row_count, 1);
        state.set_year_range(2018, 2021);
        assert_eq!(state.view.as_ref().unwrap().row_count, 2);
        state.set_year_range(2019, 2019);
        assert!(state.view.as_ref().unwrap().is_empty());
    }

    #[test]
    fn selecting_all_matches_no_journal_filter() {
        let mut state = AppState::new(Settings::default());
        state.set_table(table());
        let unfiltered = state.view.as_ref().unwrap().row_count;
        state.set_journal(JournalFilter::Only("Cell".into()));
        state.set_journal(JournalFilter::from_label("All"));
        assert_eq!(state.view.as_ref().unwrap().row_count, unfiltered);
    }

    #[test]
    fn failed_open_keeps_current_table() {
        let mut state = AppState::new(Settings::default());
        state.set_table(table());
        state.open_file(Path::new("no/such/file.csv"));
        assert!(state.table.is_some());
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
    }
}
