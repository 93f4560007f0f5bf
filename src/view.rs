use crate::config::Settings;
use crate::data::analysis::{summarize, Summary};
use crate::data::filter::{apply, FilterState, JournalFilter};
use crate::data::model::Table;

pub const NO_DATA_MESSAGE: &str = "No data found for the selected filter.";
pub const NO_TITLES_MESSAGE: &str = "No titles found for the selected filter.";

// ---------------------------------------------------------------------------
// DashboardView – everything the dashboard draws for one filter state
// ---------------------------------------------------------------------------

/// First rows of a table, stringified for display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Preview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Preview {
    pub fn of(table: &Table, n: usize) -> Self {
        let head = table.head(n);
        let headers = head.column_names().iter().map(|s| s.to_string()).collect();
        let rows = (0..head.n_rows())
            .map(|row| {
                head.columns()
                    .iter()
                    .map(|col| col.values[row].to_string())
                    .collect()
            })
            .collect();
        Preview { headers, rows }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewBody {
    /// The filter matched no rows.
    NoData,
    Charts(Summary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Selection the view was rendered for.
    pub years: (i64, i64),
    pub journal: JournalFilter,
    pub row_count: usize,
    pub body: ViewBody,
    pub preview: Preview,
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        matches!(self.body, ViewBody::NoData)
    }

    /// Title words of the filtered rows; `None` when there are none to show.
    pub fn words(&self) -> Option<&[(String, usize)]> {
        match &self.body {
            ViewBody::Charts(summary) => summary.words.as_deref().filter(|w| !w.is_empty()),
            ViewBody::NoData => None,
        }
    }
}

/// Filter the cleaned table and compute every dashboard output.
///
/// Pure: called whenever the filter state changes; load and clean never rerun here.
pub fn render(table: &Table, filter: &FilterState, settings: &Settings) -> DashboardView {
    let filtered = apply(table, filter, &settings.columns);
    let body = if filtered.is_empty() {
        ViewBody::NoData
    } else {
        ViewBody::Charts(summarize(&filtered, &settings.columns, settings.top_n))
    };
    log::debug!(
        "Rendered years {:?}, journal {}: {} rows",
        filter.years,
        filter.journal,
        filtered.n_rows()
    );
    DashboardView {
        years: filter.years,
        journal: filter.journal.clone(),
        row_count: filtered.n_rows(),
        body,
        preview: Preview::of(&filtered, settings.preview_rows),
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
                [2019, 2021, 2021].into_iter().map(CellValue::Integer).collect(),
            ),
            Column::infer(
                "title",
                ["Covid Spread Model", "covid vaccine trial", "Masks"]
                    .into_iter()
                    .map(|s| CellValue::String(s.into()))
                    .collect(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn empty_selection_shows_no_data() {
        let filter = FilterState {
            years: (2020, 2020),
            journal: JournalFilter::All,
        };
        let view = render(&table(), &filter, &Settings::default());
        assert!(view.is_empty());
        assert_eq!(view.years, (2020, 2020));
        assert_eq!(view.journal, JournalFilter::All);
        assert_eq!(view.row_count, 0);
        assert!(view.preview.rows.is_empty());
        assert_eq!(view.preview.headers.len(), 2);
    }

    #[test]
    fn charts_cover_only_selected_years() {
        let filter = FilterState {
            years: (2021, 2021),
            journal: JournalFilter::All,
        };
        let view = render(&table(), &filter, &Settings::default());
        let ViewBody::Charts(summary) = &view.body else {
            panic!("expected charts");
        };
        assert_eq!(summary.years.as_deref(), Some(&[(2021, 2)][..]));
        assert_eq!(view.words().unwrap()[0], ("covid".to_string(), 1));
        assert_eq!(view.preview.rows[0][1], "covid vaccine trial");
    }

    #[test]
    fn preview_is_limited_to_configured_rows() {
        let filter = FilterState {
            years: (2019, 2021),
            journal: JournalFilter::All,
        };
        let settings = Settings {
            preview_rows: 2,
            ..Settings::default()
        };
        let view = render(&table(), &filter, &settings);
        assert_eq!(view.row_count, 3);
        assert_eq!(view.preview.rows.len(), 2);
    }
}
