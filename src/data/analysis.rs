use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use super::model::Table;
use crate::config::ColumnNames;

/// `(label, count)` pairs in display order.
pub type Counts = Vec<(String, usize)>;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("Invalid regex pattern"));

/// Papers per year, ascending by year. Non-integer and missing cells are skipped.
pub fn year_counts(table: &Table, column: &str) -> Option<Vec<(i64, usize)>> {
    let column = table.column(column)?;
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for year in column.present().filter_map(|v| v.as_i64()) {
        *counts.entry(year).or_default() += 1;
    }
    Some(counts.into_iter().collect())
}

/// Occurrences of each distinct value, by descending count. Ties keep the
/// order in which values first appear in the table.
pub fn value_counts(table: &Table, column: &str) -> Option<Counts> {
    let column = table.column(column)?;
    Some(rank(column.present().map(|v| v.to_string())))
}

/// The `n` most frequent values of a column.
pub fn top_values(table: &Table, column: &str, n: usize) -> Option<Counts> {
    let mut counts = value_counts(table, column)?;
    counts.truncate(n);
    Some(counts)
}

/// The `n` most frequent lowercase words across all present cells of a
/// text column. A word is a maximal run of letters, digits and underscores.
pub fn word_frequencies(table: &Table, column: &str, n: usize) -> Option<Counts> {
    let column = table.column(column)?;
    let mut words = Vec::new();
    for title in column.present() {
        let lowered = title.to_string().to_lowercase();
        words.extend(WORD.find_iter(&lowered).map(|m| m.as_str().to_string()));
    }
    let mut counts = rank(words.into_iter());
    counts.truncate(n);
    Some(counts)
}

/// Count items and sort by descending count; the sort is stable over
/// first-seen order.
fn rank(items: impl Iterator<Item = String>) -> Counts {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Counts = Vec::new();
    for item in items {
        match index.get(&item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item.clone(), counts.len());
                counts.push((item, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// ---------------------------------------------------------------------------
// Summary – every aggregate view of one table
// ---------------------------------------------------------------------------

/// All aggregate views of a table. A view is `None` when its column is absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    pub years: Option<Vec<(i64, usize)>>,
    pub journals: Option<Counts>,
    pub sources: Option<Counts>,
    pub words: Option<Counts>,
}

pub fn summarize(table: &Table, columns: &ColumnNames, top_n: usize) -> Summary {
    Summary {
        years: year_counts(table, &columns.publication_year),
        journals: top_values(table, &columns.journal, top_n),
        sources: value_counts(table, &columns.source),
        words: word_frequencies(table, &columns.title, top_n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn text_column(name: &str, values: &[&str]) -> Column {
        Column::infer(
            name,
            values.iter().map(|s| CellValue::String(s.to_string())).collect(),
        )
    }

    #[test]
    fn year_counts_ascend_over_distinct_years() {
        let table = Table::new(vec![Column::infer(
            "publication_year",
            [2021, 2019, 2020, 2021, 2019]
                .into_iter()
                .map(CellValue::Integer)
                .collect(),
        )])
        .unwrap();
        let years = year_counts(&table, "publication_year").unwrap();
        assert_eq!(years, vec![(2019, 2), (2020, 1), (2021, 2)]);
        assert!(years.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn value_counts_break_ties_by_first_appearance() {
        let table = Table::new(vec![text_column(
            "journal",
            &["Cell", "BMJ", "Lancet", "BMJ", "Cell", "Nature"],
        )])
        .unwrap();
        let counts = value_counts(&table, "journal").unwrap();
        assert_eq!(
            counts,
            vec![
                ("Cell".to_string(), 2),
                ("BMJ".to_string(), 2),
                ("Lancet".to_string(), 1),
                ("Nature".to_string(), 1)
            ]
        );
    }

    #[test]
    fn top_values_never_exceed_n() {
        let names: Vec<String> = (0..25).map(|i| format!("J{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let table = Table::new(vec![text_column("journal", &refs)]).unwrap();
        let top = top_values(&table, "journal", 10).unwrap();
        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn words_are_case_folded_and_counted() {
        let table = Table::new(vec![text_column(
            "title",
            &["Covid Spread Model", "covid vaccine trial"],
        )])
        .unwrap();
        let words = word_frequencies(&table, "title", 10).unwrap();
        assert_eq!(words[0], ("covid".to_string(), 2));
        assert_eq!(words[1], ("spread".to_string(), 1));
        assert_eq!(words.len(), 5);
    }

    #[test]
    fn punctuation_separates_words() {
        let table = Table::new(vec![text_column(
            "title",
            &["SARS-CoV-2: a review", "covid_19 (update)"],
        )])
        .unwrap();
        let words: Vec<String> = word_frequencies(&table, "title", 10)
            .unwrap()
            .into_iter()
            .map(|(w, _)| w)
            .collect();
        assert_eq!(words, vec!["sars", "cov", "2", "a", "review", "covid_19", "update"]);
    }

    #[test]
    fn missing_titles_are_skipped() {
        let table = Table::new(vec![Column::infer(
            "title",
            vec![CellValue::Null, CellValue::String("Hello".into())],
        )])
        .unwrap();
        assert_eq!(
            word_frequencies(&table, "title", 10).unwrap(),
            vec![("hello".to_string(), 1)]
        );
    }

    #[test]
    fn absent_columns_yield_no_view() {
        let table = Table::new(vec![text_column("title", &["a"])]).unwrap();
        let summary = summarize(&table, &ColumnNames::default(), 10);
        assert!(summary.years.is_none());
        assert!(summary.journals.is_none());
        assert!(summary.sources.is_none());
        assert!(summary.words.is_some());
    }
}
