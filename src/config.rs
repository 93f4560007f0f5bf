use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::clean::CleanOptions;

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "paper-explorer.toml";

/// Names of the metadata columns the analysis and dashboard read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub title: String,
    pub journal: String,
    pub source: String,
    pub publication_date: String,
    pub publication_year: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            title: "title".to_string(),
            journal: "journal".to_string(),
            source: "source".to_string(),
            publication_date: "publication_date".to_string(),
            publication_year: "publication_year".to_string(),
        }
    }
}

/// Run settings. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_path: PathBuf,
    pub chart_dir: PathBuf,
    /// Entries kept in the journal and word rankings.
    pub top_n: usize,
    /// Rows shown in the dashboard preview.
    pub preview_rows: usize,
    /// Year written where the publication date cannot be parsed.
    pub default_year: i64,
    /// Initial dashboard year range, clamped to the data.
    pub year_window: (i64, i64),
    /// Columns normalized to calendar dates.
    pub date_columns: Vec<String>,
    pub columns: ColumnNames,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("metadata.csv.zip"),
            chart_dir: PathBuf::from("charts"),
            top_n: 10,
            preview_rows: 5,
            default_year: 2020,
            year_window: (2019, 2024),
            date_columns: vec!["release_date".to_string(), "last_modified".to_string()],
            columns: ColumnNames::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from [`DEFAULT_CONFIG_FILE`] when it
    /// exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let settings = Self::from_toml_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn clean_options(&self) -> CleanOptions {
        CleanOptions {
            date_columns: self.date_columns.clone(),
            publication_date: self.columns.publication_date.clone(),
            publication_year: self.columns.publication_year.clone(),
            default_year: self.default_year,
        }
    }
}
