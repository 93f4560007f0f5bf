use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use paper_explorer::app::run_dashboard;
use paper_explorer::charts::write_static_charts;
use paper_explorer::cli::{Args, Command};
use paper_explorer::config::Settings;
use paper_explorer::data::analysis::summarize;
use paper_explorer::data::clean::{clean, Cleaned};
use paper_explorer::data::loader::{load_file, LoadError};
use paper_explorer::data::model::Table;
use paper_explorer::report::{write_chart_list, write_cleaning, write_overview, write_summary};
use paper_explorer::state::AppState;

fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(data) = args.data {
        settings.data_path = data;
    }
    if let Some(Command::Report(report)) = &args.command {
        if let Some(dir) = &report.chart_dir {
            settings.chart_dir = dir.clone();
        }
    }

    let raw = match load_file(&settings.data_path) {
        Ok(table) => table,
        Err(LoadError::NotFound(path)) => {
            eprintln!(
                "File not found. Please check the file path. ({})",
                path.display()
            );
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };
    let cleaned = clean(&raw, &settings.clean_options());

    match args.command {
        Some(Command::Report(report)) => run_report(&raw, &cleaned, &settings, !report.no_charts)?,
        Some(Command::Dashboard) => open_dashboard(cleaned.table, settings)?,
        None => {
            run_report(&raw, &cleaned, &settings, true)?;
            open_dashboard(cleaned.table, settings)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_report(raw: &Table, cleaned: &Cleaned, settings: &Settings, charts: bool) -> Result<()> {
    let summary = summarize(&cleaned.table, &settings.columns, settings.top_n);

    let mut out = io::stdout().lock();
    write_overview(&mut out, raw)?;
    write_cleaning(&mut out, cleaned, settings)?;
    write_summary(&mut out, &summary, settings)?;

    if charts {
        let written = write_static_charts(&summary, &settings.chart_dir)?;
        write_chart_list(&mut out, &settings.chart_dir, &written)?;
    }
    out.flush()?;
    Ok(())
}

fn open_dashboard(table: Table, settings: Settings) -> Result<()> {
    let mut state = AppState::new(settings);
    state.set_table(table);
    run_dashboard(state)
}
