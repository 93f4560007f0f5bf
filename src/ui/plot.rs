use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::state::AppState;
use crate::view::{Preview, ViewBody, NO_DATA_MESSAGE, NO_TITLES_MESSAGE};

pub const DASHBOARD_TITLE: &str = "COVID-19 Data Archive";
pub const DASHBOARD_DESCRIPTION: &str = "Simple exploration of COVID-19 research papers";

const CHART_HEIGHT: f32 = 220.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Draw the cached view. Nothing here filters or aggregates.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    ui.heading(DASHBOARD_TITLE);
    ui.label(DASHBOARD_DESCRIPTION);
    ui.separator();

    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore papers  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.label(format!(
                "Showing {} - {}, journal: {}",
                view.years.0, view.years.1, view.journal
            ));
            ui.label(format!(
                "Number of papers in filtered data: {}",
                view.row_count
            ));

            match &view.body {
                ViewBody::NoData => {
                    ui.label(RichText::new(NO_DATA_MESSAGE).strong());
                }
                ViewBody::Charts(summary) => {
                    if let Some(years) = &summary.years {
                        year_chart(ui, years);
                    }
                    if let Some(sources) = &summary.sources {
                        count_bars(
                            ui,
                            "source_counts",
                            "Papers by source",
                            sources,
                            state.source_colors.as_ref(),
                        );
                    }
                    if let Some(journals) = &summary.journals {
                        count_bars(ui, "journal_counts", "Top journals", journals, None);
                    }

                    ui.strong("Most common words in titles:");
                    match view.words() {
                        Some(words) => word_list(ui, words),
                        None => {
                            ui.label(NO_TITLES_MESSAGE);
                        }
                    }
                }
            }

            ui.separator();
            ui.strong("Sample of the cleaned data:");
            preview_table(ui, &view.preview);
        });
}

fn year_chart(ui: &mut Ui, years: &[(i64, usize)]) {
    ui.strong("Papers per year");
    let coords: Vec<[f64; 2]> = years
        .iter()
        .map(|&(year, n)| [year as f64, n as f64])
        .collect();
    let line: PlotPoints = coords.iter().copied().collect();
    let markers: PlotPoints = coords.iter().copied().collect();

    Plot::new("year_counts")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Papers")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(line).name("papers").width(2.0));
            plot_ui.points(Points::new(markers).radius(3.0));
        });
}

/// Vertical bar chart with the category labels on the x axis.
fn count_bars(
    ui: &mut Ui,
    id: &str,
    title: &str,
    counts: &[(String, usize)],
    colors: Option<&ColorMap>,
) {
    ui.strong(title);
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (label, n))| {
            let bar = Bar::new(i as f64, *n as f64).name(label).width(0.7);
            match colors {
                Some(map) => bar.fill(map.color_for(label)),
                None => bar,
            }
        })
        .collect();
    let labels: Vec<String> = counts.iter().map(|(label, _)| label.clone()).collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .y_axis_label("Papers")
        .x_axis_formatter(move |mark, _range| {
            let r = mark.value.round();
            if (mark.value - r).abs() > 1e-6 || r < 0.0 {
                return String::new();
            }
            labels.get(r as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(title));
        });
}

fn word_list(ui: &mut Ui, words: &[(String, usize)]) {
    egui::Grid::new("top_words")
        .striped(true)
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.strong("word");
            ui.strong("count");
            ui.end_row();
            for (word, count) in words {
                ui.label(word);
                ui.label(count.to_string());
                ui.end_row();
            }
        });
}

fn preview_table(ui: &mut Ui, preview: &Preview) {
    if preview.headers.is_empty() {
        ui.label("(no columns)");
        return;
    }
    ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(
                    TableColumn::auto().at_least(60.0).clip(true),
                    preview.headers.len(),
                )
                .header(20.0, |mut header| {
                    for name in &preview.headers {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for row in &preview.rows {
                        body.row(18.0, |mut table_row| {
                            for cell in row {
                                table_row.col(|ui| {
                                    ui.label(cell);
                                });
                            }
                        });
                    }
                });
        });
}
