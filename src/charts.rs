//! Static chart export to PNG (plotters bitmap backend).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use plotters::prelude::*;

use crate::color::rgb_palette;
use crate::data::analysis::Summary;

const SIZE: (u32, u32) = (1000, 600);

/// One chart to export: kind, title, axis labels and file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    PapersPerYear,
    TopJournals,
    TopWords,
    PapersBySource,
}

impl ChartKind {
    pub const ALL: [Self; 4] = [
        Self::PapersPerYear,
        Self::TopJournals,
        Self::TopWords,
        Self::PapersBySource,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::PapersPerYear => "papers_per_year.png",
            Self::TopJournals => "top_journals.png",
            Self::TopWords => "top_words.png",
            Self::PapersBySource => "papers_by_source.png",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::PapersPerYear => "Number of Papers Published Each Year",
            Self::TopJournals => "Top Journals Publishing COVID-19 Research",
            Self::TopWords => "Most Common Words in Titles",
            Self::PapersBySource => "Distribution of Paper Counts by Source",
        }
    }
}

/// Write one PNG per available aggregate into `dir`. Charts whose aggregate is
/// absent or empty are skipped; a chart that fails to render is logged and the
/// rest are still written. Returns the paths written.
pub fn write_static_charts(summary: &Summary, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating chart directory {}", dir.display()))?;

    let mut written = Vec::new();
    for kind in ChartKind::ALL {
        let path = dir.join(kind.file_name());
        let result = match kind {
            ChartKind::PapersPerYear => match summary.years.as_deref() {
                Some(years) if !years.is_empty() => write_line_chart(&path, kind.title(), years),
                _ => continue,
            },
            ChartKind::TopJournals => match summary.journals.as_deref() {
                Some(bars) if !bars.is_empty() => {
                    write_bar_chart(&path, kind.title(), "Number of Papers", bars)
                }
                _ => continue,
            },
            ChartKind::TopWords => match summary.words.as_deref() {
                Some(bars) if !bars.is_empty() => {
                    write_bar_chart(&path, kind.title(), "Frequency", bars)
                }
                _ => continue,
            },
            ChartKind::PapersBySource => match summary.sources.as_deref() {
                Some(bars) if !bars.is_empty() => {
                    write_bar_chart(&path, kind.title(), "Number of Papers", bars)
                }
                _ => continue,
            },
        };
        match result {
            Ok(()) => {
                log::info!("Wrote {}", path.display());
                written.push(path);
            }
            Err(e) => log::warn!("Skipping chart {}: {e:#}", path.display()),
        }
    }
    Ok(written)
}

/// Papers-per-year line chart with point markers.
pub fn write_line_chart(path: &Path, title: &str, points: &[(i64, usize)]) -> Result<()> {
    if points.is_empty() {
        bail!("No data to export");
    }
    let x_min = points.iter().map(|p| p.0).min().unwrap_or(0);
    let x_max = points.iter().map(|p| p.0).max().unwrap_or(0);
    let y_max = points.iter().map(|p| p.1).max().unwrap_or(0) as f64;

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(30)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (x_min as f64 - 0.5)..(x_max as f64 + 0.5),
            0.0..(y_max * 1.1).max(1.0),
        )?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Number of Papers")
        .x_label_formatter(&|x| format!("{x:.0}"))
        .draw()?;

    let (r, g, b) = rgb_palette(1)[0];
    let color = RGBColor(r, g, b);
    let series: Vec<(f64, f64)> = points.iter().map(|&(x, y)| (x as f64, y as f64)).collect();
    chart.draw_series(LineSeries::new(series.iter().copied(), color.stroke_width(2)))?;
    chart.draw_series(
        series
            .iter()
            .map(|&p| Circle::new(p, 4, color.filled())),
    )?;

    root.present()?;
    Ok(())
}

/// Horizontal bar chart, largest bar on top.
pub fn write_bar_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    bars: &[(String, usize)],
) -> Result<()> {
    if bars.is_empty() {
        bail!("No data to export");
    }
    let n = bars.len();
    let x_max = bars.iter().map(|b| b.1).max().unwrap_or(0) as f64;
    let label_width = bars
        .iter()
        .map(|b| b.0.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(4, 40) as u32
        * 8;

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    // Bar i sits at y = n - 1 - i so the first entry is drawn on top.
    let label_at = |y: &f64| -> String {
        let r = y.round();
        if (y - r).abs() > 1e-6 || r < 0.0 || r >= n as f64 {
            return String::new();
        }
        let idx = n - 1 - r as usize;
        let label = &bars[idx].0;
        if label.chars().count() > 40 {
            format!("{}…", label.chars().take(39).collect::<String>())
        } else {
            label.clone()
        }
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(30)
        .x_label_area_size(40)
        .y_label_area_size(label_width + 10)
        .build_cartesian_2d(0.0..(x_max * 1.05).max(1.0), -0.5..(n as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&label_at)
        .x_desc(x_desc)
        .draw()?;

    let palette = rgb_palette(n);
    chart.draw_series(bars.iter().enumerate().map(|(i, (_, count))| {
        let y = (n - 1 - i) as f64;
        let (r, g, b) = palette[i];
        Rectangle::new(
            [(0.0, y - 0.4), (*count as f64, y + 0.4)],
            RGBColor(r, g, b).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}
