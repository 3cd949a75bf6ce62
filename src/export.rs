//! Result export: CSV tables, summary documents, line plots, and artifact
//! relocation.
//!
//! Each operation is independent and idempotent per invocation: re-running
//! overwrites same-named outputs. No partial-file cleanup is performed on a
//! mid-write failure; the error propagates and the run aborts.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use crate::capture::TimestampSeries;
use crate::error::AnalysisError;
use crate::stats::LatencyStatistics;

/// Header of the per-series delta tables.
pub const DELTA_CSV_HEADER: &str = "TimeStamp,Delta";
/// Header of the round-trip table.
pub const ROUND_TRIP_CSV_HEADER: &str = "Entry ts,Ack ts,Delta";

/// File extensions recognized by [`collect_artifacts`].
const ARTIFACT_EXTENSIONS: [&str; 3] = ["png", "json", "csv"];

/// Write a series and its deltas as CSV.
///
/// First data row is `(samples[0], 0)` since the first sample has no
/// predecessor; each following row pairs `samples[i+1]` with `deltas[i]`.
/// Data row count therefore equals the sample count. Surplus deltas beyond
/// `len - 1` have no sample to pair with and are dropped.
pub fn write_delta_csv(
    series: &TimestampSeries,
    deltas: &[i64],
    path: &Path,
) -> Result<(), AnalysisError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", DELTA_CSV_HEADER)?;
    let samples = series.samples();
    if let Some(first) = samples.first() {
        writeln!(writer, "{},0", first)?;
    }
    for (sample, delta) in samples.iter().skip(1).zip(deltas) {
        writeln!(writer, "{},{}", sample, delta)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write entry/acked timestamp pairs with their round-trip latencies as CSV.
///
/// One row per index up to the shortest of the three inputs.
pub fn write_round_trip_csv(
    entry: &TimestampSeries,
    acked: &TimestampSeries,
    round_trips: &[i64],
    path: &Path,
) -> Result<(), AnalysisError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", ROUND_TRIP_CSV_HEADER)?;
    let rows = entry
        .samples()
        .iter()
        .zip(acked.samples())
        .zip(round_trips);
    for ((e, a), rt) in rows {
        writeln!(writer, "{},{},{}", e, a, rt)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write a statistics record as a pretty JSON summary document.
pub fn write_summary_json(stats: &LatencyStatistics, path: &Path) -> Result<(), AnalysisError> {
    let json =
        serde_json::to_string_pretty(stats).map_err(|e| AnalysisError::Render(e.to_string()))?;
    fs::write(path, json)?;
    Ok(())
}

/// Embedded typeface for plot captions and axis labels.
///
/// The bitmap backend ships no font of its own, so the face is compiled in
/// and registered once; plots render identically on hosts without any
/// installed fonts.
static SANS_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

fn ensure_plot_font() {
    static REGISTERED: OnceLock<()> = OnceLock::new();
    REGISTERED.get_or_init(|| {
        // Only fails on malformed font bytes; the embedded face is fixed.
        let _ = register_font("sans-serif", FontStyle::Normal, SANS_FONT);
    });
}

/// Render a numeric sequence as a PNG line plot.
pub fn plot_series(
    values: &[i64],
    title: &str,
    x_label: &str,
    y_label: &str,
    path: &Path,
) -> Result<(), AnalysisError> {
    ensure_plot_font();

    let root = BitMapBackend::new(path, (1024, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let y_min = values.iter().copied().min().unwrap_or(0);
    let y_max = values.iter().copied().max().unwrap_or(1);
    // Degenerate ranges (empty or constant series) still need a valid axis.
    let y_pad = ((y_max - y_min) / 20).max(1);
    let x_max = values.len().max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0..x_max, (y_min - y_pad)..(y_max + y_pad))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            values.iter().enumerate().map(|(i, &v)| (i, v)),
            &BLUE,
        ))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

fn plot_err(e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::Render(e.to_string())
}

/// Move every generated artifact from `work_dir` into `output_dir`.
///
/// A file counts as an artifact when its extension is `png`, `json`, or
/// `csv`; everything else (notably the `.dat` captures) is left untouched.
/// The output directory is created if absent. Returns the number of files
/// moved.
pub fn collect_artifacts(work_dir: &Path, output_dir: &Path) -> Result<usize, AnalysisError> {
    fs::create_dir_all(output_dir)?;

    let mut moved = 0;
    for entry in fs::read_dir(work_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let recognized = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ARTIFACT_EXTENSIONS.contains(&ext))
            .unwrap_or(false);
        if !recognized {
            continue;
        }

        let target = output_dir.join(entry.file_name());
        // Rename fails across filesystems; fall back to copy + remove.
        if fs::rename(&path, &target).is_err() {
            fs::copy(&path, &target)?;
            fs::remove_file(&path)?;
        }
        tracing::debug!(from = %path.display(), to = %target.display(), "moved artifact");
        moved += 1;
    }

    Ok(moved)
}
