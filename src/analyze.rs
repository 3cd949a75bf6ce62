//! Analysis pipeline: captures in, artifacts out.
//!
//! Single-threaded, single-pass batch execution. Artifact ordering is
//! enforced purely by invocation order: every table, summary, and plot is on
//! disk before the relocation step runs.
//!
//! Plot axes are labeled in ticks: the pipeline never converts counter
//! samples to wall time, so labeling them `ms` (as earlier report tooling
//! did) would misstate the unit.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::capture::TimestampSeries;
use crate::error::AnalysisError;
use crate::export;
use crate::files;
use crate::platform::PlatformInfo;
use crate::stats::{self, LatencyStatistics};

/// Driver for one analysis run over a results directory.
#[derive(Debug)]
pub struct Analyzer {
    results_dir: PathBuf,
    output_dir: PathBuf,
    entry_path: PathBuf,
    acked_path: PathBuf,
}

impl Analyzer {
    /// Bind the analyzer to a results directory and an output directory.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::MissingInput`] if either capture file is absent.
    pub fn new(results_dir: &Path, output_dir: &Path) -> Result<Self, AnalysisError> {
        let acked_path = results_dir.join(files::ACKED_CAPTURE);
        if !acked_path.is_file() {
            return Err(AnalysisError::MissingInput {
                what: "timestamps file for acked orders",
                path: acked_path,
            });
        }
        let entry_path = results_dir.join(files::ENTRY_CAPTURE);
        if !entry_path.is_file() {
            return Err(AnalysisError::MissingInput {
                what: "timestamps file for entry orders",
                path: entry_path,
            });
        }

        Ok(Self {
            results_dir: results_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            entry_path,
            acked_path,
        })
    }

    /// Run the full pipeline: acked deltas, entry deltas, round trips,
    /// platform metadata, then artifact relocation.
    pub fn run(&self) -> Result<(), AnalysisError> {
        let acked = TimestampSeries::parse_file(&self.acked_path)?;
        let entry = TimestampSeries::parse_file(&self.entry_path)?;
        tracing::info!(
            acked = acked.len(),
            entry = entry.len(),
            "captures decoded"
        );

        self.process_series(
            &acked,
            "ACKED",
            "Acked Deltas",
            files::ACKED_DELTAS_CSV,
            files::ACKED_SUMMARY,
            files::ACKED_PLOT,
        )?;
        self.process_series(
            &entry,
            "ENTRY",
            "Entry Deltas",
            files::ENTRY_DELTAS_CSV,
            files::ENTRY_SUMMARY,
            files::ENTRY_PLOT,
        )?;
        self.process_round_trip(&entry, &acked)?;

        PlatformInfo::collect().save(&self.results_dir.join(files::PLATFORM_SUMMARY))?;

        let moved = export::collect_artifacts(&self.results_dir, &self.output_dir)?;
        tracing::info!(moved, output = %self.output_dir.display(), "artifacts relocated");
        Ok(())
    }

    /// Deltas for one capture: CSV table, summary document, line plot.
    fn process_series(
        &self,
        series: &TimestampSeries,
        label: &str,
        plot_title: &str,
        csv_name: &str,
        summary_name: &str,
        plot_name: &str,
    ) -> Result<LatencyStatistics, AnalysisError> {
        let deltas = stats::deltas(series)?;
        let summary = stats::summarize(series.method(), series.cpu_frequency_hz(), &deltas)?;
        print_statistics(label, &summary);

        export::write_delta_csv(series, &deltas, &self.results_dir.join(csv_name))?;
        export::write_summary_json(&summary, &self.results_dir.join(summary_name))?;
        export::plot_series(
            &deltas,
            plot_title,
            "Deltas",
            "Ticks",
            &self.results_dir.join(plot_name),
        )?;
        Ok(summary)
    }

    /// Round trips across the entry/acked pair: CSV, summary, plot.
    fn process_round_trip(
        &self,
        entry: &TimestampSeries,
        acked: &TimestampSeries,
    ) -> Result<LatencyStatistics, AnalysisError> {
        let round_trips = stats::round_trip(entry, acked);
        let summary = stats::summarize(entry.method(), entry.cpu_frequency_hz(), &round_trips)?;
        print_statistics("ROUND TRIP", &summary);

        export::write_round_trip_csv(
            entry,
            acked,
            &round_trips,
            &self.results_dir.join(files::ROUND_TRIP_CSV),
        )?;
        export::write_summary_json(&summary, &self.results_dir.join(files::ROUND_TRIP_SUMMARY))?;
        export::plot_series(
            &round_trips,
            "Round Trip",
            "Time Stamp Latencies",
            "Latencies",
            &self.results_dir.join(files::ROUND_TRIP_PLOT),
        )?;
        Ok(summary)
    }
}

/// Echo one statistics record to the terminal.
fn print_statistics(label: &str, stats: &LatencyStatistics) {
    println!(
        "{} {} ({})",
        "**".bold(),
        label.bold(),
        stats.method.cyan()
    );
    println!("   min:       {}", stats.min.to_string().green());
    println!("   max:       {}", stats.max.to_string().red());
    println!("   avg:       {:.3}", stats.avg);
    println!("   median:    {:.3}", stats.median);
    println!("   deviation: {:.3}", stats.deviation);
    tracing::info!(
        label,
        min = stats.min,
        max = stats.max,
        avg = stats.avg,
        median = stats.median,
        deviation = stats.deviation,
        "statistics computed"
    );
}
