//! # gwbench
//!
//! Post-hoc latency analysis for trading-gateway benchmark runs.
//!
//! A benchmark run leaves behind binary timestamp captures recorded around
//! order entry and acknowledgment. This crate decodes them, derives delta
//! and round-trip latency series, computes summary statistics, exports
//! CSV tables / JSON summaries / PNG plots, and assembles the results plus
//! host metadata into an HTML + PDF report.
//!
//! Everything runs after the fact on archived files, single-threaded and
//! single-pass; any malformed input or missing artifact aborts the run.
//!
//! ## Pipeline
//!
//! ```text
//! capture files -> TimestampSeries -> deltas / round trips -> statistics
//!              -> CSV + JSON + PNG artifacts -> output directory -> report
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use gwbench::analyze::Analyzer;
//!
//! # fn main() -> Result<(), gwbench::error::AnalysisError> {
//! let analyzer = Analyzer::new(Path::new("results"), Path::new("out"))?;
//! analyzer.run()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analyze;
pub mod capture;
pub mod error;
pub mod export;
pub mod files;
pub mod pcap;
pub mod platform;
pub mod report;
pub mod stats;

pub use analyze::Analyzer;
pub use capture::TimestampSeries;
pub use error::{AnalysisError, EmptySeriesError, FormatError};
pub use platform::{CpuModelProbe, PlatformInfo};
pub use report::{PdfConverter, Report, Reporter, WkhtmltopdfConverter};
pub use stats::LatencyStatistics;
