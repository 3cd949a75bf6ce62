//! Fixed file names consumed and produced by the pipeline.
//!
//! The benchmark harness, the analyzer, and the reporter rendezvous purely
//! through these names inside a results directory. Keep them in sync with
//! whatever produced the captures.

/// Timestamps recorded when each order acknowledgment arrived.
pub const ACKED_CAPTURE: &str = "order-acked-timestamps.dat";
/// Timestamps recorded just before each order-entry call.
pub const ENTRY_CAPTURE: &str = "order-entry-called-timestamps.dat";
/// Optional raw traffic capture. Not consumed by the statistics path.
pub const TRAFFIC_PCAP: &str = "traffic.pcap";

/// Per-row deltas of the entry series.
pub const ENTRY_DELTAS_CSV: &str = "order-entry-deltas.csv";
/// Per-row deltas of the acked series.
pub const ACKED_DELTAS_CSV: &str = "order-acked-deltas.csv";
/// Entry/ack timestamp pairs with their round-trip latency.
pub const ROUND_TRIP_CSV: &str = "round_trip-latencies.csv";

/// Summary statistics for the entry deltas.
pub const ENTRY_SUMMARY: &str = "order-entry-consolidated-results.json";
/// Summary statistics for the acked deltas.
pub const ACKED_SUMMARY: &str = "order-acked-consolidated-results.json";
/// Summary statistics for the round-trip latencies.
pub const ROUND_TRIP_SUMMARY: &str = "round-trip-consolidated-results.json";
/// Host hardware/software descriptors for the run.
pub const PLATFORM_SUMMARY: &str = "systemInfo.json";

/// Line plot of the entry deltas.
pub const ENTRY_PLOT: &str = "EntryDeltas.png";
/// Line plot of the acked deltas.
pub const ACKED_PLOT: &str = "AckedDeltas.png";
/// Line plot of the round-trip latencies.
pub const ROUND_TRIP_PLOT: &str = "RoundTrips.png";

/// Rendered report markup.
pub const REPORT_HTML: &str = "report.html";
/// Rendered report document.
pub const REPORT_PDF: &str = "report.pdf";
