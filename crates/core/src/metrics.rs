//! Stage timing and size metrics.
//!
//! Encoding and decoding report how long each stage took through a
//! [`Reporter`] passed in by the caller. Nothing is global: a caller that does
//! not care passes [`NoopReporter`].
//!
//! # Thread Safety
//!
//! Reporters are only called from the coordinating thread, never from
//! workers, so `&mut self` is enough.

use std::fmt;
use std::time::{Duration, Instant};

/// A timed step of encoding or decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Counting symbol frequencies (round 1 on the parallel paths)
    Frequencies,
    /// Building the Huffman tree and encoding table
    BuildTable,
    /// Writing the table and symbol-count header
    SerializeTable,
    /// Bit-packing the text (round 2 and stitching on the parallel paths)
    EncodeText,
    /// Parsing the header and rebuilding the decode tree
    ParseTable,
    /// Walking the decode tree over the payload
    DecodeText,
}

impl Stage {
    /// Number of stages.
    pub const COUNT: usize = 6;

    /// All stages in pipeline order.
    pub const ALL: [Stage; Stage::COUNT] = [
        Stage::Frequencies,
        Stage::BuildTable,
        Stage::SerializeTable,
        Stage::EncodeText,
        Stage::ParseTable,
        Stage::DecodeText,
    ];

    /// Short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Frequencies => "frequencies",
            Stage::BuildTable => "build table",
            Stage::SerializeTable => "serialize table",
            Stage::EncodeText => "encode text",
            Stage::ParseTable => "parse table",
            Stage::DecodeText => "decode text",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives stage timings from the codec.
pub trait Reporter {
    /// Called once per completed stage.
    fn record(&mut self, stage: Stage, elapsed: Duration);

    /// Called once the table is known, with its size and the symbol count.
    fn table_ready(&mut self, _distinct_symbols: usize, _symbols: u64) {}
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn record(&mut self, _stage: Stage, _elapsed: Duration) {}
}

/// Run `f` and report its duration under `stage`.
pub(crate) fn timed<T>(reporter: &mut dyn Reporter, stage: Stage, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let value = f();
    reporter.record(stage, start.elapsed());
    value
}

/// Timing and size metrics for one run.
#[derive(Debug, Clone)]
pub struct Metrics {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    /// Accumulated time per stage, indexed by `Stage`
    stage_times: [Duration; Stage::COUNT],

    // === Sizes ===
    /// Bytes handed to the codec
    pub input_bytes: u64,

    /// Bytes produced by the codec
    pub output_bytes: u64,

    /// Distinct symbols in the table
    pub distinct_symbols: usize,

    /// Number of symbols encoded or decoded
    pub symbols: u64,

    /// Workers used (1 for the sequential path)
    pub workers: usize,
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            stage_times: [Duration::ZERO; Stage::COUNT],
            input_bytes: 0,
            output_bytes: 0,
            distinct_symbols: 0,
            symbols: 0,
            workers: 1,
        }
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Time spent in `stage`.
    pub fn stage_time(&self, stage: Stage) -> Duration {
        self.stage_times[stage.index()]
    }

    /// Sum of all stage times.
    pub fn codec_time(&self) -> Duration {
        self.stage_times.iter().sum()
    }

    /// Compute compression ratio (output / input) of an encode run.
    ///
    /// Returns 0.0 if no input.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            self.output_bytes as f64 / self.input_bytes as f64
        }
    }

    /// Compute throughput in MiB/s over the codec stages.
    pub fn throughput_mib_s(&self) -> f64 {
        let secs = self.codec_time().as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            (self.input_bytes as f64 / (1024.0 * 1024.0)) / secs
        }
    }

    /// Render a human-readable summary.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Metrics Summary ===\n");
        out.push_str(&format!("Workers:          {}\n", self.workers));
        out.push_str(&format!("Input:            {} bytes\n", self.input_bytes));
        out.push_str(&format!("Output:           {} bytes\n", self.output_bytes));
        out.push_str(&format!("Symbols:          {}\n", self.symbols));
        out.push_str(&format!("Distinct symbols: {}\n", self.distinct_symbols));
        out.push_str(&format!("Ratio:            {:.3}\n", self.compression_ratio()));
        out.push_str("\n=== Stage Timings ===\n");
        for stage in Stage::ALL {
            let elapsed = self.stage_time(stage);
            if !elapsed.is_zero() {
                out.push_str(&format!("{:<17} {:>10.3} ms\n", stage.name(), millis(elapsed)));
            }
        }
        out.push_str(&format!("{:<17} {:>10.3} ms\n", "total", millis(self.duration())));
        out
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for Metrics {
    fn record(&mut self, stage: Stage, elapsed: Duration) {
        self.stage_times[stage.index()] += elapsed;
    }

    fn table_ready(&mut self, distinct_symbols: usize, symbols: u64) {
        self.distinct_symbols = distinct_symbols;
        self.symbols = symbols;
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.input_bytes, 0);
        assert_eq!(metrics.codec_time(), Duration::ZERO);
        assert!(metrics.end_time.is_none());
    }

    #[test]
    fn test_record_accumulates() {
        let mut metrics = Metrics::new();
        metrics.record(Stage::EncodeText, Duration::from_millis(3));
        metrics.record(Stage::EncodeText, Duration::from_millis(4));
        metrics.record(Stage::BuildTable, Duration::from_millis(1));

        assert_eq!(metrics.stage_time(Stage::EncodeText), Duration::from_millis(7));
        assert_eq!(metrics.codec_time(), Duration::from_millis(8));
    }

    #[test]
    fn test_compression_ratio() {
        let mut metrics = Metrics::new();
        assert_eq!(metrics.compression_ratio(), 0.0);

        metrics.input_bytes = 1000;
        metrics.output_bytes = 250;
        assert_eq!(metrics.compression_ratio(), 0.25);
    }

    #[test]
    fn test_timed_reports() {
        let mut metrics = Metrics::new();
        let value = timed(&mut metrics, Stage::Frequencies, || {
            std::thread::sleep(Duration::from_millis(2));
            11
        });
        assert_eq!(value, 11);
        assert!(metrics.stage_time(Stage::Frequencies) >= Duration::from_millis(2));
        assert!(metrics.stage_time(Stage::DecodeText).is_zero());
    }

    #[test]
    fn test_summary_lists_used_stages() {
        let mut metrics = Metrics::new();
        metrics.input_bytes = 10;
        metrics.record(Stage::ParseTable, Duration::from_millis(2));
        metrics.complete();

        let summary = metrics.summary();
        assert!(summary.contains("parse table"));
        assert!(!summary.contains("encode text"));
        assert!(summary.contains("total"));
    }
}
