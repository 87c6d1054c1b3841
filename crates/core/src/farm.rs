//! The same two-round encode scheduled on a rayon thread pool.
//!
//! Segments and offsets come from [`crate::segment`], so the output matches
//! the pool and sequential encoders byte for byte.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::codec::start_output;
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::metrics::{timed, NoopReporter, Reporter, Stage};
use crate::segment::{merge_frequencies, segment_offsets, segment_ranges, stitch};
use crate::serializer::encode_segment;
use crate::table::EncodingTable;

/// Parallel encoder backed by a dedicated rayon pool.
#[derive(Debug)]
pub struct FarmEncoder {
    pool: ThreadPool,
    workers: usize,
}

impl FarmEncoder {
    /// Build a rayon pool with `workers` threads.
    ///
    /// # Errors
    /// Returns `Error::Config` if `workers` is 0 or the pool cannot be built.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::Config("farm needs at least one worker".into()));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("huffpar-farm-{i}"))
            .build()
            .map_err(|e| Error::Config(format!("failed to build farm: {e}")))?;

        Ok(Self { pool, workers })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Encode `text`.
    pub fn encode(&self, text: &[u8]) -> Result<Vec<u8>> {
        self.encode_with(text, &mut NoopReporter)
    }

    /// Encode `text`, reporting stage timings.
    pub fn encode_with(&self, text: &[u8], reporter: &mut dyn Reporter) -> Result<Vec<u8>> {
        let ranges = segment_ranges(text.len(), self.workers);

        let parts: Vec<FrequencyTable> = timed(reporter, Stage::Frequencies, || {
            self.pool.install(|| {
                ranges
                    .par_iter()
                    .map(|range| FrequencyTable::from_bytes(&text[range.clone()]))
                    .collect()
            })
        });

        let (table, freqs) = timed(reporter, Stage::BuildTable, || {
            let freqs = merge_frequencies(&parts);
            (EncodingTable::from_frequencies(&freqs), freqs)
        });
        reporter.table_ready(table.len(), text.len() as u64);

        let mut out = timed(reporter, Stage::SerializeTable, || {
            start_output(&table, &freqs, text.len())
        });

        timed(reporter, Stage::EncodeText, || {
            let offsets = segment_offsets(&table, &parts);
            let segments = self.pool.install(|| {
                ranges
                    .par_iter()
                    .zip(offsets.par_iter())
                    .map(|(range, &offset)| encode_segment(&table, &text[range.clone()], offset))
                    .collect::<Result<Vec<_>>>()
            })?;

            for (segment, &offset) in segments.iter().zip(&offsets) {
                stitch(&mut out, &segment.bytes, offset);
            }
            Ok::<_, Error>(())
        })?;

        debug!(
            workers = self.workers,
            bytes = text.len(),
            output = out.len(),
            "farm encode finished"
        );
        Ok(out)
    }
}
