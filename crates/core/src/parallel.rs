//! Two-round map-reduce encoder on a [`WorkerPool`].
//!
//! Round 1 counts symbol frequencies per segment. The coordinator merges the
//! counts, builds the table, writes the header and computes each segment's
//! starting bit offset. Round 2 bit-packs every segment at its offset, and the
//! coordinator stitches the results in segment order.
//!
//! The pool lives as long as the encoder, so one encoder serves any number
//! of texts without respawning threads.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::codec::start_output;
use crate::error::Result;
use crate::frequency::FrequencyTable;
use crate::metrics::{timed, NoopReporter, Reporter, Stage};
use crate::pool::{TaskHandle, WorkerPool};
use crate::segment::{merge_frequencies, segment_offsets, segment_ranges, stitch};
use crate::serializer::{encode_segment, EncodedSegment};
use crate::table::EncodingTable;

/// Parallel encoder that owns its worker pool.
#[derive(Debug)]
pub struct ParallelEncoder {
    pool: WorkerPool,
}

impl ParallelEncoder {
    /// Start an encoder with `workers` threads.
    ///
    /// # Errors
    /// Returns `Error::Config` if `workers` is 0.
    pub fn new(workers: usize) -> Result<Self> {
        Ok(Self {
            pool: WorkerPool::new(workers)?,
        })
    }

    /// Number of workers.
    pub fn workers(&self) -> usize {
        self.pool.len()
    }

    /// Encode `text`. Output is identical to [`crate::encode`].
    pub fn encode(&self, text: &[u8]) -> Result<Vec<u8>> {
        self.encode_with(text, &mut NoopReporter)
    }

    /// Encode `text`, reporting stage timings.
    pub fn encode_with(&self, text: &[u8], reporter: &mut dyn Reporter) -> Result<Vec<u8>> {
        let workers = self.workers();
        let ranges = segment_ranges(text.len(), workers);
        // Tasks must be 'static, so the workers share one copy of the text.
        let shared: Arc<[u8]> = Arc::from(text);

        let parts = timed(reporter, Stage::Frequencies, || {
            let handles = ranges
                .iter()
                .enumerate()
                .map(|(worker, range)| {
                    let text = Arc::clone(&shared);
                    let range = range.clone();
                    self.pool
                        .submit(worker, move || FrequencyTable::from_bytes(&text[range]))
                })
                .collect::<Result<Vec<_>>>()?;
            wait_all(handles)
        })?;

        let (table, freqs) = timed(reporter, Stage::BuildTable, || {
            let freqs = merge_frequencies(&parts);
            (Arc::new(EncodingTable::from_frequencies(&freqs)), freqs)
        });
        reporter.table_ready(table.len(), text.len() as u64);

        let mut out = timed(reporter, Stage::SerializeTable, || {
            start_output(&table, &freqs, text.len())
        });

        timed(reporter, Stage::EncodeText, || {
            let offsets = segment_offsets(&table, &parts);
            trace!(?offsets, "segment offsets");

            let handles = ranges
                .iter()
                .zip(&offsets)
                .enumerate()
                .map(|(worker, (range, &offset))| {
                    let text = Arc::clone(&shared);
                    let table = Arc::clone(&table);
                    let range = range.clone();
                    self.pool.submit(worker, move || {
                        encode_segment(&table, &text[range], offset)
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let segments = wait_all(handles)?
                .into_iter()
                .collect::<Result<Vec<EncodedSegment>>>()?;
            for (segment, &offset) in segments.iter().zip(&offsets) {
                stitch(&mut out, &segment.bytes, offset);
            }
            Ok::<_, crate::Error>(())
        })?;

        debug!(workers, bytes = text.len(), output = out.len(), "pool encode finished");
        Ok(out)
    }
}

/// Wait for every handle before reporting the first failure, so no task of
/// this round is still running when the caller moves on.
fn wait_all<R>(handles: Vec<TaskHandle<R>>) -> Result<Vec<R>> {
    let results: Vec<Result<R>> = handles.into_iter().map(TaskHandle::wait).collect();
    results.into_iter().collect()
}
