//! Shared plumbing of the parallel encoders.
//!
//! Both parallel backends split the text the same way, compute the same
//! per-segment bit offsets and stitch results with the same rule, which is
//! what keeps their output identical to the sequential encoder.

use std::ops::Range;

use crate::frequency::FrequencyTable;
use crate::table::EncodingTable;

/// Split `len` symbols into `workers` contiguous segments.
///
/// Every segment but the last has `ceil(len / workers)` symbols; the last one
/// takes whatever remains. With more workers than symbols the trailing
/// segments are empty.
pub fn segment_ranges(len: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let size = (len + workers - 1) / workers;

    (0..workers)
        .map(|i| {
            let start = (i * size).min(len);
            let end = if i == workers - 1 {
                len
            } else {
                ((i + 1) * size).min(len)
            };
            start..end
        })
        .collect()
}

/// Bit offset at which each segment's output starts.
///
/// `offsets[0] = 0` and
/// `offsets[i] = (offsets[i - 1] + bits(segment i - 1)) % 8`, where a
/// segment's bit count comes from its frequency table and the code lengths.
pub fn segment_offsets(table: &EncodingTable, segments: &[FrequencyTable]) -> Vec<u8> {
    let mut offsets = Vec::with_capacity(segments.len());
    let mut offset = 0u8;
    for freqs in segments {
        offsets.push(offset);
        let bits = freqs.encoded_bits(table);
        offset = ((offset as u64 + bits) % 8) as u8;
    }
    offsets
}

/// Append a segment encoded at `offset` to `out`.
///
/// At offset 0 the bytes are appended as they are. Otherwise the first byte
/// shares its top `offset` bits with the current last byte of `out`, so it is
/// OR-merged into that byte and only the rest is appended.
pub fn stitch(out: &mut Vec<u8>, segment: &[u8], offset: u8) {
    let Some((&first, rest)) = segment.split_first() else {
        return;
    };

    match out.last_mut() {
        Some(last) if offset != 0 => {
            *last |= first;
            out.extend_from_slice(rest);
        }
        _ => out.extend_from_slice(segment),
    }
}

/// Merge partial frequency tables.
pub fn merge_frequencies(parts: &[FrequencyTable]) -> FrequencyTable {
    parts.iter().sum()
}
