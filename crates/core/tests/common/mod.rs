//! Deterministic test corpora.
//!
//! Generated data mixes runs of one byte, text-like data over a small
//! alphabet, short repeating patterns and random bytes, so trees get both
//! shallow and deep codes.

#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generate `size_bytes` of mixed-compressibility data from `seed`.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let chunk_size = (size_bytes - data.len()).min(4096);

        match rng.gen_range(0..10u8) {
            // runs of the same byte
            0..=2 => {
                let byte: u8 = rng.gen();
                data.extend(std::iter::repeat(byte).take(chunk_size));
            }
            // limited alphabet
            3..=5 => {
                let alphabet = b"abcdefghijklmnopqrstuvwxyz .!,\n";
                data.extend((0..chunk_size).map(|_| alphabet[rng.gen_range(0..alphabet.len())]));
            }
            // repeating pattern
            6..=7 => {
                let len = rng.gen_range(4..=32);
                let pattern: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
                data.extend(pattern.iter().cycle().take(chunk_size));
            }
            _ => data.extend((0..chunk_size).map(|_| rng.gen::<u8>())),
        }
    }

    data
}

/// Text whose frequencies follow the Fibonacci sequence, which gives the
/// deepest possible tree for its alphabet size.
pub fn fibonacci_text(symbols: usize) -> Vec<u8> {
    let (mut a, mut b) = (1usize, 1usize);
    let mut text = Vec::new();
    for symbol in 0..symbols {
        text.extend(std::iter::repeat(symbol as u8).take(a));
        (a, b) = (b, a + b);
    }
    text
}
