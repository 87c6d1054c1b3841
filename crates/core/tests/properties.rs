//! Property tests for the codec.

mod common;

use huffpar_core::{
    decode, encode, encode_parallel, encode_with, EncodingTable, FrequencyTable, NoopReporter,
    Strategy as EncodeStrategy,
};
use proptest::prelude::*;

fn text() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..2048),
        prop::collection::vec(prop::sample::select(b"abcde".to_vec()), 0..2048),
        (any::<u64>(), 0usize..20_000).prop_map(|(seed, len)| common::generate_sample_data(seed, len)),
    ]
}

proptest! {
    #[test]
    fn test_round_trip(text in text()) {
        let encoded = encode(&text)?;
        prop_assert_eq!(decode(&encoded)?, text);
    }

    #[test]
    fn test_codes_are_prefix_free(text in text()) {
        let table = EncodingTable::from_bytes(&text);
        prop_assert!(table.is_prefix_free());
        prop_assert_eq!(table.len(), FrequencyTable::from_bytes(&text).distinct());
    }

    #[test]
    fn test_table_round_trip(text in text()) {
        let table = EncodingTable::from_bytes(&text);
        let mut bytes = table.serialize();
        // followed by a symbol-count header, as in a real payload
        bytes.extend_from_slice(&text.len().to_ne_bytes());

        let (parsed, consumed) = EncodingTable::deserialize(&bytes)?;
        prop_assert_eq!(consumed, table.serialized_len());
        prop_assert_eq!(parsed, table);
    }

    #[test]
    fn test_parallel_equals_sequential(text in text(), workers in prop::sample::select(vec![1usize, 2, 4, 8])) {
        let sequential = encode(&text)?;
        prop_assert_eq!(&encode_parallel(&text, workers)?, &sequential);
        let farm = encode_with(&text, EncodeStrategy::Farm { workers }, &mut NoopReporter)?;
        prop_assert_eq!(farm, sequential);
    }

    #[test]
    fn test_frequency_merge_commutes(a in text(), b in text()) {
        let fa = FrequencyTable::from_bytes(&a);
        let fb = FrequencyTable::from_bytes(&b);
        let joined: Vec<u8> = a.iter().chain(&b).copied().collect();

        let ab = fa.clone() + fb.clone();
        prop_assert_eq!(&ab, &(fb + fa));
        prop_assert_eq!(ab, FrequencyTable::from_bytes(&joined));
    }

    #[test]
    fn test_encoding_is_deterministic(text in text()) {
        prop_assert_eq!(encode(&text)?, encode(&text)?);
    }
}
