//! Property-based tests for the codec engine.
//!
//! Uses proptest to generate random records, payloads, and seeds, then
//! verify the wire, cipher, and fingerprint invariants hold.

use proptest::prelude::*;
use tabula_core::cipher::CipherStream;
use tabula_core::test_utils::*;
use tabula_core::{decode_list, decode_record, encode_list, encode_record, ByteBuffer, Codec};

// ===========================================================================
// Generators
// ===========================================================================

fn arb_grade() -> impl Strategy<Value = Grade> {
    prop_oneof![
        Just(Grade::Common),
        Just(Grade::Rare),
        Just(Grade::Epic),
    ]
}

fn arb_item() -> impl Strategy<Value = ItemRow> {
    (
        any::<i32>(),
        any::<bool>(),
        "[A-Za-z0-9 ]{0,24}",
        arb_grade(),
        (any::<i32>(), any::<i32>()),
        [any::<i32>(), any::<i32>(), any::<i32>()],
        any::<f32>(),
    )
        .prop_map(|(id, active, name, grade, (base, bonus), stats, weight)| ItemRow {
            id,
            active,
            name,
            grade,
            price: Price { base, bonus },
            stats,
            weight,
        })
}

fn arb_items(max: usize) -> impl Strategy<Value = Vec<ItemRow>> {
    proptest::collection::vec(arb_item(), 0..=max)
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn single_record_artifacts_round_trip(item in arb_item()) {
        let codec = Codec::<ItemRow>::new();
        let bytes = encode_record(&codec, &item);
        let back = decode_record(&codec, &bytes).unwrap();
        // NaN weights compare by bits, everything else by value.
        prop_assert_eq!(back.weight.to_bits(), item.weight.to_bits());
        let (mut a, mut b) = (back, item);
        a.weight = 0.0;
        b.weight = 0.0;
        prop_assert_eq!(a, b);
    }

    #[test]
    fn list_artifacts_round_trip_with_exact_count(items in arb_items(16)) {
        let codec = Codec::<ItemRow>::new();
        let bytes = encode_list(&codec, &items);
        let back = decode_list(&codec, &bytes).unwrap();
        prop_assert_eq!(back.len(), items.len());
        for (a, b) in back.iter().zip(&items) {
            prop_assert_eq!(a.id, b.id);
            prop_assert_eq!(&a.name, &b.name);
        }
    }

    #[test]
    fn cipher_is_reversible_for_any_seed_and_payload(
        seed in any::<u64>(),
        payload in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut data = payload.clone();
        CipherStream::new(seed).apply(&mut data);
        CipherStream::new(seed).apply(&mut data);
        prop_assert_eq!(data, payload);
    }

    #[test]
    fn varints_round_trip(values in proptest::collection::vec(any::<u64>(), 0..32)) {
        let mut buf = ByteBuffer::new();
        for &v in &values {
            buf.write_varint(v);
        }
        for &v in &values {
            prop_assert_eq!(buf.read_varint().unwrap(), v);
        }
        prop_assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn truncating_an_artifact_never_panics(
        items in arb_items(4),
        cut in 0usize..64,
    ) {
        let codec = Codec::<ItemRow>::new();
        let bytes = encode_list(&codec, &items);
        let cut = cut.min(bytes.len());
        // Any prefix either decodes or reports a defined error.
        let _ = decode_list(&codec, &bytes[..cut]);
    }

    #[test]
    fn fingerprint_is_stable_across_codec_builds(_n in 0..8u8) {
        let a = Codec::<ItemRow>::new();
        let b = Codec::<ItemRow>::new();
        prop_assert_eq!(a.scheme(), b.scheme());
    }
}

// A list artifact from one record shape never decodes as another.
#[test]
fn cross_type_decode_is_rejected() {
    let items = sample_items();
    let bytes = encode_list(&Codec::<ItemRow>::new(), &items);
    let err = decode_list(&Codec::<PotionRow>::new(), &bytes).unwrap_err();
    assert!(matches!(
        err,
        tabula_core::DecodeError::IncompatibleSchema(_)
    ));
}
