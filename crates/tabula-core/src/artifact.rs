//! Binary artifact assembly and disassembly.
//!
//! Layout, little-endian throughout:
//!
//! ```text
//! single record:  [u16 entry count][fingerprint entries][ciphered payload]
//! record list:    [u16 entry count][fingerprint entries]
//!                 [varint record count][ciphered payload]
//! ```
//!
//! The fingerprint header and the record count stay in the clear; only the
//! payload region is XORed. Single-record artifacts seed the cipher with
//! [`SINGLE_RECORD_SEED`], list artifacts with their record count, so the
//! count read from the clear prefix is also the decode seed.

use crate::buffer::ByteBuffer;
use crate::cipher::{CipherStream, SINGLE_RECORD_SEED};
use crate::codec::{Codec, Schema};
use crate::error::DecodeError;
use crate::scheme;

/// Encode one record into a standalone artifact.
pub fn encode_record<T: Schema>(codec: &Codec<T>, record: &T) -> Vec<u8> {
    let mut buf = ByteBuffer::new();
    scheme::write_scheme(&mut buf, codec.scheme());
    let payload_start = buf.len();
    codec.encode_fields(&mut buf, record);
    CipherStream::new(SINGLE_RECORD_SEED).apply(&mut buf.bytes_mut()[payload_start..]);
    buf.into_vec()
}

/// Decode a single-record artifact. The fingerprint is validated before a
/// single payload byte is interpreted.
pub fn decode_record<T: Schema>(codec: &Codec<T>, bytes: &[u8]) -> Result<T, DecodeError> {
    let mut buf = ByteBuffer::from_vec(bytes.to_vec());
    scheme::read_and_check(&mut buf, codec.scheme())?;
    let payload_start = buf.read_pos();
    CipherStream::new(SINGLE_RECORD_SEED).apply(&mut buf.bytes_mut()[payload_start..]);
    codec.decode_fields(&mut buf)
}

/// Encode a record list. The count prefix stays in the clear and doubles as
/// the cipher seed.
pub fn encode_list<T: Schema>(codec: &Codec<T>, records: &[T]) -> Vec<u8> {
    let mut buf = ByteBuffer::new();
    scheme::write_scheme(&mut buf, codec.scheme());
    buf.write_varint(records.len() as u64);
    let payload_start = buf.len();
    for record in records {
        codec.encode_fields(&mut buf, record);
    }
    CipherStream::new(records.len() as u64).apply(&mut buf.bytes_mut()[payload_start..]);
    buf.into_vec()
}

/// Read a list artifact's record count without touching the payload. The
/// fingerprint is still validated first.
pub fn peek_list_len<T: Schema>(codec: &Codec<T>, bytes: &[u8]) -> Result<usize, DecodeError> {
    let mut buf = ByteBuffer::from_vec(bytes.to_vec());
    scheme::read_and_check(&mut buf, codec.scheme())?;
    Ok(buf.read_varint()? as usize)
}

/// Decode a list artifact into a vector.
pub fn decode_list<T: Schema>(codec: &Codec<T>, bytes: &[u8]) -> Result<Vec<T>, DecodeError> {
    let mut records = Vec::new();
    decode_list_with(codec, bytes, |record| records.push(record))?;
    Ok(records)
}

/// Decode a list artifact, handing each record to `each` as it is produced.
/// Returns the record count on success. A mid-stream failure discards the
/// artifact; records already handed out must not be kept.
pub fn decode_list_with<T, F>(codec: &Codec<T>, bytes: &[u8], mut each: F) -> Result<usize, DecodeError>
where
    T: Schema,
    F: FnMut(T),
{
    let mut buf = ByteBuffer::from_vec(bytes.to_vec());
    scheme::read_and_check(&mut buf, codec.scheme())?;
    let count = buf.read_varint()? as usize;
    let payload_start = buf.read_pos();
    CipherStream::new(count as u64).apply(&mut buf.bytes_mut()[payload_start..]);
    for _ in 0..count {
        each(codec.decode_fields(&mut buf)?);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::SchemeError;
    use crate::test_utils::{sample_items, ItemRow};

    fn codec() -> Codec<ItemRow> {
        Codec::new()
    }

    #[test]
    fn single_record_round_trips() {
        let codec = codec();
        let item = sample_items().remove(0);
        let bytes = encode_record(&codec, &item);
        let back = decode_record(&codec, &bytes).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn list_round_trips_with_count() {
        let codec = codec();
        let items = sample_items();
        let bytes = encode_list(&codec, &items);
        let back = decode_list(&codec, &bytes).unwrap();
        assert_eq!(back, items);
    }

    #[test]
    fn empty_list_round_trips() {
        let codec = codec();
        let bytes = encode_list(&codec, &[]);
        assert!(decode_list(&codec, &bytes).unwrap().is_empty());
    }

    #[test]
    fn header_and_count_are_in_the_clear() {
        let codec = codec();
        let items = sample_items();
        let bytes = encode_list(&codec, &items);
        let mut expected = ByteBuffer::new();
        scheme::write_scheme(&mut expected, codec.scheme());
        expected.write_varint(items.len() as u64);
        assert_eq!(&bytes[..expected.len()], expected.as_slice());
    }

    #[test]
    fn payload_is_obfuscated() {
        let codec = codec();
        let items = sample_items();
        let ciphered = encode_list(&codec, &items);

        let mut clear = ByteBuffer::new();
        scheme::write_scheme(&mut clear, codec.scheme());
        clear.write_varint(items.len() as u64);
        let payload_start = clear.len();
        for item in &items {
            codec.encode_fields(&mut clear, item);
        }
        assert_ne!(&ciphered[payload_start..], &clear.as_slice()[payload_start..]);
    }

    #[test]
    fn fingerprint_mismatch_rejected_before_payload() {
        let codec = codec();
        let mut bytes = encode_list(&codec, &sample_items());
        // Flip a bit inside the first fingerprint entry.
        bytes[2] ^= 0x01;
        let err = decode_list(&codec, &bytes).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::IncompatibleSchema(SchemeError::EntryMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn truncated_payload_rejected() {
        let codec = codec();
        let bytes = encode_list(&codec, &sample_items());
        let err = decode_list(&codec, &bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, DecodeError::Payload(_)));
    }

    #[test]
    fn corrupted_payload_never_escapes_decode_errors() {
        // Corruption inside the ciphered region decodes to garbage values or
        // a defined error, never a panic or an out-of-range read.
        let codec = codec();
        let clean = encode_list(&codec, &sample_items());
        let header_len = 2 + codec.scheme().len() * 8 + 1;
        for i in header_len..clean.len() {
            let mut bytes = clean.clone();
            bytes[i] ^= 0xFF;
            match decode_list(&codec, &bytes) {
                Ok(records) => assert_eq!(records.len(), sample_items().len()),
                Err(DecodeError::Payload(_) | DecodeError::InvalidEnumValue { .. }) => {}
                Err(other) => panic!("unexpected error kind: {other}"),
            }
        }
    }

    #[test]
    fn scalar_only_record_round_trips() {
        use crate::codec::Record;
        use crate::field::{ColumnField, FieldCodec};

        #[derive(Debug, Default, Clone, PartialEq)]
        struct Entry {
            id: i32,
            is_active: bool,
            name: String,
        }
        impl Schema for Entry {
            const TYPE_NAME: &'static str = "Entry";
            fn fields() -> Vec<Box<dyn FieldCodec<Self>>> {
                vec![
                    ColumnField::new("Id", |r: &Entry| r.id, |r, v| r.id = v).boxed(),
                    ColumnField::new("IsActive", |r: &Entry| r.is_active, |r, v| r.is_active = v)
                        .boxed(),
                    ColumnField::new("Name", |r: &Entry| r.name.clone(), |r, v| r.name = v)
                        .boxed(),
                ]
            }
        }
        impl Record for Entry {
            fn id(&self) -> i32 {
                self.id
            }
            fn is_active(&self) -> bool {
                self.is_active
            }
        }

        let codec = Codec::<Entry>::new();
        let entry = Entry {
            id: 7,
            is_active: true,
            name: "Potion".to_string(),
        };
        let bytes = encode_record(&codec, &entry);
        assert_eq!(decode_record(&codec, &bytes).unwrap(), entry);
    }

    #[test]
    fn peek_reads_count_without_decoding() {
        let codec = codec();
        let items = sample_items();
        let bytes = encode_list(&codec, &items);
        assert_eq!(peek_list_len(&codec, &bytes).unwrap(), items.len());
        // Truncating the payload does not affect the peek.
        assert_eq!(peek_list_len(&codec, &bytes[..bytes.len() - 4]).unwrap(), items.len());
    }

    #[test]
    fn streaming_decode_matches_vec_decode() {
        let codec = codec();
        let items = sample_items();
        let bytes = encode_list(&codec, &items);
        let mut seen = Vec::new();
        let count = decode_list_with(&codec, &bytes, |r| seen.push(r)).unwrap();
        assert_eq!(count, items.len());
        assert_eq!(seen, items);
    }
}
