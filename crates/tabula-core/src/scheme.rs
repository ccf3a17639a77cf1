//! Schema fingerprint header: the artifact's compatibility gate.
//!
//! An ordered list of `(name_hash, type_hash)` pairs, one per transcoded
//! field, written ahead of every payload. Decode validates the header
//! against the currently compiled record shape and stops at the first
//! difference — a coarse full-reject check, not a migration mechanism.

use crate::buffer::{BufferError, ByteBuffer};

/// One fingerprint entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeEntry {
    pub name_hash: u32,
    pub type_hash: u32,
}

/// Why a header failed validation.
#[derive(Debug, thiserror::Error)]
pub enum SchemeError {
    #[error("fingerprint entry count mismatch: artifact has {found}, compiled schema has {expected}")]
    CountMismatch { found: u16, expected: u16 },
    #[error(
        "fingerprint entry {index} mismatch: artifact {found_name:#010x}/{found_type:#010x}, \
         compiled schema {expected_name:#010x}/{expected_type:#010x}"
    )]
    EntryMismatch {
        index: usize,
        found_name: u32,
        found_type: u32,
        expected_name: u32,
        expected_type: u32,
    },
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Write the header: `u16` entry count, then each pair as two `u32`s.
pub fn write_scheme(buf: &mut ByteBuffer, entries: &[SchemeEntry]) {
    buf.write_u16(entries.len() as u16);
    for entry in entries {
        buf.write_u32(entry.name_hash);
        buf.write_u32(entry.type_hash);
    }
}

/// Read a header and compare it to `expected`, failing on the first
/// difference. On success the cursor rests on the first payload byte.
pub fn read_and_check(buf: &mut ByteBuffer, expected: &[SchemeEntry]) -> Result<(), SchemeError> {
    let found = buf.read_u16()?;
    if found as usize != expected.len() {
        return Err(SchemeError::CountMismatch {
            found,
            expected: expected.len() as u16,
        });
    }
    for (index, entry) in expected.iter().enumerate() {
        let name = buf.read_u32()?;
        let ty = buf.read_u32()?;
        if name != entry.name_hash || ty != entry.type_hash {
            return Err(SchemeError::EntryMismatch {
                index,
                found_name: name,
                found_type: ty,
                expected_name: entry.name_hash,
                expected_type: entry.type_hash,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<SchemeEntry> {
        vec![
            SchemeEntry {
                name_hash: 0x1111_1111,
                type_hash: 0xAAAA_AAAA,
            },
            SchemeEntry {
                name_hash: 0x2222_2222,
                type_hash: 0xBBBB_BBBB,
            },
        ]
    }

    #[test]
    fn write_then_check_accepts() {
        let entries = sample();
        let mut buf = ByteBuffer::new();
        write_scheme(&mut buf, &entries);
        assert_eq!(buf.len(), 2 + entries.len() * 8);
        read_and_check(&mut buf, &entries).unwrap();
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn count_mismatch_rejected() {
        let mut buf = ByteBuffer::new();
        write_scheme(&mut buf, &sample()[..1]);
        let err = read_and_check(&mut buf, &sample()).unwrap_err();
        assert!(matches!(
            err,
            SchemeError::CountMismatch {
                found: 1,
                expected: 2
            }
        ));
    }

    #[test]
    fn entry_mismatch_rejected_with_index() {
        let mut wrong = sample();
        wrong[1].type_hash ^= 1;
        let mut buf = ByteBuffer::new();
        write_scheme(&mut buf, &wrong);
        let err = read_and_check(&mut buf, &sample()).unwrap_err();
        assert!(matches!(err, SchemeError::EntryMismatch { index: 1, .. }));
    }

    #[test]
    fn truncated_header_is_a_buffer_error() {
        let mut buf = ByteBuffer::new();
        buf.write_u16(2);
        buf.write_u32(0x1111_1111);
        let err = read_and_check(&mut buf, &sample()).unwrap_err();
        assert!(matches!(err, SchemeError::Buffer(_)));
    }
}
