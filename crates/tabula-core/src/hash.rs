//! Stable 32-bit hashing for schema fingerprints.
//!
//! xxh32 over UTF-8 bytes. The only requirement is stability across runs
//! and platforms for the same input; these helpers centralize the token
//! formats so name, type, and enum hashes can never collide by accident.

use xxhash_rust::xxh32::xxh32;

const SEED: u32 = 0;

/// Hash of a field's declared name. Compound and compound-list fields pass
/// a marker-suffixed name (see `field`), so a scalar and a compound with
/// the same name fingerprint differently.
pub fn name_hash(name: &str) -> u32 {
    xxh32(name.as_bytes(), SEED)
}

/// Hash of a value type token (`"i32"`, `"str"`, a compound type name...).
pub fn type_hash(token: &str) -> u32 {
    let mut bytes = Vec::with_capacity(token.len() + 3);
    bytes.extend_from_slice(b"ty:");
    bytes.extend_from_slice(token.as_bytes());
    xxh32(&bytes, SEED)
}

/// Hash of an enum's declared shape. Covers every variant name/value pair,
/// so renaming a variant or changing a discriminant invalidates the
/// fingerprint even when the field itself is unchanged.
pub fn enum_type_hash(enum_name: &str, variants: &[(&str, i64)]) -> u32 {
    let mut token = String::with_capacity(64);
    token.push_str("enum:");
    token.push_str(enum_name);
    token.push('.');
    for (name, value) in variants {
        token.push_str(name);
        token.push('+');
        token.push_str(&value.to_string());
        token.push('-');
    }
    xxh32(token.as_bytes(), SEED)
}

/// Hash of a fixed-count array of the element type `elem`.
pub fn array_type_hash(elem: u32) -> u32 {
    let mut bytes = [0u8; 6];
    bytes[..4].copy_from_slice(&elem.to_le_bytes());
    bytes[4..].copy_from_slice(b"[]");
    xxh32(&bytes, SEED)
}
