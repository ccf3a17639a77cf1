//! Tabula Core -- the table codec engine.
//!
//! This crate turns spreadsheet-shaped rows of game configuration into
//! compact obfuscated binary artifacts and back into typed records, with a
//! schema fingerprint guarding every decode.
//!
//! # Pipeline
//!
//! 1. **Declare** -- A record type implements [`codec::Schema`], listing its
//!    field descriptors ([`field`]); enums used as columns are declared with
//!    [`wire_enum!`].
//! 2. **Ingest** -- [`ingest::records_from_rows`] converts JSON rows to
//!    records, skipping broken rows and accumulating their coordinates.
//! 3. **Encode** -- [`artifact::encode_list`] writes the fingerprint header,
//!    the record count, and the XOR-ciphered payload.
//! 4. **Decode** -- [`artifact::decode_list`] validates the fingerprint
//!    against the compiled schema before interpreting a single payload byte.
//!
//! # Key Types
//!
//! - [`buffer::ByteBuffer`] -- Little-endian byte buffer with an
//!   independent read cursor and varint support.
//! - [`codec::Codec`] -- Per-record-type transcoder built once from the
//!   declared descriptors, fields normalized to alphabetic order.
//! - [`scheme`] -- The `(name_hash, type_hash)` fingerprint header.
//! - [`cipher::CipherStream`] -- SplitMix64 obfuscation stream (not a
//!   security boundary).
//! - [`registry::CodecRegistry`] -- Immutable `TypeId -> Codec` map, built
//!   at startup and shared across threads.

pub mod artifact;
pub mod buffer;
pub mod cipher;
pub mod codec;
pub mod error;
pub mod field;
pub mod hash;
pub mod ingest;
pub mod registry;
pub mod scheme;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exported for the `wire_enum!` macro expansion.
pub use serde_json;

pub use artifact::{
    decode_list, decode_list_with, decode_record, encode_list, encode_record, peek_list_len,
};
pub use buffer::{BufferError, ByteBuffer};
pub use cipher::{CipherStream, SINGLE_RECORD_SEED};
pub use codec::{Codec, Record, Schema};
pub use error::DecodeError;
pub use field::{
    CellError, ChildCompoundField, ColumnField, ColumnListField, CompoundField, CompoundListField,
    FieldCodec, Row, Scope,
};
pub use ingest::{records_from_rows, ColumnConversionError, IngestReport};
pub use registry::{CodecRegistry, CodecRegistryBuilder, RegistryError};
pub use scheme::{SchemeEntry, SchemeError};
pub use value::WireValue;
