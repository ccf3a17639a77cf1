//! Decode-side error taxonomy shared by the value, field, codec, and
//! artifact layers. Encoding is infallible by construction (field layout is
//! fixed at build time), so there is no encode counterpart.

use crate::buffer::BufferError;
use crate::scheme::SchemeError;

/// A failure while decoding a binary artifact. Fatal for the artifact,
/// never for sibling tables.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The artifact's fingerprint header does not match the compiled
    /// record shape. The payload is never interpreted past this point.
    #[error("incompatible schema: {0}")]
    IncompatibleSchema(#[from] SchemeError),

    /// Buffer underrun (or malformed varint/string) inside the payload.
    #[error(transparent)]
    Payload(#[from] BufferError),

    /// A wire discriminant outside the enum's declared value set.
    #[error("invalid value {value} for enum {enum_name}")]
    InvalidEnumValue {
        enum_name: &'static str,
        value: i64,
    },
}
