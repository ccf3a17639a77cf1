//! Per-record-type codec built from the declared field descriptors.
//!
//! A [`Codec`] is constructed once per record type (at registry build time)
//! and reused for the process lifetime. Construction normalizes the field
//! order alphabetically by declared name and caches the fingerprint; encode,
//! decode, fingerprinting, and JSON mapping all traverse that same order.

use crate::buffer::ByteBuffer;
use crate::error::DecodeError;
use crate::field::{CellError, FieldCodec, Row, Scope};
use crate::scheme::SchemeEntry;

/// A record or compound value type with a declared, fixed field set.
///
/// Compound value types (embedded by value inside a parent record)
/// implement only this trait; top-level table rows also implement
/// [`Record`].
pub trait Schema: Default + Send + Sync + 'static {
    /// Type name fed into fingerprint type hashes for compound and
    /// child-compound fields.
    const TYPE_NAME: &'static str;

    /// The field descriptors, in any declaration order. [`Codec::new`]
    /// sorts them; declaring twice yields the same codec.
    fn fields() -> Vec<Box<dyn FieldCodec<Self>>>;
}

/// A top-level table row. Every row carries an identity and an
/// active/inactive flag.
pub trait Record: Schema {
    fn id(&self) -> i32;
    fn is_active(&self) -> bool;
}

/// Bidirectional transcoder for one record type: binary ⇄ record ⇄ JSON row.
pub struct Codec<T: Schema> {
    fields: Vec<Box<dyn FieldCodec<T>>>,
    scheme: Vec<SchemeEntry>,
}

impl<T: Schema> std::fmt::Debug for Codec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

impl<T: Schema> Codec<T> {
    pub fn new() -> Self {
        let mut fields = T::fields();
        fields.sort_by(|a, b| a.declared_name().cmp(b.declared_name()));
        let mut scheme = Vec::new();
        for field in &fields {
            field.fingerprint(&mut scheme);
        }
        Self { fields, scheme }
    }

    /// The cached schema fingerprint, in transcoding order.
    pub fn scheme(&self) -> &[SchemeEntry] {
        &self.scheme
    }

    /// Write every field of `record`, in fingerprint order, no padding.
    pub fn encode_fields(&self, buf: &mut ByteBuffer, record: &T) {
        for field in &self.fields {
            field.encode(buf, record);
        }
    }

    /// Read every field in fingerprint order. Never reads more than the
    /// schema-determined number of bytes per field.
    pub fn decode_fields(&self, buf: &mut ByteBuffer) -> Result<T, DecodeError> {
        let mut record = T::default();
        for field in &self.fields {
            field.decode(buf, &mut record)?;
        }
        Ok(record)
    }

    /// Convert one source row. A missing cell yields the field default; a
    /// present cell that fails conversion aborts this row only.
    pub fn from_row(&self, row: &Row) -> Result<T, CellError> {
        self.from_row_scoped(row, &Scope::ROOT)
    }

    pub(crate) fn from_row_scoped(&self, row: &Row, scope: &Scope<'_>) -> Result<T, CellError> {
        let mut record = T::default();
        for field in &self.fields {
            field.read_row(row, scope, &mut record)?;
        }
        Ok(record)
    }

    /// Render a record back into a source row. Defined for symmetry with
    /// [`Codec::from_row`]; no production path consumes it today.
    pub fn to_row(&self, record: &T) -> Row {
        let mut row = Row::new();
        self.to_row_scoped(record, &Scope::ROOT, &mut row);
        row
    }

    pub(crate) fn to_row_scoped(&self, record: &T, scope: &Scope<'_>, row: &mut Row) {
        for field in &self.fields {
            field.write_row(record, scope, row);
        }
    }
}

impl<T: Schema> Default for Codec<T> {
    fn default() -> Self {
        Self::new()
    }
}
