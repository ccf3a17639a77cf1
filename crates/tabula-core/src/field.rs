//! Field descriptors: the ordered transcoding instructions for one record
//! type.
//!
//! Five descriptor kinds cover every declared field role:
//!
//! - [`ColumnField`] — one scalar mapped from a named source column.
//! - [`ColumnListField`] — a fixed-count scalar array mapped from
//!   `name1..nameN`.
//! - [`CompoundField`] — an inline nested value group mapped from prefixed
//!   columns, embedded by value.
//! - [`CompoundListField`] — a fixed-count array of nested groups, columns
//!   suffixed `1..N`.
//! - [`ChildCompoundField`] — a field whose value is a full nested record,
//!   delegated to that record type's own codec.
//!
//! One descriptor list drives encode, decode, fingerprinting, and JSON
//! mapping uniformly, so no two consumers can disagree on field order.

use crate::buffer::ByteBuffer;
use crate::codec::{Codec, Schema};
use crate::error::DecodeError;
use crate::hash;
use crate::scheme::SchemeEntry;
use crate::value::WireValue;
use serde_json::Value;

/// A source row: string-keyed cells as produced by a spreadsheet reader.
pub type Row = serde_json::Map<String, Value>;

/// A cell conversion failure, scoped to one column. The ingest layer
/// attaches the table and row coordinates.
#[derive(Debug, Clone, thiserror::Error)]
#[error("column '{column}': {detail}")]
pub struct CellError {
    pub column: String,
    pub detail: String,
}

/// Column-name scope while mapping nested groups: compound fields add a
/// prefix, compound-list elements add a 1-based index suffix.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub prefix: &'a str,
    pub suffix: &'a str,
}

impl Scope<'_> {
    pub const ROOT: Scope<'static> = Scope {
        prefix: "",
        suffix: "",
    };

    fn column(&self, name: &str) -> String {
        format!("{}{}{}", self.prefix, name, self.suffix)
    }
}

/// One transcoding instruction. Implementations must keep `encode`,
/// `decode`, and `fingerprint` byte-for-byte consistent with each other.
pub trait FieldCodec<T>: Send + Sync {
    /// Declared field name; codecs sort by this before transcoding.
    fn declared_name(&self) -> &'static str;

    /// Append this field's fingerprint entries. Nested group entries come
    /// before the entry for the group itself.
    fn fingerprint(&self, out: &mut Vec<SchemeEntry>);

    fn encode(&self, buf: &mut ByteBuffer, record: &T);

    fn decode(&self, buf: &mut ByteBuffer, record: &mut T) -> Result<(), DecodeError>;

    /// Fill this field from a source row. Missing cells yield the default;
    /// a failed conversion aborts the row.
    fn read_row(&self, row: &Row, scope: &Scope<'_>, record: &mut T) -> Result<(), CellError>;

    /// Write this field's cells back into a source row.
    fn write_row(&self, record: &T, scope: &Scope<'_>, row: &mut Row);
}

fn is_absent(cell: Option<&Value>) -> bool {
    matches!(cell, None | Some(Value::Null))
}

// ---------------------------------------------------------------------------
// ColumnField
// ---------------------------------------------------------------------------

/// A plain scalar column. The source column defaults to the field name;
/// [`ColumnField::parse_with`] installs a custom cell conversion (the
/// declared wire type still fixes the encoded width).
pub struct ColumnField<T, V: WireValue> {
    name: &'static str,
    column: &'static str,
    parse: Option<fn(&Value) -> Result<V, String>>,
    get: fn(&T) -> V,
    set: fn(&mut T, V),
}

impl<T: Send + Sync + 'static, V: WireValue> ColumnField<T, V> {
    pub fn new(name: &'static str, get: fn(&T) -> V, set: fn(&mut T, V)) -> Self {
        Self {
            name,
            column: name,
            parse: None,
            get,
            set,
        }
    }

    /// Map from a source column named differently than the field.
    pub fn column(mut self, column: &'static str) -> Self {
        self.column = column;
        self
    }

    /// Override the JSON-to-value conversion only.
    pub fn parse_with(mut self, parse: fn(&Value) -> Result<V, String>) -> Self {
        self.parse = Some(parse);
        self
    }

    pub fn boxed(self) -> Box<dyn FieldCodec<T>> {
        Box::new(self)
    }
}

impl<T: Send + Sync + 'static, V: WireValue> FieldCodec<T> for ColumnField<T, V> {
    fn declared_name(&self) -> &'static str {
        self.name
    }

    fn fingerprint(&self, out: &mut Vec<SchemeEntry>) {
        out.push(SchemeEntry {
            name_hash: hash::name_hash(self.name),
            type_hash: V::type_hash(),
        });
    }

    fn encode(&self, buf: &mut ByteBuffer, record: &T) {
        (self.get)(record).write(buf);
    }

    fn decode(&self, buf: &mut ByteBuffer, record: &mut T) -> Result<(), DecodeError> {
        (self.set)(record, V::read(buf)?);
        Ok(())
    }

    fn read_row(&self, row: &Row, scope: &Scope<'_>, record: &mut T) -> Result<(), CellError> {
        let column = scope.column(self.column);
        let cell = row.get(&column);
        if is_absent(cell) {
            (self.set)(record, V::default());
            return Ok(());
        }
        let cell = cell.unwrap_or(&Value::Null);
        let value = match self.parse {
            Some(parse) => parse(cell),
            None => V::from_cell(cell),
        }
        .map_err(|detail| CellError { column, detail })?;
        (self.set)(record, value);
        Ok(())
    }

    fn write_row(&self, record: &T, scope: &Scope<'_>, row: &mut Row) {
        row.insert(scope.column(self.column), (self.get)(record).to_cell());
    }
}

// ---------------------------------------------------------------------------
// ColumnListField
// ---------------------------------------------------------------------------

/// A fixed-count scalar array mapped from `column1..columnN`. The count is
/// part of the compiled schema, not the wire data.
pub struct ColumnListField<T, V: WireValue, const N: usize> {
    name: &'static str,
    column: &'static str,
    get: fn(&T) -> [V; N],
    set: fn(&mut T, [V; N]),
}

impl<T: Send + Sync + 'static, V: WireValue, const N: usize> ColumnListField<T, V, N> {
    pub fn new(name: &'static str, get: fn(&T) -> [V; N], set: fn(&mut T, [V; N])) -> Self {
        Self {
            name,
            column: name,
            get,
            set,
        }
    }

    pub fn column(mut self, column: &'static str) -> Self {
        self.column = column;
        self
    }

    pub fn boxed(self) -> Box<dyn FieldCodec<T>> {
        Box::new(self)
    }

    fn read_array(buf: &mut ByteBuffer) -> Result<[V; N], DecodeError> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(V::read(buf)?);
        }
        let mut drain = items.into_iter();
        Ok(std::array::from_fn(|_| drain.next().unwrap_or_default()))
    }
}

impl<T: Send + Sync + 'static, V: WireValue, const N: usize> FieldCodec<T>
    for ColumnListField<T, V, N>
{
    fn declared_name(&self) -> &'static str {
        self.name
    }

    fn fingerprint(&self, out: &mut Vec<SchemeEntry>) {
        out.push(SchemeEntry {
            name_hash: hash::name_hash(self.name),
            type_hash: hash::array_type_hash(V::type_hash()),
        });
    }

    fn encode(&self, buf: &mut ByteBuffer, record: &T) {
        for value in (self.get)(record) {
            value.write(buf);
        }
    }

    fn decode(&self, buf: &mut ByteBuffer, record: &mut T) -> Result<(), DecodeError> {
        (self.set)(record, Self::read_array(buf)?);
        Ok(())
    }

    fn read_row(&self, row: &Row, scope: &Scope<'_>, record: &mut T) -> Result<(), CellError> {
        let mut items = Vec::with_capacity(N);
        for i in 1..=N {
            let column = scope.column(&format!("{}{}", self.column, i));
            let cell = row.get(&column);
            if is_absent(cell) {
                items.push(V::default());
                continue;
            }
            let value = V::from_cell(cell.unwrap_or(&Value::Null))
                .map_err(|detail| CellError { column, detail })?;
            items.push(value);
        }
        let mut drain = items.into_iter();
        (self.set)(record, std::array::from_fn(|_| drain.next().unwrap_or_default()));
        Ok(())
    }

    fn write_row(&self, record: &T, scope: &Scope<'_>, row: &mut Row) {
        for (i, value) in (self.get)(record).iter().enumerate() {
            let column = scope.column(&format!("{}{}", self.column, i + 1));
            row.insert(column, value.to_cell());
        }
    }
}

// ---------------------------------------------------------------------------
// CompoundField
// ---------------------------------------------------------------------------

/// An inline nested value group. Cells come from `prefix + column` in the
/// same source row; on the wire the group's fields are written in place,
/// nested entries fingerprinted before the group's own marker entry.
pub struct CompoundField<T, C: Schema> {
    name: &'static str,
    prefix: &'static str,
    codec: Codec<C>,
    get: fn(&T) -> &C,
    set: fn(&mut T, C),
}

impl<T: Send + Sync + 'static, C: Schema> CompoundField<T, C> {
    pub fn new(
        name: &'static str,
        prefix: &'static str,
        get: fn(&T) -> &C,
        set: fn(&mut T, C),
    ) -> Self {
        Self {
            name,
            prefix,
            codec: Codec::new(),
            get,
            set,
        }
    }

    pub fn boxed(self) -> Box<dyn FieldCodec<T>> {
        Box::new(self)
    }
}

impl<T: Send + Sync + 'static, C: Schema> FieldCodec<T> for CompoundField<T, C> {
    fn declared_name(&self) -> &'static str {
        self.name
    }

    fn fingerprint(&self, out: &mut Vec<SchemeEntry>) {
        out.extend_from_slice(self.codec.scheme());
        // The marker suffix keeps a compound from fingerprinting like a
        // scalar field of the same name.
        out.push(SchemeEntry {
            name_hash: hash::name_hash(&format!("{}#comp", self.name)),
            type_hash: hash::type_hash(C::TYPE_NAME),
        });
    }

    fn encode(&self, buf: &mut ByteBuffer, record: &T) {
        self.codec.encode_fields(buf, (self.get)(record));
    }

    fn decode(&self, buf: &mut ByteBuffer, record: &mut T) -> Result<(), DecodeError> {
        (self.set)(record, self.codec.decode_fields(buf)?);
        Ok(())
    }

    fn read_row(&self, row: &Row, scope: &Scope<'_>, record: &mut T) -> Result<(), CellError> {
        let prefix = format!("{}{}", scope.prefix, self.prefix);
        let nested = Scope {
            prefix: &prefix,
            suffix: scope.suffix,
        };
        (self.set)(record, self.codec.from_row_scoped(row, &nested)?);
        Ok(())
    }

    fn write_row(&self, record: &T, scope: &Scope<'_>, row: &mut Row) {
        let prefix = format!("{}{}", scope.prefix, self.prefix);
        let nested = Scope {
            prefix: &prefix,
            suffix: scope.suffix,
        };
        self.codec.to_row_scoped((self.get)(record), &nested, row);
    }
}

// ---------------------------------------------------------------------------
// CompoundListField
// ---------------------------------------------------------------------------

/// A fixed-count array of nested value groups. Element `i` reads its cells
/// from `column{i+1}` (1-based suffix on each nested column name).
pub struct CompoundListField<T, C: Schema, const N: usize> {
    name: &'static str,
    codec: Codec<C>,
    get: fn(&T) -> &[C; N],
    set: fn(&mut T, [C; N]),
}

impl<T: Send + Sync + 'static, C: Schema, const N: usize> CompoundListField<T, C, N> {
    pub fn new(name: &'static str, get: fn(&T) -> &[C; N], set: fn(&mut T, [C; N])) -> Self {
        Self {
            name,
            codec: Codec::new(),
            get,
            set,
        }
    }

    pub fn boxed(self) -> Box<dyn FieldCodec<T>> {
        Box::new(self)
    }
}

impl<T: Send + Sync + 'static, C: Schema, const N: usize> FieldCodec<T>
    for CompoundListField<T, C, N>
{
    fn declared_name(&self) -> &'static str {
        self.name
    }

    fn fingerprint(&self, out: &mut Vec<SchemeEntry>) {
        out.extend_from_slice(self.codec.scheme());
        out.push(SchemeEntry {
            name_hash: hash::name_hash(&format!("{}#complist", self.name)),
            type_hash: hash::array_type_hash(hash::type_hash(C::TYPE_NAME)),
        });
    }

    fn encode(&self, buf: &mut ByteBuffer, record: &T) {
        for element in (self.get)(record) {
            self.codec.encode_fields(buf, element);
        }
    }

    fn decode(&self, buf: &mut ByteBuffer, record: &mut T) -> Result<(), DecodeError> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(self.codec.decode_fields(buf)?);
        }
        let mut drain = items.into_iter();
        (self.set)(record, std::array::from_fn(|_| drain.next().unwrap_or_default()));
        Ok(())
    }

    fn read_row(&self, row: &Row, scope: &Scope<'_>, record: &mut T) -> Result<(), CellError> {
        let mut items = Vec::with_capacity(N);
        for i in 1..=N {
            let suffix = format!("{}{}", i, scope.suffix);
            let nested = Scope {
                prefix: scope.prefix,
                suffix: &suffix,
            };
            items.push(self.codec.from_row_scoped(row, &nested)?);
        }
        let mut drain = items.into_iter();
        (self.set)(record, std::array::from_fn(|_| drain.next().unwrap_or_default()));
        Ok(())
    }

    fn write_row(&self, record: &T, scope: &Scope<'_>, row: &mut Row) {
        for (i, element) in (self.get)(record).iter().enumerate() {
            let suffix = format!("{}{}", i + 1, scope.suffix);
            let nested = Scope {
                prefix: scope.prefix,
                suffix: &suffix,
            };
            self.codec.to_row_scoped(element, &nested, row);
        }
    }
}

// ---------------------------------------------------------------------------
// ChildCompoundField
// ---------------------------------------------------------------------------

/// A field whose value is a full nested record with its own codec. Unlike
/// a compound, its source cells live under a single named sub-object
/// rather than prefixed columns of the parent row.
pub struct ChildCompoundField<T, C: Schema> {
    name: &'static str,
    column: &'static str,
    codec: Codec<C>,
    get: fn(&T) -> &C,
    set: fn(&mut T, C),
}

impl<T: Send + Sync + 'static, C: Schema> ChildCompoundField<T, C> {
    pub fn new(name: &'static str, get: fn(&T) -> &C, set: fn(&mut T, C)) -> Self {
        Self {
            name,
            column: name,
            codec: Codec::new(),
            get,
            set,
        }
    }

    pub fn column(mut self, column: &'static str) -> Self {
        self.column = column;
        self
    }

    pub fn boxed(self) -> Box<dyn FieldCodec<T>> {
        Box::new(self)
    }
}

impl<T: Send + Sync + 'static, C: Schema> FieldCodec<T> for ChildCompoundField<T, C> {
    fn declared_name(&self) -> &'static str {
        self.name
    }

    fn fingerprint(&self, out: &mut Vec<SchemeEntry>) {
        out.extend_from_slice(self.codec.scheme());
        out.push(SchemeEntry {
            name_hash: hash::name_hash(self.name),
            type_hash: hash::type_hash(C::TYPE_NAME),
        });
    }

    fn encode(&self, buf: &mut ByteBuffer, record: &T) {
        self.codec.encode_fields(buf, (self.get)(record));
    }

    fn decode(&self, buf: &mut ByteBuffer, record: &mut T) -> Result<(), DecodeError> {
        (self.set)(record, self.codec.decode_fields(buf)?);
        Ok(())
    }

    fn read_row(&self, row: &Row, scope: &Scope<'_>, record: &mut T) -> Result<(), CellError> {
        let column = scope.column(self.column);
        let cell = row.get(&column);
        if is_absent(cell) {
            (self.set)(record, C::default());
            return Ok(());
        }
        match cell {
            Some(Value::Object(sub)) => {
                let value = self.codec.from_row(sub).map_err(|e| CellError {
                    column: format!("{}:{}", column, e.column),
                    detail: e.detail,
                })?;
                (self.set)(record, value);
                Ok(())
            }
            _ => Err(CellError {
                column,
                detail: "expected a nested object cell".to_string(),
            }),
        }
    }

    fn write_row(&self, record: &T, scope: &Scope<'_>, row: &mut Row) {
        let sub = self.codec.to_row((self.get)(record));
        row.insert(scope.column(self.column), Value::Object(sub));
    }
}
