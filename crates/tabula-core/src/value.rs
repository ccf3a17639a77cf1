//! Scalar wire values: the closed set of cell types a column can carry.
//!
//! `WireValue` fixes, for each type, its wire encoding, its fingerprint
//! type hash, and its conversion from a spreadsheet JSON cell. Spreadsheet
//! readers frequently deliver every cell as a string, so numeric and
//! boolean conversions accept both native JSON values and string forms.
//!
//! Enums used as columns are declared with [`wire_enum!`], which records
//! the variant name/value pairs so they feed the fingerprint.

use crate::buffer::ByteBuffer;
use crate::error::DecodeError;
use crate::hash;
use serde_json::Value;

/// A scalar value transcodable between wire bytes, typed fields, and JSON
/// cells. Conversion failures return a human-readable detail string; the
/// field layer attaches the column coordinates.
pub trait WireValue: Sized + Default + Clone + Send + Sync + 'static {
    /// Token used to derive the fingerprint type hash.
    const TYPE_TOKEN: &'static str;

    /// Fingerprint type hash. Enums override this to cover their variants.
    fn type_hash() -> u32 {
        hash::type_hash(Self::TYPE_TOKEN)
    }

    fn write(&self, buf: &mut ByteBuffer);
    fn read(buf: &mut ByteBuffer) -> Result<Self, DecodeError>;

    /// Convert a source cell. Absent cells never reach this point (the
    /// field layer substitutes the default); a present cell that cannot
    /// convert is an error.
    fn from_cell(cell: &Value) -> Result<Self, String>;

    fn to_cell(&self) -> Value;
}

fn cell_i64(cell: &Value) -> Result<i64, String> {
    match cell {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("number {n} is not an integer")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("cannot parse '{s}' as an integer")),
        other => Err(format!("expected an integer cell, got {other}")),
    }
}

fn cell_u64(cell: &Value) -> Result<u64, String> {
    match cell {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| format!("number {n} is not an unsigned integer")),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("cannot parse '{s}' as an unsigned integer")),
        other => Err(format!("expected an unsigned integer cell, got {other}")),
    }
}

fn cell_f64(cell: &Value) -> Result<f64, String> {
    match cell {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("number {n} is not representable as f64")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("cannot parse '{s}' as a number")),
        other => Err(format!("expected a numeric cell, got {other}")),
    }
}

macro_rules! wire_signed {
    ($t:ty, $token:expr, $write:ident, $read:ident) => {
        impl WireValue for $t {
            const TYPE_TOKEN: &'static str = $token;

            fn write(&self, buf: &mut ByteBuffer) {
                buf.$write(*self);
            }

            fn read(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
                Ok(buf.$read()?)
            }

            fn from_cell(cell: &Value) -> Result<Self, String> {
                let wide = cell_i64(cell)?;
                <$t>::try_from(wide).map_err(|_| {
                    format!("{wide} is out of range for {}", Self::TYPE_TOKEN)
                })
            }

            fn to_cell(&self) -> Value {
                Value::from(*self)
            }
        }
    };
}

macro_rules! wire_unsigned {
    ($t:ty, $token:expr, $write:ident, $read:ident) => {
        impl WireValue for $t {
            const TYPE_TOKEN: &'static str = $token;

            fn write(&self, buf: &mut ByteBuffer) {
                buf.$write(*self);
            }

            fn read(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
                Ok(buf.$read()?)
            }

            fn from_cell(cell: &Value) -> Result<Self, String> {
                let wide = cell_u64(cell)?;
                <$t>::try_from(wide).map_err(|_| {
                    format!("{wide} is out of range for {}", Self::TYPE_TOKEN)
                })
            }

            fn to_cell(&self) -> Value {
                Value::from(*self)
            }
        }
    };
}

wire_signed!(i8, "i8", write_i8, read_i8);
wire_signed!(i16, "i16", write_i16, read_i16);
wire_signed!(i32, "i32", write_i32, read_i32);
wire_signed!(i64, "i64", write_i64, read_i64);
wire_unsigned!(u8, "u8", write_u8, read_u8);
wire_unsigned!(u16, "u16", write_u16, read_u16);
wire_unsigned!(u32, "u32", write_u32, read_u32);
wire_unsigned!(u64, "u64", write_u64, read_u64);

impl WireValue for f32 {
    const TYPE_TOKEN: &'static str = "f32";

    fn write(&self, buf: &mut ByteBuffer) {
        buf.write_f32(*self);
    }

    fn read(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        Ok(buf.read_f32()?)
    }

    fn from_cell(cell: &Value) -> Result<Self, String> {
        Ok(cell_f64(cell)? as f32)
    }

    fn to_cell(&self) -> Value {
        Value::from(f64::from(*self))
    }
}

impl WireValue for f64 {
    const TYPE_TOKEN: &'static str = "f64";

    fn write(&self, buf: &mut ByteBuffer) {
        buf.write_f64(*self);
    }

    fn read(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        Ok(buf.read_f64()?)
    }

    fn from_cell(cell: &Value) -> Result<Self, String> {
        cell_f64(cell)
    }

    fn to_cell(&self) -> Value {
        Value::from(*self)
    }
}

impl WireValue for bool {
    const TYPE_TOKEN: &'static str = "bool";

    fn write(&self, buf: &mut ByteBuffer) {
        buf.write_bool(*self);
    }

    fn read(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        Ok(buf.read_bool()?)
    }

    fn from_cell(cell: &Value) -> Result<Self, String> {
        match cell {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "y" => Ok(true),
                "false" | "0" | "n" | "" => Ok(false),
                other => Err(format!("cannot parse '{other}' as a boolean")),
            },
            other => Err(format!("expected a boolean cell, got {other}")),
        }
    }

    fn to_cell(&self) -> Value {
        Value::from(*self)
    }
}

impl WireValue for String {
    const TYPE_TOKEN: &'static str = "str";

    fn write(&self, buf: &mut ByteBuffer) {
        buf.write_str(self);
    }

    fn read(buf: &mut ByteBuffer) -> Result<Self, DecodeError> {
        Ok(buf.read_str()?)
    }

    fn from_cell(cell: &Value) -> Result<Self, String> {
        match cell {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(format!("expected a text cell, got {other}")),
        }
    }

    fn to_cell(&self) -> Value {
        Value::from(self.clone())
    }
}

/// Declare a column enum with an explicit wire representation.
///
/// Generates the enum plus a [`WireValue`] impl whose type hash covers the
/// variant name/value pairs, so editing the variants invalidates every
/// fingerprint the enum participates in. Cells convert from either the
/// variant name or its numeric value. The first variant is the default.
///
/// ```
/// tabula_core::wire_enum! {
///     pub enum Grade: u8 {
///         Common = 0,
///         Rare = 1,
///         Epic = 2,
///     }
/// }
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ty {
            $first:ident = $first_value:expr
            $(, $variant:ident = $value:expr)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr($repr)]
        $vis enum $name {
            $first = $first_value,
            $($variant = $value,)*
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$first
            }
        }

        impl $name {
            fn from_discriminant(raw: i64) -> Option<Self> {
                if raw == $first_value as i64 {
                    return Some(Self::$first);
                }
                $(
                    if raw == $value as i64 {
                        return Some(Self::$variant);
                    }
                )*
                None
            }
        }

        impl $crate::value::WireValue for $name {
            const TYPE_TOKEN: &'static str = stringify!($name);

            fn type_hash() -> u32 {
                $crate::hash::enum_type_hash(
                    stringify!($name),
                    &[
                        (stringify!($first), $first_value as i64),
                        $((stringify!($variant), $value as i64),)*
                    ],
                )
            }

            fn write(&self, buf: &mut $crate::buffer::ByteBuffer) {
                <$repr as $crate::value::WireValue>::write(&(*self as $repr), buf);
            }

            fn read(
                buf: &mut $crate::buffer::ByteBuffer,
            ) -> Result<Self, $crate::error::DecodeError> {
                let raw = <$repr as $crate::value::WireValue>::read(buf)?;
                Self::from_discriminant(raw as i64).ok_or(
                    $crate::error::DecodeError::InvalidEnumValue {
                        enum_name: stringify!($name),
                        value: raw as i64,
                    },
                )
            }

            fn from_cell(cell: &$crate::serde_json::Value) -> Result<Self, String> {
                if let $crate::serde_json::Value::String(s) = cell {
                    let trimmed = s.trim();
                    if trimmed == stringify!($first) {
                        return Ok(Self::$first);
                    }
                    $(
                        if trimmed == stringify!($variant) {
                            return Ok(Self::$variant);
                        }
                    )*
                    if let Ok(raw) = trimmed.parse::<i64>() {
                        return Self::from_discriminant(raw)
                            .ok_or_else(|| format!("{raw} is not a {} value", stringify!($name)));
                    }
                    return Err(format!(
                        "'{trimmed}' is not a {} variant",
                        stringify!($name)
                    ));
                }
                if let $crate::serde_json::Value::Number(n) = cell {
                    if let Some(raw) = n.as_i64() {
                        return Self::from_discriminant(raw)
                            .ok_or_else(|| format!("{raw} is not a {} value", stringify!($name)));
                    }
                }
                Err(format!(
                    "expected a {} name or value, got {cell}",
                    stringify!($name)
                ))
            }

            fn to_cell(&self) -> $crate::serde_json::Value {
                let name = match self {
                    Self::$first => stringify!($first),
                    $(Self::$variant => stringify!($variant),)*
                };
                $crate::serde_json::Value::from(name)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    crate::wire_enum! {
        pub enum Grade: u8 {
            Common = 0,
            Rare = 1,
            Epic = 2,
        }
    }

    #[test]
    fn integer_cells_accept_numbers_and_strings() {
        assert_eq!(i32::from_cell(&json!(100)).unwrap(), 100);
        assert_eq!(i32::from_cell(&json!("100")).unwrap(), 100);
        assert_eq!(i32::from_cell(&json!(" -5 ")).unwrap(), -5);
        assert!(i32::from_cell(&json!("potion")).is_err());
        assert!(u8::from_cell(&json!(300)).is_err());
    }

    #[test]
    fn bool_cells_accept_common_spreadsheet_forms() {
        assert!(bool::from_cell(&json!(true)).unwrap());
        assert!(bool::from_cell(&json!("TRUE")).unwrap());
        assert!(bool::from_cell(&json!("1")).unwrap());
        assert!(!bool::from_cell(&json!("0")).unwrap());
        assert!(!bool::from_cell(&json!(0)).unwrap());
        assert!(bool::from_cell(&json!("maybe")).is_err());
    }

    #[test]
    fn string_cells_accept_scalars() {
        assert_eq!(String::from_cell(&json!("Potion")).unwrap(), "Potion");
        assert_eq!(String::from_cell(&json!(7)).unwrap(), "7");
    }

    #[test]
    fn float_cells_parse_strings() {
        assert_eq!(f32::from_cell(&json!("1.5")).unwrap(), 1.5);
        assert_eq!(f64::from_cell(&json!(2.25)).unwrap(), 2.25);
    }

    #[test]
    fn enum_wire_round_trip() {
        let mut buf = ByteBuffer::new();
        Grade::Epic.write(&mut buf);
        assert_eq!(buf.len(), 1);
        assert_eq!(Grade::read(&mut buf).unwrap(), Grade::Epic);
    }

    #[test]
    fn enum_unknown_discriminant_rejected() {
        let mut buf = ByteBuffer::new();
        buf.write_u8(9);
        let err = Grade::read(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidEnumValue {
                enum_name: "Grade",
                value: 9
            }
        ));
    }

    #[test]
    fn enum_cells_accept_names_and_values() {
        assert_eq!(Grade::from_cell(&json!("Rare")).unwrap(), Grade::Rare);
        assert_eq!(Grade::from_cell(&json!("2")).unwrap(), Grade::Epic);
        assert_eq!(Grade::from_cell(&json!(1)).unwrap(), Grade::Rare);
        assert!(Grade::from_cell(&json!("Legendary")).is_err());
        assert!(Grade::from_cell(&json!(7)).is_err());
    }

    #[test]
    fn enum_type_hash_depends_on_variants() {
        crate::wire_enum! {
            pub enum GradeRenamed: u8 {
                Common = 0,
                Rare = 1,
                Mythic = 2,
            }
        }
        assert_ne!(Grade::type_hash(), GradeRenamed::type_hash());
    }

    #[test]
    fn enum_default_is_first_variant() {
        assert_eq!(Grade::default(), Grade::Common);
    }
}
