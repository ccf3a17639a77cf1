//! Growable byte buffer with an independent read cursor.
//!
//! All multi-byte values are little-endian. Writes append at the logical
//! end; reads advance a cursor and fail with [`BufferError::UnexpectedEnd`]
//! when fewer bytes remain than requested. Counts and string lengths use an
//! unsigned varint (7 bits per byte, high bit = continuation).

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by primitive reads.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },
    #[error("varint longer than 10 bytes")]
    VarintOverflow,
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,
}

// ---------------------------------------------------------------------------
// ByteBuffer
// ---------------------------------------------------------------------------

/// A byte buffer owned exclusively by one encode or decode call.
#[derive(Debug, Default)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
    read_pos: usize,
}

impl ByteBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer with room for `capacity` bytes before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            read_pos: 0,
        }
    }

    /// Wrap existing bytes for reading. The cursor starts at zero.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes, read_pos: 0 }
    }

    /// Reserve space for at least `additional` more bytes. Growth is
    /// geometric (amortized O(1) appends).
    pub fn ensure_capacity(&mut self, additional: usize) {
        self.bytes.reserve(additional);
    }

    /// Logical length (total bytes written).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Current read cursor position.
    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.read_pos
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable access to the raw bytes. Used by the artifact layer to XOR
    /// the payload region in place; the read cursor is unaffected.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    fn take(&mut self, n: usize) -> Result<&[u8], BufferError> {
        if self.remaining() < n {
            return Err(BufferError::UnexpectedEnd {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let start = self.read_pos;
        self.read_pos += n;
        Ok(&self.bytes[start..start + n])
    }
}

macro_rules! rw_primitive {
    ($write:ident, $read:ident, $t:ty) => {
        impl ByteBuffer {
            pub fn $write(&mut self, value: $t) {
                self.bytes.extend_from_slice(&value.to_le_bytes());
            }

            pub fn $read(&mut self) -> Result<$t, BufferError> {
                let raw = self.take(size_of::<$t>())?;
                let mut le = [0u8; size_of::<$t>()];
                le.copy_from_slice(raw);
                Ok(<$t>::from_le_bytes(le))
            }
        }
    };
}

rw_primitive!(write_u8, read_u8, u8);
rw_primitive!(write_u16, read_u16, u16);
rw_primitive!(write_u32, read_u32, u32);
rw_primitive!(write_u64, read_u64, u64);
rw_primitive!(write_i8, read_i8, i8);
rw_primitive!(write_i16, read_i16, i16);
rw_primitive!(write_i32, read_i32, i32);
rw_primitive!(write_i64, read_i64, i64);
rw_primitive!(write_f32, read_f32, f32);
rw_primitive!(write_f64, read_f64, f64);

impl ByteBuffer {
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    pub fn read_bool(&mut self) -> Result<bool, BufferError> {
        Ok(self.read_u8()? != 0)
    }

    /// Unsigned varint: 7 bits per byte, low group first, high bit set on
    /// every byte except the last.
    pub fn write_varint(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.write_u8(byte);
                return;
            }
            self.write_u8(byte | 0x80);
        }
    }

    pub fn read_varint(&mut self) -> Result<u64, BufferError> {
        let mut value = 0u64;
        for shift in (0..70).step_by(7) {
            let byte = self.read_u8()?;
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(BufferError::VarintOverflow)
    }

    /// Varint byte length, UTF-8 bytes.
    pub fn write_str(&mut self, value: &str) {
        self.write_varint(value.len() as u64);
        self.bytes.extend_from_slice(value.as_bytes());
    }

    pub fn read_str(&mut self) -> Result<String, BufferError> {
        let len = self.read_varint()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| BufferError::InvalidUtf8)
    }
}
