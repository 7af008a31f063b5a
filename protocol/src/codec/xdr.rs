//! Low-level XDR reader and writer.
//!
//! The rules, all of which the reader enforces:
//!
//! - integers are big-endian, 4 bytes (`i32`/`u32`/`bool`) or 8 bytes;
//! - booleans are a `u32` that is exactly 0 or 1;
//! - opaque data and strings are padded to a multiple of 4 with zero bytes;
//!   variable-length ones carry a `u32` length prefix checked against a
//!   maximum before anything is allocated;
//! - optional values are a `u32` flag (0 or 1) followed by the value;
//! - unions are an `i32` tag followed by the arm.

use thiserror::Error;

/// Why a byte string is not a valid encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("invalid {type_name} tag {tag}")]
    InvalidTag { type_name: &'static str, tag: i32 },

    #[error("non-zero padding byte")]
    NonZeroPadding,

    #[error("invalid boolean value {0}")]
    InvalidBool(u32),

    #[error("{type_name} length {len} exceeds maximum {max}")]
    LengthExceeded {
        type_name: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{0} trailing bytes after envelope")]
    TrailingBytes(usize),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid {type_name}: {reason}")]
    InvalidValue {
        type_name: &'static str,
        reason: String,
    },

    #[error("invalid base64: {0}")]
    Base64(String),
}

impl CodecError {
    pub(crate) fn invalid(type_name: &'static str, reason: impl ToString) -> Self {
        Self::InvalidValue {
            type_name,
            reason: reason.to_string(),
        }
    }
}

fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Append-only XDR output buffer.
#[derive(Debug, Default)]
pub struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_u32(u32::from(v));
    }

    /// Fixed-length opaque data, zero-padded to 4 bytes.
    pub fn write_fixed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.buf.extend(std::iter::repeat(0u8).take(padding(bytes.len())));
    }

    /// Length-prefixed opaque data.
    pub fn write_var_opaque(&mut self, bytes: &[u8]) {
        self.write_u32(bytes.len() as u32);
        self.write_fixed(bytes);
    }

    pub fn write_string(&mut self, s: &str) {
        self.write_var_opaque(s.as_bytes());
    }

    pub fn write_option<T: Encode>(&mut self, value: &Option<T>) {
        match value {
            Some(v) => {
                self.write_u32(1);
                v.encode(self);
            }
            None => self.write_u32(0),
        }
    }

    pub fn write_array<T: Encode>(&mut self, items: &[T]) {
        self.write_u32(items.len() as u32);
        for item in items {
            item.encode(self);
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Cursor over an XDR byte string.
#[derive(Debug)]
pub struct XdrReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> XdrReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.take_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.read_u32()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBool(other)),
        }
    }

    fn skip_padding(&mut self, len: usize) -> Result<(), CodecError> {
        let pad = self.take(padding(len))?;
        if pad.iter().any(|&b| b != 0) {
            return Err(CodecError::NonZeroPadding);
        }
        Ok(())
    }

    /// Fixed-length opaque data of exactly `N` bytes.
    pub fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let out = self.take_array::<N>()?;
        self.skip_padding(N)?;
        Ok(out)
    }

    /// Length-prefixed opaque data of at most `max` bytes.
    pub fn read_var_opaque(
        &mut self,
        type_name: &'static str,
        max: usize,
    ) -> Result<Vec<u8>, CodecError> {
        let len = self.read_u32()? as usize;
        if len > max {
            return Err(CodecError::LengthExceeded { type_name, len, max });
        }
        let bytes = self.take(len)?.to_vec();
        self.skip_padding(len)?;
        Ok(bytes)
    }

    pub fn read_string(&mut self, type_name: &'static str, max: usize) -> Result<String, CodecError> {
        let bytes = self.read_var_opaque(type_name, max)?;
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
    }

    pub fn read_option<T: Decode>(&mut self) -> Result<Option<T>, CodecError> {
        if self.read_bool()? {
            Ok(Some(T::decode(self)?))
        } else {
            Ok(None)
        }
    }

    pub fn read_array<T: Decode>(
        &mut self,
        type_name: &'static str,
        max: usize,
    ) -> Result<Vec<T>, CodecError> {
        let len = self.read_u32()? as usize;
        if len > max {
            return Err(CodecError::LengthExceeded { type_name, len, max });
        }
        // Every element takes at least 4 bytes; refuse lengths the input
        // cannot possibly hold before reserving memory for them.
        if len.saturating_mul(4) > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                needed: len * 4,
                remaining: self.remaining(),
            });
        }
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(T::decode(self)?);
        }
        Ok(out)
    }

    /// Fails if any input is left over.
    pub fn finish(self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Canonical binary encoding.
pub trait Encode {
    fn encode(&self, w: &mut XdrWriter);

    fn to_xdr(&self) -> Vec<u8> {
        let mut w = XdrWriter::new();
        self.encode(&mut w);
        w.into_bytes()
    }

    fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(self.to_xdr())
    }
}

/// Strict decoding: the whole input must be consumed.
pub trait Decode: Sized {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError>;

    fn from_xdr(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = XdrReader::new(bytes);
        let value = Self::decode(&mut r)?;
        r.finish()?;
        Ok(value)
    }

    /// Surrounding whitespace is ignored.
    fn from_base64(text: &str) -> Result<Self, CodecError> {
        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(text.trim())
            .map_err(|e| CodecError::Base64(e.to_string()))?;
        Self::from_xdr(&bytes)
    }
}

macro_rules! primitive_codec {
    ($ty:ty, $write:ident, $read:ident) => {
        impl Encode for $ty {
            fn encode(&self, w: &mut XdrWriter) {
                w.$write(*self);
            }
        }

        impl Decode for $ty {
            fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
                r.$read()
            }
        }
    };
}

primitive_codec!(i32, write_i32, read_i32);
primitive_codec!(u32, write_u32, read_u32);
primitive_codec!(i64, write_i64, read_i64);
primitive_codec!(u64, write_u64, read_u64);
primitive_codec!(bool, write_bool, read_bool);

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self, w: &mut XdrWriter) {
        (**self).encode(w);
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(r: &mut XdrReader<'_>) -> Result<Self, CodecError> {
        T::decode(r).map(Box::new)
    }
}
