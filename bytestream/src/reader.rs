//! Byte-level reader with bounded operations.

use crate::error::{StreamError, StreamResult};
use crate::MAX_VARU32_BYTES;

/// A byte-level reader for decoding protocol primitives.
///
/// All read operations are bounds-checked and return errors on failure.
/// The reader never panics on malformed input.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn bytes_remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes_remaining() == 0
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Reads a single raw byte.
    pub fn read_u8(&mut self) -> StreamResult<u8> {
        self.ensure_bytes(1)?;
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Reads a one-byte boolean, rejecting anything but 0 and 1.
    pub fn read_bool(&mut self) -> StreamResult<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(StreamError::InvalidBool { value }),
        }
    }

    /// Reads an unsigned LEB128 varint.
    pub fn read_varu32(&mut self) -> StreamResult<u32> {
        let mut result = 0u32;
        for index in 0..MAX_VARU32_BYTES {
            let byte = self.read_u8()?;
            let shift = 7 * index as u32;
            // Fifth byte may only carry the top four bits of a u32.
            if index == MAX_VARU32_BYTES - 1 && byte > 0x0F {
                return Err(StreamError::InvalidVarint);
            }
            result |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(StreamError::InvalidVarint)
    }

    /// Reads a zigzag-encoded signed varint.
    pub fn read_vars32(&mut self) -> StreamResult<i32> {
        let value = self.read_varu32()?;
        let decoded = ((value >> 1) as i32) ^ (-((value & 1) as i32));
        Ok(decoded)
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> StreamResult<&'a [u8]> {
        self.ensure_bytes(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads a varint-length-prefixed UTF-8 string of at most `max_len` bytes.
    pub fn read_str(&mut self, max_len: usize) -> StreamResult<&'a str> {
        let len = self.read_varu32()? as usize;
        if len > max_len {
            return Err(StreamError::StringTooLong { len, max: max_len });
        }
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes).map_err(|_| StreamError::InvalidUtf8)
    }

    fn ensure_bytes(&self, bytes: usize) -> StreamResult<()> {
        let available = self.bytes_remaining();
        if bytes > available {
            return Err(StreamError::UnexpectedEof {
                requested: bytes,
                available,
            });
        }
        Ok(())
    }
}
