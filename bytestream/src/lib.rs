//! Bounded byte-level encoding primitives for the claimsync protocol.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`] for the handful of
//! primitive encodings the record codec is built from: unsigned LEB128
//! varints, zigzag signed varints, single-byte booleans and length-prefixed
//! UTF-8 strings.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked, string lengths are
//!   validated before any bytes are copied.
//! - **No domain knowledge** - This crate knows nothing about records, cells or messages.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bytestream::{ByteReader, ByteWriter};
//!
//! let mut writer = ByteWriter::new();
//! writer.write_varu32(300);
//! writer.write_vars32(-2);
//! writer.write_str("red").unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ByteReader::new(&bytes);
//! assert_eq!(reader.read_varu32().unwrap(), 300);
//! assert_eq!(reader.read_vars32().unwrap(), -2);
//! assert_eq!(reader.read_str(16).unwrap(), "red");
//! ```

mod error;
mod reader;
mod writer;

pub use error::{StreamError, StreamResult};
pub use reader::ByteReader;
pub use writer::{varu32_len, ByteWriter};

/// Maximum number of bytes a varint-encoded `u32` may occupy.
pub const MAX_VARU32_BYTES: usize = 5;
