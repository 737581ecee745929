//! # zjump Core
//!
//! Core components for the zjump compression library.
//!
//! This crate provides the building blocks shared by the codec and the CLI:
//!
//! - [`bitstream`]: positioned bit-level reader/writer over byte buffers,
//!   used for the bit-packed block container and Huffman payloads
//! - [`error`]: the [`ZjumpError`] taxonomy and [`Result`] alias
//!
//! ## Example
//!
//! ```rust
//! use zjump_core::bitstream::{BitStreamReader, BitStreamWriter};
//!
//! let mut buf = [0u8; 4];
//! let mut writer = BitStreamWriter::new(&mut buf);
//! writer.append(0x5A, 8);
//! writer.append(0b11, 2);
//!
//! let mut reader = BitStreamReader::new(&buf);
//! assert_eq!(reader.read_next(8), (0x5A, 8));
//! assert_eq!(reader.read_next(2), (0b11, 2));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitstream;
pub mod error;

// Re-exports for convenience
pub use bitstream::{BitStreamReader, BitStreamWriter, MAX_BITS_PER_OP};
pub use error::{Result, ZjumpError};
