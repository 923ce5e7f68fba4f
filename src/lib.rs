//! # Static Huffman compression
//!
//! Compress a buffer by counting byte frequencies, building a Huffman tree with
//! a reproducible tie-break, deriving a prefix-free code table, and packing the
//! coded bits into a versioned container that carries the table and the exact
//! padding count.
//!
//! ```rust
//! use huffcodec::huff;
//! let compressed = huff::compress_slice(b"aaabbc",&huff::STD_OPTIONS).unwrap();
//! let expanded = huff::expand_slice(&compressed,&huff::STD_OPTIONS).unwrap();
//! assert_eq!(expanded,b"aaabbc");
//! ```

pub mod tools;
pub mod container;
pub mod huff;

type DYNERR = Box<dyn std::error::Error>;

const RCH: &str = "unreachable was reached";

/// Codec Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("input is empty")]
    EmptyInput,
    #[error("container is corrupt")]
    CorruptContainer,
    #[error("payload cannot be decoded with this table")]
    CorruptPayload,
    #[error("symbol is missing from code table")]
    SymbolNotInTable,
    #[error("file format mismatch")]
    FileFormatMismatch,
    #[error("file too large")]
    FileTooLarge
}
