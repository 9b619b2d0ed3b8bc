//! huffstream-core: Huffman file codec with a self-describing header
//!
//! A compressed blob carries its own code tree, so nothing beyond the blob
//! is needed to decode it:
//!
//! ```text
//! [32 bits]  magic 0xFACE8201
//! [variable] tree header, preorder (0 = internal, 1 + 9-bit symbol = leaf)
//! [variable] one code per input byte, then the end-of-stream code
//! [0-7 bits] zero padding
//! ```
//!
//! # Architecture
//!
//! - `bitio`: MSB-first bit reading/writing over byte streams
//! - `frequency`: symbol counting (first pass over the input)
//! - `tree`: code tree type and Huffman construction
//! - `code_table`: symbol-to-code mapping derived from the tree
//! - `header`: tree (de)serialization
//! - `codec`: the compress/decompress pipelines
//! - `metrics`: per-run counters and summaries
//!
//! # Example
//! ```
//! use huffstream_core::codec::{compress_bytes, decompress_bytes};
//!
//! let blob = compress_bytes(b"abracadabra").unwrap();
//! assert_eq!(decompress_bytes(&blob).unwrap(), b"abracadabra");
//! ```

pub mod bitio;
pub mod code_table;
pub mod codec;
pub mod error;
pub mod frequency;
pub mod header;
pub mod metrics;
pub mod tree;

// Re-export commonly used types
pub use codec::{compress, compress_bytes, decompress, decompress_bytes, MAGIC};
pub use error::{Error, Result};
