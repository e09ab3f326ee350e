//! A two-pass Huffman coder.
//!
//! Huffman coding assigns every byte value a code, with commonly used bytes
//! getting shorter codes and rare bytes getting longer ones. Codes are prefix
//! free, no code is the start of another, so the packed stream needs no
//! separators.
//!
//! The pipeline is
//! [`FrequencyTable`] -> [`HuffmanTree`] -> [`CodeTable`] -> [`Encoder`],
//! and for the way back the code table's frequencies rebuild the same tree
//! for the [`Decoder`]. [`encode_file`] and [`decode_file`] run the whole
//! thing on paths, and [`encode_file_with`] and [`decode_file_with`] let the
//! caller wrap the readers, e.g. for progress reporting.
#![deny(trivial_casts, trivial_numeric_casts, rust_2018_idioms)]

pub mod code_table;
pub mod codec;
pub mod decoding;
pub mod encoding;
pub mod frequency;
pub mod tree;
#[cfg(test)]
mod tests;

pub use code_table::{Code, CodeTable, StoredTable};
pub use codec::{
    analyze, compress, decode_file, decode_file_with, decompress, encode_file, encode_file_with,
    load_code_table, HuffmanError, Pass,
};
pub use decoding::Decoder;
pub use encoding::Encoder;
pub use frequency::FrequencyTable;
pub use tree::HuffmanTree;

#[cfg(feature = "fuzz_exports")]
pub use codec::round_trip;
