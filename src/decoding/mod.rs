//! Turning packed code bits back into the original byte stream.

pub mod bit_reader;
pub mod decoder;

pub use decoder::{DecodeError, DecodeSummary, Decoder, DecoderState};
