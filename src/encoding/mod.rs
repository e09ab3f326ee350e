//! Turning a byte stream into packed code bits.

pub mod bit_writer;
pub mod encoder;

pub use encoder::{EncodeError, EncodeSummary, Encoder};
