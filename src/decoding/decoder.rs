use crate::decoding::bit_reader::BitReader;
use crate::tree::{HuffmanTree, Node};
use std::io::{self, Read, Write};

const WRITE_CHUNK: usize = 8 * 1024;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Bit {position} has value {bit}, only 0 and 1 are valid")]
    InvalidBit { bit: u8, position: u64 },
    #[error("Bit {position} leads into a child the tree does not have. The data or code table is corrupted")]
    CorruptTree { position: u64 },
}

/// Where the decoder is in the tree between two bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState<'tree> {
    AtRoot,
    AtInternal(&'tree Node),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Symbols written to the sink
    pub symbols: u64,
    /// Symbols the code table promised
    pub expected: u64,
    /// Bits consumed while decoding
    pub bits: u64,
    /// Bits left in the stream after the last symbol
    pub trailing_bits: u64,
}

impl DecodeSummary {
    pub fn is_complete(&self) -> bool {
        self.symbols == self.expected
    }
}

/// Walks the tree one bit at a time, emitting a symbol whenever a leaf is
/// reached and starting over at the root.
pub struct Decoder<'tree> {
    tree: &'tree HuffmanTree,
    state: DecoderState<'tree>,
    bits_consumed: u64,
}

impl<'t> Decoder<'t> {
    pub fn new(tree: &'t HuffmanTree) -> Decoder<'t> {
        Decoder {
            tree,
            state: DecoderState::AtRoot,
            bits_consumed: 0,
        }
    }

    pub fn state(&self) -> DecoderState<'t> {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = DecoderState::AtRoot;
        self.bits_consumed = 0;
    }

    /// Advance by one bit. `0` descends left, `1` descends right. Returns the
    /// symbol if this bit completed a code.
    ///
    /// A tree that is a single leaf has the code `0`, so every `0` yields
    /// its symbol and a `1` has nowhere to go.
    pub fn feed(&mut self, bit: u8) -> Result<Option<u8>, DecodeError> {
        let position = self.bits_consumed;
        self.bits_consumed += 1;

        let node = match self.state {
            DecoderState::AtRoot => self.tree.root(),
            DecoderState::AtInternal(node) => node,
        };

        let next = match (node, bit) {
            (_, bit @ 2..=u8::MAX) => return Err(DecodeError::InvalidBit { bit, position }),
            (Node::Leaf { symbol, .. }, 0) => return Ok(Some(*symbol)),
            (Node::Leaf { .. }, _) => return Err(DecodeError::CorruptTree { position }),
            (Node::Internal { left, .. }, 0) => &**left,
            (Node::Internal { right, .. }, _) => &**right,
        };

        match next {
            Node::Leaf { symbol, .. } => {
                self.state = DecoderState::AtRoot;
                Ok(Some(*symbol))
            }
            internal => {
                self.state = DecoderState::AtInternal(internal);
                Ok(None)
            }
        }
    }

    /// Decode `source` into `sink` until as many symbols as the tree counts
    /// have been emitted, or the bit stream ends.
    ///
    /// The padding after the last symbol is never decoded. If the stream ends
    /// in the middle of a code the partial code is dropped.
    pub fn decode<R: Read, W: Write>(
        &mut self,
        source: R,
        mut sink: W,
    ) -> Result<DecodeSummary, DecodeError> {
        self.reset();
        let expected = self.tree.frequency();
        let mut reader = BitReader::new(source);
        let mut out = Vec::with_capacity(WRITE_CHUNK);
        let mut symbols: u64 = 0;

        while symbols < expected {
            let Some(bit) = reader.get_bit()? else {
                break;
            };
            if let Some(symbol) = self.feed(bit)? {
                out.push(symbol);
                symbols += 1;
                if out.len() >= WRITE_CHUNK {
                    sink.write_all(&out)?;
                    out.clear();
                }
            }
        }
        sink.write_all(&out)?;
        sink.flush()?;

        let bits = self.bits_consumed;
        let trailing_bits = reader.skip_to_end()?;

        if symbols < expected {
            tracing::warn!(
                expected,
                decoded = symbols,
                partial_code = self.state != DecoderState::AtRoot,
                "bit stream ended before all symbols were decoded"
            );
        } else if trailing_bits >= 8 {
            tracing::warn!(
                trailing_bytes = trailing_bits / 8,
                "ignoring data after the last symbol"
            );
        }
        tracing::debug!(symbols, bits, trailing_bits, "decoded stream");

        Ok(DecodeSummary {
            symbols,
            expected,
            bits,
            trailing_bits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeError, Decoder, DecoderState};
    use crate::frequency::FrequencyTable;
    use crate::tree::HuffmanTree;

    fn tree_for(data: &[u8]) -> HuffmanTree {
        HuffmanTree::build(&FrequencyTable::from_bytes(data)).unwrap()
    }

    #[test]
    fn walks_aaabbc() {
        // a=0 c=10 b=11
        let tree = tree_for(b"aaabbc");
        let mut dec = Decoder::new(&tree);
        assert_eq!(dec.feed(0).unwrap(), Some(b'a'));
        assert_eq!(dec.state(), DecoderState::AtRoot);
        assert_eq!(dec.feed(1).unwrap(), None);
        assert!(matches!(dec.state(), DecoderState::AtInternal(_)));
        assert_eq!(dec.feed(0).unwrap(), Some(b'c'));
        assert_eq!(dec.feed(1).unwrap(), None);
        assert_eq!(dec.feed(1).unwrap(), Some(b'b'));
    }

    #[test]
    fn decodes_stream_and_ignores_padding() {
        let tree = tree_for(b"aaabbc");
        let mut out = Vec::new();
        let summary = Decoder::new(&tree)
            .decode(&[0b0001_1111, 0b0000_0000][..], &mut out)
            .unwrap();
        assert_eq!(out, b"aaabbc");
        assert!(summary.is_complete());
        assert_eq!(summary.bits, 9);
        assert_eq!(summary.trailing_bits, 7);
    }

    #[test]
    fn truncated_stream_drops_partial_code() {
        let tree = tree_for(b"aaabbc");
        let mut out = Vec::new();
        // 0 0 0 1 1 1 1 1 ends in the middle of the last code
        let summary = Decoder::new(&tree).decode(&[0b0001_1111][..], &mut out).unwrap();
        assert_eq!(out, b"aaabb");
        assert!(!summary.is_complete());
        assert_eq!(summary.expected, 6);
    }

    #[test]
    fn single_symbol_tree() {
        let tree = tree_for(&[b'A'; 10]);
        let mut out = Vec::new();
        let summary = Decoder::new(&tree).decode(&[0, 0][..], &mut out).unwrap();
        assert_eq!(out, vec![b'A'; 10]);
        assert_eq!(summary.trailing_bits, 6);

        let mut dec = Decoder::new(&tree);
        assert_eq!(dec.feed(0).unwrap(), Some(b'A'));
        assert!(matches!(
            dec.feed(1),
            Err(DecodeError::CorruptTree { position: 1 })
        ));
    }

    #[test]
    fn single_symbol_stream_with_set_bit_is_corrupt() {
        let tree = tree_for(&[b'A'; 10]);
        let err = Decoder::new(&tree)
            .decode(&[0b0010_0000, 0][..], Vec::new())
            .unwrap_err();
        assert!(matches!(err, DecodeError::CorruptTree { position: 2 }));
    }

    #[test]
    fn invalid_bit_is_framing_error() {
        let tree = tree_for(b"ab");
        let mut dec = Decoder::new(&tree);
        assert!(matches!(
            dec.feed(2),
            Err(DecodeError::InvalidBit {
                bit: 2,
                position: 0
            })
        ));
    }
}
