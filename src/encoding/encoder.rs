use crate::code_table::CodeTable;
use crate::encoding::bit_writer::BitWriter;
use std::io::{self, Read, Write};

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EncodeError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Byte {symbol} at offset {offset} has no code in the code table. The table was built from different data")]
    UnknownSymbol { symbol: u8, offset: u64 },
}

/// What a finished encoding pass produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSummary {
    /// Bytes read from the source
    pub symbols: u64,
    /// Code bits written, without the padding of the last byte
    pub bits: u64,
    /// Zero bits appended to complete the last byte
    pub padding: u8,
}

impl EncodeSummary {
    pub fn compressed_bytes(&self) -> u64 {
        (self.bits + u64::from(self.padding)) / 8
    }
}

/// Substitutes every byte of a source with its code.
pub struct Encoder<'table> {
    table: &'table CodeTable,
}

impl<'t> Encoder<'t> {
    pub fn new(table: &'t CodeTable) -> Encoder<'t> {
        Encoder { table }
    }

    /// Read `source` to the end and write the concatenated codes to `sink`.
    ///
    /// The final partial byte is zero padded and the sink is flushed. On
    /// error nothing is flushed and the sink is dropped.
    pub fn encode<R: Read, W: Write>(
        &self,
        mut source: R,
        sink: W,
    ) -> Result<EncodeSummary, EncodeError> {
        let mut writer = BitWriter::new(sink);
        let mut buf = [0u8; READ_CHUNK];
        let mut offset: u64 = 0;

        loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            for &symbol in &buf[..n] {
                let code = self
                    .table
                    .code(symbol)
                    .ok_or(EncodeError::UnknownSymbol { symbol, offset })?;
                writer.write_code(code)?;
                offset += 1;
            }
        }

        let bits = writer.bits_written();
        let padding = writer.padding_bits();
        writer.finish()?;
        tracing::debug!(symbols = offset, bits, padding, "encoded stream");

        Ok(EncodeSummary {
            symbols: offset,
            bits,
            padding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{EncodeError, Encoder};
    use crate::code_table::CodeTable;
    use crate::frequency::FrequencyTable;
    use crate::tree::HuffmanTree;

    fn table_for(data: &[u8]) -> CodeTable {
        CodeTable::from_tree(&HuffmanTree::build(&FrequencyTable::from_bytes(data)).unwrap())
    }

    #[test]
    fn aaabbc_bits() {
        let table = table_for(b"aaabbc");
        let mut out = Vec::new();
        let summary = Encoder::new(&table).encode(&b"aaabbc"[..], &mut out).unwrap();
        // 0 0 0 11 11 10 -> 0001 1111 | 0(pad...)
        assert_eq!(out, vec![0b0001_1111, 0b0000_0000]);
        assert_eq!(summary.symbols, 6);
        assert_eq!(summary.bits, 9);
        assert_eq!(summary.padding, 7);
        assert_eq!(summary.compressed_bytes(), 2);
        assert_eq!(Some(summary.bits), table.expected_bits());
    }

    #[test]
    fn single_symbol_one_bit_each() {
        let table = table_for(&[b'A'; 1000]);
        let mut out = Vec::new();
        let summary = Encoder::new(&table)
            .encode(&[b'A'; 1000][..], &mut out)
            .unwrap();
        assert_eq!(summary.bits, 1000);
        assert_eq!(out.len(), 125);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn unknown_symbol_is_reported() {
        let table = table_for(b"aaabbc");
        let err = Encoder::new(&table)
            .encode(&b"abcd"[..], Vec::new())
            .unwrap_err();
        assert!(matches!(
            err,
            EncodeError::UnknownSymbol {
                symbol: b'd',
                offset: 3
            }
        ));
    }
}
