use crate::code_table::Code;
use std::io::{self, Write};

/// Full bytes are handed to the sink once this many are staged.
const STAGE_SIZE: usize = 4 * 1024;

/// An interface for writing single bits into a byte sink.
///
/// Bits fill each byte starting from the *most significant position*. The last
/// byte is padded with zero bits by [`BitWriter::finish`].
pub struct BitWriter<W: Write> {
    sink: W,
    /// Complete bytes that have not been handed to the sink yet
    staged: Vec<u8>,
    /// The byte currently being filled
    current: u8,
    /// How many bits of `current` are occupied
    bits_in_current: u8,
    /// Number of bits written so far, not counting padding
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            staged: Vec::with_capacity(STAGE_SIZE),
            current: 0,
            bits_in_current: 0,
            bits_written: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        if bit {
            self.current |= 0x80 >> self.bits_in_current;
        }
        self.bits_in_current += 1;
        self.bits_written += 1;

        if self.bits_in_current == 8 {
            self.staged.push(self.current);
            self.current = 0;
            self.bits_in_current = 0;
            if self.staged.len() >= STAGE_SIZE {
                self.drain()?;
            }
        }
        Ok(())
    }

    /// Append all bits of `code`, first bit first.
    pub fn write_code(&mut self, code: &Code) -> io::Result<()> {
        for &bit in code.bits() {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// How many zero bits [`BitWriter::finish`] will append to complete the last byte.
    pub fn padding_bits(&self) -> u8 {
        (8 - self.bits_in_current) % 8
    }

    fn drain(&mut self) -> io::Result<()> {
        self.sink.write_all(&self.staged)?;
        self.staged.clear();
        Ok(())
    }

    /// Pad the partial last byte with zero bits, flush everything into the
    /// sink and return it.
    pub fn finish(mut self) -> io::Result<W> {
        if self.bits_in_current > 0 {
            self.staged.push(self.current);
            self.current = 0;
            self.bits_in_current = 0;
        }
        self.drain()?;
        self.sink.flush()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::BitWriter;
    use crate::code_table::Code;

    fn write_str(bits: &str) -> Vec<u8> {
        let mut bw = BitWriter::new(Vec::new());
        bw.write_code(&bits.parse::<Code>().unwrap()).unwrap();
        bw.finish().unwrap()
    }

    #[test]
    fn single_byte_written_4_4() {
        assert_eq!(write_str("11110000"), vec![0b1111_0000]);
    }

    #[test]
    fn partial_byte_is_zero_padded() {
        let mut bw = BitWriter::new(Vec::new());
        bw.write_bit(true).unwrap();
        bw.write_bit(false).unwrap();
        bw.write_bit(true).unwrap();
        assert_eq!(bw.bits_written(), 3);
        assert_eq!(bw.padding_bits(), 5);
        assert_eq!(bw.finish().unwrap(), vec![0b1010_0000]);
    }

    #[test]
    fn multi_byte_boundary_crossed_4_5_7() {
        // 4 ones, 5 zeros, 7 ones
        assert_eq!(
            write_str("1111000001111111"),
            vec![0b1111_0000, 0b0111_1111]
        );
    }

    #[test]
    fn aligned_output_has_no_padding() {
        let mut bw = BitWriter::new(Vec::new());
        bw.write_code(&"0000000111111110".parse().unwrap()).unwrap();
        assert_eq!(bw.padding_bits(), 0);
        assert_eq!(bw.finish().unwrap(), vec![0b0000_0001, 0b1111_1110]);
    }

    #[test]
    fn nothing_written_is_empty() {
        assert!(BitWriter::new(Vec::new()).finish().unwrap().is_empty());
    }

    #[test]
    fn many_bytes_pass_through_the_stage() {
        let mut bw = BitWriter::new(Vec::new());
        for i in 0..(10 * 4096 * 8 + 3) {
            bw.write_bit(i % 3 == 0).unwrap();
        }
        let out = bw.finish().unwrap();
        assert_eq!(out.len(), 10 * 4096 + 1);
        // bits 0, 3, 6 of the stream are set
        assert_eq!(out[0], 0b1001_0010);
    }
}
