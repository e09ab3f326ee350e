use std::io::{self, Read};

const READ_CHUNK: usize = 4 * 1024;

/// Reads single bits from a byte source, most significant bit of each byte
/// first. Mirrors [`crate::encoding::bit_writer::BitWriter`].
pub struct BitReader<R: Read> {
    source: R,
    buffer: Vec<u8>,
    /// Valid bytes in `buffer`
    filled: usize,
    idx: usize, //index counts bits already read from `buffer`
    bits_read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(source: R) -> Self {
        BitReader {
            source,
            buffer: vec![0; READ_CHUNK],
            filled: 0,
            idx: 0,
            bits_read: 0,
        }
    }

    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }

    /// Returns `false` once the source is exhausted.
    fn refill(&mut self) -> io::Result<bool> {
        loop {
            match self.source.read(&mut self.buffer) {
                Ok(n) => {
                    self.filled = n;
                    self.idx = 0;
                    return Ok(n > 0);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Next bit as `0` or `1`, or `None` at the end of the stream.
    pub fn get_bit(&mut self) -> io::Result<Option<u8>> {
        if self.idx == self.filled * 8 && !self.refill()? {
            return Ok(None);
        }
        let byte = self.buffer[self.idx / 8];
        let bit = (byte >> (7 - self.idx % 8)) & 1;
        self.idx += 1;
        self.bits_read += 1;
        Ok(Some(bit))
    }

    /// Consume the rest of the stream and return how many bits were left.
    pub fn skip_to_end(&mut self) -> io::Result<u64> {
        let mut skipped = (self.filled * 8 - self.idx) as u64;
        self.idx = self.filled * 8;
        while self.refill()? {
            skipped += self.filled as u64 * 8;
            self.idx = self.filled * 8;
        }
        self.bits_read += skipped;
        Ok(skipped)
    }
}
