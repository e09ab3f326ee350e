//! Contains [`FrequencyTable`], the per-byte occurrence counts
//! that everything else in the codec is derived from.

use std::io::{self, Read};

/// Number of distinct symbols a byte can take.
pub const ALPHABET_SIZE: usize = 256;

const READ_CHUNK: usize = 8 * 1024;

/// Occurrence count for every byte value. Only symbols with a nonzero
/// count take part in tree construction.
#[derive(Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
}

impl FrequencyTable {
    pub fn new() -> Self {
        FrequencyTable {
            counts: [0; ALPHABET_SIZE],
        }
    }

    /// Consume `source` until it is exhausted and count every byte.
    ///
    /// The source is read to the end, so a second pass over the same data
    /// needs a rewind or reopen by the caller. An empty source yields an
    /// empty table.
    pub fn from_reader<R: Read>(mut source: R) -> io::Result<Self> {
        let mut table = Self::new();
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            table.count_all(&buf[..n]);
        }
        Ok(table)
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        table.count_all(data);
        table
    }

    fn count_all(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
    }

    /// Overwrite the count for `symbol`. Setting zero removes the symbol.
    pub fn set(&mut self, symbol: u8, frequency: u64) {
        self.counts[symbol as usize] = frequency;
    }

    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Iterate `(symbol, frequency)` for every present symbol, ascending by symbol.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }

    /// Total number of symbols counted, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .fold(0u64, |total, &count| total.saturating_add(count))
    }

    /// Number of symbols with a nonzero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.distinct() == 0
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<(u8, u64)> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = (u8, u64)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (symbol, frequency) in iter {
            table.set(symbol, frequency);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::FrequencyTable;
    use std::io::{self, Read};

    #[test]
    fn counts_bytes() {
        let table = FrequencyTable::from_bytes(b"aaabbc");
        assert_eq!(table.get(b'a'), 3);
        assert_eq!(table.get(b'b'), 2);
        assert_eq!(table.get(b'c'), 1);
        assert_eq!(table.get(b'd'), 0);
        assert_eq!(table.total(), 6);
        assert_eq!(table.distinct(), 3);
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec![(b'a', 3), (b'b', 2), (b'c', 1)]
        );
    }

    #[test]
    fn empty_source_is_empty_table() {
        let table = FrequencyTable::from_reader(io::empty()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
    }

    #[test]
    fn reader_spanning_many_chunks() {
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 7) as u8).collect();
        let table = FrequencyTable::from_reader(data.as_slice()).unwrap();
        assert_eq!(table, FrequencyTable::from_bytes(&data));
        assert_eq!(table.total(), 100_000);
        assert_eq!(table.distinct(), 7);
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn read_errors_propagate() {
        let err = FrequencyTable::from_reader(Broken).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn total_saturates() {
        let table: FrequencyTable = [(0u8, u64::MAX), (1, 1), (2, 7)].into_iter().collect();
        assert_eq!(table.total(), u64::MAX);
    }

    #[test]
    fn collect_from_pairs() {
        let table: FrequencyTable = [(0u8, 4u64), (255, 1)].into_iter().collect();
        assert_eq!(table.get(0), 4);
        assert_eq!(table.get(255), 1);
        assert_eq!(table.distinct(), 2);
    }
}
