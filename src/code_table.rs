//! Derives the per-symbol codes from a [`HuffmanTree`] and handles the
//! plain-text code table that is stored next to the compressed data.
//!
//! A code table file has one line per present symbol:
//!
//! ```text
//! <symbol> <frequency> <code>
//! ```
//!
//! with the symbol and frequency as decimal integers and the code as a string
//! of `0` and `1`. Only the first two fields are needed to rebuild the tree;
//! the code field is optional when reading and is checked against the
//! re-derived code if present.

use crate::frequency::{FrequencyTable, ALPHABET_SIZE};
use crate::tree::{HuffmanTree, Node};
use core::fmt;
use core::str::FromStr;
use std::io::{self, BufRead, Write};

/// The path from the root to a leaf. `false` is a step to the left child,
/// `true` a step to the right child.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// True if `self` is a prefix of `other` (including equality).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }

    fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    fn pop(&mut self) {
        self.bits.pop();
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({self})")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid code digit {found:?}, codes only contain 0 and 1")]
pub struct InvalidCodeDigit {
    pub found: char,
}

impl FromStr for Code {
    type Err = InvalidCodeDigit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                found => Err(InvalidCodeDigit { found }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Code { bits })
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CodeTableError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Line {line}: expected `<symbol> <frequency> [code]`, got {content:?}")]
    MalformedLine { line: usize, content: String },
    #[error("Line {line}: symbol {got} is outside of 0..=255")]
    SymbolOutOfRange { line: usize, got: u64 },
    #[error("Line {line}: frequency of symbol {symbol} must be at least 1")]
    ZeroFrequency { line: usize, symbol: u8 },
    #[error("Line {line}: symbol {symbol} is listed more than once")]
    DuplicateSymbol { line: usize, symbol: u8 },
    #[error("Line {line}: sum of frequencies does not fit into 64 bits")]
    FrequencyOverflow { line: usize },
    #[error("Line {line}: {source}")]
    InvalidCode {
        line: usize,
        #[source]
        source: InvalidCodeDigit,
    },
    #[error("Stored code {stored} for symbol {symbol} does not match the rebuilt code {derived}")]
    CodeMismatch {
        symbol: u8,
        stored: Code,
        derived: Code,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub frequency: u64,
    pub code: Code,
}

/// Symbol to (frequency, code) mapping. Built once from a tree and only read
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    /// Index is the symbol
    entries: Vec<Option<CodeEntry>>,
}

impl CodeTable {
    /// Walk the tree depth first, appending `0` for every step to the left
    /// and `1` for every step to the right.
    ///
    /// A tree that is a single leaf gets the one bit code `0` so that every
    /// symbol still occupies space in the bit stream.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut table = CodeTable {
            entries: vec![None; ALPHABET_SIZE],
        };
        let mut path = Code::new();
        table.collect(tree.root(), &mut path);

        tracing::debug!(
            symbols = table.distinct(),
            max_code_len = table.max_code_len(),
            "derived code table"
        );
        table
    }

    fn collect(&mut self, node: &Node, path: &mut Code) {
        match node {
            Node::Leaf { symbol, frequency } => {
                let mut code = path.clone();
                if code.is_empty() {
                    code.push(false);
                }
                tracing::trace!(symbol, frequency, code = %code, "leaf");
                self.entries[*symbol as usize] = Some(CodeEntry {
                    frequency: *frequency,
                    code,
                });
            }
            Node::Internal { left, right, .. } => {
                path.push(false);
                self.collect(left, path);
                path.pop();
                path.push(true);
                self.collect(right, path);
                path.pop();
            }
        }
    }

    pub fn get(&self, symbol: u8) -> Option<&CodeEntry> {
        self.entries[symbol as usize].as_ref()
    }

    pub fn code(&self, symbol: u8) -> Option<&Code> {
        self.get(symbol).map(|entry| &entry.code)
    }

    /// Iterate all present symbols in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &CodeEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(symbol, entry)| entry.as_ref().map(|e| (symbol as u8, e)))
    }

    pub fn frequencies(&self) -> FrequencyTable {
        self.iter()
            .map(|(symbol, entry)| (symbol, entry.frequency))
            .collect()
    }

    pub fn distinct(&self) -> usize {
        self.iter().count()
    }

    /// Number of symbols the table was built from.
    pub fn total_symbols(&self) -> u64 {
        self.iter()
            .fold(0u64, |total, (_, entry)| total.saturating_add(entry.frequency))
    }

    /// Length of the bit stream the encoder will produce, before padding.
    ///
    /// `None` if that length does not fit into a `u64`, which a code table
    /// read from a file can claim even though no real input gets there.
    pub fn expected_bits(&self) -> Option<u64> {
        self.iter().try_fold(0u64, |bits, (_, entry)| {
            entry
                .frequency
                .checked_mul(entry.code.len() as u64)
                .and_then(|symbol_bits| bits.checked_add(symbol_bits))
        })
    }

    pub fn max_code_len(&self) -> usize {
        self.iter()
            .map(|(_, entry)| entry.code.len())
            .max()
            .unwrap_or(0)
    }

    /// Write one `<symbol> <frequency> <code>` line per symbol, ascending by symbol.
    pub fn write_to<W: Write>(&self, mut sink: W) -> io::Result<()> {
        for (symbol, entry) in self.iter() {
            writeln!(sink, "{} {} {}", symbol, entry.frequency, entry.code)?;
        }
        sink.flush()
    }

    /// Check that every code stored next to the frequencies is the code this
    /// table derived. A mismatch means the encoder built a different tree.
    pub fn verify(&self, stored: &StoredTable) -> Result<(), CodeTableError> {
        for (symbol, stored_code) in &stored.codes {
            let derived = self.code(*symbol).cloned().unwrap_or_default();
            if &derived != stored_code {
                return Err(CodeTableError::CodeMismatch {
                    symbol: *symbol,
                    stored: stored_code.clone(),
                    derived,
                });
            }
        }
        Ok(())
    }
}

/// A code table as read back from disk: the frequencies needed to rebuild the
/// tree, and whatever codes were stored alongside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTable {
    pub frequencies: FrequencyTable,
    pub codes: Vec<(u8, Code)>,
}

impl StoredTable {
    /// Parse a code table. Lines may come in any order; blank lines are skipped.
    pub fn read_from<R: BufRead>(source: R) -> Result<Self, CodeTableError> {
        use CodeTableError as err;

        let mut frequencies = FrequencyTable::new();
        let mut codes = Vec::new();
        let mut total: u64 = 0;

        for (idx, line) in source.lines().enumerate() {
            let line_no = idx + 1;
            let content = line?;
            let mut fields = content.split_ascii_whitespace();
            let (symbol, frequency, code) =
                match (fields.next(), fields.next(), fields.next(), fields.next()) {
                    (None, ..) => continue,
                    (Some(symbol), Some(frequency), code, None) => (symbol, frequency, code),
                    _ => {
                        return Err(err::MalformedLine {
                            line: line_no,
                            content,
                        })
                    }
                };

            let malformed = || err::MalformedLine {
                line: line_no,
                content: content.clone(),
            };
            let symbol: u64 = symbol.parse().map_err(|_| malformed())?;
            let frequency: u64 = frequency.parse().map_err(|_| malformed())?;
            let symbol = u8::try_from(symbol).map_err(|_| err::SymbolOutOfRange {
                line: line_no,
                got: symbol,
            })?;

            if frequency == 0 {
                return Err(err::ZeroFrequency {
                    line: line_no,
                    symbol,
                });
            }
            if frequencies.get(symbol) != 0 {
                return Err(err::DuplicateSymbol {
                    line: line_no,
                    symbol,
                });
            }
            total = total
                .checked_add(frequency)
                .ok_or(err::FrequencyOverflow { line: line_no })?;
            frequencies.set(symbol, frequency);

            if let Some(code) = code {
                let code = code.parse::<Code>().map_err(|source| err::InvalidCode {
                    line: line_no,
                    source,
                })?;
                codes.push((symbol, code));
            }
        }

        Ok(StoredTable { frequencies, codes })
    }
}
