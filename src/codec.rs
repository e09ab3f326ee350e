//! The two file level operations, encode and decode, plus in-memory
//! variants of both.
//!
//! Encoding makes two passes over the original: one to count frequencies and
//! one to substitute codes. It writes a code table file and a compressed bit
//! file. Decoding rebuilds the tree from the code table's frequencies and
//! walks it over the compressed bits.

use crate::code_table::{CodeTable, CodeTableError, StoredTable};
use crate::decoding::decoder::{DecodeError, DecodeSummary, Decoder};
use crate::encoding::encoder::{EncodeError, EncodeSummary, Encoder};
use crate::frequency::FrequencyTable;
use crate::tree::{HuffmanTree, TreeError};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HuffmanError {
    #[error("Can't open {} for reading", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Can't create {}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    CodeTable(#[from] CodeTableError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("Source changed between passes: {counted} bytes counted, {encoded} encoded")]
    SourceChanged { counted: u64, encoded: u64 },
}

fn open(path: &Path) -> Result<File, HuffmanError> {
    File::open(path).map_err(|source| HuffmanError::Open {
        path: path.to_owned(),
        source,
    })
}

fn create(path: &Path) -> Result<File, HuffmanError> {
    File::create(path).map_err(|source| HuffmanError::Create {
        path: path.to_owned(),
        source,
    })
}

/// Count the symbols of `source` and derive the tree and the codes.
/// Fails with [`TreeError::EmptyInput`] if the source is empty.
pub fn analyze<R: Read>(source: R) -> Result<(HuffmanTree, CodeTable), HuffmanError> {
    let frequencies = FrequencyTable::from_reader(source)?;
    build(&frequencies)
}

fn build(frequencies: &FrequencyTable) -> Result<(HuffmanTree, CodeTable), HuffmanError> {
    let tree = HuffmanTree::build(frequencies)?;
    let table = CodeTable::from_tree(&tree);
    Ok((tree, table))
}

/// Read a code table, rebuild the tree from its frequencies and check the
/// stored codes, if any, against the rebuilt ones.
pub fn load_code_table<R: BufRead>(source: R) -> Result<(HuffmanTree, CodeTable), HuffmanError> {
    let stored = StoredTable::read_from(source)?;
    let (tree, table) = build(&stored.frequencies)?;
    table.verify(&stored)?;
    Ok((tree, table))
}

/// The passes [`encode_file_with`] and [`decode_file_with`] make over their
/// input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Counting symbol frequencies in the original
    Counting,
    /// Substituting codes for the original's bytes
    Encoding,
    /// Walking the tree over the compressed bits
    Decoding,
}

impl Pass {
    pub fn name(self) -> &'static str {
        match self {
            Pass::Counting => "counting",
            Pass::Encoding => "encoding",
            Pass::Decoding => "decoding",
        }
    }
}

/// Open `path` and hand it to `wrap` together with its length in bytes.
fn open_pass<R, F>(path: &Path, pass: Pass, wrap: &mut F) -> Result<R, HuffmanError>
where
    R: Read,
    F: FnMut(BufReader<File>, u64, Pass) -> R,
{
    let file = open(path)?;
    let len = file.metadata()?.len();
    Ok(wrap(BufReader::new(file), len, pass))
}

/// Remove the half written `path` if `result` is an error.
fn discard_on_error<T>(path: &Path, result: Result<T, HuffmanError>) -> Result<T, HuffmanError> {
    if result.is_err() {
        if let Err(err) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), %err, "could not remove partial output");
        }
    }
    result
}

/// Compress the file at `original`, writing the code table to `code_table`
/// and the packed code bits to `compressed`.
pub fn encode_file(
    original: &Path,
    code_table: &Path,
    compressed: &Path,
) -> Result<EncodeSummary, HuffmanError> {
    encode_file_with(original, code_table, compressed, |reader, _, _| reader)
}

/// Like [`encode_file`], but every reader over `original` is passed through
/// `wrap` first, together with the file length and the pass it is used for.
///
/// The original is opened once per pass. If it changed in between, the
/// compressed file is removed and [`HuffmanError::SourceChanged`] returned.
pub fn encode_file_with<R, F>(
    original: &Path,
    code_table: &Path,
    compressed: &Path,
    mut wrap: F,
) -> Result<EncodeSummary, HuffmanError>
where
    R: Read,
    F: FnMut(BufReader<File>, u64, Pass) -> R,
{
    let (tree, table) = analyze(open_pass(original, Pass::Counting, &mut wrap)?)?;

    table.write_to(BufWriter::new(create(code_table)?))?;

    let source = open_pass(original, Pass::Encoding, &mut wrap)?;
    let sink = BufWriter::new(create(compressed)?);
    let result = Encoder::new(&table)
        .encode(source, sink)
        .map_err(HuffmanError::from)
        .and_then(|summary| {
            if summary.symbols == tree.frequency() {
                Ok(summary)
            } else {
                Err(HuffmanError::SourceChanged {
                    counted: tree.frequency(),
                    encoded: summary.symbols,
                })
            }
        });
    let summary = discard_on_error(compressed, result)?;

    tracing::info!(
        original = %original.display(),
        symbols = summary.symbols,
        compressed_bytes = summary.compressed_bytes(),
        "encoded"
    );
    Ok(summary)
}

/// Rebuild the file `compressed` was made from, using the frequencies in
/// `code_table`, and write it to `output`.
///
/// A corrupt bit stream removes `output` again. A truncated one is not an
/// error: the symbols decoded so far stay in `output` and the summary is
/// not [complete](DecodeSummary::is_complete).
pub fn decode_file(
    compressed: &Path,
    code_table: &Path,
    output: &Path,
) -> Result<DecodeSummary, HuffmanError> {
    decode_file_with(compressed, code_table, output, |reader, _, _| reader)
}

/// Like [`decode_file`], but the reader over `compressed` is passed through
/// `wrap` first, together with the file length.
pub fn decode_file_with<R, F>(
    compressed: &Path,
    code_table: &Path,
    output: &Path,
    mut wrap: F,
) -> Result<DecodeSummary, HuffmanError>
where
    R: Read,
    F: FnMut(BufReader<File>, u64, Pass) -> R,
{
    let (tree, _) = load_code_table(BufReader::new(open(code_table)?))?;

    let source = open_pass(compressed, Pass::Decoding, &mut wrap)?;
    let sink = BufWriter::new(create(output)?);
    let result = Decoder::new(&tree)
        .decode(source, sink)
        .map_err(HuffmanError::from);
    let summary = discard_on_error(output, result)?;

    tracing::info!(
        output = %output.display(),
        symbols = summary.symbols,
        "decoded"
    );
    Ok(summary)
}

/// In-memory encode. Returns the code table and the packed bits.
pub fn compress(data: &[u8]) -> Result<(CodeTable, Vec<u8>), HuffmanError> {
    let (_, table) = build(&FrequencyTable::from_bytes(data))?;
    let mut out = Vec::new();
    Encoder::new(&table).encode(data, &mut out)?;
    Ok((table, out))
}

/// In-memory decode of the output of [`compress`].
pub fn decompress(table: &CodeTable, data: &[u8]) -> Result<Vec<u8>, HuffmanError> {
    let tree = HuffmanTree::build(&table.frequencies())?;
    // every symbol takes at least one bit
    let capacity = usize::try_from(tree.frequency())
        .unwrap_or(usize::MAX)
        .min(data.len().saturating_mul(8));
    let mut out = Vec::with_capacity(capacity);
    Decoder::new(&tree).decode(data, &mut out)?;
    Ok(out)
}

/// Compress and decompress `data`, panicking if anything goes wrong.
#[cfg(feature = "fuzz_exports")]
pub fn round_trip(data: &[u8]) {
    if data.is_empty() {
        assert!(matches!(
            compress(data),
            Err(HuffmanError::Tree(TreeError::EmptyInput))
        ));
        return;
    }
    let (table, compressed) = compress(data).unwrap();
    assert_eq!(
        Some(compressed.len() as u64),
        table.expected_bits().map(|bits| bits.div_ceil(8))
    );

    let mut written = Vec::new();
    table.write_to(&mut written).unwrap();
    let (_, reloaded) = load_code_table(written.as_slice()).unwrap();
    assert_eq!(reloaded, table);

    let decompressed = decompress(&reloaded, &compressed).unwrap();
    assert_eq!(data, decompressed.as_slice());
}
