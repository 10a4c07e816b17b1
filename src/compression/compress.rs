use std::fs;
use std::io::{BufWriter, Write};

use log::{debug, error, info, warn};

use super::{create_output, same_path, write_header, Termination};
use crate::bitstream::bitwriter::BitWriter;
use crate::error::{HuffError, Result};
use crate::huffman_coding::code_table::CodeTable;
use crate::huffman_coding::huffman::HuffmanTree;
use crate::huffman_coding::tree_codec;
use crate::tools::cli::HuffOpts;
use crate::tools::freq_count::freqs;

/// What a compression run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Input symbols encoded (not counting a sentinel).
    pub symbols: u64,
    /// Distinct symbols in the code table.
    pub distinct: usize,
    /// Code bits written after the header.
    pub bits: u64,
    /// Artifact size in bytes, header included.
    pub bytes: usize,
    /// Zero bits padding out the last byte.
    pub padding: u8,
}

/// Feed the code of every input symbol to the BitWriter, in input order.
/// Returns the number of bits written.
pub fn encode<W: Write>(data: &[u8], table: &CodeTable, bw: &mut BitWriter<W>) -> Result<u64> {
    let mut bits = 0_u64;
    for &sym in data {
        let code = table.get(sym).ok_or(HuffError::UnknownSymbol(sym))?;
        bw.out_code(code)?;
        bits += code.len() as u64;
    }
    Ok(bits)
}

/// Compress data in memory, writing the artifact and the code file to the two sinks.
///
/// With a sentinel, that byte value must not occur in data. It is added to the alphabet once
/// and its code is written after the data.
pub fn compress_to<A: Write, C: Write>(
    data: &[u8],
    sentinel: Option<u8>,
    artifact: A,
    code: C,
) -> Result<Summary> {
    let mut freq_map = freqs(data);
    info!(
        "Counted {} symbols, {} distinct",
        freq_map.total(),
        freq_map.len()
    );
    if freq_map.len() < 2 {
        return Err(HuffError::DegenerateAlphabet(freq_map.len()));
    }

    let termination = match sentinel {
        Some(sym) => {
            if freq_map.get(sym) > 0 {
                return Err(HuffError::SentinelCollision(sym));
            }
            freq_map.add(sym, 1);
            Termination::Sentinel(sym)
        }
        None => Termination::Count(data.len() as u64),
    };

    let tree = HuffmanTree::from_freqs(&freq_map)?;
    let table = CodeTable::from_tree(&tree)?;
    debug!(
        "Weighted code length is {} bits for {} symbols",
        table.weighted_length(&freq_map),
        freq_map.total()
    );

    tree_codec::serialize(&table, code)?;

    let mut bw = BitWriter::new(artifact);
    write_header(&mut bw, termination)?;
    let mut bits = encode(data, &table, &mut bw)?;
    if let Termination::Sentinel(sym) = termination {
        let code = table.get(sym).ok_or(HuffError::UnknownSymbol(sym))?;
        bw.out_code(code)?;
        bits += code.len() as u64;
    }
    debug!("Encoded {} bits, ending at {}", bits, bw.loc());
    let (bytes, padding) = bw.close()?;

    Ok(Summary {
        symbols: data.len() as u64,
        distinct: table.len(),
        bits,
        bytes,
        padding,
    })
}

/// Compress the input file defined in opts, writing the artifact and code file next to it
/// (or where opts says). Nothing is left behind if compression fails.
pub fn compress(opts: &HuffOpts) -> Result<Summary> {
    let data = fs::read(&opts.file).map_err(|source| HuffError::MissingInput {
        path: opts.file.clone(),
        source,
    })?;
    let artifact_path = opts.artifact_path();
    let code_path = opts.code_path();
    for (output, other) in [
        (&artifact_path, &opts.file),
        (&code_path, &opts.file),
        (&code_path, &artifact_path),
    ] {
        if same_path(output, other) {
            error!("Refusing to write {} over another file of this run", output.display());
            return Err(HuffError::PathClash(output.clone()));
        }
    }

    let artifact = create_output(&artifact_path, opts.force_overwrite)?;
    let code = match create_output(&code_path, opts.force_overwrite) {
        Ok(file) => file,
        Err(e) => {
            drop(artifact);
            let _ = fs::remove_file(&artifact_path);
            return Err(e);
        }
    };

    let result = compress_to(
        &data,
        opts.sentinel,
        BufWriter::new(artifact),
        BufWriter::new(code),
    );
    match result {
        Ok(summary) => {
            info!(
                "{}: {} -> {} bytes ({} distinct symbols), code table in {}",
                opts.file.display(),
                data.len(),
                summary.bytes,
                summary.distinct,
                code_path.display()
            );
            Ok(summary)
        }
        Err(e) => {
            warn!("Compression failed, removing partial output");
            let _ = fs::remove_file(&artifact_path);
            let _ = fs::remove_file(&code_path);
            Err(e)
        }
    }
}

#[cfg(test)]
mod test {
    use super::{compress_to, encode};
    use crate::bitstream::bitwriter::BitWriter;
    use crate::error::HuffError;
    use crate::huffman_coding::code_table::CodeTable;
    use crate::huffman_coding::huffman::HuffmanTree;
    use crate::tools::freq_count::freqs;
    use std::io::sink;

    #[test]
    fn encode_small_test() {
        // a=0, c=10, b=11: 0000 111111 1010, padded with two zeros.
        let table =
            CodeTable::from_tree(&HuffmanTree::from_freqs(&freqs(b"aaaabbbcc")).unwrap()).unwrap();
        let mut out: Vec<u8> = Vec::new();
        let mut bw = BitWriter::new(&mut out);
        assert_eq!(encode(b"aaaabbbcc", &table, &mut bw).unwrap(), 14);
        assert_eq!(bw.close().unwrap(), (2, 2));
        assert_eq!(out, vec![0b0000_1111, 0b1110_1000]);
    }

    #[test]
    fn unknown_symbol_test() {
        let table =
            CodeTable::from_tree(&HuffmanTree::from_freqs(&freqs(b"ab")).unwrap()).unwrap();
        let mut out: Vec<u8> = Vec::new();
        let mut bw = BitWriter::new(&mut out);
        assert!(matches!(
            encode(b"abc", &table, &mut bw),
            Err(HuffError::UnknownSymbol(b'c'))
        ));
    }

    #[test]
    fn compress_to_test() {
        let mut artifact: Vec<u8> = Vec::new();
        let mut code: Vec<u8> = Vec::new();
        let summary = compress_to(b"aaaabbbcc", None, &mut artifact, &mut code).unwrap();
        assert_eq!(summary.symbols, 9);
        assert_eq!(summary.distinct, 3);
        assert_eq!(summary.bits, 14);
        assert_eq!(summary.bytes, 14);
        assert_eq!(summary.padding, 2);
        assert_eq!(&artifact[..12], b"HUFc\0\0\0\0\0\0\0\x09");
        assert_eq!(&artifact[12..], &[0b0000_1111, 0b1110_1000]);
        assert_eq!(code, b"97\n0\n98\n11\n99\n10\n");
    }

    #[test]
    fn sentinel_test() {
        let mut artifact: Vec<u8> = Vec::new();
        let mut code: Vec<u8> = Vec::new();
        let summary = compress_to(b"aaaabbbcc", Some(b'*'), &mut artifact, &mut code).unwrap();
        assert_eq!(summary.distinct, 4);
        assert_eq!(&artifact[..5], b"HUFs*");
        assert!(String::from_utf8(code).unwrap().starts_with("42\n"));

        assert!(matches!(
            compress_to(b"a*b", Some(b'*'), sink(), sink()),
            Err(HuffError::SentinelCollision(b'*'))
        ));
    }

    #[test]
    fn degenerate_test() {
        assert!(matches!(
            compress_to(b"aaaa", None, sink(), sink()),
            Err(HuffError::DegenerateAlphabet(1))
        ));
        assert!(matches!(
            compress_to(b"", None, sink(), sink()),
            Err(HuffError::DegenerateAlphabet(0))
        ));
        // A sentinel does not rescue a single-symbol input.
        assert!(matches!(
            compress_to(b"aaaa", Some(0), sink(), sink()),
            Err(HuffError::DegenerateAlphabet(1))
        ));
    }

    #[test]
    fn deterministic_test() {
        let data = b"It was the best of times, it was the worst of times";
        let mut first: (Vec<u8>, Vec<u8>) = (Vec::new(), Vec::new());
        let mut second: (Vec<u8>, Vec<u8>) = (Vec::new(), Vec::new());
        compress_to(data, None, &mut first.0, &mut first.1).unwrap();
        compress_to(data, None, &mut second.0, &mut second.1).unwrap();
        assert_eq!(first, second);
    }
}
