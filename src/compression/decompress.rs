use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

use log::{debug, error, info, trace, warn};

use super::{create_output, open_input, read_header, same_path, Termination};
use crate::bitstream::bitreader::BitReader;
use crate::error::{HuffError, Result};
use crate::huffman_coding::huffman::{HuffmanTree, Node, NodeData};
use crate::huffman_coding::tree_codec;
use crate::tools::cli::HuffOpts;

/// Decoded bytes are collected here before being handed to the sink.
const OUT_CHUNK: usize = 64 * 1024;

/// Where the decoder stands in the tree.
#[derive(Debug, Clone, Copy)]
enum State<'a> {
    /// At the root, between codes.
    AtRoot,
    /// Partway down a code, at this internal node.
    InPath(&'a Node),
}

/// Walk the tree bit by bit, writing a symbol to the sink at every leaf.
/// Returns the number of symbols written.
///
/// The stream is done when the termination rule says so. Running out of bits partway down
/// a code is always an error; running out at the root is only fine in sentinel mode, since a
/// counted stream knows how many symbols it is owed.
pub fn decode<R: Read, W: Write>(
    tree: &HuffmanTree,
    br: &mut BitReader<R>,
    termination: Termination,
    sink: &mut W,
) -> Result<u64> {
    if tree.root.is_leaf() {
        return Err(HuffError::DegenerateAlphabet(1));
    }
    let mut out: Vec<u8> = Vec::with_capacity(OUT_CHUNK);
    let mut emitted = 0_u64;
    let mut state = State::AtRoot;

    loop {
        let node = match state {
            State::AtRoot => {
                if termination == Termination::Count(emitted) {
                    break;
                }
                &tree.root
            }
            State::InPath(node) => node,
        };

        let bit = match br.bit()? {
            Some(bit) => bit,
            None => match (state, termination) {
                (State::AtRoot, Termination::Sentinel(_)) => {
                    warn!("Stream ended without a sentinel after {} symbols", emitted);
                    break;
                }
                (State::AtRoot, Termination::Count(n)) => {
                    return Err(HuffError::corrupt(format!(
                        "stream ended after {} of {} symbols",
                        emitted, n
                    )))
                }
                (State::InPath(_), _) => {
                    return Err(HuffError::corrupt(format!(
                        "stream ended in the middle of a code after {} symbols",
                        emitted
                    )))
                }
            },
        };

        let next = match &node.node_data {
            NodeData::Kids(left, right) => {
                if bit {
                    right
                } else {
                    left
                }
            }
            // Only the root could be a leaf, and that was ruled out above.
            NodeData::Leaf(_) => return Err(HuffError::DegenerateAlphabet(1)),
        };

        state = match next.node_data {
            NodeData::Leaf(sym) => {
                if termination == Termination::Sentinel(sym) {
                    trace!("Found the sentinel at {}", br.loc());
                    break;
                }
                out.push(sym);
                emitted += 1;
                if out.len() == OUT_CHUNK {
                    sink.write_all(&out)?;
                    out.clear();
                }
                State::AtRoot
            }
            NodeData::Kids(..) => State::InPath(next),
        };
    }

    sink.write_all(&out)?;
    sink.flush()?;
    debug!("Decoded {} symbols", emitted);
    Ok(emitted)
}

/// Restore data in memory: rebuild the tree from the code records, read the artifact header,
/// then decode the rest of the artifact into the sink.
pub fn decompress_from<A: Read, C: BufRead, W: Write>(
    artifact: A,
    code: C,
    mut sink: W,
) -> Result<u64> {
    let tree = tree_codec::deserialize(code)?;
    let mut br = BitReader::new(artifact);
    let termination = read_header(&mut br)?;
    info!("Artifact header: {:?}", termination);
    decode(&tree, &mut br, termination, &mut sink)
}

/// Decompress the artifact named in opts, using its code file, into the restored file.
/// The restored file is removed again if decoding fails.
pub fn decompress(opts: &HuffOpts) -> Result<u64> {
    let artifact_path = opts.artifact_path();
    let code_path = opts.code_path();
    let restored_path = opts.restored_path();
    if same_path(&restored_path, &artifact_path) || same_path(&restored_path, &code_path) {
        error!("Refusing to write the restored data over an input file");
        return Err(HuffError::PathClash(restored_path));
    }

    let artifact = open_input(&artifact_path)?;
    let code = open_input(&code_path)?;
    let restored = create_output(&restored_path, opts.force_overwrite)?;

    let result = decompress_from(
        BufReader::new(artifact),
        BufReader::new(code),
        BufWriter::new(restored),
    );
    match result {
        Ok(symbols) => {
            info!(
                "{}: restored {} bytes to {}",
                artifact_path.display(),
                symbols,
                restored_path.display()
            );
            Ok(symbols)
        }
        Err(e) => {
            warn!("Decompression failed, removing {}", restored_path.display());
            let _ = fs::remove_file(&restored_path);
            Err(e)
        }
    }
}

/// Decode the artifact named in opts without keeping the output, to check it is intact.
pub fn test(opts: &HuffOpts) -> Result<u64> {
    let artifact_path = opts.artifact_path();
    let artifact = open_input(&artifact_path)?;
    let code = open_input(&opts.code_path())?;
    let symbols = decompress_from(BufReader::new(artifact), BufReader::new(code), io::sink())?;
    info!("{}: ok, {} symbols", artifact_path.display(), symbols);
    Ok(symbols)
}

#[cfg(test)]
mod test {
    use super::{decode, decompress_from};
    use crate::bitstream::bitreader::BitReader;
    use crate::compression::compress::compress_to;
    use crate::compression::Termination;
    use crate::error::HuffError;
    use crate::huffman_coding::huffman::HuffmanTree;
    use crate::huffman_coding::tree_codec::from_text;
    use crate::tools::freq_count::freqs;

    const SMALL_CODE: &str = "97\n0\n98\n11\n99\n10\n";

    fn run(bits: &[u8], termination: Termination) -> Result<Vec<u8>, HuffError> {
        let tree = from_text(SMALL_CODE).unwrap();
        let mut br = BitReader::new(bits);
        let mut out: Vec<u8> = Vec::new();
        decode(&tree, &mut br, termination, &mut out)?;
        Ok(out)
    }

    #[test]
    fn counted_decode_test() {
        let out = run(&[0b0000_1111, 0b1110_1000], Termination::Count(9)).unwrap();
        assert_eq!(out, b"aaaabbbcc");
    }

    #[test]
    fn padding_is_ignored_test() {
        // Two padding zeros would decode as "aa" if the count did not stop the decoder.
        let out = run(&[0b1110_1000], Termination::Count(3)).unwrap();
        assert_eq!(out, b"bcc");
    }

    #[test]
    fn truncated_test() {
        assert!(matches!(
            run(&[0b0000_1111], Termination::Count(9)),
            Err(HuffError::CorruptStream(_))
        ));
        // Runs dry right after the first half of a "11".
        assert!(matches!(
            run(&[0b0000_0001], Termination::Count(9)),
            Err(HuffError::CorruptStream(_))
        ));
    }

    #[test]
    fn zero_count_test() {
        assert!(run(&[], Termination::Count(0)).unwrap().is_empty());
    }

    #[test]
    fn sentinel_decode_test() {
        // b'c' stands in as the sentinel here: a a b, then c stops the decoder.
        let out = run(&[0b0011_1000, 0b1111_1111], Termination::Sentinel(b'c')).unwrap();
        assert_eq!(out, b"aab");
        // No sentinel, but the bits end cleanly between codes.
        let out = run(&[0b0011_0000], Termination::Sentinel(b'*')).unwrap();
        assert_eq!(out, b"aabaaaa");
    }

    #[test]
    fn lone_leaf_test() {
        let tree = HuffmanTree {
            root: crate::huffman_coding::huffman::Node::leaf(b'a', 1),
        };
        let mut br = BitReader::new(&[0_u8][..]);
        assert!(matches!(
            decode(&tree, &mut br, Termination::Count(1), &mut Vec::<u8>::new()),
            Err(HuffError::DegenerateAlphabet(1))
        ));
    }

    #[test]
    fn scenario_test() {
        let data = b"aaaabbbcc";
        let tree = HuffmanTree::from_freqs(&freqs(data)).unwrap();
        assert_eq!(tree.root.leaves(), 3);
        let mut artifact: Vec<u8> = Vec::new();
        let mut code: Vec<u8> = Vec::new();
        compress_to(data, None, &mut artifact, &mut code).unwrap();
        let mut restored: Vec<u8> = Vec::new();
        let n = decompress_from(artifact.as_slice(), code.as_slice(), &mut restored).unwrap();
        assert_eq!(n, 9);
        assert_eq!(restored, data);
    }

    #[test]
    fn sentinel_round_trip_test() {
        let data = b"sentinel mode still works";
        let mut artifact: Vec<u8> = Vec::new();
        let mut code: Vec<u8> = Vec::new();
        compress_to(data, Some(0), &mut artifact, &mut code).unwrap();
        let mut restored: Vec<u8> = Vec::new();
        decompress_from(artifact.as_slice(), code.as_slice(), &mut restored).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn wrong_code_file_test() {
        let mut artifact: Vec<u8> = Vec::new();
        compress_to(b"abcabcabd", None, &mut artifact, std::io::sink()).unwrap();
        let mut restored: Vec<u8> = Vec::new();
        let result = decompress_from(artifact.as_slice(), "".as_bytes(), &mut restored);
        assert!(matches!(result, Err(HuffError::CorruptStream(_))));
    }
}
