//! Static Huffman coding for files.
//!
//! Provides lossless compression of byte data with a single Huffman code per file. The code is
//! built from the byte frequencies of the input, the data is packed into a bitstream with a
//! short header, and the code itself is saved as a separate text file from which the decoding
//! tree is rebuilt.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> huff -z test.txt`
//!
//! This creates test.txt.huf and test.txt.code, leaving test.txt in place.
//! `$> huff -d test.txt.huf` restores the data to test.txt.out.
//!
//! The same pipeline runs in memory:
//!
//! ```
//! use huff::compression::{compress::compress_to, decompress::decompress_from};
//!
//! let mut artifact: Vec<u8> = Vec::new();
//! let mut code: Vec<u8> = Vec::new();
//! compress_to(b"aaaabbbcc", None, &mut artifact, &mut code)?;
//!
//! let mut restored: Vec<u8> = Vec::new();
//! decompress_from(artifact.as_slice(), code.as_slice(), &mut restored)?;
//! assert_eq!(restored, b"aaaabbbcc");
//! # Ok::<(), huff::HuffError>(())
//! ```
//!
pub mod bitstream;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use error::{HuffError, Result};
