//! The compression module runs the huff pipeline end to end.
//!
//! Compression happens in the following steps:
//! - Frequency count: how often every byte value occurs in the input.
//! - Tree build: merge the two lightest nodes until one tree remains.
//! - Code table: read each symbol's root-to-leaf path off the tree.
//! - Code file: save the table as text records so the tree can be regrown later.
//! - Encoding: write the header, then every input symbol's code, packed into bytes.
//!
//! Decompression follows the inverse: regrow the tree from the code file, read the header,
//! then walk the tree one bit at a time, emitting a symbol at every leaf.
//!
//! The packed bits carry no length of their own and the last byte is zero padded, so the
//! header records how the decoder knows it is done: either the number of symbols, or a
//! reserved sentinel byte that was encoded after the data.
//!

pub mod compress;
pub mod decompress;

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use crate::bitstream::bitreader::BitReader;
use crate::bitstream::bitwriter::BitWriter;
use crate::error::{HuffError, Result};

/// Every artifact starts with these bytes.
pub const MAGIC: &[u8; 3] = b"HUF";
const MODE_COUNT: u8 = b'c';
const MODE_SENTINEL: u8 = b's';

/// How the decoder knows the stream is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Stop after this many symbols.
    Count(u64),
    /// Stop at this symbol, which is not part of the data.
    Sentinel(u8),
}

/// Put the artifact header on the stream: magic, mode byte, then the count or sentinel.
pub fn write_header<W: Write>(bw: &mut BitWriter<W>, termination: Termination) -> io::Result<()> {
    MAGIC.iter().try_for_each(|&x| bw.out8(x))?;
    match termination {
        Termination::Count(n) => {
            bw.out8(MODE_COUNT)?;
            bw.out64(n)
        }
        Termination::Sentinel(sym) => {
            bw.out8(MODE_SENTINEL)?;
            bw.out8(sym)
        }
    }
}

/// Check the magic and read back the termination rule.
pub fn read_header<R: Read>(br: &mut BitReader<R>) -> Result<Termination> {
    match br.bytes(MAGIC.len())? {
        Some(magic) if magic == MAGIC => {}
        _ => return Err(HuffError::corrupt("not a huff compressed file")),
    }
    match br.byte()? {
        Some(MODE_COUNT) => br
            .bint(64)?
            .map(Termination::Count)
            .ok_or_else(|| HuffError::corrupt("header ends before the symbol count")),
        Some(MODE_SENTINEL) => br
            .byte()?
            .map(Termination::Sentinel)
            .ok_or_else(|| HuffError::corrupt("header ends before the sentinel")),
        Some(other) => Err(HuffError::corrupt(format!("unknown header mode {}", other))),
        None => Err(HuffError::corrupt("header ends before the mode byte")),
    }
}

/// Open an input file, reporting a missing or unreadable file as MissingInput.
pub(crate) fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| HuffError::MissingInput {
        path: path.to_path_buf(),
        source,
    })
}

/// True if both paths name the same file. Paths that exist are compared after
/// canonicalization, so "./x.huf" and "x.huf" match.
pub(crate) fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Create an output file. Unless forced, an existing file is left alone.
pub(crate) fn create_output(path: &Path, force: bool) -> Result<File> {
    let result = if force {
        File::create(path)
    } else {
        OpenOptions::new().write(true).create_new(true).open(path)
    };
    result.map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => HuffError::OutputExists(path.to_path_buf()),
        _ => HuffError::Io(e),
    })
}
