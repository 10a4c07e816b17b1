//! Saves a code table as text and grows a decoding tree back out of it.
//!
//! The code file holds one record per symbol, two lines each: the symbol's decimal value, then
//! its code as '0'/'1' digits. Records are written in ascending symbol order, but any order
//! reads back to the same tree.
//!
//! ```text
//! 97
//! 0
//! 98
//! 11
//! 99
//! 10
//! ```
use std::io::{self, BufRead, Write};

use log::{debug, trace};

use super::code_table::{BitString, CodeTable};
use super::huffman::{HuffmanTree, Node};
use crate::error::{HuffError, Result};

/// With at most 256 leaves no code can be longer than this.
pub const MAX_CODE_LEN: usize = 255;

/// Write every (symbol, code) record of the table to the sink.
pub fn serialize<W: Write>(table: &CodeTable, mut sink: W) -> Result<()> {
    for (sym, code) in table.iter() {
        writeln!(sink, "{}", sym)?;
        writeln!(sink, "{}", code)?;
    }
    sink.flush()?;
    debug!("Wrote {} code records", table.len());
    Ok(())
}

/// Convenience wrapper around serialize() for in-memory use.
pub fn to_text(table: &CodeTable) -> Result<String> {
    let mut out: Vec<u8> = Vec::new();
    serialize(table, &mut out)?;
    String::from_utf8(out).map_err(|e| HuffError::corrupt(e.to_string()))
}

/// A tree under construction. Slots that no record has reached yet are Empty.
#[derive(Debug)]
enum Slot {
    Empty,
    Leaf(u8),
    Kids(Box<Slot>, Box<Slot>),
}

impl Slot {
    fn kids() -> Slot {
        Slot::Kids(Box::new(Slot::Empty), Box::new(Slot::Empty))
    }

    /// The child slot in the direction of bit. Only internal slots have children.
    fn child(&mut self, bit: bool) -> Option<&mut Slot> {
        match self {
            Slot::Kids(left, right) => Some(if bit { right } else { left }),
            _ => None,
        }
    }

    /// Hang a leaf for sym at the end of code, making internal slots along the way.
    fn insert(&mut self, sym: u8, code: &BitString) -> Result<()> {
        if code.len() > MAX_CODE_LEN {
            return Err(HuffError::corrupt(format!(
                "code for symbol {} is {} bits long, the limit is {}",
                sym,
                code.len(),
                MAX_CODE_LEN
            )));
        }
        let digits: Vec<bool> = code.iter().collect();
        let (&last, path) = digits
            .split_last()
            .ok_or_else(|| HuffError::corrupt(format!("empty code for symbol {}", sym)))?;

        let mut here = self;
        for &bit in path {
            let next = here
                .child(bit)
                .ok_or_else(|| HuffError::corrupt(format!("bad path for symbol {}", sym)))?;
            match next {
                Slot::Empty => *next = Slot::kids(),
                Slot::Leaf(other) => {
                    return Err(HuffError::corrupt(format!(
                        "code {} for symbol {} runs through the leaf for symbol {}",
                        code, sym, other
                    )))
                }
                Slot::Kids(..) => {}
            }
            here = next;
        }

        let slot = here
            .child(last)
            .ok_or_else(|| HuffError::corrupt(format!("bad path for symbol {}", sym)))?;
        match slot {
            Slot::Empty => {
                *slot = Slot::Leaf(sym);
                Ok(())
            }
            _ => Err(HuffError::corrupt(format!(
                "code {} for symbol {} collides with another code",
                code, sym
            ))),
        }
    }

    /// Convert into a finished tree. Every internal node must have both children.
    fn into_node(self) -> Result<Node> {
        match self {
            Slot::Empty => Err(HuffError::corrupt("code tree has a missing branch")),
            Slot::Leaf(sym) => Ok(Node::leaf(sym, 0)),
            Slot::Kids(left, right) => Ok(Node::merge(left.into_node()?, right.into_node()?)),
        }
    }
}

/// Read code records and rebuild the decoding tree.
pub fn deserialize<R: BufRead>(source: R) -> Result<HuffmanTree> {
    let mut lines = source
        .lines()
        .collect::<io::Result<Vec<String>>>()
        .map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => HuffError::corrupt("code file is not valid text"),
            _ => HuffError::Io(e),
        })?;
    // Trailing blank lines are harmless, anything else must come in pairs.
    while lines.last().map_or(false, |l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.len() % 2 != 0 {
        return Err(HuffError::corrupt("code file ends without a bitstring line"));
    }
    if lines.len() < 4 {
        return Err(HuffError::corrupt(format!(
            "code file holds {} records, at least 2 are needed",
            lines.len() / 2
        )));
    }

    let mut root = Slot::kids();
    let mut seen = [false; 256];
    for record in lines.chunks(2) {
        let sym: u8 = record[0].trim().parse().map_err(|_| {
            HuffError::corrupt(format!("bad symbol value {:?} in code file", record[0]))
        })?;
        if seen[sym as usize] {
            return Err(HuffError::corrupt(format!("symbol {} is listed twice", sym)));
        }
        seen[sym as usize] = true;
        let code: BitString = record[1].trim().parse()?;
        trace!("Record: symbol {} code {}", sym, code);
        root.insert(sym, &code)?;
    }

    let tree = HuffmanTree {
        root: root.into_node()?,
    };
    debug!(
        "Rebuilt tree with {} leaves, depth {}",
        tree.root.leaves(),
        tree.root.depth()
    );
    Ok(tree)
}

/// Convenience wrapper around deserialize() for in-memory use.
pub fn from_text(text: &str) -> Result<HuffmanTree> {
    deserialize(text.as_bytes())
}
