use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use log::{debug, trace};
use rustc_hash::FxHashMap;

use super::huffman::{HuffmanTree, Node, NodeData};
use crate::error::{HuffError, Result};
use crate::tools::freq_count::FreqMap;

/// A code: the left (false, 0) / right (true, 1) turns from the root down to a leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitString(Vec<bool>);

impl BitString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bit: bool) {
        self.0.push(bit)
    }

    pub fn pop(&mut self) -> Option<bool> {
        self.0.pop()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    /// True if other is a prefix of (or equal to) self.
    pub fn starts_with(&self, other: &BitString) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl Display for BitString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0
            .iter()
            .try_for_each(|&bit| f.write_str(if bit { "1" } else { "0" }))
    }
}

impl FromStr for BitString {
    type Err = HuffError;

    /// Parse a string of '0' and '1' digits.
    fn from_str(s: &str) -> Result<Self> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(HuffError::corrupt(format!(
                    "bad digit {:?} in bitstring {:?}",
                    other, s
                ))),
            })
            .collect::<Result<Vec<bool>>>()
            .map(BitString)
    }
}

/// Symbol to code lookup, derived from a Huffman tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: FxHashMap<u8, BitString>,
}

impl CodeTable {
    /// Walk the tree depth first and record the path to every leaf.
    /// A tree that is a lone leaf has no paths, and is rejected.
    pub fn from_tree(tree: &HuffmanTree) -> Result<CodeTable> {
        if tree.root.is_leaf() {
            return Err(HuffError::DegenerateAlphabet(1));
        }
        let mut codes = FxHashMap::default();
        let mut path = BitString::new();
        walk(&tree.root, &mut path, &mut codes);
        let table = CodeTable { codes };
        debug!(
            "Code table holds {} symbols, longest code {} bits",
            table.len(),
            table.max_len()
        );
        Ok(table)
    }

    pub fn get(&self, sym: u8) -> Option<&BitString> {
        self.codes.get(&sym)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Length of the longest code.
    pub fn max_len(&self) -> usize {
        self.codes.values().map(BitString::len).max().unwrap_or(0)
    }

    /// (symbol, code) pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitString)> + '_ {
        let mut syms: Vec<u8> = self.codes.keys().copied().collect();
        syms.sort_unstable();
        syms.into_iter().map(move |sym| (sym, &self.codes[&sym]))
    }

    /// Total encoded size in bits: the sum of frequency x code length.
    /// Symbols the table does not know contribute nothing.
    pub fn weighted_length(&self, freqs: &FreqMap) -> u64 {
        freqs
            .iter()
            .filter_map(|(sym, count)| self.get(sym).map(|code| count * code.len() as u64))
            .sum()
    }

    /// True if no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        self.codes.iter().all(|(a, code_a)| {
            self.codes
                .iter()
                .all(|(b, code_b)| a == b || !code_b.starts_with(code_a))
        })
    }
}

/// Record the path to every leaf below node. The path is extended before each descent and
/// trimmed again afterwards.
fn walk(node: &Node, path: &mut BitString, codes: &mut FxHashMap<u8, BitString>) {
    match &node.node_data {
        NodeData::Kids(left, right) => {
            path.push(false);
            walk(left, path, codes);
            path.pop();
            path.push(true);
            walk(right, path, codes);
            path.pop();
        }
        NodeData::Leaf(sym) => {
            trace!("Symbol {} gets code {}", sym, path);
            codes.insert(*sym, path.clone());
        }
    }
}

#[cfg(test)]
mod test {
    use super::{BitString, CodeTable};
    use crate::error::HuffError;
    use crate::huffman_coding::huffman::{HuffmanTree, Node};
    use crate::tools::freq_count::{freqs, FreqMap};

    fn table_for(data: &[u8]) -> CodeTable {
        CodeTable::from_tree(&HuffmanTree::from_freqs(&freqs(data)).unwrap()).unwrap()
    }

    #[test]
    fn bitstring_text_test() {
        let code: BitString = "0110".parse().unwrap();
        assert_eq!(code.len(), 4);
        assert_eq!(code.to_string(), "0110");
        assert_eq!(code.iter().collect::<Vec<_>>(), vec![false, true, true, false]);
        assert!(matches!(
            "01x".parse::<BitString>(),
            Err(HuffError::CorruptStream(_))
        ));
        assert!("".parse::<BitString>().unwrap().is_empty());
    }

    #[test]
    fn small_table_test() {
        let table = table_for(b"aaaabbbcc");
        assert_eq!(table.get(b'a').unwrap().to_string(), "0");
        assert_eq!(table.get(b'c').unwrap().to_string(), "10");
        assert_eq!(table.get(b'b').unwrap().to_string(), "11");
        assert_eq!(table.get(b'z'), None);
        assert_eq!(table.weighted_length(&freqs(b"aaaabbbcc")), 14);
    }

    #[test]
    fn textbook_optimality_test() {
        let f: FreqMap = [
            (b'a', 5),
            (b'b', 9),
            (b'c', 12),
            (b'd', 13),
            (b'e', 16),
            (b'f', 45),
        ]
        .into_iter()
        .collect();
        let table = CodeTable::from_tree(&HuffmanTree::from_freqs(&f).unwrap()).unwrap();
        assert_eq!(table.weighted_length(&f), 224);
        assert_eq!(table.get(b'f').unwrap().len(), 1);
        assert!(table.is_prefix_free());
    }

    #[test]
    fn prefix_free_test() {
        let table = table_for(b"she sells sea shells by the sea shore");
        assert!(table.is_prefix_free());
        assert_eq!(table.len(), freqs(b"she sells sea shells by the sea shore").len());
    }

    #[test]
    fn sorted_iter_test() {
        let table = table_for(b"zyxzyz");
        let syms: Vec<u8> = table.iter().map(|(sym, _)| sym).collect();
        assert_eq!(syms, vec![b'x', b'y', b'z']);
    }

    #[test]
    fn lone_leaf_test() {
        let tree = HuffmanTree {
            root: Node::leaf(b'q', 7),
        };
        assert!(matches!(
            CodeTable::from_tree(&tree),
            Err(HuffError::DegenerateAlphabet(1))
        ));
    }
}
