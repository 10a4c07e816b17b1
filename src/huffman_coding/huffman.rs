use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, trace};

use crate::error::{HuffError, Result};
use crate::tools::freq_count::FreqMap;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum NodeData {
    Kids(Box<Node>, Box<Node>),
    Leaf(u8),
}

/// One node of a Huffman tree. The weight is only meaningful while the tree is being built;
/// trees rebuilt from a code file carry 0 everywhere.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Node {
    pub weight: u64,
    pub node_data: NodeData,
}

impl Node {
    /// Create a new leaf
    pub fn leaf(sym: u8, weight: u64) -> Node {
        Node {
            weight,
            node_data: NodeData::Leaf(sym),
        }
    }

    /// Create a parent for two nodes. Left is the 0 branch, right the 1 branch.
    pub fn merge(left: Node, right: Node) -> Node {
        Node {
            weight: left.weight + right.weight,
            node_data: NodeData::Kids(Box::new(left), Box::new(right)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.node_data, NodeData::Leaf(_))
    }

    /// Longest root-to-leaf path below this node.
    pub fn depth(&self) -> usize {
        match &self.node_data {
            NodeData::Kids(left, right) => 1 + left.depth().max(right.depth()),
            NodeData::Leaf(_) => 0,
        }
    }

    /// Number of leaves below this node.
    pub fn leaves(&self) -> usize {
        match &self.node_data {
            NodeData::Kids(left, right) => left.leaves() + right.leaves(),
            NodeData::Leaf(_) => 1,
        }
    }
}

/// A node waiting in the priority queue, tagged with the order it was queued in.
#[derive(Debug, Eq, PartialEq)]
struct Queued {
    seq: usize,
    node: Node,
}

impl Ord for Queued {
    /// Sort by decreasing weight, then decreasing sequence number, so that BinaryHeap
    /// (a max-heap) pops the lightest, oldest node first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .node
            .weight
            .cmp(&self.node.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    pub root: Node,
}

impl HuffmanTree {
    /// Build an optimal code tree from symbol frequencies.
    ///
    /// Leaves are queued in ascending symbol order and numbered 0..n; every merged node gets
    /// the next number. Ties in weight go to the lower number, so the same frequencies always
    /// give the same tree.
    pub fn from_freqs(freqs: &FreqMap) -> Result<HuffmanTree> {
        if freqs.len() < 2 {
            return Err(HuffError::DegenerateAlphabet(freqs.len()));
        }
        let mut heap: BinaryHeap<Queued> = freqs
            .iter()
            .enumerate()
            .map(|(seq, (sym, count))| Queued {
                seq,
                node: Node::leaf(sym, count),
            })
            .collect();
        let mut seq = heap.len();

        // Pull off the two lightest nodes and queue their parent until only the root is left.
        while let Some(left) = heap.pop() {
            let Some(right) = heap.pop() else {
                debug_assert_eq!(left.node.weight, freqs.total());
                let tree = HuffmanTree { root: left.node };
                debug!(
                    "Built tree with {} leaves, depth {}, weight {}",
                    tree.root.leaves(),
                    tree.root.depth(),
                    tree.root.weight
                );
                return Ok(tree);
            };
            trace!(
                "Merging #{} (weight {}) and #{} (weight {}) into #{}",
                left.seq,
                left.node.weight,
                right.seq,
                right.node.weight,
                seq
            );
            heap.push(Queued {
                seq,
                node: Node::merge(left.node, right.node),
            });
            seq += 1;
        }
        // The heap started with at least two nodes, so the loop always returns.
        Err(HuffError::DegenerateAlphabet(freqs.len()))
    }
}

#[cfg(test)]
mod test {
    use super::{HuffmanTree, Node, NodeData};
    use crate::error::HuffError;
    use crate::tools::freq_count::{freqs, FreqMap};

    fn kids(node: &Node) -> (&Node, &Node) {
        match &node.node_data {
            NodeData::Kids(left, right) => (&**left, &**right),
            NodeData::Leaf(sym) => panic!("unexpected leaf {}", sym),
        }
    }

    #[test]
    fn small_merge_order_test() {
        // c (2) and b (3) merge first, then that pair joins a (4) on the right.
        let tree = HuffmanTree::from_freqs(&freqs(b"aaaabbbcc")).unwrap();
        assert_eq!(tree.root.weight, 9);
        let (left, right) = kids(&tree.root);
        assert_eq!(left, &Node::leaf(b'a', 4));
        assert_eq!(right.weight, 5);
        let (rl, rr) = kids(right);
        assert_eq!(rl, &Node::leaf(b'c', 2));
        assert_eq!(rr, &Node::leaf(b'b', 3));
    }

    #[test]
    fn tie_break_test() {
        // All weights equal: the lower symbols are queued first and merge first.
        let f: FreqMap = [(b'd', 1), (b'a', 1), (b'c', 1), (b'b', 1)].into_iter().collect();
        let tree = HuffmanTree::from_freqs(&f).unwrap();
        let (left, right) = kids(&tree.root);
        let (ll, lr) = kids(left);
        let (rl, rr) = kids(right);
        assert_eq!((ll, lr), (&Node::leaf(b'a', 1), &Node::leaf(b'b', 1)));
        assert_eq!((rl, rr), (&Node::leaf(b'c', 1), &Node::leaf(b'd', 1)));
    }

    #[test]
    fn merged_node_loses_ties_to_leaves_test() {
        // a+b make a node of weight 2, which ties with c and d. c and d were queued first.
        let f: FreqMap = [(b'a', 1), (b'b', 1), (b'c', 2), (b'd', 2)].into_iter().collect();
        let tree = HuffmanTree::from_freqs(&f).unwrap();
        let (left, right) = kids(&tree.root);
        assert_eq!(left.weight, 2);
        assert!(!left.is_leaf());
        assert_eq!(kids(right), (&Node::leaf(b'c', 2), &Node::leaf(b'd', 2)));
    }

    #[test]
    fn deterministic_test() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let a = HuffmanTree::from_freqs(&freqs(data)).unwrap();
        let b = HuffmanTree::from_freqs(&freqs(data)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.root.leaves(), freqs(data).len());
    }

    #[test]
    fn degenerate_test() {
        assert!(matches!(
            HuffmanTree::from_freqs(&freqs(b"zzzz")),
            Err(HuffError::DegenerateAlphabet(1))
        ));
        assert!(matches!(
            HuffmanTree::from_freqs(&freqs(b"")),
            Err(HuffError::DegenerateAlphabet(0))
        ));
    }

    #[test]
    fn full_alphabet_test() {
        let data: Vec<u8> = (0..=255).collect();
        let tree = HuffmanTree::from_freqs(&freqs(&data)).unwrap();
        assert_eq!(tree.root.leaves(), 256);
        assert_eq!(tree.root.depth(), 8);
    }
}
