//! The huffman module turns symbol frequencies into codes, and code files back into trees.
//!
//! Encoding side: the tree is grown by repeatedly merging the two lightest nodes in a priority
//! queue (huffman), then walked once to read off each symbol's path (code_table).
//!
//! Decoding side: the code table is saved as a small text file (tree_codec). Restoring reads
//! the records back and grows a fresh tree with the same root-to-leaf paths. The node weights
//! are gone by then, but decoding only ever follows paths.
//!
//! Ties between equal weights are settled by queue order, so a given input always produces
//! the same codes.
//!

pub mod code_table;
pub mod huffman;
pub mod tree_codec;
