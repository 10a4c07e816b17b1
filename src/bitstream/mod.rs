//! The bitstream module forms the I/O subsystem for the huff compressor.
//!
//! Huffman codes are variable length, so neither side of the codec can work in whole bytes.
//! BitWriter packs single bits (and the occasional whole byte for the artifact header) most
//! significant bit first, zero-padding the final byte. BitReader unpacks them again in the same
//! order, one bit at a time, from any source that supports the read() call.
//!
//! Neither side records where the logical stream ends. That is the job of the artifact header
//! written by the compression module.
//!
pub mod bitreader;
pub mod bitwriter;
