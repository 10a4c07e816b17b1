//! BitReader: the read side of the huff bitstream.
//!
//! Unpacks bytes most significant bit first, the order BitWriter packs them in. The bit
//! sequence has no end marker of its own; None simply means the source ran dry.
//!
//! NOTE: This module can read from any I/O source that supports the read() call.
//!
use std::io::{self, Read};

const BUFFER_SIZE: usize = 64 * 1024;
const BIT_MASK: u8 = 0xff;

/// Reads a packed bitstream.
#[derive(Debug)]
pub struct BitReader<R> {
    buffer: Vec<u8>,
    /// How much of the buffer holds real data.
    filled: usize,
    cursor: usize,
    bit_index: usize,
    source: R,
}

impl<R: Read> BitReader<R> {
    /// Creates a new BitReader (with a 64k buffer).
    pub fn new(source: R) -> Self {
        Self {
            buffer: vec![0; BUFFER_SIZE],
            filled: 0,
            cursor: 0,
            bit_index: 0,
            source,
        }
    }

    /// Check (and refill) buffer. Returns true if we have data, false if there is no more
    fn have_data(&mut self) -> io::Result<bool> {
        // Only try to read more data when the cursor has used up what we have
        if self.cursor == self.filled {
            let size = loop {
                match self.source.read(&mut self.buffer) {
                    Ok(size) => break size,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            };
            // If nothing came back from our read attempt, then we have no more data.
            if size == 0 {
                return Ok(false);
            }
            self.filled = size;
            self.cursor = 0;
            self.bit_index = 0;
        }
        Ok(true)
    }

    /// Return the next bit (*true* for 1), or None if there is no more data to read
    pub fn bit(&mut self) -> io::Result<Option<bool>> {
        // If bit_index is == 0, check if we have a byte to read.
        if self.bit_index == 0 && !self.have_data()? {
            return Ok(None);
        }
        let bit = (self.buffer[self.cursor] & BIT_MASK >> self.bit_index) >> (7 - self.bit_index);
        self.bit_index += 1;
        self.bit_index %= 8;
        if self.bit_index == 0 {
            self.cursor += 1;
        }
        Ok(Some(bit == 1))
    }

    /// Return the next n bits (n <= 64) as an integer, or None if the data ran out first.
    pub fn bint(&mut self, n: usize) -> io::Result<Option<u64>> {
        debug_assert!(n <= 64);
        let mut result = 0_u64;
        for _ in 0..n {
            match self.bit()? {
                Some(bit) => result = result << 1 | bit as u64,
                None => return Ok(None),
            }
        }
        Ok(Some(result))
    }

    /// Returns a byte, or None if there is no more data to read. This is
    /// a convenience function, and calls bint(8).
    pub fn byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.bint(8)?.map(|byte| byte as u8))
    }

    /// Returns n bytes, or None if the data ran out before all n were read.
    pub fn bytes(&mut self, n: usize) -> io::Result<Option<Vec<u8>>> {
        let mut result: Vec<u8> = Vec::with_capacity(n);
        for _ in 0..n {
            match self.byte()? {
                Some(byte) => result.push(byte),
                None => return Ok(None),
            }
        }
        Ok(Some(result))
    }

    /// Debugging function. Report current position in the buffer.
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.cursor, self.bit_index)
    }
}

/// The lazy bit sequence. Ends when the source is exhausted.
impl<R: Read> Iterator for BitReader<R> {
    type Item = io::Result<bool>;

    fn next(&mut self) -> Option<Self::Item> {
        self.bit().transpose()
    }
}
