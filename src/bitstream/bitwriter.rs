use std::io::{self, Write};

use log::trace;

use crate::huffman_coding::code_table::BitString;

/// Once this many packed bytes are waiting, hand them to the sink.
const SPILL_SIZE: usize = 64 * 1024;

/// Writes a packed bitstream, most significant bit first, to any sink that supports write().
pub struct BitWriter<W: Write> {
    /// Output buffer holding packed bytes not yet handed to the sink.
    output: Vec<u8>,
    /// Private queue to hold bits that are waiting to be put as bytes into the output buffer.
    queue: u64,
    /// Count of valid bits in the queue.
    q_bits: u8,
    /// Bytes already handed to the sink.
    written: usize,
    /// Handle to the output stream
    writer: W,
}

impl<W: Write> BitWriter<W> {
    /// Create a new BitWriter over the sink. Call close() when done or the final bits are lost.
    pub fn new(writer: W) -> Self {
        Self {
            output: Vec::with_capacity(SPILL_SIZE),
            queue: 0,
            q_bits: 0,
            written: 0,
            writer,
        }
    }

    /// Move full bytes from the queue into the output buffer once the queue is nearly full,
    /// and spill the buffer to the sink when it grows large.
    fn push_queue(&mut self) -> io::Result<()> {
        if self.q_bits > 56 {
            while self.q_bits > 7 {
                let byte = (self.queue >> (self.q_bits - 8)) as u8;
                self.output.push(byte); //push the packed byte out
                self.q_bits -= 8; //adjust the count of bits left in the queue
            }
        }
        if self.output.len() >= SPILL_SIZE {
            self.writer.write_all(&self.output)?;
            self.written += self.output.len();
            self.output.clear();
        }
        Ok(())
    }

    /// Put a single bit on the stream.
    pub fn bit(&mut self, bit: bool) -> io::Result<()> {
        self.push_queue()?;
        self.queue = (self.queue << 1) | bit as u64;
        self.q_bits += 1;
        Ok(())
    }

    /// Put every bit of a code on the stream, in order.
    pub fn out_code(&mut self, code: &BitString) -> io::Result<()> {
        for bit in code.iter() {
            self.bit(bit)?;
        }
        Ok(())
    }

    /// Put a whole byte on the stream.
    pub fn out8(&mut self, data: u8) -> io::Result<()> {
        // Make sure the queue is empty enough to hold the data
        self.push_queue()?;
        self.queue <<= 8; //shift queue by one byte
        self.queue |= data as u64; //add the byte to queue
        self.q_bits += 8; //update depth of queue bits
        Ok(())
    }

    /// Put a u64 on the stream, big endian.
    pub fn out64(&mut self, data: u64) -> io::Result<()> {
        data.to_be_bytes().iter().try_for_each(|&b| self.out8(b))
    }

    /// Flushes the remaining bits (1-7) from the queue, padding with 0s in the least
    /// signficant bits. Returns how many padding bits were added.
    fn flush(&mut self) -> u8 {
        // First push out all the full bytes
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte);
            self.q_bits -= 8;
        }
        // Then push out the remaining bits
        if self.q_bits > 0 {
            let padding = 8 - self.q_bits;
            let mut byte = (self.queue & (0xff >> padding) as u64) as u8;
            byte <<= padding;
            self.output.push(byte);
            self.q_bits = 0;
            return padding;
        }
        0
    }

    /// Pad and write out everything still pending, then flush the sink.
    /// Returns the total number of bytes written and the padding bits in the last byte.
    pub fn close(mut self) -> io::Result<(usize, u8)> {
        let padding = self.flush();
        self.writer.write_all(&self.output)?;
        self.written += self.output.len();
        self.output.clear();
        self.writer.flush()?;
        trace!("BitWriter closed after {} bytes, {} padding bits", self.written, padding);
        Ok((self.written, padding))
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        let bits = (self.written + self.output.len()) * 8 + self.q_bits as usize;
        format!("[{}.{}]", bits / 8, bits % 8)
    }
}
