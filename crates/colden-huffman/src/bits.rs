//! Growable, randomly addressable bit sequence.
//!
//! Bits are packed most-significant-bit first: bit index 0 is the high bit
//! of byte 0. The logical length may be shorter than the backing storage;
//! bits past it are unspecified until [`BitBuffer::to_bytes`] zeroes them.

use colden_core::{Error, Result};

/// A resizable array of individually indexed bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl BitBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    /// Wrap existing bytes; every bit is valid.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            len: bytes.len() * 8,
        }
    }

    /// Logical length in bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no bits have been pushed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of whole bytes needed to hold the logical bits.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.len.div_ceil(8)
    }

    /// Read the bit at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Result<bool> {
        if index >= self.len {
            return Err(Error::out_of_range(index, self.len));
        }
        Ok(self.bytes[index / 8] & mask(index) != 0)
    }

    /// Overwrite the bit at `index`.
    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        if index >= self.len {
            return Err(Error::out_of_range(index, self.len));
        }
        let byte = &mut self.bytes[index / 8];
        if value {
            *byte |= mask(index);
        } else {
            *byte &= !mask(index);
        }
        Ok(())
    }

    /// Append one bit, growing storage a byte at a time.
    #[inline]
    pub fn push(&mut self, value: bool) {
        let byte_index = self.len / 8;
        if byte_index >= self.bytes.len() {
            self.bytes.push(0);
        }
        let byte = &mut self.bytes[byte_index];
        if value {
            *byte |= mask(self.len);
        } else {
            // A popped bit may have left a stale 1 here
            *byte &= !mask(self.len);
        }
        self.len += 1;
    }

    /// Remove and return the last bit.
    pub fn pop(&mut self) -> Option<bool> {
        if self.len == 0 {
            return None;
        }
        let value = self.bytes[(self.len - 1) / 8] & mask(self.len - 1) != 0;
        self.len -= 1;
        Some(value)
    }

    /// Append 8 bits, most significant first.
    pub fn push_byte(&mut self, value: u8) {
        for shift in (0..8).rev() {
            self.push((value >> shift) & 1 == 1);
        }
    }

    /// Append 32 bits in big-endian order.
    pub fn push_u32(&mut self, value: u32) {
        for byte in value.to_be_bytes() {
            self.push_byte(byte);
        }
    }

    /// Read 8 bits starting at any bit offset.
    pub fn read_byte(&self, index: usize) -> Result<u8> {
        if index >= self.len || self.len - index < 8 {
            return Err(Error::out_of_range(index, self.len));
        }
        let offset = index % 8;
        let first = self.bytes[index / 8];
        if offset == 0 {
            return Ok(first);
        }
        let second = self.bytes[index / 8 + 1];
        Ok((first << offset) | (second >> (8 - offset)))
    }

    /// Read a big-endian `u32` starting at a byte-aligned bit offset.
    pub fn get_u32(&self, index: usize) -> Result<u32> {
        if index % 8 != 0 {
            return Err(Error::out_of_range(index, self.len));
        }
        if index >= self.len || self.len - index < 32 {
            return Err(Error::out_of_range(index, self.len));
        }
        let start = index / 8;
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[start..start + 4]);
        Ok(u32::from_be_bytes(word))
    }

    /// Append every bit of `other`, in order.
    pub fn append_bits(&mut self, other: &BitBuffer) {
        self.bytes.reserve(other.byte_len());
        for bit in other.iter() {
            self.push(bit);
        }
    }

    /// Iterate over the logical bits.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bytes[i / 8] & mask(i) != 0)
    }

    /// Copy out the logical bytes with the final partial byte zero-padded.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.bytes[..self.byte_len()].to_vec();
        clear_padding(&mut bytes, self.len);
        bytes
    }

    /// Consume the buffer, returning zero-padded bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.bytes.truncate(self.byte_len());
        clear_padding(&mut self.bytes, self.len);
        self.bytes
    }
}

impl FromIterator<bool> for BitBuffer {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut buffer = BitBuffer::new();
        for bit in iter {
            buffer.push(bit);
        }
        buffer
    }
}

/// Mask selecting bit `index` within its byte (MSB first).
#[inline]
fn mask(index: usize) -> u8 {
    0x80 >> (index % 8)
}

fn clear_padding(bytes: &mut [u8], len: usize) {
    let used = len % 8;
    if used != 0 {
        if let Some(last) = bytes.last_mut() {
            *last &= 0xFFu8 << (8 - used);
        }
    }
}
