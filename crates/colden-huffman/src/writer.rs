//! Streaming bit writer.
//!
//! Bits accumulate MSB first in a 64-bit register and every complete byte is
//! handed to the sink as soon as it exists. Only a sub-byte remainder (at
//! most 7 bits) is ever held back.

use std::io::{self, Write};
use std::mem::ManuallyDrop;

use crate::bits::BitBuffer;
use crate::table::Codeword;

/// Bit-granular writer over any byte sink.
///
/// Wrap file sinks in [`std::io::BufWriter`]; bytes are written one at a
/// time as they complete.
pub struct BitWriter<W: Write> {
    inner: ManuallyDrop<W>,
    bit_buf: u64,
    bit_count: u8,
    bytes_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new bit writer.
    pub fn new(inner: W) -> Self {
        Self {
            inner: ManuallyDrop::new(inner),
            bit_buf: 0,
            bit_count: 0,
            bytes_written: 0,
        }
    }

    /// Get a reference to the inner writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Bits written but not yet emitted (always below 8).
    pub fn pending_bits(&self) -> u8 {
        self.bit_count
    }

    /// Whole bytes emitted to the sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.bit_buf = (self.bit_buf << 1) | bit as u64;
        self.bit_count += 1;
        self.commit()
    }

    /// Write 8 bits, most significant first.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.bit_buf = (self.bit_buf << 8) | byte as u64;
        self.bit_count += 8;
        self.commit()
    }

    /// Write a big-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.bit_buf = (self.bit_buf << 32) | value as u64;
        self.bit_count += 32;
        self.commit()
    }

    /// Write a byte slice at the current bit alignment.
    ///
    /// Produces exactly what a `write_byte` call per element would.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        if self.bit_count == 0 {
            self.inner.write_all(bytes)?;
            self.bytes_written += bytes.len() as u64;
            return Ok(());
        }

        // Every input byte straddles two output bytes: its high bits finish
        // the pending byte and its low bits start the next one.
        let shift = self.bit_count;
        let mut carry = (self.bit_buf as u8) << (8 - shift);
        let mut shifted = Vec::with_capacity(bytes.len());
        for &byte in bytes {
            shifted.push(carry | (byte >> shift));
            carry = byte << (8 - shift);
        }
        self.inner.write_all(&shifted)?;
        self.bytes_written += shifted.len() as u64;
        self.bit_buf = (carry >> (8 - shift)) as u64;
        Ok(())
    }

    /// Write every bit of a buffer.
    pub fn write_bits(&mut self, bits: &BitBuffer) -> io::Result<()> {
        for bit in bits.iter() {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Write a codeword from a code table.
    #[inline]
    pub fn write_codeword(&mut self, codeword: &Codeword) -> io::Result<()> {
        for chunk in codeword.chunks() {
            self.bit_buf = (self.bit_buf << chunk.len) | chunk.bits as u64;
            self.bit_count += chunk.len;
            self.commit()?;
        }
        Ok(())
    }

    /// Emit whole pending bytes and flush the sink, keeping any sub-byte
    /// remainder for later writes.
    pub fn flush_without_padding(&mut self) -> io::Result<()> {
        self.commit()?;
        self.inner.flush()
    }

    /// Finish the stream: pad the final partial byte with zero bits and
    /// return the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.pad()?;
        self.inner.flush()?;
        // Safety: self is consumed and forgotten, so inner is taken exactly once
        let inner = unsafe { ManuallyDrop::take(&mut self.inner) };
        std::mem::forget(self);
        Ok(inner)
    }

    /// Emit every complete byte held in the accumulator.
    #[inline]
    fn commit(&mut self) -> io::Result<()> {
        if self.bit_count < 8 {
            return Ok(());
        }
        let whole = (self.bit_count / 8) as usize;
        let remainder = self.bit_count % 8;
        let mut out = [0u8; 8];
        for (i, slot) in out.iter_mut().take(whole).enumerate() {
            let shift = self.bit_count as usize - 8 * (i + 1);
            *slot = (self.bit_buf >> shift) as u8;
        }
        self.inner.write_all(&out[..whole])?;
        self.bytes_written += whole as u64;
        self.bit_buf &= (1u64 << remainder) - 1;
        self.bit_count = remainder;
        Ok(())
    }

    /// Emit the remainder as one byte, zero-filled in its low bits.
    fn pad(&mut self) -> io::Result<()> {
        self.commit()?;
        if self.bit_count > 0 {
            let byte = (self.bit_buf << (8 - self.bit_count)) as u8;
            self.inner.write_all(&[byte])?;
            self.bytes_written += 1;
            self.bit_buf = 0;
            self.bit_count = 0;
        }
        Ok(())
    }
}

impl<W: Write> Write for BitWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    /// Pads the partial byte with zeros, then flushes the sink.
    fn flush(&mut self) -> io::Result<()> {
        self.pad()?;
        self.inner.flush()
    }
}

impl<W: Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        // Best effort finish on drop so the final partial byte is never lost
        let _ = self.pad();
        let _ = self.inner.flush();
        // Safety: we're in drop, so this is the only time inner is dropped
        unsafe { ManuallyDrop::drop(&mut self.inner) };
    }
}
