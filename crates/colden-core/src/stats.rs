//! Statistics and metrics for compression operations.

use crate::types::CompressionRatio;

/// Statistics from a compression/expansion operation.
#[derive(Debug, Clone, Default)]
pub struct CompressionStats {
    /// Original (uncompressed) size in bytes.
    pub original_size: usize,

    /// Artifact size in bytes, header included.
    pub compressed_size: usize,

    /// Size of the serialized tree section in bytes.
    pub tree_size: usize,

    /// Number of distinct symbols in the code tree.
    pub distinct_symbols: usize,

    /// Time taken in microseconds.
    pub time_us: u64,
}

impl CompressionStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create stats from a completed operation.
    pub fn from_operation(original_size: usize, compressed_size: usize, time_us: u64) -> Self {
        CompressionStats {
            original_size,
            compressed_size,
            time_us,
            ..Default::default()
        }
    }

    /// Get compression ratio.
    pub fn ratio(&self) -> CompressionRatio {
        CompressionRatio::new(self.original_size, self.compressed_size)
    }

    /// Compressed bits per original byte, header included.
    pub fn bits_per_byte(&self) -> f64 {
        self.ratio().bits_per_byte()
    }

    /// Get throughput in bytes per second.
    pub fn throughput_bps(&self) -> f64 {
        if self.time_us == 0 {
            return 0.0;
        }
        self.original_size as f64 * 1_000_000.0 / self.time_us as f64
    }

    /// Get throughput in MB/s.
    pub fn throughput_mbs(&self) -> f64 {
        self.throughput_bps() / 1_000_000.0
    }

    /// Get space savings as percentage.
    pub fn savings_percent(&self) -> f64 {
        self.ratio().savings_percent()
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} -> {} bytes ({:.3} bits/byte, tree {} bytes, {} symbols, {:.1} MB/s)",
            self.original_size,
            self.compressed_size,
            self.bits_per_byte(),
            self.tree_size,
            self.distinct_symbols,
            self.throughput_mbs(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput() {
        let stats = CompressionStats::from_operation(2_000_000, 1_000_000, 1_000_000);
        assert_eq!(stats.throughput_bps(), 2_000_000.0);
        assert_eq!(stats.throughput_mbs(), 2.0);
        assert_eq!(stats.bits_per_byte(), 4.0);
    }

    #[test]
    fn test_zero_time() {
        let stats = CompressionStats::from_operation(10, 20, 0);
        assert_eq!(stats.throughput_bps(), 0.0);
        assert!(stats.summary().starts_with("10 -> 20 bytes"));
    }
}
