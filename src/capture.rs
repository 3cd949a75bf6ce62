//! Binary timestamp-capture decoding.
//!
//! The benchmark harness records raw counter reads around order entry and
//! acknowledgment into a fixed-format binary file:
//!
//! ```text
//! sample_count      u32   number of trailing samples
//! cpu_frequency_hz  u64   capture clock frequency
//! method_len        u32   byte length of the method label
//! method            [u8]  free-text label, not null-terminated
//! padding_len       u32   byte length of reserved padding
//! padding           [u8]  ignored
//! samples           [u64] counter values, in file order
//! ```
//!
//! All integers are **little-endian**, matching the x86 hosts that write the
//! captures. Decoding is strictly sequential: each declared length governs
//! how many bytes the next read consumes, and any declared length that
//! exceeds the remaining buffer is a [`FormatError`].

use std::fs;
use std::path::Path;

use crate::error::{AnalysisError, FormatError};

/// An ordered series of raw counter samples with capture metadata.
///
/// Immutable after construction. The samples are raw ticks of the capture
/// clock; consumers treat them as already timeline-meaningful and use
/// [`cpu_frequency_hz`](Self::cpu_frequency_hz) only as carried metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampSeries {
    samples: Vec<u64>,
    method: String,
    cpu_frequency_hz: u64,
}

impl TimestampSeries {
    /// Build a series from already-decoded parts.
    pub fn new(samples: Vec<u64>, method: impl Into<String>, cpu_frequency_hz: u64) -> Self {
        Self {
            samples,
            method: method.into(),
            cpu_frequency_hz,
        }
    }

    /// The counter samples, in file order.
    pub fn samples(&self) -> &[u64] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Free-text label describing how the timestamps were taken.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Capture clock frequency in Hz.
    pub fn cpu_frequency_hz(&self) -> u64 {
        self.cpu_frequency_hz
    }

    /// Decode a capture from its binary representation.
    ///
    /// # Errors
    ///
    /// [`FormatError::Truncated`] if the buffer is shorter than any declared
    /// field requires; [`FormatError::TrailingBytes`] if bytes remain after
    /// the declared sample block. On error no partial series is produced.
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut cur = Cursor::new(bytes);

        let sample_count = cur.read_u32("sample_count")? as usize;
        let cpu_frequency_hz = cur.read_u64("cpu_frequency_hz")?;

        let method_len = cur.read_u32("method_len")? as usize;
        let method = String::from_utf8_lossy(cur.take("method", method_len)?).into_owned();

        let padding_len = cur.read_u32("padding_len")? as usize;
        cur.take("padding", padding_len)?;

        let needed = sample_count.saturating_mul(8);
        if cur.remaining() < needed {
            return Err(FormatError::Truncated {
                field: "samples",
                needed,
                available: cur.remaining(),
            });
        }
        let mut samples = Vec::with_capacity(sample_count);
        for _ in 0..sample_count {
            samples.push(cur.read_u64("samples")?);
        }

        let extra = cur.remaining();
        if extra != 0 {
            return Err(FormatError::TrailingBytes { extra });
        }

        Ok(Self {
            samples,
            method,
            cpu_frequency_hz,
        })
    }

    /// Read and decode a capture file.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::Io`] if the file cannot be read, otherwise any
    /// [`FormatError`] from [`parse`](Self::parse).
    pub fn parse_file(path: &Path) -> Result<Self, AnalysisError> {
        let bytes = fs::read(path)?;
        Ok(Self::parse(&bytes)?)
    }

    /// Encode the series into the capture format.
    ///
    /// Exact inverse of [`parse`](Self::parse) (with zero padding), used to
    /// generate synthetic captures. `parse(encode(s)) == s` for any series.
    pub fn encode(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(4 + 8 + 4 + self.method.len() + 4 + self.samples.len() * 8);
        out.extend_from_slice(&(self.samples.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.cpu_frequency_hz.to_le_bytes());
        out.extend_from_slice(&(self.method.len() as u32).to_le_bytes());
        out.extend_from_slice(self.method.as_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        for sample in &self.samples {
            out.extend_from_slice(&sample.to_le_bytes());
        }
        out
    }
}

/// Sequential reader over the capture buffer.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, field: &'static str, n: usize) -> Result<&'a [u8], FormatError> {
        if self.remaining() < n {
            return Err(FormatError::Truncated {
                field,
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u32(&mut self, field: &'static str) -> Result<u32, FormatError> {
        let bytes = self.take(field, 4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    fn read_u64(&mut self, field: &'static str) -> Result<u64, FormatError> {
        let bytes = self.take(field, 8)?;
        Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    /// Hand-built capture: 2 samples, method "rdtsc", 3 padding bytes.
    fn sample_capture() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&3_000_000_000u64.to_le_bytes());
        buf.extend_from_slice(&5u32.to_le_bytes());
        buf.extend_from_slice(b"rdtsc");
        buf.extend_from_slice(&3u32.to_le_bytes());
        buf.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        buf.extend_from_slice(&100u64.to_le_bytes());
        buf.extend_from_slice(&150u64.to_le_bytes());
        buf
    }

    #[test]
    fn parse_well_formed_capture() {
        let series = TimestampSeries::parse(&sample_capture()).unwrap();
        assert_eq!(series.samples(), &[100, 150]);
        assert_eq!(series.method(), "rdtsc");
        assert_eq!(series.cpu_frequency_hz(), 3_000_000_000);
    }

    #[test]
    fn parse_skips_padding() {
        // Padding content must not leak into samples.
        let series = TimestampSeries::parse(&sample_capture()).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn parse_empty_sample_block() {
        let series = TimestampSeries::new(vec![], "clock_gettime", 1_000_000_000);
        let decoded = TimestampSeries::parse(&series.encode()).unwrap();
        assert_eq!(decoded, series);
        assert!(decoded.is_empty());
    }

    #[test]
    fn encode_decode_round_trip() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for n in [0usize, 1, 2, 17, 256] {
            let samples: Vec<u64> = (0..n).map(|_| rng.gen()).collect();
            let series = TimestampSeries::new(samples, "rdtscp", rng.gen());
            let decoded = TimestampSeries::parse(&series.encode()).unwrap();
            assert_eq!(decoded, series);
        }
    }

    #[test]
    fn truncated_header_fails() {
        let err = TimestampSeries::parse(&[0x01, 0x00]).unwrap_err();
        assert_eq!(
            err,
            FormatError::Truncated {
                field: "sample_count",
                needed: 4,
                available: 2,
            }
        );
    }

    #[test]
    fn method_length_exceeding_buffer_fails() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&1u64.to_le_bytes());
        buf.extend_from_slice(&100u32.to_le_bytes());
        buf.extend_from_slice(b"short");
        let err = TimestampSeries::parse(&buf).unwrap_err();
        assert!(matches!(
            err,
            FormatError::Truncated {
                field: "method",
                needed: 100,
                ..
            }
        ));
    }

    #[test]
    fn declared_sample_count_exceeding_buffer_fails() {
        let series = TimestampSeries::new(vec![1, 2, 3], "rdtsc", 1);
        let mut buf = series.encode();
        // Inflate the declared count without adding sample bytes.
        buf[0..4].copy_from_slice(&10u32.to_le_bytes());
        let err = TimestampSeries::parse(&buf).unwrap_err();
        assert!(matches!(err, FormatError::Truncated { field: "samples", .. }));
    }

    #[test]
    fn trailing_bytes_fail() {
        let mut buf = sample_capture();
        buf.push(0xFF);
        assert_eq!(
            TimestampSeries::parse(&buf).unwrap_err(),
            FormatError::TrailingBytes { extra: 1 }
        );
    }
}
