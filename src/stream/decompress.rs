//! Streaming decompression
//!
//! Wraps a raw byte stream in an incremental decoder for the declared
//! codec. The decoders keep a bounded internal buffer regardless of total
//! payload size; corrupt compressed data surfaces as an `io::Error` from
//! `read`, which the pipeline treats as a terminal failure.

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::io::{self, Read};

/// Compression codec declared for a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// gzip (CEDICT dump)
    Gzip,
    /// bzip2 (Tatoeba exports)
    Bzip2,
}

/// Incremental decoder over an arbitrary byte stream
pub enum Decompressor<R: Read> {
    Gzip(GzDecoder<R>),
    Bzip2(BzDecoder<R>),
}

impl<R: Read> Decompressor<R> {
    /// Wrap `inner` with a decoder for `codec`
    pub fn new(codec: Codec, inner: R) -> Self {
        match codec {
            Codec::Gzip => Decompressor::Gzip(GzDecoder::new(inner)),
            Codec::Bzip2 => Decompressor::Bzip2(BzDecoder::new(inner)),
        }
    }
}

impl<R: Read> Read for Decompressor<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Decompressor::Gzip(r) => r.read(buf),
            Decompressor::Bzip2(r) => r.read(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::write::BzEncoder;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn bzip2_compress(data: &[u8]) -> Vec<u8> {
        let mut enc = BzEncoder::new(Vec::new(), bzip2::Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_gzip_roundtrip() {
        let payload = b"hello gzip stream".to_vec();
        let compressed = gzip(&payload);

        let mut out = Vec::new();
        Decompressor::new(Codec::Gzip, compressed.as_slice())
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn test_bzip2_roundtrip() {
        let payload = b"hello bzip2 stream".to_vec();
        let compressed = bzip2_compress(&payload);

        let mut out = Vec::new();
        Decompressor::new(Codec::Bzip2, compressed.as_slice())
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn test_corrupt_gzip_is_terminal() {
        let garbage = b"this is not a gzip stream at all";
        let mut out = Vec::new();
        let result = Decompressor::new(Codec::Gzip, garbage.as_slice()).read_to_end(&mut out);
        assert!(result.is_err());
    }

    #[test]
    fn test_truncated_bzip2_is_terminal() {
        let payload = vec![b'x'; 4096];
        let mut compressed = bzip2_compress(&payload);
        compressed.truncate(compressed.len() / 2);

        let mut out = Vec::new();
        let result = Decompressor::new(Codec::Bzip2, compressed.as_slice()).read_to_end(&mut out);
        assert!(result.is_err());
    }
}
