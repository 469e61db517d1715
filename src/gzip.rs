//! Gzip compression for the response serializer's compression pre-pass.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Gzip-compresses `data` at the best compression level. Failure can only
/// come from the in-memory writer itself, never from I/O, so callers may
/// treat it as effectively infallible; the `Result` is kept so a future
/// streaming implementation can propagate a real I/O error.
pub fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compresses_and_shrinks_repetitive_data() {
        let data = vec![b'a'; 4096];
        let compressed = compress(&data).unwrap();
        assert!(compressed.len() < data.len());
    }
}
