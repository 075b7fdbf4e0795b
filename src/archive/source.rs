//! Random-access byte source and gzip container unwrapping

use std::io::Read;

use bytes::Bytes;
use flate2::read::MultiGzDecoder;
use tracing::debug;

use super::format::GZIP_MAGIC;
use crate::{DecodeError, Result};

/// Cursor over an immutable byte buffer
///
/// Reads hand out [`Bytes`] views of the underlying buffer, so nothing is
/// copied unless the caller asks for it. Reading past the end yields a short
/// (possibly empty) result rather than an error.
#[derive(Debug, Clone)]
pub struct ByteSource {
    data: Bytes,
    pos: usize,
}

impl ByteSource {
    /// Wrap a buffer with the cursor at its start
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    /// Total length of the buffer
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current cursor position
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Read up to `n` bytes and advance the cursor
    pub fn read(&mut self, n: usize) -> Bytes {
        let out = self.peek(n);
        self.pos += out.len();
        out
    }

    /// Read everything after the cursor
    pub fn read_to_end(&mut self) -> Bytes {
        self.read(self.remaining())
    }

    /// Return up to `n` bytes without moving the cursor
    #[must_use]
    pub fn peek(&self, n: usize) -> Bytes {
        let start = self.pos.min(self.data.len());
        let end = start.saturating_add(n).min(self.data.len());
        self.data.slice(start..end)
    }

    /// Move the cursor to an absolute position
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// The whole underlying buffer
    #[must_use]
    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }
}

/// Strip a whole-file gzip envelope if one is present
///
/// # Errors
///
/// Returns [`DecodeError::Format`] if the gzip stream is malformed
pub fn unwrap_container(source: ByteSource) -> Result<ByteSource> {
    if source.peek(GZIP_MAGIC.len())[..] != GZIP_MAGIC[..] {
        return Ok(source);
    }

    let compressed = source.as_bytes();
    let mut decoder = MultiGzDecoder::new(compressed.as_ref());
    let mut inflated = Vec::with_capacity(compressed.len() * 4);
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| DecodeError::Format(format!("Invalid gzip stream: {e}")))?;

    debug!(
        "Unwrapped gzip container: {} -> {} bytes",
        compressed.len(),
        inflated.len()
    );

    Ok(ByteSource::new(inflated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_read_peek_seek() {
        let mut source = ByteSource::new(vec![1u8, 2, 3, 4, 5]);

        assert_eq!(source.peek(2).to_vec(), vec![1, 2]);
        assert_eq!(source.position(), 0);

        assert_eq!(source.read(3).to_vec(), vec![1, 2, 3]);
        assert_eq!(source.position(), 3);
        assert_eq!(source.remaining(), 2);

        source.seek(1);
        assert_eq!(source.read_to_end().to_vec(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_read_past_end_is_truncated() {
        let mut source = ByteSource::new(vec![9u8, 8, 7]);
        assert_eq!(source.read(10).to_vec(), vec![9, 8, 7]);
        assert!(source.read(4).is_empty());

        source.seek(100);
        assert!(source.peek(1).is_empty());
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_plain_source_passes_through() {
        let source = ByteSource::new(b"AR2V0006.501".to_vec());
        let unwrapped = unwrap_container(source).unwrap();
        assert_eq!(&unwrapped.as_bytes()[..], &b"AR2V0006.501"[..]);
    }

    #[test]
    fn test_gzip_source_is_inflated() {
        let payload = b"AR2V0006.501 some volume bytes".repeat(20);
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&payload).unwrap();
        let gz = encoder.finish().unwrap();

        let unwrapped = unwrap_container(ByteSource::new(gz)).unwrap();
        assert_eq!(&unwrapped.as_bytes()[..], payload.as_slice());
        assert_eq!(unwrapped.position(), 0);
    }

    #[test]
    fn test_corrupt_gzip_is_format_error() {
        let mut bytes = GZIP_MAGIC.to_vec();
        bytes.extend_from_slice(&[0xFF; 32]);

        let err = unwrap_container(ByteSource::new(bytes)).unwrap_err();
        assert!(matches!(err, DecodeError::Format(msg) if msg.contains("gzip")));
    }
}
