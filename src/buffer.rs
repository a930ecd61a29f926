use std::{
    fmt,
    io::{ErrorKind, Read},
};

use bytes::{Buf, Bytes, BytesMut};
use memchr::memmem;

/// Rolling window over bytes pulled from the source but not yet classified.
///
/// Classified bytes leave the front through [`Buffer::split_to`], which hands
/// out a frozen `Bytes` without copying, so the window stays bounded by one
/// refill plus the withheld tail and a large body streams in linear time.
pub(crate) struct Buffer {
    inner: BytesMut,
}

impl Buffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: BytesMut::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    pub(crate) fn starts_with(&self, needle: &[u8]) -> bool {
        self.inner.starts_with(needle)
    }

    /// Searches from `from` on, the returned position is absolute.
    pub(crate) fn find_from(&self, needle: &[u8], from: usize) -> Option<usize> {
        let from = from.min(self.inner.len());
        memmem::find(&self.inner[from..], needle).map(|n| from + n)
    }

    /// Number of leading bytes that can leave while `reserve` trailing bytes stay.
    pub(crate) fn watermark(&self, reserve: usize) -> usize {
        self.inner.len().saturating_sub(reserve)
    }

    pub(crate) fn split_to(&mut self, n: usize) -> Bytes {
        self.inner.split_to(n).freeze()
    }

    pub(crate) fn advance(&mut self, n: usize) {
        self.inner.advance(n);
    }

    pub(crate) fn clear(&mut self) {
        self.inner.clear();
    }

    /// Appends at most `max` bytes read from `io`, returns `0` at end-of-data.
    pub(crate) fn read_from<R: Read>(&mut self, io: &mut R, max: usize) -> std::io::Result<usize> {
        let start = self.inner.len();
        self.inner.resize(start + max, 0);

        loop {
            match io.read(&mut self.inner[start..]) {
                Ok(n) => {
                    self.inner.truncate(start + n);
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.inner.truncate(start);
                    return Err(e);
                }
            }
        }
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.inner.len())
            .field("capacity", &self.inner.capacity())
            .finish()
    }
}
