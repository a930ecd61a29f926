use std::{
    fmt,
    fs::File,
    io::{self, Cursor, Read, Write},
    path::{Path, PathBuf},
};

use bytes::{Bytes, BytesMut};
use tempfile::NamedTempFile;
use tracing::trace;

use crate::{Config, Error, Result};

/// In-memory part body.
#[derive(Default)]
pub struct MemorySink {
    buf: BytesMut,
    sealed: Option<Bytes>,
}

impl MemorySink {
    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if self.sealed.is_some() {
            return Err(Error::Sealed);
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn seal(&mut self) {
        if self.sealed.is_none() {
            self.sealed = Some(std::mem::take(&mut self.buf).freeze());
        }
    }

    fn bytes(&self) -> Bytes {
        match &self.sealed {
            Some(bytes) => bytes.clone(),
            None => Bytes::copy_from_slice(&self.buf),
        }
    }

    fn size(&self) -> u64 {
        self.sealed.as_ref().map_or(self.buf.len(), Bytes::len) as u64
    }
}

/// Part body spilled to an exclusively owned temporary file.
///
/// The file is removed when the sink is dropped, unless [`FileSink::keep`]
/// detached it first.
pub struct FileSink {
    file: NamedTempFile,
    size: u64,
    sealed: bool,
}

impl FileSink {
    /// Creates a fresh temporary file in the configured directory.
    ///
    /// # Errors
    ///
    /// When the file cannot be created.
    pub fn create(config: &Config) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(&config.temp_prefix)
            .tempfile_in(config.spill_dir())?;

        trace!("spill file {} created", file.path().display());

        Ok(Self {
            file,
            size: 0,
            sealed: false,
        })
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if self.sealed {
            return Err(Error::Sealed);
        }
        self.file.write_all(bytes)?;
        self.size += bytes.len() as u64;
        Ok(())
    }

    fn seal(&mut self) -> Result<()> {
        if !self.sealed {
            self.file.flush()?;
            self.sealed = true;
        }
        Ok(())
    }

    /// Path of the temporary file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Detaches the file from automatic deletion.
    ///
    /// # Errors
    ///
    /// When the pending writes cannot be flushed.
    pub fn keep(mut self) -> Result<PathBuf> {
        self.seal()?;
        self.file
            .into_temp_path()
            .keep()
            .map_err(|e| Error::Stream(e.error))
    }
}

/// Append-only, seal-once destination of a part body.
pub enum Sink {
    /// Bytes kept in memory
    Memory(MemorySink),
    /// Bytes spilled to disk
    File(FileSink),
}

impl Sink {
    /// Creates an in-memory sink.
    pub fn memory() -> Self {
        Self::Memory(MemorySink::default())
    }

    /// Creates a disk-backed sink.
    ///
    /// # Errors
    ///
    /// When the temporary file cannot be created.
    pub fn file(config: &Config) -> Result<Self> {
        FileSink::create(config).map(Self::File)
    }

    /// Chooses a sink from the body length left when a part begins.
    ///
    /// # Errors
    ///
    /// When a disk-backed sink is chosen and cannot be created.
    pub fn select(remaining: u64, config: &Config) -> Result<Self> {
        if config.checked_spill(remaining) {
            Self::file(config)
        } else {
            Ok(Self::memory())
        }
    }

    /// Appends bytes at the end.
    ///
    /// # Errors
    ///
    /// [`Error::Sealed`] after [`Sink::seal`], or the write error of a spilled file.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        match self {
            Self::Memory(sink) => sink.append(bytes),
            Self::File(sink) => sink.append(bytes),
        }
    }

    /// Forbids further appends, idempotent.
    ///
    /// # Errors
    ///
    /// When a spilled file cannot be flushed.
    pub fn seal(&mut self) -> Result<()> {
        match self {
            Self::Memory(sink) => {
                sink.seal();
                Ok(())
            }
            Self::File(sink) => sink.seal(),
        }
    }

    /// Checks if the sink is sealed.
    pub fn is_sealed(&self) -> bool {
        match self {
            Self::Memory(sink) => sink.sealed.is_some(),
            Self::File(sink) => sink.sealed,
        }
    }

    /// Bytes written so far.
    pub fn size(&self) -> u64 {
        match self {
            Self::Memory(sink) => sink.size(),
            Self::File(sink) => sink.size,
        }
    }

    /// Path of the spilled file.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Memory(_) => None,
            Self::File(sink) => Some(sink.path()),
        }
    }

    /// Opens a read handle from the first byte.
    ///
    /// A sealed memory sink shares its bytes, a spilled file is reopened.
    ///
    /// # Errors
    ///
    /// When a spilled file cannot be reopened.
    pub fn reader(&self) -> Result<PartReader> {
        match self {
            Self::Memory(sink) => Ok(PartReader::Memory(Cursor::new(sink.bytes()))),
            Self::File(sink) => Ok(PartReader::File(sink.file.reopen()?)),
        }
    }

    /// Reads the body to bytes, a sealed memory sink shares its bytes.
    ///
    /// # Errors
    ///
    /// When a spilled file cannot be read.
    pub fn bytes(&self) -> Result<Bytes> {
        match self {
            Self::Memory(sink) => Ok(sink.bytes()),
            Self::File(sink) => {
                let mut buf = Vec::with_capacity(sink.size as usize);
                sink.file.reopen()?.read_to_end(&mut buf)?;
                Ok(buf.into())
            }
        }
    }

    /// Detaches the content, a spilled file is no longer deleted on drop.
    ///
    /// # Errors
    ///
    /// When a spilled file cannot be flushed.
    pub fn keep(self) -> Result<Content> {
        match self {
            Self::Memory(mut sink) => {
                sink.seal();
                Ok(Content::Memory(sink.bytes()))
            }
            Self::File(sink) => sink.keep().map(Content::File),
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory(_) => f
                .debug_struct("MemorySink")
                .field("size", &self.size())
                .field("sealed", &self.is_sealed())
                .finish(),
            Self::File(sink) => f
                .debug_struct("FileSink")
                .field("path", &sink.path())
                .field("size", &sink.size)
                .field("sealed", &sink.sealed)
                .finish(),
        }
    }
}

/// Read handle over a part body.
#[derive(Debug)]
pub enum PartReader {
    /// Shared in-memory bytes
    Memory(Cursor<Bytes>),
    /// Reopened spilled file
    File(File),
}

impl Read for PartReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Memory(cursor) => cursor.read(buf),
            Self::File(file) => file.read(buf),
        }
    }
}

/// Detached part body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// In-memory bytes
    Memory(Bytes),
    /// Path of a kept file, now owned by the caller
    File(PathBuf),
}
