use std::{fmt, path::Path};

use bytes::Bytes;

use crate::{Content, PartHeader, PartReader, Result, Sink};

/// One decoded section of the body, a form field or a file upload.
pub struct Part {
    /// The position of Part in the body.
    pub index: usize,
    /// The name of Part.
    pub name: String,
    /// The filename of Part, optional.
    pub filename: Option<String>,
    /// The raw content type of Part, optional, absent for plain fields.
    pub content_type: Option<String>,
    /// The extra headers of Part, optional.
    pub headers: Option<http::HeaderMap>,
    sink: Sink,
}

impl Part {
    pub(crate) fn new(index: usize, header: PartHeader, sink: Sink) -> Self {
        let PartHeader {
            name,
            filename,
            content_type,
            headers,
        } = header;

        Self {
            index,
            name,
            filename,
            content_type,
            headers,
            sink,
        }
    }

    pub(crate) fn sink_mut(&mut self) -> &mut Sink {
        &mut self.sink
    }

    /// The body storage.
    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Bytes of the body.
    pub fn size(&self) -> u64 {
        self.sink.size()
    }

    /// Parses the content type.
    pub fn mime(&self) -> Option<mime::Mime> {
        self.content_type.as_deref().and_then(|v| v.parse().ok())
    }

    /// Checks if the part carries a filename.
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }

    /// Checks if the body was spilled to disk.
    pub fn is_spilled(&self) -> bool {
        matches!(self.sink, Sink::File(_))
    }

    /// Path of the spilled body.
    pub fn path(&self) -> Option<&Path> {
        self.sink.path()
    }

    /// Opens a read handle on the body.
    ///
    /// # Errors
    ///
    /// When a spilled body cannot be reopened.
    pub fn reader(&self) -> Result<PartReader> {
        self.sink.reader()
    }

    /// Reads the body to bytes.
    ///
    /// # Errors
    ///
    /// When a spilled body cannot be read.
    pub fn bytes(&self) -> Result<Bytes> {
        self.sink.bytes()
    }

    /// Reads the body to a string, invalid UTF-8 is replaced.
    ///
    /// # Errors
    ///
    /// When a spilled body cannot be read.
    pub fn text(&self) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.bytes()?).into_owned())
    }

    /// Detaches the body, a spilled file is no longer deleted on drop.
    ///
    /// # Errors
    ///
    /// When a spilled file cannot be flushed.
    pub fn keep(self) -> Result<Content> {
        self.sink.keep()
    }
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Part")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("headers", &self.headers)
            .field("sink", &self.sink)
            .finish()
    }
}
