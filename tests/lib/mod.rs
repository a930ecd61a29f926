#![allow(dead_code)]

mod limited;
pub use limited::{Disconnect, Limited};

pub const MAC_IE: &str = "Mozilla/4.0 (compatible; MSIE 5.23; Mac_PowerPC)";

pub fn tracing_init() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        // From env var: `RUST_LOG`
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

/// Builds a `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct Body {
    boundary: String,
    bytes: Vec<u8>,
}

impl Body {
    pub fn new(boundary: &str) -> Self {
        Self {
            boundary: boundary.to_string(),
            bytes: Vec::new(),
        }
    }

    pub fn field(mut self, name: &str, value: &[u8]) -> Self {
        self.open();
        self.bytes.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.bytes.extend_from_slice(value);
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, value: &[u8]) -> Self {
        self.open();
        self.bytes.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(value);
        self
    }

    /// A part with a raw header block, blank line included.
    pub fn raw(mut self, headers: &str, value: &[u8]) -> Self {
        self.open();
        self.bytes.extend_from_slice(headers.as_bytes());
        self.bytes.extend_from_slice(value);
        self
    }

    /// Closes the body with the final boundary.
    pub fn finish(mut self) -> Vec<u8> {
        self.bytes.extend_from_slice(b"\r\n--");
        self.bytes.extend_from_slice(self.boundary.as_bytes());
        self.bytes.extend_from_slice(b"--\r\n");
        self.bytes
    }

    /// Leaves the body without its final boundary.
    pub fn unfinished(self) -> Vec<u8> {
        self.bytes
    }

    fn open(&mut self) {
        if !self.bytes.is_empty() {
            self.bytes.extend_from_slice(b"\r\n");
        }
        self.bytes.extend_from_slice(b"--");
        self.bytes.extend_from_slice(self.boundary.as_bytes());
        self.bytes.extend_from_slice(b"\r\n");
    }
}

/// Files left in a directory.
pub fn leftovers(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).map_or(0, |entries| entries.count())
}
