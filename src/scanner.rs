use std::fmt;

use memchr::memmem::Finder;

use crate::utils::{CRLF, DASHES};

/// Result of scanning the buffer for the next delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// No delimiter in the buffer, the tail may still hold a partial one.
    NotFound,
    /// A confirmed delimiter starting at `at`.
    Boundary {
        /// Offset of the `\r\n--boundary` delimiter, i.e. the body length.
        at: usize,
        /// `--boundary--`, no parts follow.
        is_final: bool,
    },
    /// A delimiter candidate whose follow-up marker is not buffered yet.
    NeedMoreData,
}

/// Locates `\r\n--boundary` followed by `\r\n` or `--`.
pub struct Scanner {
    // `\r\n--boundary`
    delimiter: Vec<u8>,
    // `--boundary\r\n`
    prologue: Vec<u8>,
    finder: Finder<'static>,
}

impl Scanner {
    /// Creates a scanner for the boundary token, taken verbatim.
    pub fn new(boundary: &[u8]) -> Self {
        let mut delimiter = Vec::with_capacity(4 + boundary.len());
        delimiter.extend_from_slice(&CRLF);
        delimiter.extend_from_slice(&DASHES);
        delimiter.extend_from_slice(boundary);

        let mut prologue = delimiter[2..].to_vec();
        prologue.extend_from_slice(&CRLF);

        let finder = Finder::new(&delimiter).into_owned();

        Self {
            delimiter,
            prologue,
            finder,
        }
    }

    /// Gets the boundary.
    pub fn boundary(&self) -> &[u8] {
        &self.delimiter[4..]
    }

    /// The delimiter, `\r\n--boundary`.
    pub fn delimiter(&self) -> &[u8] {
        &self.delimiter
    }

    /// The opening line every body must start with, `--boundary\r\n`.
    pub fn prologue(&self) -> &[u8] {
        &self.prologue
    }

    /// Bytes consumed by a confirmed delimiter and its follow-up marker.
    pub fn consumed(&self) -> usize {
        self.delimiter.len() + 2
    }

    /// Tail bytes to withhold from a sink while no delimiter is confirmed.
    pub fn reserve(&self) -> usize {
        self.consumed()
    }

    /// Scans `haystack` for the first confirmed delimiter.
    pub fn find(&self, haystack: &[u8]) -> Scan {
        let mut offset = 0;

        while let Some(n) = self.finder.find(&haystack[offset..]) {
            let at = offset + n;
            let end = at + self.delimiter.len();

            match haystack.get(end..end + 2) {
                None => return Scan::NeedMoreData,
                Some(marker) if *marker == CRLF => {
                    return Scan::Boundary {
                        at,
                        is_final: false,
                    }
                }
                Some(marker) if *marker == DASHES => {
                    return Scan::Boundary { at, is_final: true }
                }
                // boundary-like content
                Some(_) => offset = at + 1,
            }
        }

        Scan::NotFound
    }
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("boundary", &String::from_utf8_lossy(self.boundary()))
            .finish()
    }
}
