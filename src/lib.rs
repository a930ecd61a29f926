//! Blocking `multipart/form-data` decoder, [rfc7578].
//!
//! A body of a declared length is read in bounded chunks, split on the
//! boundary even when it straddles two reads, and every part is stored in
//! memory or, when much of the body is still ahead, in a temporary file that
//! is removed with the part.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use form_parts::{Config, Decoder, Error};
//!
//! fn main() -> Result<(), Error> {
//!     let body = "--XBOUNDARY\r\n\
//!         Content-Disposition: form-data; name=\"title\"\r\n\r\n\
//!         Hello\r\n\
//!         --XBOUNDARY\r\n\
//!         Content-Disposition: form-data; name=\"upload\"; filename=\"report.txt\"\r\n\
//!         Content-Type: text/plain\r\n\r\n\
//!         abc123\r\n\
//!         --XBOUNDARY--\r\n";
//!
//!     let parts = Decoder::with_config(
//!         Cursor::new(body),
//!         body.len() as u64,
//!         "XBOUNDARY",
//!         Config::default().buffer_size(16),
//!     )
//!     .decode()?;
//!
//!     assert_eq!(parts["title"][0].text()?, "Hello");
//!
//!     let upload = &parts["upload"][0];
//!     assert_eq!(upload.filename.as_deref(), Some("report.txt"));
//!     assert_eq!(upload.mime(), Some(mime::TEXT_PLAIN));
//!     assert_eq!(upload.bytes()?, "abc123");
//!
//!     Ok(())
//! }
//! ```
//!
//! [rfc7578]: <https://tools.ietf.org/html/rfc7578>

#![forbid(unsafe_code)]
#![deny(nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod buffer;
mod collection;
mod config;
mod decoder;
mod error;
mod header;
mod normalize;
mod part;
mod scanner;
mod sink;
mod utils;

pub use collection::{Iter, PartCollection};

pub use config::Config;

pub use decoder::{decode, Decoder, DecoderState};

pub use error::Error;

pub use header::PartHeader;

pub use normalize::{Normalize, PercentDecodeFilename};

pub use part::Part;

pub use scanner::{Scan, Scanner};

pub use sink::{Content, FileSink, MemorySink, PartReader, Sink};

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;
