use thiserror::Error;

/// Form-parts Error
#[derive(Debug, Error)]
pub enum Error {
    /// IO Error, from the input source or a spilled part's file
    #[error(transparent)]
    Stream(#[from] std::io::Error),

    /// The body does not open with `--boundary\r\n`
    #[error("malformed body: missing or mismatched initial boundary")]
    MalformedBody,

    /// A part header block cannot be parsed or lacks a field name
    #[error("malformed part: {0}")]
    MalformedPart(&'static str),

    /// The body ended before the final boundary
    #[error("truncated body: consumed `{consumed}` of `{declared}` bytes without a final boundary")]
    TruncatedBody {
        /// Bytes pulled from the source
        consumed: u64,
        /// Declared content length
        declared: u64,
    },

    /// Append on a sealed sink
    #[error("sink is sealed")]
    Sealed,
}
