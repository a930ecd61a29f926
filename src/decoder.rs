use std::{fmt, io::Read};

use tracing::{debug, trace};

use crate::{
    buffer::Buffer,
    normalize::Normalizers,
    utils::{CRLF, CRLFS},
    Config, Error, Normalize, Part, PartCollection, PartHeader, Result, Scan, Scanner, Sink,
};

/// Decoder states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Verifying `--boundary\r\n` at the very start of the body.
    AwaitingInitialBoundary,
    /// Collecting a part header block up to the blank line.
    ReadingHeaders,
    /// Streaming a part body into its sink.
    ReadingBody,
    /// The final boundary was seen and the declared length consumed.
    Complete,
    /// A fatal error was returned, nothing more is decoded.
    Failed,
}

/// Blocking `multipart/form-data` decoder over a length-bounded source.
///
/// Yields each [`Part`] once its closing boundary is confirmed. One decoder
/// serves one body and is not reusable.
pub struct Decoder<R> {
    io: R,
    state: DecoderState,
    config: Config,
    /// declared content length
    declared: u64,
    /// bytes pulled from `io`
    length: u64,
    total: usize,
    buffer: Buffer,
    /// where the next search for the end of a header block starts
    scanned: usize,
    scanner: Scanner,
    client: Option<String>,
    normalizers: Normalizers,
    part: Option<Part>,
}

impl<R: Read> Decoder<R> {
    /// Creates a decoder for a body of `declared` bytes delimited by `boundary`.
    pub fn new<B: AsRef<[u8]>>(io: R, declared: u64, boundary: B) -> Self {
        Self::with_config(io, declared, boundary, Config::default())
    }

    /// Creates a decoder with the given settings.
    pub fn with_config<B: AsRef<[u8]>>(
        io: R,
        declared: u64,
        boundary: B,
        mut config: Config,
    ) -> Self {
        config.buffer_size = config.checked_buffer_size();
        let scanner = Scanner::new(boundary.as_ref());
        let buffer = Buffer::with_capacity(config.buffer_size + scanner.reserve());

        Self {
            io,
            state: DecoderState::AwaitingInitialBoundary,
            config,
            declared,
            length: 0,
            total: 0,
            buffer,
            scanned: 0,
            scanner,
            client: None,
            normalizers: Normalizers::legacy(),
            part: None,
        }
    }

    /// Sets the client identifier consulted by the normalization rules.
    #[must_use]
    pub fn client(mut self, client: impl Into<String>) -> Self {
        self.client.replace(client.into());
        self
    }

    /// Appends a header normalization rule.
    #[must_use]
    pub fn normalize<N: Normalize + 'static>(mut self, rule: N) -> Self {
        self.normalizers.push(Box::new(rule));
        self
    }

    /// Drops every normalization rule, including the built-in legacy one.
    #[must_use]
    pub fn without_normalizers(mut self) -> Self {
        self.normalizers.clear();
        self
    }

    /// Gets the state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Gets the declared length.
    pub fn declared(&self) -> u64 {
        self.declared
    }

    /// Gets the number of bytes pulled from the source.
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Checks if nothing was pulled from the source yet.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Counts the parts started.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Gets the boundary.
    pub fn boundary(&self) -> &[u8] {
        self.scanner.boundary()
    }

    /// Decodes the whole body.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedBody`], [`Error::MalformedPart`],
    /// [`Error::TruncatedBody`], or the I/O error of the source or a sink.
    pub fn decode(mut self) -> Result<PartCollection> {
        let mut collection = PartCollection::new();
        while let Some(part) = self.next_part()? {
            collection.push(part);
        }
        Ok(collection)
    }

    /// Decodes the next part.
    ///
    /// Returns `None` once the body is complete, or after an error.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode`]. The in-progress part is released first.
    pub fn next_part(&mut self) -> Result<Option<Part>> {
        self.step().map_err(|e| {
            debug!("decode failed: {}", e);
            self.state = DecoderState::Failed;
            // drops the sink, a spilled file is removed
            self.part.take();
            self.buffer.clear();
            e
        })
    }

    fn step(&mut self) -> Result<Option<Part>> {
        loop {
            match self.state {
                DecoderState::AwaitingInitialBoundary => {
                    let prologue = self.scanner.prologue();
                    let n = prologue.len().min(self.buffer.len());

                    if !self.buffer.starts_with(&prologue[..n]) {
                        return Err(Error::MalformedBody);
                    }

                    if n == prologue.len() {
                        trace!("initial boundary confirmed");
                        self.buffer.advance(n);
                        self.state = DecoderState::ReadingHeaders;
                        continue;
                    }

                    if self.fill()? == 0 {
                        return Err(Error::MalformedBody);
                    }
                }
                DecoderState::ReadingHeaders => {
                    let Some(n) = self.header_end() else {
                        if self.config.checked_header_size(self.buffer.len()) {
                            return Err(Error::MalformedPart("header block too large"));
                        }
                        self.refill()?;
                        continue;
                    };

                    if self.config.checked_header_size(n) {
                        return Err(Error::MalformedPart("header block too large"));
                    }

                    let block = self.buffer.split_to(n);
                    let mut header = PartHeader::parse(&block)?;
                    self.normalizers.apply(self.client.as_deref(), &mut header);

                    if header.name.is_empty() {
                        return Err(Error::MalformedPart("missing field name"));
                    }

                    let remaining = self.declared - self.body_offset();
                    let sink = Sink::select(remaining, &self.config)?;
                    debug!(
                        "part {} `{}` begins with {} bytes remaining, sink {:?}",
                        self.total, header.name, remaining, sink
                    );

                    self.part.replace(Part::new(self.total, header, sink));
                    self.total += 1;
                    self.state = DecoderState::ReadingBody;
                }
                DecoderState::ReadingBody => match self.scanner.find(self.buffer.as_slice()) {
                    Scan::Boundary { at, is_final } => {
                        let mut part = self
                            .part
                            .take()
                            .ok_or(Error::MalformedPart("no active part"))?;

                        let data = self.buffer.split_to(at);
                        part.sink_mut().append(&data)?;
                        part.sink_mut().seal()?;
                        self.buffer.advance(self.scanner.consumed());

                        trace!("part {} sealed, {} bytes", part.index, part.size());

                        if is_final {
                            self.drain()?;
                            self.state = DecoderState::Complete;
                            debug!("body complete, {} parts, {} bytes", self.total, self.length);
                        } else {
                            self.state = DecoderState::ReadingHeaders;
                        }

                        return Ok(Some(part));
                    }
                    Scan::NeedMoreData => self.refill()?,
                    Scan::NotFound => {
                        let n = self.buffer.watermark(self.scanner.reserve());
                        if n > 0 {
                            let data = self.buffer.split_to(n);
                            if let Some(part) = self.part.as_mut() {
                                part.sink_mut().append(&data)?;
                            }
                            trace!("flushed {} bytes", n);
                        }
                        self.refill()?;
                    }
                },
                DecoderState::Complete | DecoderState::Failed => return Ok(None),
            }
        }
    }

    /// Length of the header block, blank line included.
    ///
    /// Bytes already searched are skipped on the next call.
    fn header_end(&mut self) -> Option<usize> {
        if self.buffer.starts_with(&CRLF) {
            self.scanned = 0;
            return Some(CRLF.len());
        }
        match self.buffer.find_from(&CRLFS, self.scanned) {
            Some(n) => {
                self.scanned = 0;
                Some(n + CRLFS.len())
            }
            None => {
                // `\r\n\r` may be completed by the next read
                self.scanned = self.buffer.len().saturating_sub(CRLFS.len() - 1);
                None
            }
        }
    }

    /// Body bytes classified so far.
    fn body_offset(&self) -> u64 {
        self.length - self.buffer.len() as u64
    }

    /// Pulls at most one chunk, never past the declared length.
    fn fill(&mut self) -> Result<usize> {
        let remaining = self.declared - self.length;
        if remaining == 0 {
            return Ok(0);
        }

        let max = remaining.min(self.config.buffer_size as u64) as usize;
        let n = self.buffer.read_from(&mut self.io, max)?;
        self.length += n as u64;

        trace!("pulled {} bytes, {}/{}", n, self.length, self.declared);

        Ok(n)
    }

    fn refill(&mut self) -> Result<()> {
        if self.fill()? == 0 {
            return Err(Error::TruncatedBody {
                consumed: self.length,
                declared: self.declared,
            });
        }
        Ok(())
    }

    /// Discards the epilogue up to the declared length.
    fn drain(&mut self) -> Result<()> {
        loop {
            if !self.buffer.is_empty() {
                trace!("discarding {} epilogue bytes", self.buffer.len());
                self.buffer.clear();
            }
            if self.length == self.declared {
                return Ok(());
            }
            self.refill()?;
        }
    }
}

impl<R: Read> Iterator for Decoder<R> {
    type Item = Result<Part>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_part().transpose()
    }
}

impl<R> fmt::Debug for Decoder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("state", &self.state)
            .field("declared", &self.declared)
            .field("length", &self.length)
            .field("total", &self.total)
            .field("buffer", &self.buffer)
            .field("scanner", &self.scanner)
            .field("client", &self.client)
            .field("normalizers", &self.normalizers.len())
            .field("part", &self.part)
            .finish()
    }
}

/// Decodes a whole body of `declared` bytes read from `io`.
///
/// # Errors
///
/// See [`Decoder::decode`].
pub fn decode<R, B>(io: R, declared: u64, boundary: B, config: Config) -> Result<PartCollection>
where
    R: Read,
    B: AsRef<[u8]>,
{
    Decoder::with_config(io, declared, boundary, config).decode()
}
