use std::{
    fmt,
    io::{self, ErrorKind, Read},
};

use rand::Rng;

pub const LIMITED: usize = 8 * 1024;

/// Hands out at most `limit` bytes per read.
pub struct Limited<T> {
    io: T,
    limit: usize,
    length: u64,
    eof: bool,
}

impl<T> Limited<T> {
    pub fn new(io: T, limit: usize) -> Self {
        tracing::info!("Limited stream by {}", limit);

        Self {
            io,
            limit,
            length: 0,
            eof: false,
        }
    }

    pub fn random(io: T) -> Self {
        Self::new(io, rand::thread_rng().gen_range(1..LIMITED))
    }

    pub fn random_with(io: T, max: usize) -> Self {
        Self::new(io, rand::thread_rng().gen_range(1..max))
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn length(&self) -> u64 {
        self.length
    }
}

impl<T> fmt::Debug for Limited<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Limited")
            .field("eof", &self.eof)
            .field("limit", &self.limit)
            .field("length", &self.length)
            .finish()
    }
}

impl<T: Read> Read for Limited<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let max = buf.len().min(self.limit);
        let n = self.io.read(&mut buf[..max])?;
        if n == 0 {
            self.eof = true;
        }
        self.length += n as u64;
        Ok(n)
    }
}

/// Fails with `ConnectionReset` once `after` bytes were read, like a peer
/// going away mid-body.
pub struct Disconnect<T> {
    io: T,
    after: u64,
    length: u64,
}

impl<T> Disconnect<T> {
    pub fn new(io: T, after: u64) -> Self {
        Self {
            io,
            after,
            length: 0,
        }
    }
}

impl<T: Read> Read for Disconnect<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let left = self.after - self.length;
        if left == 0 {
            return Err(io::Error::new(ErrorKind::ConnectionReset, "peer disconnected"));
        }
        let max = buf.len().min(left as usize);
        let n = self.io.read(&mut buf[..max])?;
        self.length += n as u64;
        Ok(n)
    }
}
