use std::fmt;

use percent_encoding::percent_decode_str;

use crate::PartHeader;

/// Rewrites a parsed part header for a client quirk.
///
/// `client` is the client identifier of the request, usually `User-Agent`.
pub trait Normalize: Send + Sync {
    /// Normalizes the header in place.
    fn normalize(&self, client: Option<&str>, header: &mut PartHeader);
}

impl<F> Normalize for F
where
    F: Fn(Option<&str>, &mut PartHeader) + Send + Sync,
{
    fn normalize(&self, client: Option<&str>, header: &mut PartHeader) {
        (self)(client, header);
    }
}

/// Percent-decodes the filename sent by clients that pre-escape it.
pub struct PercentDecodeFilename {
    matches: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl PercentDecodeFilename {
    /// Creates the rule for clients accepted by `matches`.
    pub fn new<F>(matches: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            matches: Box::new(matches),
        }
    }

    /// Internet Explorer on classic Mac OS.
    pub fn legacy() -> Self {
        Self::new(|client| client.contains("MSIE") && client.contains("Mac"))
    }
}

impl Normalize for PercentDecodeFilename {
    fn normalize(&self, client: Option<&str>, header: &mut PartHeader) {
        if !client.is_some_and(|client| (self.matches)(client)) {
            return;
        }

        if let Some(filename) = header.filename.as_mut() {
            let decoded = percent_decode_str(filename.as_str())
                .decode_utf8_lossy()
                .into_owned();
            tracing::trace!("filename {:?} decoded to {:?}", filename, decoded);
            *filename = decoded;
        }
    }
}

impl fmt::Debug for PercentDecodeFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PercentDecodeFilename").finish()
    }
}

/// Ordered chain of [`Normalize`] rules.
#[derive(Default)]
pub(crate) struct Normalizers(Vec<Box<dyn Normalize>>);

impl Normalizers {
    pub(crate) fn legacy() -> Self {
        Self(vec![Box::new(PercentDecodeFilename::legacy())])
    }

    pub(crate) fn push(&mut self, rule: Box<dyn Normalize>) {
        self.0.push(rule);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    pub(crate) fn apply(&self, client: Option<&str>, header: &mut PartHeader) {
        for rule in &self.0 {
            rule.normalize(client, header);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}
