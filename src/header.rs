use std::borrow::Cow;

use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE};
use httparse::{parse_headers, Status, EMPTY_HEADER};

use crate::{utils::MAX_HEADERS, Error, Result};

const NAME: &[u8; 4] = b"name";
const FILE_NAME: &[u8; 8] = b"filename";
const FORM_DATA: &[u8; 9] = b"form-data";

/// Structured header block of one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartHeader {
    /// The field name, from `Content-Disposition`.
    pub name: String,
    /// The filename, from `Content-Disposition`, optional.
    pub filename: Option<String>,
    /// The raw `Content-Type` value, optional.
    pub content_type: Option<String>,
    /// The remaining headers, optional.
    pub headers: Option<HeaderMap>,
}

impl PartHeader {
    /// Parses the bytes between a boundary line and the end of the blank line.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedPart`] when the block is not a valid header block, has
    /// no `form-data` disposition, or has no field name.
    pub fn parse(block: &[u8]) -> Result<Self> {
        let mut headers = parse_part_headers(block)?;

        let (name, filename) = headers
            .remove(CONTENT_DISPOSITION)
            .as_ref()
            .map(HeaderValue::as_bytes)
            .map(parse_content_disposition)
            .ok_or(Error::MalformedPart("missing content disposition"))??;

        let content_type = headers
            .remove(CONTENT_TYPE)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

        Ok(Self {
            name,
            filename,
            content_type,
            headers: if headers.is_empty() {
                None
            } else {
                Some(headers)
            },
        })
    }
}

pub(crate) fn parse_part_headers(bytes: &[u8]) -> Result<HeaderMap> {
    let mut headers = [EMPTY_HEADER; MAX_HEADERS];
    match parse_headers(bytes, &mut headers) {
        Ok(Status::Complete((_, hs))) => {
            let mut header_map = HeaderMap::with_capacity(hs.len());
            for h in hs.iter() {
                header_map.append(
                    HeaderName::from_bytes(h.name.as_bytes())
                        .map_err(|_| Error::MalformedPart("invalid header name"))?,
                    HeaderValue::from_bytes(h.value)
                        .map_err(|_| Error::MalformedPart("invalid header value"))?,
                );
            }
            Ok(header_map)
        }
        Ok(Status::Partial) | Err(_) => Err(Error::MalformedPart("invalid part header")),
    }
}

/// `form-data; name="field"; filename="a.txt"`, parameters in any order.
pub(crate) fn parse_content_disposition(hv: &[u8]) -> Result<(String, Option<String>)> {
    let len = hv.len();
    let mut i = hv.iter().position(|b| *b == b';').unwrap_or(len);

    if !trim(&hv[..i]).eq_ignore_ascii_case(FORM_DATA) {
        return Err(Error::MalformedPart("invalid content disposition"));
    }

    let mut name = None;
    let mut filename = None;

    // `hv[i]` is `;` or the end
    while i < len {
        i += 1;

        let k = i;
        while i < len && hv[i] != b'=' && hv[i] != b';' {
            i += 1;
        }
        let key = trim(&hv[k..i]);

        // valueless parameter
        if i == len || hv[i] == b';' {
            continue;
        }

        i += 1;
        while i < len && hv[i] == b' ' {
            i += 1;
        }

        let value = if i < len && hv[i] == b'"' {
            i += 1;
            let mut value = Vec::new();
            loop {
                match hv.get(i) {
                    None => return Err(Error::MalformedPart("unterminated quoted string")),
                    Some(b'"') => break,
                    // only `\"` is unescaped, other backslashes are path separators
                    Some(b'\\') if hv.get(i + 1) == Some(&b'"') => {
                        value.push(b'"');
                        i += 2;
                    }
                    Some(b) => {
                        value.push(*b);
                        i += 1;
                    }
                }
            }
            while i < len && hv[i] != b';' {
                i += 1;
            }
            Cow::Owned(value)
        } else {
            let k = i;
            while i < len && hv[i] != b';' {
                i += 1;
            }
            Cow::Borrowed(trim(&hv[k..i]))
        };

        if key.eq_ignore_ascii_case(NAME) {
            name.get_or_insert_with(|| String::from_utf8_lossy(&value).into_owned());
        } else if key.eq_ignore_ascii_case(FILE_NAME) {
            filename.get_or_insert_with(|| String::from_utf8_lossy(&value).into_owned());
        }
    }

    match name {
        Some(name) if !name.is_empty() => Ok((name, filename)),
        _ => Err(Error::MalformedPart("missing field name")),
    }
}

fn trim(mut bytes: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = bytes {
        bytes = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = bytes {
        bytes = rest;
    }
    bytes
}
