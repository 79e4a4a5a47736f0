//! Splitting of raw HTTP response bytes
//!
//! libcurl with header output enabled hands back the whole response as one
//! byte stream. This parser pulls the status code, the header block and the
//! body out of it. Interim blocks (`100 Continue`, a proxy's
//! `Connection established`) in front of the final response are skipped.
//!
//! A response without the blank line that ends the header block is treated
//! as headers only, with an empty body.

use crate::fcm::FirebaseError;

/// Status, headers and body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ParsedResponse {
    /// First header with the given name, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser;

impl ResponseParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, raw: &[u8]) -> Result<ParsedResponse, FirebaseError> {
        if raw.is_empty() {
            return Err(FirebaseError::NoData);
        }

        let mut rest = raw;
        loop {
            let start = find_status_line(rest).ok_or_else(|| {
                FirebaseError::transport("network error: no HTTP status line in response")
            })?;
            rest = &rest[start..];

            let (status, reason) = parse_status_line(rest).ok_or_else(|| {
                FirebaseError::transport("network error: malformed HTTP status line")
            })?;

            let Some((head_end, body_start)) = find_header_end(rest) else {
                return Ok(ParsedResponse {
                    status,
                    headers: parse_headers(rest),
                    body: Vec::new(),
                });
            };

            let body = &rest[body_start..];
            let interim = status < 200 || reason.eq_ignore_ascii_case("connection established");
            if interim && find_status_line(body).is_some() {
                rest = body;
                continue;
            }

            return Ok(ParsedResponse {
                status,
                headers: parse_headers(&rest[..head_end]),
                body: body.to_vec(),
            });
        }
    }
}

/// Offset of the first line that starts a valid status line
fn find_status_line(bytes: &[u8]) -> Option<usize> {
    let mut offset = 0;
    while offset < bytes.len() {
        if bytes[offset..].starts_with(b"HTTP/") && parse_status_line(&bytes[offset..]).is_some() {
            return Some(offset);
        }
        match bytes[offset..].iter().position(|&b| b == b'\n') {
            Some(newline) => offset += newline + 1,
            None => break,
        }
    }
    None
}

/// Parse `HTTP/<version> <code> [reason]` at the start of `bytes`
fn parse_status_line(bytes: &[u8]) -> Option<(u16, String)> {
    let line_end = bytes.iter().position(|&b| b == b'\n').unwrap_or(bytes.len());
    let line = std::str::from_utf8(&bytes[..line_end]).ok()?.trim_end_matches('\r');

    let mut parts = line.splitn(3, ' ');
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    let code = parts.next()?;
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let status = code.parse().ok()?;
    let reason = parts.next().unwrap_or("").trim().to_string();
    Some((status, reason))
}

/// End of the header block and start of the body
fn find_header_end(bytes: &[u8]) -> Option<(usize, usize)> {
    let crlf = find(bytes, b"\r\n\r\n").map(|i| (i, i + 4));
    let lf = find(bytes, b"\n\n").map(|i| (i, i + 2));
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn parse_headers(head: &[u8]) -> Vec<(String, String)> {
    String::from_utf8_lossy(head)
        .lines()
        .skip(1)
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}
