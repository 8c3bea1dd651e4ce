//! Key file parsing.
//!
//! A key file holds one key per line. Each key is stored with its 1-based
//! line number, encoded as four little-endian bytes, so a lookup can be
//! traced back to the line that wrote it, which caps a key file at
//! [`u32::MAX`] lines.

use crate::error::{Error, Result};

/// Strips a trailing carriage return.
#[inline]
fn trim_line(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Yields `(line number, key)` for every non-empty line of `chunk`.
///
/// The last line does not need a terminating newline.
pub fn key_lines(chunk: &[u8]) -> impl Iterator<Item = (usize, &[u8])> + '_ {
    let mut start = 0;
    memchr::memchr_iter(b'\n', chunk)
        .map(move |end| {
            let line = &chunk[start..end];
            start = end + 1;
            line
        })
        .chain(tail(chunk))
        .zip(1usize..)
        .map(|(line, number)| (number, trim_line(line)))
        .filter(|(_, key)| !key.is_empty())
}

/// Bytes after the last newline, if any.
fn tail(chunk: &[u8]) -> Option<&[u8]> {
    let start = memchr::memrchr(b'\n', chunk).map_or(0, |index| index + 1);
    (start < chunk.len()).then(|| &chunk[start..])
}

/// Narrows a line number to the stored width.
#[inline]
pub fn line_number(line: usize) -> Result<u32> {
    u32::try_from(line).map_err(|_| Error::LineLimit)
}

#[inline]
pub fn encode_line(line: u32) -> [u8; 4] {
    line.to_le_bytes()
}

/// Reads back a line number stored by [`encode_line`].
#[inline]
pub fn decode_line(value: &[u8]) -> Option<u32> {
    value.try_into().ok().map(u32::from_le_bytes)
}
