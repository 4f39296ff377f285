//! Bounded byte scanning primitives.
//!
//! Every function takes the buffer it scans and returns indices into it;
//! none of them reads past `buf.len()` or the explicit limit.

use memchr::memchr;

#[inline(always)]
const fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

/// Index of the first `\r` in `buf[..limit]`. `limit` is clamped to the
/// buffer length.
#[inline]
pub(crate) fn find_cr(buf: &[u8], limit: usize) -> Option<usize> {
    memchr(b'\r', &buf[..limit.min(buf.len())])
}

/// Index of the first `\n` in `buf`.
#[inline]
pub(crate) fn find_lf(buf: &[u8]) -> Option<usize> {
    memchr(b'\n', buf)
}

/// First index at or after `from` that is not space, tab, `\r` or `\n`.
/// Returns `buf.len()` when only whitespace remains.
#[inline]
pub(crate) fn skip_whitespace(buf: &[u8], from: usize) -> usize {
    buf.get(from..)
        .and_then(|rest| rest.iter().position(|&b| !is_whitespace(b)))
        .map_or(buf.len(), |offset| from + offset)
}
