//! Fixed allow-list of request headers the parser recognizes.
//!
//! Lines that start with one of these names, byte for byte, are matched structurally
//! (`Name: value\r\n`); everything else, including recognized names with a
//! malformed remainder, is skipped as an unknown header.

use crate::http::{scan, types::Span};

/// What to do with the value of a recognized header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderAction {
    /// Cache the lowercased first byte of the value.
    CacheConnection,
    /// Recognized and skipped without generic scanning.
    Ignore,
}

#[rustfmt::skip]
pub(crate) const HEADERS: [(&[u8], HeaderAction); 6] = [
    (b"Connection",        HeaderAction::CacheConnection),
    // No virtual hosting
    (b"Host",              HeaderAction::Ignore),
    (b"If-Modified-Since", HeaderAction::Ignore),
    (b"Range",             HeaderAction::Ignore),
    (b"Referer",           HeaderAction::Ignore),
    (b"Cookie",            HeaderAction::Ignore),
];

/// Fewer bytes than this left in the buffer ends header scanning.
pub(crate) const HEADER_MIN_LOOKAHEAD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderMatch {
    Matched {
        action: HeaderAction,
        value: Span,
        /// Index of the first byte of the next line.
        next: usize,
    },
    NotMatched,
}

/// Matches the line starting at `start` against the allow-list.
#[inline]
pub(crate) fn match_header(buf: &[u8], start: usize) -> HeaderMatch {
    let Some(line) = buf.get(start..) else {
        return HeaderMatch::NotMatched;
    };

    HEADERS
        .iter()
        .find(|(name, _)| line.starts_with(name))
        .map_or(HeaderMatch::NotMatched, |&(name, action)| {
            match_value(buf, start + name.len(), action)
        })
}

// `: ` + value + `\r\n`, starting right after the header name
#[inline]
fn match_value(buf: &[u8], after_name: usize, action: HeaderAction) -> HeaderMatch {
    if buf.get(after_name..after_name + 2) != Some(b": ") {
        return HeaderMatch::NotMatched;
    }

    let value_start = after_name + 2;
    let rest = &buf[value_start..];
    let Some(cr) = scan::find_cr(rest, rest.len()) else {
        return HeaderMatch::NotMatched;
    };

    let end = value_start + cr;
    if buf.get(end + 1) != Some(&b'\n') {
        return HeaderMatch::NotMatched;
    }

    HeaderMatch::Matched {
        action,
        value: Span::new(value_start, end),
        next: end + 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookahead_is_safe() {
        // Matching is bounds checked, the threshold only has to stay
        // below the shortest meaningful header line.
        for (name, _) in HEADERS {
            assert!(name.len() + 4 > HEADER_MIN_LOOKAHEAD);
        }
    }

    #[test]
    fn matched() {
        #[rustfmt::skip]
        let cases = [
            ("Connection: close\r\n",     HeaderAction::CacheConnection, "close"),
            ("Connection: KEEP-ALIVE\r\n", HeaderAction::CacheConnection, "KEEP-ALIVE"),
            ("Host: example.com\r\n",     HeaderAction::Ignore, "example.com"),
            ("If-Modified-Since: x\r\n",  HeaderAction::Ignore, "x"),
            ("Range: bytes=0-1\r\n",      HeaderAction::Ignore, "bytes=0-1"),
            ("Referer: /\r\n",            HeaderAction::Ignore, "/"),
            ("Cookie: a=b; c=d\r\n",      HeaderAction::Ignore, "a=b; c=d"),
            ("Host: \r\n",                HeaderAction::Ignore, ""),
        ];

        for (line, expected_action, expected_value) in cases {
            let buf = line.as_bytes();

            match match_header(buf, 0) {
                HeaderMatch::Matched {
                    action,
                    value,
                    next,
                } => {
                    assert_eq!(action, expected_action, "{line:?}");
                    assert_eq!(value.get(buf), expected_value.as_bytes(), "{line:?}");
                    assert_eq!(next, buf.len(), "{line:?}");
                }
                HeaderMatch::NotMatched => panic!("{line:?} did not match"),
            }
        }
    }

    #[test]
    fn not_matched() {
        #[rustfmt::skip]
        let cases = [
            "X-Custom: foo\r\n",
            "connection: close\r\n",
            "CONNECTION: close\r\n",
            "COOKIE: a=b\r\n",
            "host: example.com\r\n",
            "Connection:close\r\n",
            "Connection close\r\n",
            "Connection: close\n",
            "Connection: close\r",
            "Connection: close",
            "Connection",
            "Connections: close\r\n",
            "Hos",
            "",
        ];

        for line in cases {
            assert_eq!(match_header(line.as_bytes(), 0), HeaderMatch::NotMatched, "{line:?}");
        }
    }

    #[test]
    fn offset_start() {
        let buf = b"GET / HTTP/1.1\r\nHost: a\r\n\r\n";

        assert_eq!(
            match_header(buf, 16),
            HeaderMatch::Matched {
                action: HeaderAction::Ignore,
                value: Span::new(22, 23),
                next: 25,
            }
        );
        assert_eq!(match_header(buf, 100), HeaderMatch::NotMatched);
    }
}
