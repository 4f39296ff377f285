use crate::StatusCode;
use std::{error, fmt, io};

/// Every way a single request can end early.
///
/// The boundary with the caller is "which canned response to send", so the
/// only thing most code needs is [`ErrorKind::status`].
#[derive(Debug, PartialEq)]
pub(crate) enum ErrorKind {
    /// The peer closed the connection before sending anything.
    Closed,
    Io(IoError),

    EmptyRequest,
    InvalidMethod,
    InvalidRequestLine,
    UnsupportedVersion,
    InvalidUrl,

    TooLarge,
    NotFound,
}

impl ErrorKind {
    /// Status of the default response for this failure, or `None` when no
    /// response must be attempted.
    #[inline]
    pub(crate) const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Closed | Self::Io(_) => None,

            Self::EmptyRequest
            | Self::InvalidRequestLine
            | Self::UnsupportedVersion
            | Self::InvalidUrl => Some(StatusCode::BadRequest),
            Self::InvalidMethod => Some(StatusCode::MethodNotAllowed),

            Self::TooLarge => Some(StatusCode::PayloadTooLarge),
            Self::NotFound => Some(StatusCode::NotFound),
        }
    }
}

impl error::Error for ErrorKind {}
impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status() {
            Some(status) => write!(f, "{:?} ({} {})", self, status.as_u16(), status.reason()),
            None => write!(f, "{:?}", self),
        }
    }
}

impl From<io::Error> for ErrorKind {
    fn from(err: io::Error) -> Self {
        ErrorKind::Io(IoError(err))
    }
}

#[derive(Debug)]
pub(crate) struct IoError(pub(crate) io::Error);

impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        #[rustfmt::skip]
        let cases = [
            (ErrorKind::Closed,             None),
            (io::Error::from(io::ErrorKind::ConnectionReset).into(), None),
            (ErrorKind::EmptyRequest,       Some(StatusCode::BadRequest)),
            (ErrorKind::InvalidMethod,      Some(StatusCode::MethodNotAllowed)),
            (ErrorKind::InvalidRequestLine, Some(StatusCode::BadRequest)),
            (ErrorKind::UnsupportedVersion, Some(StatusCode::BadRequest)),
            (ErrorKind::InvalidUrl,         Some(StatusCode::BadRequest)),
            (ErrorKind::TooLarge,           Some(StatusCode::PayloadTooLarge)),
            (ErrorKind::NotFound,           Some(StatusCode::NotFound)),
        ];

        for (kind, expected) in cases {
            assert_eq!(kind.status(), expected);
        }
    }

    #[test]
    fn display() {
        assert_eq!(ErrorKind::NotFound.to_string(), "NotFound (404 Not Found)");
        assert_eq!(ErrorKind::Closed.to_string(), "Closed");
    }
}
