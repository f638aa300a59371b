//! Bridge configuration errors.

use std::fmt;

/// Reasons a bridge address fails verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No address configured (empty string).
    MissingIdentifier,
    /// Address present but not in the six-group hex shape.
    MalformedIdentifier,
}

impl ErrorKind {
    /// Short machine-readable tag, used in the status snapshot and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingIdentifier => "missing_identifier",
            Self::MalformedIdentifier => "malformed_identifier",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIdentifier => write!(f, "RileyLink address invalid: no address"),
            Self::MalformedIdentifier => write!(
                f,
                "RileyLink address invalid: expected six hex groups like 00:11:22:aa:bb:cc"
            ),
        }
    }
}

impl std::error::Error for ErrorKind {}
