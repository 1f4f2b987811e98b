//! Error type shared by the loader and the archive.
use std::fmt;

use saphyr_parser::{ScanError, Span};
use serde::{de, ser};

/// Position in the YAML text, counted from 1. Archive errors carry a path instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    pub(crate) row: u32,
    pub(crate) column: u32,
}

impl Location {
    /// No position is known.
    pub const UNKNOWN: Self = Self { row: 0, column: 0 };

    pub(crate) const fn new(row: usize, column: usize) -> Self {
        // Error reporting only; documents beyond 4G lines are not a concern.
        Self { row: row as u32, column: column as u32 }
    }

    pub fn line(&self) -> u64 {
        self.row as u64
    }

    pub fn column(&self) -> u64 {
        self.column as u64
    }
}

/// Start of a parser span.
pub(crate) fn location_from_span(span: &Span) -> Location {
    let start = &span.start;
    Location::new(start.line(), start.col() + 1)
}

/// Classification of failures raised while reading a tree into native values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The `<<` value is a scalar, null, or a sequence holding a non-mapping.
    MergeKeyType,
    /// A field has no matching key in the current scope.
    MissingEntry,
    /// A key is present but its node has the wrong shape for the field.
    TypeMismatch,
    /// A scope mapping holds a key that no field consumed.
    UnrecognizedKey,
    /// A scalar could not be converted to the field's type.
    InvalidScalar,
    /// A failure reported by the target type's own `Deserialize` implementation.
    Custom,
    /// The driver used the archive against its contract. Not caused by document data.
    InvariantViolation,
}

/// Error type for loading and reading YAML trees.
#[derive(Debug)]
pub enum Error {
    /// Loader failure or a message raised by a serde visitor.
    Message {
        msg: String,
        location: Location,
    },
    /// Alias references a non-existent (or still open) anchor id.
    UnknownAnchor {
        id: usize,
        location: Location,
    },
    /// A loader hardening limit was exceeded.
    Limit {
        msg: String,
        location: Location,
    },
    /// Read-archive failure; `msg` already carries the full field path.
    Archive {
        kind: ErrorKind,
        msg: String,
    },
}

impl Error {
    pub(crate) fn msg<S: Into<String>>(s: S) -> Self {
        Error::Message {
            msg: s.into(),
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn limit<S: Into<String>>(s: S, location: Location) -> Self {
        Error::Limit {
            msg: s.into(),
            location,
        }
    }

    pub(crate) fn archive(kind: ErrorKind, msg: String) -> Self {
        Error::Archive { kind, msg }
    }

    /// Set the location of a loader error; archive errors are left as they are.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::Message { location, .. }
            | Error::UnknownAnchor { location, .. }
            | Error::Limit { location, .. } => {
                *location = set_location;
            }
            Error::Archive { .. } => {} // paths replace locations here
        }
        self
    }

    /// Position in the YAML text, for errors raised while loading.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Message { location, .. }
            | Error::UnknownAnchor { location, .. }
            | Error::Limit { location, .. } => {
                if location != &Location::UNKNOWN {
                    Some(*location)
                } else {
                    None
                }
            }
            Error::Archive { .. } => None,
        }
    }

    /// Archive taxonomy of this error, `None` for loader errors.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Archive { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub(crate) fn from_scan_error(err: ScanError) -> Self {
        let mark = err.marker();
        let location = Location::new(mark.line(), mark.col() + 1);
        Error::Message {
            msg: err.info().to_owned(),
            location,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Message { msg, location } => fmt_with_location(f, msg, location),
            Error::UnknownAnchor { id, location } => {
                fmt_with_location(f, &format!("alias references unknown anchor id {id}"), location)
            }
            Error::Limit { msg, location } => {
                fmt_with_location(f, &format!("YAML limit exceeded: {msg}"), location)
            }
            Error::Archive { msg, .. } => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::msg(msg.to_string())
    }
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::msg(msg.to_string())
    }
}

fn fmt_with_location(f: &mut fmt::Formatter<'_>, msg: &str, location: &Location) -> fmt::Result {
    if location != &Location::UNKNOWN {
        write!(f, "{msg} at line {}, column {}", location.row, location.column)
    } else {
        write!(f, "{msg}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_is_appended_when_known() {
        let err = Error::msg("bad thing").with_location(Location::new(3, 7));
        assert_eq!(err.to_string(), "bad thing at line 3, column 7");
        assert_eq!(err.location().map(|l| (l.line(), l.column())), Some((3, 7)));
    }

    #[test]
    fn archive_errors_have_kind_and_no_location() {
        let err = Error::archive(ErrorKind::MissingEntry, "x is missing".into())
            .with_location(Location::new(1, 1));
        assert_eq!(err.kind(), Some(ErrorKind::MissingEntry));
        assert_eq!(err.location(), None);
        assert_eq!(err.to_string(), "x is missing");
    }
}
