use std::fmt;

/// A structural error raised at the host boundary.
///
/// Structural errors cover missing or wrongly typed top-level arguments on
/// session construction, `check_request` and `reload_policy`. They are fatal
/// to the call: no partial request is built.
///
/// Content-level problems (a malformed purpose vector, obligation or trigger)
/// are never reported through this type; the offending unit is dropped with a
/// diagnostic log entry and processing continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    /// Creates a new structural error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}

/// The kind of structural error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required top-level argument was not supplied.
    MissingArgument,
    /// A top-level argument had the wrong type.
    BadType,
    /// The policy source could not be (re-)read while issuing an engine.
    PolicyLoad,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MissingArgument => write!(f, "missing argument"),
            ErrorKind::BadType => write!(f, "bad type argument"),
            ErrorKind::PolicyLoad => write!(f, "policy load failure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_kind_and_message() {
        let err = Error::new(ErrorKind::BadType, "policy file path must be a string");
        assert_eq!(
            err.to_string(),
            "bad type argument: policy file path must be a string"
        );
        assert_eq!(err.kind(), ErrorKind::BadType);
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        let err = Error::new(ErrorKind::MissingArgument, "argument missing");
        assert_error(&err);
    }
}
