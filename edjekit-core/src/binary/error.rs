use std::fmt::{self, Display};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("deserialization error")]
    Deserialize,
    #[error("serialization error")]
    Serialize,
}

impl ErrorKind {
    pub fn make(self, message: impl Into<String>) -> Error {
        Error {
            kind: self,
            context_stack: vec![message.into()],
        }
    }
}

/// Binary (de)serialization error.
///
/// Carries the innermost failure message followed by every context frame pushed while the error
/// travelled outwards, so that a failure deep inside a nested structure still says which field of
/// which record it happened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    context_stack: Vec<String>,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The innermost (original) failure message.
    pub fn root_message(&self) -> &str {
        self.context_stack.first().map(|s| s.as_str()).unwrap_or("")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for (i, context) in self.context_stack.iter().rev().enumerate() {
            write!(f, "\n{i:5}: {context}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

pub trait ResultContextExt {
    fn context(self, text: &str) -> Self;
    fn with_context(self, text: impl FnOnce() -> String) -> Self;
}

impl<T> ResultContextExt for Result<T, Error> {
    fn context(self, text: &str) -> Self {
        self.with_context(|| text.to_string())
    }

    fn with_context(self, text: impl FnOnce() -> String) -> Self {
        self.map_err(|mut error| {
            error.context_stack.push(text());
            error
        })
    }
}

pub trait ResultMapToBinaryErrorExt<T> {
    fn map_err_to_binary_error(self, kind: ErrorKind) -> Result<T, Error>;
}

impl<T, E> ResultMapToBinaryErrorExt<T> for Result<T, E>
where
    E: Display,
{
    fn map_err_to_binary_error(self, kind: ErrorKind) -> Result<T, Error> {
        self.map_err(|error| kind.make(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, ResultContextExt};

    #[test]
    fn context_frames_are_printed_outermost_first() {
        let result: Result<(), _> = Err(ErrorKind::Deserialize.make("unexpected end of file"));
        let error = result
            .context("cannot read array length")
            .context("cannot deserialize field Directory::images")
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Deserialize);
        assert_eq!(error.root_message(), "unexpected end of file");
        assert_eq!(
            error.to_string(),
            "deserialization error\n    0: cannot deserialize field Directory::images\n    1: cannot read array length\n    2: unexpected end of file"
        );
    }
}
