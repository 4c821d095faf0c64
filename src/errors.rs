//! Error types for engine setup.
//!
//! Rewriting itself never fails: a rule that cannot prove its
//! preconditions declines, and a run that does not converge reports a
//! status. Only configuration problems surface here.

use std::error::Error as StdError;

use derive_more::{Display, From};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Display, Debug, From)]
#[display("{kind}")]
pub struct Error {
    #[from]
    kind: Box<ErrorKind>,
}

impl<E> From<E> for Error
where
    ErrorKind: From<E>,
{
    fn from(error: E) -> Self {
        Error {
            kind: Box::new(ErrorKind::from(error)),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.kind.source()
    }
}

impl Error {
    pub(crate) fn unknown_rule(name: impl Into<String>) -> Self {
        ErrorKind::UnknownRule(name.into()).into()
    }

    pub(crate) fn invalid_config(msg: impl std::fmt::Display) -> Self {
        ErrorKind::InvalidConfig(msg.to_string()).into()
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

#[derive(Display, Debug, derive_more::Error)]
pub enum ErrorKind {
    #[display("Unknown rule: {_0}")]
    UnknownRule(#[error(not(source))] String),

    #[display("Invalid configuration: {_0}")]
    InvalidConfig(#[error(not(source))] String),

    #[display("Malformed JSON: {_0}")]
    Json(serde_json::Error),
}

impl From<serde_json::Error> for ErrorKind {
    fn from(error: serde_json::Error) -> Self {
        ErrorKind::Json(error)
    }
}
