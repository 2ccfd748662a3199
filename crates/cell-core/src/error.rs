use crate::binder::BindError;
use crate::context::ContextError;
use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Context(#[from] ContextError),
    /// Failure raised by a language frontend, kept opaque at this level
    #[error("{0}")]
    Frontend(Box<dyn std::error::Error + Send + Sync>),
    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
    pub fn frontend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Frontend(Box::new(err))
    }
}

impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Generic(e.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Generic(e.to_string())
    }
}
