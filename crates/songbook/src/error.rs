use thiserror::Error;

use crate::types::error::ErrorData;

/// Errors raised by the song store, service, and client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("store error: {0}")]
    Store(String),

    #[cfg(feature = "client")]
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rpc error [{code}] {message}")]
    Rpc { code: i32, message: String },

    #[error("protocol error: {0}")]
    Protocol(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<&Error> for ErrorData {
    fn from(err: &Error) -> Self {
        match err {
            Error::InvalidParams(msg) => ErrorData::invalid_params(msg.clone()),
            Error::Rpc { code, message } => ErrorData::new(*code, message.clone()),
            other => ErrorData::internal_error(other.to_string()),
        }
    }
}

impl From<ErrorData> for Error {
    fn from(data: ErrorData) -> Self {
        Error::Rpc {
            code: data.code,
            message: data.message,
        }
    }
}
