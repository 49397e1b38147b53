use emotes_core::ModelError;
use thiserror::Error;

/// Malformed or unsendable wire data.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("not enough data: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },
    #[error("negative length prefix: {0}")]
    NegativeLength(i32),
    #[error("string field is not valid utf-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("unknown transfer purpose id: {0}")]
    UnknownPurpose(u8),
    #[error("unsupported protocol version {found}, newest known is {supported}")]
    UnsupportedProtocol { found: u8, supported: u8 },
    #[error("too many {what} for one packet: {count}")]
    TooMany { what: &'static str, count: usize },
    #[error("packet needs {0} in the transfer context")]
    MissingData(&'static str),
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, NetworkError>;
