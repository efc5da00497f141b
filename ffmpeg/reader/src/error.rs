use std::path::PathBuf;

use thiserror::Error;

/**
    Errors returned by [`VideoFileReader`](crate::VideoFileReader).

    End of stream is not an error: reads return `Ok(None)` instead.
*/
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("no media file is open")]
    NotOpen,

    #[error("a media file is already open, close it first")]
    AlreadyOpen,

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("no decodable video or audio stream in {}", .0.display())]
    NoDecodableStreams(PathBuf),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("seek failed: {0}")]
    Seek(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T, E = ReaderError> = std::result::Result<T, E>;

impl ReaderError {
    pub(crate) fn decode(error: impl std::fmt::Display) -> Self {
        Self::Decode(error.to_string())
    }

    pub(crate) fn seek(error: impl std::fmt::Display) -> Self {
        Self::Seek(error.to_string())
    }
}
