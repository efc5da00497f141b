/*!
    Error types shared by the ffmpeg reader crates.
*/

use std::fmt;

use crate::StreamType;

/**
    Error type shared by the source, decode and transform crates.
*/
#[derive(Debug)]
pub enum Error {
    /// I/O error (file not found, permission denied, etc.)
    Io(std::io::Error),
    /// Codec error (decoder could not be created or failed on a packet)
    Codec { message: String },
    /// Invalid data (malformed packet or frame buffer)
    InvalidData { message: String },
    /// Unsupported format (valid media, but not something we can handle)
    UnsupportedFormat { message: String },
    /// The container has no stream of the requested type
    StreamNotFound { stream_type: StreamType },
    /// The container refused to seek
    Seek { message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Codec { message } => write!(f, "codec error: {message}"),
            Self::InvalidData { message } => write!(f, "invalid data: {message}"),
            Self::UnsupportedFormat { message } => write!(f, "unsupported format: {message}"),
            Self::StreamNotFound { stream_type } => {
                write!(f, "no {} stream found", stream_type.name())
            }
            Self::Seek { message } => write!(f, "seek failed: {message}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl Error {
    /**
        Create a codec error with the given message.
    */
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /**
        Create an invalid data error with the given message.
    */
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /**
        Create an unsupported format error with the given message.
    */
    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    /**
        Create a seek error with the given message.
    */
    pub fn seek(message: impl Into<String>) -> Self {
        Self::Seek {
            message: message.into(),
        }
    }

    /**
        Returns true if this error means the input file does not exist.
    */
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/**
    Result type alias for the ffmpeg reader crates.
*/
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn error_display() {
        let e = Error::codec("send_packet failed");
        assert_eq!(format!("{e}"), "codec error: send_packet failed");

        let e = Error::invalid_data("short frame buffer");
        assert_eq!(format!("{e}"), "invalid data: short frame buffer");

        let e = Error::unsupported_format("pixel format p010");
        assert_eq!(format!("{e}"), "unsupported format: pixel format p010");

        let e = Error::seek("operation not permitted");
        assert_eq!(format!("{e}"), "seek failed: operation not permitted");
    }

    #[test]
    fn stream_not_found_names_the_stream() {
        let e = Error::StreamNotFound {
            stream_type: StreamType::Video,
        };
        assert_eq!(format!("{e}"), "no video stream found");
    }

    #[test]
    fn not_found_detection() {
        let missing: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(missing.is_not_found());

        let denied: Error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
        assert!(!denied.is_not_found());
        assert!(!Error::codec("test").is_not_found());
    }

    #[test]
    fn error_source() {
        let e = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "test"));
        assert!(StdError::source(&e).is_some());
        assert!(StdError::source(&Error::seek("x")).is_none());
    }
}
