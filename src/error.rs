use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Invalid session construction: empty serial/host, partial credentials.
    Configuration(String),
    /// The device could not be reached: refused, timed out, DNS failure.
    Unreachable(reqwest::Error),
    Protocol(String),
    MalformedResponse(String),
    OutOfRange { value: f64, min: f64, max: f64 },
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Error::Unreachable(e) => write!(f, "device unreachable: {e}"),
            Error::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Error::MalformedResponse(msg) => write!(f, "malformed response: {msg}"),
            Error::OutOfRange { value, min, max } => {
                write!(f, "value out of range: {value} not in {min}..={max}")
            }
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Unreachable(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
