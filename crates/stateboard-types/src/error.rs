use std::fmt;

/// Error types that can occur in the types layer
#[derive(Debug)]
pub enum Error {
    /// An instance key that is neither absent, an integer, nor a string
    InvalidInstanceKey(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInstanceKey(raw) => write!(f, "Invalid instance key: {}", raw),
        }
    }
}

impl std::error::Error for Error {}
