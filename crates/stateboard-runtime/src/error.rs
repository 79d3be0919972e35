use std::fmt;

/// Result type for stateboard-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Database/index layer error
    Index(stateboard_index::Error),

    /// Provider layer error
    Provider(stateboard_providers::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Index(err) => write!(f, "Index error: {}", err),
            Error::Provider(err) => write!(f, "Provider error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Index(err) => Some(err),
            Error::Provider(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_) => None,
        }
    }
}

impl From<stateboard_index::Error> for Error {
    fn from(err: stateboard_index::Error) -> Self {
        Error::Index(err)
    }
}

impl From<stateboard_providers::Error> for Error {
    fn from(err: stateboard_providers::Error) -> Self {
        Error::Provider(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_config_error_has_no_source() {
        let err = Error::Config("missing [database] table".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: missing [database] table"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_provider_error_is_wrapped() {
        let err: Error = stateboard_providers::Error::NotFound("prod.tfstate".to_string()).into();
        assert!(matches!(err, Error::Provider(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_toml_error_becomes_config_error() {
        let err: Error = toml::from_str::<toml::Table>("[database").unwrap_err().into();
        assert!(matches!(err, Error::Config(_)));
    }
}
