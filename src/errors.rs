//! Error types for the cluster command line tool

use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    /// Connection or transport failure
    Network(reqwest::Error),

    /// Remote answered with something other than 200
    HttpStatus { url: String, status: u16 },

    /// Malformed JSON or a document that does not match the expected shape
    Decode { url: String, source: serde_json::Error },

    /// A base URL could not be parsed or carries no host
    UrlParse(String),

    /// Filesystem operation on the cache failed
    Io(std::io::Error),

    /// Report could not be written to the output
    Output(std::io::Error),

    /// Cache record could not be serialized
    Encode(serde_json::Error),

    /// No cache record on disk
    CacheMissing(PathBuf),

    /// Unknown service names were requested
    Validation { unknown: Vec<String>, known: Vec<String> },

    /// Configuration error
    Config(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Network(err) => write!(f, "Network error: {}", err),
            CliError::HttpStatus { url, status } => {
                write!(f, "Bad (!= 200) status code {} from {}", status, url)
            }
            CliError::Decode { url, source } => {
                write!(f, "Could not decode response from {}: {}", url, source)
            }
            CliError::UrlParse(msg) => write!(f, "Invalid URL: {}", msg),
            CliError::Io(err) => write!(f, "Cache IO error: {}", err),
            CliError::Output(err) => write!(f, "Could not write output: {}", err),
            CliError::Encode(err) => write!(f, "Could not encode cache record: {}", err),
            CliError::CacheMissing(path) => write!(f, "No cache file at {}", path.display()),
            CliError::Validation { unknown, known } => write!(
                f,
                "Unknown service(s): {} (known services: {})",
                unknown.join(", "),
                known.join(", ")
            ),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Network(err) => Some(err),
            CliError::Decode { source, .. } => Some(source),
            CliError::Io(err) => Some(err),
            CliError::Output(err) => Some(err),
            CliError::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        CliError::Network(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Encode(err)
    }
}

impl From<url::ParseError> for CliError {
    fn from(err: url::ParseError) -> Self {
        CliError::UrlParse(err.to_string())
    }
}
