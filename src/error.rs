use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by profile and credential lookups.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to read profile source '{location}': {source}")]
    SourceUnreadable {
        location: String,
        #[source]
        source: SourceError,
    },

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("incomplete credentials, missing access key and/or secret key")]
    IncompleteCredentials,

    #[error("unsupported credential type: {0}")]
    UnsupportedCredentialInput(String),

    #[error("no credentials provided")]
    MissingCredentialInput,

    #[error("profile document has no file path to save to")]
    NoSavePath,

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Underlying cause of an unreadable profile source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("content is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),

    #[error("invalid INI data: {0}")]
    Parse(#[from] ini::ParseError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("HTTP response code {0}")]
    HttpStatus(u16),

    #[error("url scheme '{0}' not supported")]
    UnsupportedScheme(String),
}

impl Error {
    pub(crate) fn unreadable(location: impl Into<String>, source: impl Into<SourceError>) -> Self {
        Self::SourceUnreadable {
            location: location.into(),
            source: source.into(),
        }
    }
}
