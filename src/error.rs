// Error types shared by the library modules. The binary wraps these in
// `anyhow` so every fatal error ends up printed with its context chain.

use std::path::PathBuf;
use thiserror::Error;

use crate::page::ScrapeError;

pub type Result<T> = std::result::Result<T, PandaError>;

#[derive(Error, Debug)]
pub enum PandaError {
    /// CAS did not answer with the expected redirect chain.
    #[error("login failed. Is ecs-id or password correct?")]
    LoginFailed,

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error("request to '{url}' failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned {status} for '{url}'")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("unexpected response shape for {what}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("file operation failed on '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("COOKIE_FILE cannot open. use -c to set correct cookie file. ({path})")]
    CookieFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cookie string contains no key=value pair")]
    EmptyCookie,
}

impl PandaError {
    pub(crate) fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        PandaError::Http {
            url: url.into(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PandaError::Io {
            path: path.into(),
            source,
        }
    }
}
