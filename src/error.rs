//! Error types for the MyGeotab client.
//!
//! Callers can match on [`Error`] to tell configuration mistakes, server-side
//! faults, failed authentication and transport failures apart.

use std::fmt;
use thiserror::Error;

/// Fault name the server uses when a session (or a login) is not valid.
pub const INVALID_USER_EXCEPTION: &str = "InvalidUserException";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Credentials or configuration that can never produce a valid session.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A fault decoded from the `error` member of a response envelope.
    #[error("server fault: {0}")]
    Server(ServerFault),

    /// The server rejected the username/password (or session) during authentication.
    #[error(
        "cannot authenticate '{} @ {}/{}'",
        .username,
        .server,
        .database.as_deref().unwrap_or("")
    )]
    Authentication {
        username: String,
        database: Option<String>,
        server: String,
    },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Non-success HTTP status whose body carries no `error` member.
    #[error("API request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// The server fault carried by this error, if any.
    pub fn server_fault(&self) -> Option<&ServerFault> {
        match self {
            Error::Server(fault) => Some(fault),
            _ => None,
        }
    }

    /// True when this is a server fault reporting an invalid user or session.
    pub fn is_invalid_user(&self) -> bool {
        self.server_fault().is_some_and(ServerFault::is_invalid_user)
    }
}

/// A structured error raised by the MyGeotab server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerFault {
    /// Error kind, e.g. `InvalidUserException`.
    pub name: String,
    pub message: String,
    pub stack_trace: Option<String>,
    /// The undecoded `error` object as received.
    pub raw: serde_json::Value,
}

impl ServerFault {
    pub fn is_invalid_user(&self) -> bool {
        self.name == INVALID_USER_EXCEPTION
    }
}

impl fmt::Display for ServerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServerFault {}
