use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fmt;

/// Server used when none is configured.
pub const DEFAULT_SERVER: &str = "my.geotab.com";

/// Authentication state for a MyGeotab user.
///
/// A `Credentials` value never changes once built. When the server issues a new
/// session the client swaps in a fresh instance instead.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: Option<String>,
    database: Option<String>,
    session_id: Option<String>,
    server: String,
}

impl Credentials {
    /// Build and validate credentials.
    ///
    /// Fails with [`Error::Configuration`] when the username is empty or when
    /// neither a password nor a session id is given.
    pub fn new(
        username: impl Into<String>,
        password: Option<String>,
        database: Option<String>,
        session_id: Option<String>,
        server: Option<String>,
    ) -> Result<Self> {
        let credentials = Self {
            username: username.into(),
            password: non_empty_secret(password),
            database: non_empty(database),
            session_id: non_empty_secret(session_id),
            server: non_empty(server).unwrap_or_else(|| DEFAULT_SERVER.to_string()),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Credentials that will log in with a password on first use.
    pub fn with_password(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Self::new(username, Some(password.into()), None, None, None)
    }

    /// Credentials restored from an existing session.
    pub fn with_session(
        username: impl Into<String>,
        session_id: impl Into<String>,
        database: impl Into<String>,
        server: impl Into<String>,
    ) -> Result<Self> {
        Self::new(
            username,
            None,
            Some(database.into()),
            Some(session_id.into()),
            Some(server.into()),
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::Configuration("A username is required".to_string()));
        }
        if self.password.is_none() && self.session_id.is_none() {
            return Err(Error::Configuration(
                "Either a password or a session id is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Same user and password, different database.
    pub fn in_database(mut self, database: impl Into<String>) -> Self {
        self.database = non_empty(Some(database.into()));
        self
    }

    /// Same user and password, different server.
    pub fn on_server(mut self, server: impl Into<String>) -> Self {
        self.server = non_empty(Some(server.into())).unwrap_or_else(|| DEFAULT_SERVER.to_string());
        self
    }

    /// Credentials for a session the server just issued.
    ///
    /// The password is carried over so the session can be renewed later.
    pub(crate) fn renewed(
        &self,
        username: String,
        session_id: String,
        database: Option<String>,
        server: String,
    ) -> Self {
        Self {
            username,
            password: self.password.clone(),
            database: non_empty(database),
            session_id: non_empty_secret(Some(session_id)),
            server,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn is_authenticated(&self) -> bool {
        self.session_id.is_some()
    }

    /// Render as the `credentials` parameter attached to every call.
    pub fn as_params(&self) -> Value {
        let mut params = Map::new();
        params.insert("userName".to_string(), Value::String(self.username.clone()));
        if let Some(database) = &self.database {
            params.insert("database".to_string(), Value::String(database.clone()));
        }
        if let Some(session_id) = &self.session_id {
            params.insert("sessionId".to_string(), Value::String(session_id.clone()));
        }
        Value::Object(params)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("database", &self.database)
            .field("session_id", &self.session_id.as_ref().map(|_| "[REDACTED]"))
            .field("server", &self.server)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Secrets are taken verbatim; only a truly empty value counts as missing.
fn non_empty_secret(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
