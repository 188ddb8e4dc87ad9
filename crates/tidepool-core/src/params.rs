//! Connection parameters handed to a connector

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Parameters describing where and how to connect.
///
/// These are opaque to the pool: they are passed through untouched to
/// [`Connector::connect`](crate::Connector::connect).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectParams {
    /// Host address
    pub host: String,
    /// Port number (0 lets the connector pick its default)
    pub port: u16,
    /// Target database name
    pub database: Option<String>,
    /// Username
    pub username: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Additional driver-specific options
    pub options: HashMap<String, String>,
}

impl ConnectParams {
    /// Create parameters for the given host and port
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            ..Default::default()
        }
    }

    /// Create parameters for a PostgreSQL server
    pub fn postgres(host: &str, port: u16, database: &str, username: &str) -> Self {
        Self::new(host, port)
            .with_database(database)
            .with_username(username)
    }

    /// Set the target database
    pub fn with_database(mut self, database: &str) -> Self {
        self.database = Some(database.to_string());
        self
    }

    /// Set the username
    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Set a driver-specific option
    pub fn with_option(mut self, key: &str, value: &str) -> Self {
        self.options.insert(key.to_string(), value.to_string());
        self
    }

    /// Get a driver-specific option
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// `host:port/database`, without credentials, for logs
    pub fn address(&self) -> String {
        match &self.database {
            Some(db) => format!("{}:{}/{}", self.host, self.port, db),
            None => format!("{}:{}", self.host, self.port),
        }
    }
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("options", &self.options)
            .finish()
    }
}
