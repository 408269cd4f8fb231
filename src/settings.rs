//! Connection settings.
//!
//! Settings are either built as a value or parsed from a connection string
//! of `key=value` pairs separated by `;`:
//!
//! ```
//! use irbis::{ConnectionSettings, Workstation};
//!
//! let settings: ConnectionSettings =
//!     "host=10.0.0.5;port=6666;user=librarian;pwd=secret;db=ISTU;arm=A".parse()?;
//! assert_eq!(settings.host, "10.0.0.5");
//! assert_eq!(settings.workstation, Workstation::Administrator);
//! # Ok::<(), irbis::IrbisError>(())
//! ```
//!
//! Recognized keys (case-insensitive): `host`/`server`/`address`, `port`,
//! `user`/`username`/`name`/`login`, `pwd`/`password`,
//! `db`/`catalog`/`database`, `arm`/`workstation`. Any other key is an error.

use crate::error::{IrbisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default server host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default server port.
pub const DEFAULT_PORT: u16 = 6666;
/// Default database.
pub const DEFAULT_DATABASE: &str = "IBIS";

/// Workstation kind the client announces in every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "char", into = "char")]
pub enum Workstation {
    /// `A`
    Administrator,
    /// `B`
    ReaderService,
    /// `C`
    #[default]
    Cataloger,
    /// `K`
    Acquisitions,
    /// `M`
    Circulation,
    /// `R`
    Reader,
    /// `X`
    Indexing,
    /// Any other single-letter code
    Other(char),
}

impl Workstation {
    /// The single-letter wire code.
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Workstation::Administrator => 'A',
            Workstation::ReaderService => 'B',
            Workstation::Cataloger => 'C',
            Workstation::Acquisitions => 'K',
            Workstation::Circulation => 'M',
            Workstation::Reader => 'R',
            Workstation::Indexing => 'X',
            Workstation::Other(code) => code,
        }
    }
}

impl From<char> for Workstation {
    fn from(code: char) -> Self {
        match code.to_ascii_uppercase() {
            'A' => Workstation::Administrator,
            'B' => Workstation::ReaderService,
            'C' => Workstation::Cataloger,
            'K' => Workstation::Acquisitions,
            'M' => Workstation::Circulation,
            'R' => Workstation::Reader,
            'X' => Workstation::Indexing,
            other => Workstation::Other(other),
        }
    }
}

impl From<Workstation> for char {
    fn from(workstation: Workstation) -> Self {
        workstation.code()
    }
}

/// Everything needed to reach and log in to a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Server host name or address
    pub host: String,
    /// Server port
    pub port: u16,
    /// User name
    pub username: String,
    /// Password
    pub password: String,
    /// Current database
    pub database: String,
    /// Workstation kind
    pub workstation: Workstation,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        ConnectionSettings {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            database: DEFAULT_DATABASE.to_string(),
            workstation: Workstation::default(),
        }
    }
}

impl ConnectionSettings {
    /// Settings for `host:port` with the given credentials and defaults otherwise.
    #[must_use]
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Self {
        ConnectionSettings {
            host: host.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
            ..ConnectionSettings::default()
        }
    }

    /// Replace the database
    #[must_use]
    pub fn with_database(mut self, database: &str) -> Self {
        self.database = database.to_string();
        self
    }

    /// Replace the workstation
    #[must_use]
    pub fn with_workstation(mut self, workstation: Workstation) -> Self {
        self.workstation = workstation;
        self
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key.to_ascii_lowercase().as_str() {
            "host" | "server" | "address" => self.host = value.to_string(),
            "port" => {
                self.port = value.parse().map_err(|_| {
                    IrbisError::InvalidSettings(format!("bad port: {value:?}"))
                })?;
            },
            "user" | "username" | "name" | "login" => self.username = value.to_string(),
            "pwd" | "password" => self.password = value.to_string(),
            "db" | "catalog" | "database" => self.database = value.to_string(),
            "arm" | "workstation" => {
                let mut chars = value.chars();
                self.workstation = match (chars.next(), chars.next()) {
                    (Some(code), None) => Workstation::from(code),
                    _ => {
                        return Err(IrbisError::InvalidSettings(format!(
                            "workstation must be one letter: {value:?}"
                        )))
                    },
                };
            },
            _ => {
                return Err(IrbisError::InvalidSettings(format!("unknown key: {key:?}")));
            },
        }
        Ok(())
    }
}

impl FromStr for ConnectionSettings {
    type Err = IrbisError;

    fn from_str(text: &str) -> Result<Self> {
        let mut settings = ConnectionSettings::default();
        for segment in text.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                IrbisError::InvalidSettings(format!("expected key=value, got {segment:?}"))
            })?;
            settings.apply(key.trim(), value.trim())?;
        }
        Ok(settings)
    }
}

impl fmt::Display for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "host={};port={};username={};password={};database={};workstation={};",
            self.host,
            self.port,
            self.username,
            self.password,
            self.database,
            self.workstation.code()
        )
    }
}
