//! Client session with an IRBIS64 server.
//!
//! A [`Connection`] starts disconnected. [`Connection::connect`] registers a
//! random client id with the server and logs in; every later command is one
//! request/reply round trip carrying that id and a growing query id.
//! [`Connection::disconnect`] logs out, and dropping a connected client does
//! the same.
//!
//! Commands never surface transport details. I/O problems come back as
//! [`IrbisError::Network`], negative return codes as [`IrbisError::Server`],
//! and the numeric form of the last outcome is kept in
//! [`Connection::last_error`]. A failed command leaves the session connected.
//!
//! Every round trip takes `&mut self`, so one connection never has two
//! requests in flight. Share a connection between threads behind a `Mutex`.
//!
//! # Examples
//!
//! ```no_run
//! use irbis::{Connection, ConnectionSettings};
//!
//! let settings: ConnectionSettings = "host=127.0.0.1;user=librarian;pwd=secret;db=IBIS".parse()?;
//! let mut connection = Connection::new(settings);
//! connection.connect()?;
//!
//! let max_mfn = connection.get_max_mfn()?;
//! for mfn in connection.search("K=ALGEBRA$")? {
//!     println!("{}", connection.format_record("@brief", mfn)?);
//! }
//! # let _ = max_mfn;
//! connection.disconnect();
//! # Ok::<(), irbis::IrbisError>(())
//! ```

use crate::error::{IrbisError, Result, CLIENT_ALREADY_EXISTS, NO_ERROR};
use crate::query::{Query, QueryHeader};
use crate::record::{Record, RecordStatus, IRBIS_DELIMITER, SHORT_DELIMITER};
use crate::response::Response;
use crate::settings::ConnectionSettings;
use crate::transport::{exchange, TcpTransport, Transport};
use log::{debug, info, warn};
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

/// Command codes.
pub mod commands {
    /// Register the client and log in.
    pub const REGISTER_CLIENT: &str = "A";
    /// Log out.
    pub const UNREGISTER_CLIENT: &str = "B";
    /// Read one record.
    pub const READ_RECORD: &str = "C";
    /// Create or update one record.
    pub const UPDATE_RECORD: &str = "D";
    /// Actualize one record.
    pub const ACTUALIZE_RECORD: &str = "F";
    /// Format records.
    pub const FORMAT_RECORD: &str = "G";
    /// Read dictionary terms.
    pub const READ_TERMS: &str = "H";
    /// Search.
    pub const SEARCH: &str = "K";
    /// Read a text file.
    pub const READ_DOCUMENT: &str = "L";
    /// Keep-alive.
    pub const NOP: &str = "N";
    /// Get the max MFN of a database.
    pub const GET_MAX_MFN: &str = "O";
    /// Get the server version.
    pub const SERVER_INFO: &str = "1";
}

/// Lower bound of generated client ids.
pub const CLIENT_ID_MIN: u32 = 100_000;
/// Upper bound of generated client ids.
pub const CLIENT_ID_MAX: u32 = 999_999;
/// How many client ids a login tries before giving up.
pub const MAX_LOGIN_ATTEMPTS: usize = 256;
/// MFN placeholder that makes the server format a record sent with the request.
const VIRTUAL_RECORD_MFN: i64 = -2;
/// The server returns at most this many found records per request.
const MAX_SEARCH_BATCH: u32 = 32_000;

/// Soft return codes of a record read: missing, deleted or locked records.
pub const READ_RECORD_CODES: &[i32] = &[-201, -600, -602, -603];
/// Soft return codes of a term read: the start term or the list ended.
pub const READ_TERMS_CODES: &[i32] = &[-202, -203, -204];

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundLine {
    /// Record MFN
    pub mfn: u32,
    /// Formatted description, if a format was requested
    pub description: String,
}

impl FoundLine {
    /// Parse `mfn#description`.
    ///
    /// # Errors
    ///
    /// Returns `IrbisError::MalformedResponse` if the MFN is not a number.
    pub fn parse(line: &str) -> Result<Self> {
        let (mfn, description) = line.split_once('#').unwrap_or((line, ""));
        let mfn = mfn.trim().parse().map_err(|_| {
            IrbisError::MalformedResponse(format!("bad found line: {line:?}"))
        })?;
        Ok(FoundLine {
            mfn,
            description: description.to_string(),
        })
    }
}

/// One dictionary term with its posting count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermInfo {
    /// Number of postings
    pub count: u32,
    /// Term text
    pub text: String,
}

impl TermInfo {
    /// Parse `count#text`.
    ///
    /// # Errors
    ///
    /// Returns `IrbisError::MalformedResponse` if the count is not a number.
    pub fn parse(line: &str) -> Result<Self> {
        let (count, text) = line.split_once('#').unwrap_or((line, ""));
        let count = count.trim().parse().map_err(|_| {
            IrbisError::MalformedResponse(format!("bad term line: {line:?}"))
        })?;
        Ok(TermInfo {
            count,
            text: text.to_string(),
        })
    }
}

/// Server version and licensing details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerVersion {
    /// Licensed organization; empty when not reported
    pub organization: String,
    /// Version string
    pub version: String,
    /// Clients currently connected
    pub connected_clients: u32,
    /// Clients allowed by the license
    pub max_clients: u32,
}

impl ServerVersion {
    /// Parse the reply lines: `[organization,] version, connected, max`.
    ///
    /// # Errors
    ///
    /// Returns `IrbisError::MalformedResponse` for any other line count or a
    /// non-numeric client count.
    pub fn parse(lines: &[String]) -> Result<Self> {
        let (organization, rest) = match lines.len() {
            3 => ("", lines),
            4 => (lines[0].as_str(), &lines[1..]),
            count => {
                return Err(IrbisError::MalformedResponse(format!(
                    "server version reply has {count} lines"
                )))
            },
        };
        let number = |text: &str| -> Result<u32> {
            text.trim().parse().map_err(|_| {
                IrbisError::MalformedResponse(format!("bad client count: {text:?}"))
            })
        };
        Ok(ServerVersion {
            organization: organization.to_string(),
            version: rest[0].clone(),
            connected_clients: number(&rest[1])?,
            max_clients: number(&rest[2])?,
        })
    }
}

/// Parameters of a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    /// Search expression
    pub expression: String,
    /// How many hits to return, 0 for as many as the server allows
    pub number_of_records: u32,
    /// 1-based index of the first hit to return
    pub first_record: u32,
    /// Format for the hit descriptions; empty for none
    pub format: String,
    /// Lowest MFN for a sequential search, 0 for none
    pub min_mfn: u32,
    /// Highest MFN for a sequential search, 0 for none
    pub max_mfn: u32,
    /// Sequential search expression; empty for none
    pub sequential: String,
}

impl SearchParameters {
    /// Parameters returning every hit of `expression` without descriptions.
    #[must_use]
    pub fn new(expression: &str) -> Self {
        SearchParameters {
            expression: expression.to_string(),
            number_of_records: 0,
            first_record: 1,
            format: String::new(),
            min_mfn: 0,
            max_mfn: 0,
            sequential: String::new(),
        }
    }

    /// Request descriptions formatted with `format`.
    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = format.to_string();
        self
    }
}

/// Source of client ids, replaceable for deterministic tests.
pub type ClientIdSource = Box<dyn FnMut() -> u32 + Send>;

/// A client id in `CLIENT_ID_MIN..=CLIENT_ID_MAX` drawn from the
/// randomly keyed std hasher.
#[must_use]
pub fn random_client_id() -> u32 {
    let mut hasher = RandomState::new().build_hasher();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    hasher.write_u128(nanos);
    let span = u64::from(CLIENT_ID_MAX - CLIENT_ID_MIN + 1);
    // The remainder is below `span`, which fits in u32.
    CLIENT_ID_MIN + u32::try_from(hasher.finish() % span).unwrap_or(0)
}

/// A session with one server.
pub struct Connection<T: Transport = TcpTransport> {
    settings: ConnectionSettings,
    transport: T,
    id_source: ClientIdSource,
    client_id: u32,
    query_id: u32,
    connected: bool,
    server_version: String,
    interval: i32,
    ini_lines: Vec<String>,
    last_error: i32,
}

impl Connection<TcpTransport> {
    /// A disconnected client talking TCP.
    #[must_use]
    pub fn new(settings: ConnectionSettings) -> Self {
        Connection::with_transport(settings, TcpTransport::new())
    }
}

impl<T: Transport> Connection<T> {
    /// A disconnected client using `transport`.
    pub fn with_transport(settings: ConnectionSettings, transport: T) -> Self {
        Connection {
            settings,
            transport,
            id_source: Box::new(random_client_id),
            client_id: 0,
            query_id: 0,
            connected: false,
            server_version: String::new(),
            interval: 0,
            ini_lines: Vec::new(),
            last_error: NO_ERROR,
        }
    }

    /// Replace the client id source.
    #[must_use]
    pub fn with_client_id_source(mut self, source: impl FnMut() -> u32 + Send + 'static) -> Self {
        self.id_source = Box::new(source);
        self
    }

    /// The settings this client logs in with.
    #[must_use]
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// The current database
    #[must_use]
    pub fn database(&self) -> &str {
        &self.settings.database
    }

    /// Switch the current database
    pub fn set_database(&mut self, database: &str) {
        self.settings.database = database.to_string();
    }

    /// True between a successful login and the logout.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Client id registered with the server; 0 before the first login.
    #[must_use]
    pub fn client_id(&self) -> u32 {
        self.client_id
    }

    /// Id of the last request sent.
    #[must_use]
    pub fn query_id(&self) -> u32 {
        self.query_id
    }

    /// Server version reported at login.
    #[must_use]
    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// Keep-alive interval in minutes reported at login.
    #[must_use]
    pub fn interval(&self) -> i32 {
        self.interval
    }

    /// Client configuration lines the server sent at login.
    #[must_use]
    pub fn ini_lines(&self) -> &[String] {
        &self.ini_lines
    }

    /// Outcome of the last operation: 0, a server return code, or one of
    /// the client-side pseudo codes.
    #[must_use]
    pub fn last_error(&self) -> i32 {
        self.last_error
    }

    /// The transport, for inspection.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Log in. Does nothing if already connected.
    ///
    /// A client id the server already knows is replaced by a fresh one and
    /// the login is repeated, up to [`MAX_LOGIN_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// Returns `IrbisError::Network` if the server cannot be reached and
    /// `IrbisError::Server` if it rejects the login. The client stays
    /// disconnected.
    pub fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Ok(());
        }

        let mut result = Err(IrbisError::Server(CLIENT_ALREADY_EXISTS));
        for attempt in 1..=MAX_LOGIN_ATTEMPTS {
            self.client_id = (self.id_source)();
            self.query_id = 0;
            result = self.login();
            match result {
                Err(IrbisError::Server(CLIENT_ALREADY_EXISTS)) => {
                    warn!(
                        "client id {} is taken, retrying (attempt {attempt})",
                        self.client_id
                    );
                },
                _ => break,
            }
        }

        if result.is_ok() {
            self.connected = true;
            info!(
                "connected to {}:{} as client {} (server {})",
                self.settings.host, self.settings.port, self.client_id, self.server_version
            );
        }
        self.track(result)
    }

    fn login(&mut self) -> Result<()> {
        let mut query = self.new_query(commands::REGISTER_CLIENT);
        query
            .add_ansi(&self.settings.username)
            .add_ansi(&self.settings.password);

        let mut response = self.round_trip(&query)?;
        response.check_return_code(&[])?;
        self.server_version = response.server_version().to_string();
        self.interval = response.read_int()?;
        self.ini_lines = response.remaining_ansi_lines();
        Ok(())
    }

    /// Log out. Always leaves the client disconnected.
    ///
    /// A failed logout is logged and otherwise ignored.
    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }

        let mut query = self.new_query(commands::UNREGISTER_CLIENT);
        query.add_ansi(&self.settings.username);
        if let Err(error) = self.round_trip(&query) {
            warn!("logout of client {} failed: {error}", self.client_id);
        }

        self.connected = false;
        self.last_error = NO_ERROR;
        info!(
            "disconnected from {}:{}",
            self.settings.host, self.settings.port
        );
    }

    /// Start a request for `command` with the next query id.
    pub fn new_query(&mut self, command: &str) -> Query {
        self.query_id += 1;
        let header = QueryHeader {
            workstation: self.settings.workstation.code(),
            client_id: self.client_id,
            query_id: self.query_id,
            username: &self.settings.username,
            password: &self.settings.password,
        };
        Query::new(command, &header)
    }

    /// Send `query` and return the reply without looking at its return code.
    ///
    /// # Errors
    ///
    /// Returns `IrbisError::NotConnected` before login, `IrbisError::Network`
    /// if the exchange fails, and `IrbisError::MalformedResponse` if the reply
    /// header is damaged.
    pub fn execute(&mut self, query: &Query) -> Result<Response> {
        let result = if self.connected {
            self.round_trip(query)
        } else {
            Err(IrbisError::NotConnected)
        };
        self.track(result)
    }

    /// Send `query` and check the return code, accepting negative codes in `allowed`.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus `IrbisError::Server` for a
    /// negative return code not in `allowed`.
    pub fn execute_checked(&mut self, query: &Query, allowed: &[i32]) -> Result<Response> {
        let result = self.execute(query).and_then(|mut response| {
            response.check_return_code(allowed)?;
            Ok(response)
        });
        self.track(result)
    }

    fn round_trip(&mut self, query: &Query) -> Result<Response> {
        let packet = query.encode();
        debug!(
            "command {} query {} sends {} bytes",
            query.command(),
            self.query_id,
            packet.len()
        );

        let reply = exchange(
            &mut self.transport,
            &self.settings.host,
            self.settings.port,
            &packet,
        )
        .map_err(|error| {
            warn!(
                "command {} to {}:{} failed: {error}",
                query.command(),
                self.settings.host,
                self.settings.port
            );
            IrbisError::Network
        })?;

        debug!("command {} received {} bytes", query.command(), reply.len());
        Response::parse(reply)
    }

    fn track<R>(&mut self, result: Result<R>) -> Result<R> {
        self.last_error = match &result {
            Ok(_) => NO_ERROR,
            Err(error) => error.code(),
        };
        result
    }

    /// The max MFN of the current database; records are numbered below it.
    ///
    /// # Errors
    ///
    /// See [`execute_checked`](Self::execute_checked).
    pub fn get_max_mfn(&mut self) -> Result<u32> {
        let mut query = self.new_query(commands::GET_MAX_MFN);
        query.add_ansi(&self.settings.database);
        let response = self.execute_checked(&query, &[])?;
        Ok(non_negative(response.return_code()))
    }

    /// Read the latest version of record `mfn`.
    ///
    /// Returns `None` if the server answers with one of the
    /// [`READ_RECORD_CODES`] and no record body.
    ///
    /// # Errors
    ///
    /// See [`execute_checked`](Self::execute_checked); a damaged record body
    /// is a parse error.
    pub fn read_record(&mut self, mfn: u32) -> Result<Option<Record>> {
        self.read_record_with(mfn, 0)
    }

    /// Read version `version` of record `mfn`.
    ///
    /// # Errors
    ///
    /// See [`read_record`](Self::read_record).
    pub fn read_record_version(&mut self, mfn: u32, version: u32) -> Result<Option<Record>> {
        self.read_record_with(mfn, version)
    }

    fn read_record_with(&mut self, mfn: u32, version: u32) -> Result<Option<Record>> {
        let mut query = self.new_query(commands::READ_RECORD);
        query
            .add_ansi(&self.settings.database)
            .add_int(i64::from(mfn))
            .add_int(i64::from(version));
        let mut response = self.execute_checked(&query, READ_RECORD_CODES)?;

        let lines = response.remaining_utf_lines();
        if lines.len() < 2 {
            return Ok(None);
        }
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        let result = Record::decode(&lines).map(|mut record| {
            record.database.clone_from(&self.settings.database);
            Some(record)
        });
        self.track(result)
    }

    /// Create or update `record` and refresh it from the server's echo.
    ///
    /// Returns the new max MFN of the database.
    ///
    /// # Errors
    ///
    /// See [`execute_checked`](Self::execute_checked).
    pub fn write_record(&mut self, record: &mut Record, lock: bool, actualize: bool) -> Result<u32> {
        let database = if record.database.is_empty() {
            self.settings.database.clone()
        } else {
            record.database.clone()
        };

        let mut query = self.new_query(commands::UPDATE_RECORD);
        query
            .add_ansi(&database)
            .add_int(i64::from(lock))
            .add_int(i64::from(actualize))
            .add_record(record, IRBIS_DELIMITER);
        let mut response = self.execute_checked(&query, &[])?;
        let max_mfn = non_negative(response.return_code());

        let echo = response.read_utf();
        if !echo.is_empty() {
            let result = Record::parse(&echo, SHORT_DELIMITER);
            let updated = self.track(result)?;
            record.mfn = updated.mfn;
            record.status = updated.status;
            record.version = updated.version;
            record.fields = updated.fields;
        }
        record.database = database;
        Ok(max_mfn)
    }

    /// Mark record `mfn` logically deleted.
    ///
    /// Returns `false` if there is no such record.
    ///
    /// # Errors
    ///
    /// See [`read_record`](Self::read_record) and [`write_record`](Self::write_record).
    pub fn delete_record(&mut self, mfn: u32) -> Result<bool> {
        self.change_deleted_flag(mfn, true)
    }

    /// Clear the logical deletion mark of record `mfn`.
    ///
    /// Returns `false` if there is no such record.
    ///
    /// # Errors
    ///
    /// See [`read_record`](Self::read_record) and [`write_record`](Self::write_record).
    pub fn undelete_record(&mut self, mfn: u32) -> Result<bool> {
        self.change_deleted_flag(mfn, false)
    }

    fn change_deleted_flag(&mut self, mfn: u32, deleted: bool) -> Result<bool> {
        let Some(mut record) = self.read_record(mfn)? else {
            return Ok(false);
        };
        if record.deleted() == deleted {
            return Ok(true);
        }
        if deleted {
            record.status.insert(RecordStatus::LOGICALLY_DELETED);
        } else {
            record.status.remove(RecordStatus::LOGICALLY_DELETED);
        }
        self.write_record(&mut record, false, true)?;
        Ok(true)
    }

    /// Rebuild the inverted file entries of record `mfn`.
    ///
    /// # Errors
    ///
    /// See [`execute_checked`](Self::execute_checked).
    pub fn actualize_record(&mut self, mfn: u32) -> Result<()> {
        let mut query = self.new_query(commands::ACTUALIZE_RECORD);
        query
            .add_ansi(&self.settings.database)
            .add_int(i64::from(mfn));
        self.execute_checked(&query, &[])?;
        Ok(())
    }

    /// MFNs of every record matching `expression`.
    ///
    /// Large result sets are fetched in several requests.
    ///
    /// # Errors
    ///
    /// See [`execute_checked`](Self::execute_checked).
    pub fn search(&mut self, expression: &str) -> Result<Vec<u32>> {
        let mut parameters = SearchParameters::new(expression);
        let mut result = Vec::new();
        loop {
            let (total, found) = self.search_batch(&parameters)?;
            let received = u32::try_from(found.len()).unwrap_or(u32::MAX);
            result.extend(found.into_iter().map(|line| line.mfn));
            if received == 0 || result.len() >= total {
                break;
            }
            parameters.first_record += received;
        }
        Ok(result)
    }

    /// One search request with full control over its parameters.
    ///
    /// # Errors
    ///
    /// See [`execute_checked`](Self::execute_checked).
    pub fn search_ex(&mut self, parameters: &SearchParameters) -> Result<Vec<FoundLine>> {
        self.search_batch(parameters).map(|(_, found)| found)
    }

    /// Number of records matching `expression`.
    ///
    /// # Errors
    ///
    /// See [`execute_checked`](Self::execute_checked).
    pub fn search_count(&mut self, expression: &str) -> Result<usize> {
        let parameters = SearchParameters {
            first_record: 0,
            ..SearchParameters::new(expression)
        };
        self.search_batch(&parameters).map(|(total, _)| total)
    }

    fn search_batch(&mut self, parameters: &SearchParameters) -> Result<(usize, Vec<FoundLine>)> {
        let mut query = self.new_query(commands::SEARCH);
        query
            .add_ansi(&self.settings.database)
            .add_utf(&parameters.expression)
            .add_int(i64::from(parameters.number_of_records.min(MAX_SEARCH_BATCH)))
            .add_int(i64::from(parameters.first_record))
            .add_format(&parameters.format)
            .add_int(i64::from(parameters.min_mfn))
            .add_int(i64::from(parameters.max_mfn))
            .add_ansi(&parameters.sequential);
        let mut response = self.execute_checked(&query, &[])?;

        let result = response.read_int().and_then(|total| {
            let found = response
                .remaining_utf_lines()
                .iter()
                .map(|line| FoundLine::parse(line))
                .collect::<Result<Vec<_>>>()?;
            Ok((usize::try_from(total).unwrap_or(0), found))
        });
        self.track(result)
    }

    /// Up to `count` dictionary terms starting at `start_term`.
    ///
    /// An empty list comes back when the start term is past the end of the
    /// dictionary.
    ///
    /// # Errors
    ///
    /// See [`execute_checked`](Self::execute_checked).
    pub fn read_terms(&mut self, start_term: &str, count: u32) -> Result<Vec<TermInfo>> {
        let mut query = self.new_query(commands::READ_TERMS);
        query
            .add_ansi(&self.settings.database)
            .add_utf(start_term)
            .add_int(i64::from(count))
            .add_format("");
        let mut response = self.execute_checked(&query, READ_TERMS_CODES)?;

        let result = response
            .remaining_utf_lines()
            .iter()
            .map(|line| TermInfo::parse(line))
            .collect();
        self.track(result)
    }

    /// Format record `mfn` of the current database.
    ///
    /// # Errors
    ///
    /// See [`execute_checked`](Self::execute_checked).
    pub fn format_record(&mut self, format: &str, mfn: u32) -> Result<String> {
        let mut query = self.new_query(commands::FORMAT_RECORD);
        query
            .add_ansi(&self.settings.database)
            .add_format(format)
            .add_int(1)
            .add_int(i64::from(mfn));
        let mut response = self.execute_checked(&query, &[])?;
        Ok(response.remaining_utf_text().trim().to_string())
    }

    /// Format a record that exists only on the client.
    ///
    /// # Errors
    ///
    /// See [`execute_checked`](Self::execute_checked).
    pub fn format_virtual_record(&mut self, format: &str, record: &Record) -> Result<String> {
        let mut query = self.new_query(commands::FORMAT_RECORD);
        query
            .add_ansi(&self.settings.database)
            .add_format(format)
            .add_int(1)
            .add_int(VIRTUAL_RECORD_MFN)
            .add_record(record, IRBIS_DELIMITER);
        let mut response = self.execute_checked(&query, &[])?;
        Ok(response.remaining_utf_text().trim().to_string())
    }

    /// Keep the session alive.
    ///
    /// # Errors
    ///
    /// See [`execute_checked`](Self::execute_checked).
    pub fn no_operation(&mut self) -> Result<()> {
        let query = self.new_query(commands::NOP);
        self.execute_checked(&query, &[])?;
        Ok(())
    }

    /// Server version and license usage.
    ///
    /// # Errors
    ///
    /// See [`execute_checked`](Self::execute_checked).
    pub fn get_server_version(&mut self) -> Result<ServerVersion> {
        let query = self.new_query(commands::SERVER_INFO);
        let mut response = self.execute_checked(&query, &[])?;
        let result = ServerVersion::parse(&response.remaining_ansi_lines());
        self.track(result)
    }

    /// Read a server text file named `path.database.file`, e.g. `3.IBIS.brief.pft`.
    ///
    /// Returns an empty string for a missing file.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub fn read_text_file(&mut self, specification: &str) -> Result<String> {
        let mut query = self.new_query(commands::READ_DOCUMENT);
        query.add_ansi(specification);
        let mut response = self.execute(&query)?;
        Ok(response.read_ansi().replace(IRBIS_DELIMITER, "\n"))
    }
}

impl<T: Transport> Drop for Connection<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl<T: Transport + fmt::Debug> fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("settings", &self.settings)
            .field("transport", &self.transport)
            .field("client_id", &self.client_id)
            .field("query_id", &self.query_id)
            .field("connected", &self.connected)
            .field("server_version", &self.server_version)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

fn non_negative(code: i32) -> u32 {
    u32::try_from(code).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_client_id_range() {
        for _ in 0..100 {
            let id = random_client_id();
            assert!((CLIENT_ID_MIN..=CLIENT_ID_MAX).contains(&id));
        }
    }

    #[test]
    fn test_found_line_parse() {
        assert_eq!(
            FoundLine::parse("12#Title").unwrap(),
            FoundLine {
                mfn: 12,
                description: "Title".to_string()
            }
        );
        assert_eq!(FoundLine::parse("7").unwrap().mfn, 7);
        assert!(FoundLine::parse("x#y").is_err());
    }

    #[test]
    fn test_term_info_parse() {
        let term = TermInfo::parse("3#K=ALGEBRA#1").unwrap();
        assert_eq!(term.count, 3);
        assert_eq!(term.text, "K=ALGEBRA#1");
        assert!(TermInfo::parse("#K=X").is_err());
    }

    #[test]
    fn test_server_version_parse() {
        let lines = |items: &[&str]| items.iter().map(ToString::to_string).collect::<Vec<_>>();

        let short = ServerVersion::parse(&lines(&["64.2014", "1", "100"])).unwrap();
        assert!(short.organization.is_empty());
        assert_eq!(short.version, "64.2014");
        assert_eq!(short.connected_clients, 1);
        assert_eq!(short.max_clients, 100);

        let long = ServerVersion::parse(&lines(&["Library", "64.2014", "2", "5"])).unwrap();
        assert_eq!(long.organization, "Library");
        assert_eq!(long.max_clients, 5);

        assert!(ServerVersion::parse(&lines(&["64.2014"])).is_err());
    }

    #[test]
    fn test_search_parameters_defaults() {
        let parameters = SearchParameters::new("K=A$").with_format("@brief");
        assert_eq!(parameters.first_record, 1);
        assert_eq!(parameters.number_of_records, 0);
        assert_eq!(parameters.format, "@brief");
    }
}
