//! Outgoing request builder.
//!
//! A [`Query`] accumulates the body of one request as raw bytes. Every
//! logical unit ends with its own newline and the caller decides how many
//! lines a command needs. [`Query::encode`] prepends the byte count of the
//! body, which is the only framing the server expects:
//!
//! ```text
//! <byte-count>\n<body>
//! ```
//!
//! # Examples
//!
//! ```
//! use irbis::{Query, QueryHeader};
//!
//! let header = QueryHeader {
//!     workstation: 'C',
//!     client_id: 123_456,
//!     query_id: 1,
//!     username: "librarian",
//!     password: "secret",
//! };
//! let mut query = Query::new("O", &header);
//! query.add_ansi("IBIS");
//!
//! let packet = query.encode();
//! assert!(packet.starts_with(format!("{}\n", query.len()).as_bytes()));
//! ```

use crate::encoding::{encode_ansi, encode_utf8};
use crate::navigator::CharNavigator;
use crate::record::Record;

const NEW_LINE: u8 = b'\n';

/// Fixed values seeding the first seven lines of every request.
#[derive(Debug, Clone, Copy)]
pub struct QueryHeader<'a> {
    /// Workstation code
    pub workstation: char,
    /// Session client id
    pub client_id: u32,
    /// Sequence number of this request
    pub query_id: u32,
    /// User name
    pub username: &'a str,
    /// Password
    pub password: &'a str,
}

/// One outgoing request.
#[derive(Debug, Clone)]
pub struct Query {
    command: String,
    buffer: Vec<u8>,
}

impl Query {
    /// Start a request for `command`.
    ///
    /// Seeds the body with the command, workstation, command again, client
    /// id, query id, password, user name, and three reserved blank lines.
    #[must_use]
    pub fn new(command: &str, header: &QueryHeader<'_>) -> Self {
        let mut query = Query {
            command: command.to_string(),
            buffer: Vec::with_capacity(256),
        };
        let mut workstation = [0u8; 4];
        query
            .add_ansi(command)
            .add_ansi(header.workstation.encode_utf8(&mut workstation))
            .add_ansi(command)
            .add_int(i64::from(header.client_id))
            .add_int(i64::from(header.query_id))
            .add_ansi(header.password)
            .add_ansi(header.username)
            .new_line()
            .new_line()
            .new_line();
        query
    }

    /// The command code this request carries.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Append a line in the codepage.
    pub fn add_ansi(&mut self, text: &str) -> &mut Self {
        self.buffer.extend_from_slice(&encode_ansi(text));
        self.new_line()
    }

    /// Append a line in UTF-8.
    pub fn add_utf(&mut self, text: &str) -> &mut Self {
        self.buffer.extend_from_slice(&encode_utf8(text));
        self.new_line()
    }

    /// Append a decimal number line.
    pub fn add_int(&mut self, value: i64) -> &mut Self {
        self.buffer.extend_from_slice(value.to_string().as_bytes());
        self.new_line()
    }

    /// Append a record text form, lines joined by `delimiter`, as one UTF-8 line.
    pub fn add_record(&mut self, record: &Record, delimiter: &str) -> &mut Self {
        self.add_utf(&record.encode(delimiter))
    }

    /// Append a format line.
    ///
    /// An empty format emits an empty line. A format starting with `@` names
    /// a server-side format file and goes as-is in the codepage. Anything else
    /// is an inline format: it is cleaned with [`prepare_format`] and sent as
    /// UTF-8 behind a `!` marker.
    pub fn add_format(&mut self, format: &str) -> &mut Self {
        let prepared = prepare_format(format);
        if prepared.is_empty() {
            self.new_line()
        } else if prepared.starts_with('@') {
            self.add_ansi(&prepared)
        } else {
            self.add_utf(&format!("!{prepared}"))
        }
    }

    /// Append a line terminator.
    pub fn new_line(&mut self) -> &mut Self {
        self.buffer.push(NEW_LINE);
        self
    }

    /// Byte length of the body.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True if the body is empty. Never the case for a seeded query.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The body without framing.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.buffer
    }

    /// Frame the request as `<byte-count>\n<body>`.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let prefix = format!("{}\n", self.buffer.len());
        let mut packet = Vec::with_capacity(prefix.len() + self.buffer.len());
        packet.extend_from_slice(prefix.as_bytes());
        packet.extend_from_slice(&self.buffer);
        packet
    }
}

/// Clean an inline format before sending it.
///
/// Strips `/*` comments up to the end of their line unless they occur inside
/// a `'...'`, `"..."` or `|...|` literal, drops control characters (line
/// breaks included, they would split the request line), and trims leading
/// whitespace.
///
/// # Examples
///
/// ```
/// use irbis::query::prepare_format;
///
/// assert_eq!(prepare_format("  v200^a, /* title\r\nv300"), "v200^a, v300");
/// assert_eq!(prepare_format("'/* kept */'"), "'/* kept */'");
/// ```
#[must_use]
pub fn prepare_format(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut navigator = CharNavigator::new(text);
    let mut quote: Option<char> = None;

    while let Some(c) = navigator.read() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => {},
            None if matches!(c, '\'' | '"' | '|') => quote = Some(c),
            None if c == '/' && navigator.peek() == Some('*') => {
                navigator.read_while(|c| c != '\r' && c != '\n');
                continue;
            },
            None => {},
        }
        if !c.is_control() {
            result.push(c);
        }
    }

    result.trim_start().to_string()
}
