#![warn(missing_docs)]

//! # irbis: IRBIS64 client crate
//!
//! A blocking Rust client for the IRBIS64 library-automation server, with
//! the bibliographic record model it exchanges and the ISO 2709 codec used to
//! move records in and out of the system.
//!
//! ## Quick Start
//!
//! ### Talking to a Server
//!
//! ```no_run
//! use irbis::{Connection, ConnectionSettings, Field};
//!
//! # fn main() -> irbis::Result<()> {
//! let settings: ConnectionSettings = "host=127.0.0.1;port=6666;user=librarian;pwd=secret".parse()?;
//! let mut connection = Connection::new(settings);
//! connection.connect()?;
//!
//! if let Some(mut record) = connection.read_record(1)? {
//!     println!("{}", record.first_subfield_value(200, 'a').unwrap_or_default());
//!     record.add_field(Field::with_value(300, "Checked"));
//!     connection.write_record(&mut record, false, true)?;
//! }
//!
//! connection.disconnect();
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading ISO 2709 Files
//!
//! ```no_run
//! use irbis::{Iso2709Reader, TextEncoding};
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("records.iso")?;
//! let mut reader = Iso2709Reader::new(file, TextEncoding::Ansi);
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("{record}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`navigator`]: Zero-copy cursors over bytes and text
//! - [`encoding`]: Windows-1251 and UTF-8 conversion
//! - [`record`]: Core record structures (`Record`, `Field`, `Subfield`) and their text form
//! - [`reader`] / [`writer`]: ISO 2709 binary codec
//! - [`leader`] / [`iso2709`]: ISO 2709 leader and layout constants
//! - [`query`] / [`response`]: Request builder and reply reader
//! - [`connection`]: Session state machine and the command surface
//! - [`transport`]: Byte transport boundary and its TCP implementation
//! - [`settings`]: Connection settings and connection strings
//! - [`json`]: JSON serialization/deserialization
//! - [`error`]: Error types, result type, and the return-code table
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger.
//! Connections report login and logout at `info`, every round trip at
//! `debug`, and transport failures at `warn`.

pub mod connection;
pub mod encoding;
pub mod error;
pub mod iso2709;
pub mod json;
pub mod leader;
pub mod navigator;
pub mod query;
pub mod reader;
/// Core record structures (`Record`, `Field`, `Subfield`)
pub mod record;
pub mod response;
pub mod settings;
pub mod transport;
pub mod writer;

pub use connection::{Connection, FoundLine, SearchParameters, ServerVersion, TermInfo};
pub use encoding::TextEncoding;
pub use error::{describe_error, IrbisError, Result};
pub use leader::Leader;
pub use navigator::{ByteNavigator, CharNavigator};
pub use query::{Query, QueryHeader};
pub use reader::Iso2709Reader;
pub use record::{
    Field, FieldBuilder, Record, RecordBuilder, RecordStatus, Subfield, IRBIS_DELIMITER,
    LINE_DELIMITER, SHORT_DELIMITER,
};
pub use response::Response;
pub use settings::{ConnectionSettings, Workstation};
pub use transport::{TcpTransport, Transport};
pub use writer::Iso2709Writer;
