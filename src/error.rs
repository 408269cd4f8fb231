//! Error types for IRBIS operations.
//!
//! This module provides the [`IrbisError`] type for all library operations,
//! the [`Result`] convenience type, and the table of well-known server
//! return codes ([`describe_error`]).

use thiserror::Error;

/// `last_error` value for a successful operation.
pub const NO_ERROR: i32 = 0;

/// Client-side pseudo code: the transport or the response framing failed.
pub const NETWORK_FAILURE: i32 = -100_002;

/// Client-side pseudo code: a command was issued on a disconnected client.
pub const NOT_CONNECTED: i32 = -100_003;

/// Client-side pseudo code: a codec or settings error aborted the operation.
pub const CLIENT_ERROR: i32 = -100_004;

/// Server code returned when the client id is already registered.
pub const CLIENT_ALREADY_EXISTS: i32 = -3337;

/// Error type for all IRBIS library operations.
///
/// Codec-level variants come from record parsing and the ISO 2709 codec and
/// are surfaced directly to their caller. The connection layer collapses
/// transport and framing problems into [`IrbisError::Network`] and reports
/// negative return codes as [`IrbisError::Server`].
#[derive(Error, Debug)]
pub enum IrbisError {
    /// Error indicating an invalid or malformed record.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Error indicating an invalid field structure.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Error related to character encoding conversion.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Error during parsing of textual data.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error indicating a truncated or incomplete record.
    #[error("Truncated record: {0}")]
    TruncatedRecord(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The command requires a connected client.
    #[error("Client is not connected")]
    NotConnected,

    /// Socket-level or framing failure during a round trip.
    #[error("Network error")]
    Network,

    /// The reply did not follow the protocol layout.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The server answered with a negative return code.
    #[error("Server error {0}: {desc}", desc = describe_error(*.0))]
    Server(i32),

    /// Connection settings could not be parsed.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl IrbisError {
    /// The numeric code stored in a connection's `last_error` for this error.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            IrbisError::Server(code) => *code,
            IrbisError::NotConnected => NOT_CONNECTED,
            IrbisError::Network | IrbisError::IoError(_) | IrbisError::MalformedResponse(_) => {
                NETWORK_FAILURE
            },
            _ => CLIENT_ERROR,
        }
    }
}

/// Convenience type alias for [`std::result::Result`] with [`IrbisError`].
pub type Result<T> = std::result::Result<T, IrbisError>;

/// Describe a return code in human-readable form.
///
/// Non-negative codes are successes. Unknown negative codes describe as
/// `"Unknown error"`.
///
/// # Examples
///
/// ```
/// use irbis::error::describe_error;
///
/// assert_eq!(describe_error(-4444), "Wrong password");
/// assert_eq!(describe_error(5), "No error");
/// ```
#[must_use]
pub fn describe_error(code: i32) -> &'static str {
    if code >= 0 {
        return "No error";
    }

    match code {
        -1 => "Operation cancelled",
        -2 => "General error",
        -3 => "Operation not implemented",
        -4 => "Wrong format",
        -100 => "Given MFN is out of database range",
        -101 => "Wrong shelf size",
        -102 => "Wrong shelf number",
        -140 => "MFN is out of database range",
        -141 => "Read error",
        -200 => "Given field is absent",
        -201 => "Previous version of the record is absent",
        -202 => "Term not found",
        -203 => "Last term in the list",
        -204 => "First term in the list",
        -300 => "Database is locked exclusively",
        -301 => "Database is locked",
        -400 => "Error opening MST or XRF file",
        -401 => "Error opening IFP file",
        -402 => "Write error",
        -403 => "Actualization error",
        -600 => "Record is logically deleted",
        -601 => "Record is physically deleted",
        -602 => "Record is locked for input",
        -603 => "Record is logically deleted",
        -605 => "Record is physically deleted",
        -607 => "Error in autoin.gbl",
        -608 => "Record version mismatch",
        -700 => "Backup creation error",
        -701 => "Restore from backup error",
        -702 => "Sort error",
        -703 => "Wrong term",
        -704 => "Dictionary creation error",
        -705 => "Dictionary load error",
        -800 => "Global correction parameter error",
        -801 => "Global correction repeat error",
        -802 => "Global correction method error",
        -1111 => "Server execution error",
        -2222 => "Protocol error",
        -3333 => "Client is not registered",
        -3334 => "Client is not logged in",
        -3335 => "Wrong client identifier",
        -3336 => "Workstation has no access to the command",
        CLIENT_ALREADY_EXISTS => "Client is already registered",
        -3338 => "Client is not allowed",
        -4444 => "Wrong password",
        -5555 => "File does not exist",
        -6666 => "Server is overloaded",
        -7777 => "Administrator thread failure",
        -8888 => "General server error",
        NETWORK_FAILURE => "Network failure",
        NOT_CONNECTED => "Client is not connected",
        CLIENT_ERROR => "Client-side error",
        _ => "Unknown error",
    }
}
