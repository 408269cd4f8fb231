//! Incoming reply reader.
//!
//! A [`Response`] owns the complete bytes of one reply and reads them as
//! lines through a forward-only cursor. The fixed header is consumed on
//! construction; what follows is command-specific, usually a return code
//! and then a payload.
//!
//! # Examples
//!
//! ```
//! use irbis::Response;
//!
//! let reply = b"O\r\n123456\r\n1\r\n0\r\n64.2014\r\n\r\n\r\n\r\n\r\n\r\n42\r\n".to_vec();
//! let mut response = Response::parse(reply)?;
//! assert_eq!(response.command(), "O");
//! assert_eq!(response.check_return_code(&[])?, 42);
//! assert!(response.eot());
//! # Ok::<(), irbis::IrbisError>(())
//! ```

use crate::encoding::{decode_ansi, decode_utf8};
use crate::error::{IrbisError, Result};
use crate::navigator::ByteNavigator;

/// Header lines after the server version that carry nothing of interest.
const RESERVED_HEADER_LINES: usize = 5;

/// One reply with a read cursor.
#[derive(Debug, Clone)]
pub struct Response {
    buffer: Vec<u8>,
    position: usize,
    command: String,
    client_id: i32,
    query_id: i32,
    answer_size: i32,
    server_version: String,
    return_code: i32,
}

impl Response {
    /// Wrap reply bytes and consume the header.
    ///
    /// # Errors
    ///
    /// Returns `IrbisError::MalformedResponse` if a numeric header line is
    /// not a number.
    pub fn parse(buffer: Vec<u8>) -> Result<Self> {
        let mut response = Response {
            buffer,
            position: 0,
            command: String::new(),
            client_id: 0,
            query_id: 0,
            answer_size: 0,
            server_version: String::new(),
            return_code: 0,
        };

        response.command = response.read_ansi();
        response.client_id = response.read_int()?;
        response.query_id = response.read_int()?;
        response.answer_size = response.read_int()?;
        response.server_version = response.read_ansi();
        for _ in 0..RESERVED_HEADER_LINES {
            response.read_line();
        }

        Ok(response)
    }

    /// Command code echoed by the server.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Client id echoed by the server.
    #[must_use]
    pub fn client_id(&self) -> i32 {
        self.client_id
    }

    /// Query id echoed by the server.
    #[must_use]
    pub fn query_id(&self) -> i32 {
        self.query_id
    }

    /// Answer size announced in the header.
    #[must_use]
    pub fn answer_size(&self) -> i32 {
        self.answer_size
    }

    /// Server version from the header; may be empty.
    #[must_use]
    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// The return code read by the last [`get_return_code`](Self::get_return_code).
    #[must_use]
    pub fn return_code(&self) -> i32 {
        self.return_code
    }

    /// True once the cursor reached the end of the reply.
    #[must_use]
    pub fn eot(&self) -> bool {
        self.position >= self.buffer.len()
    }

    /// Read one line as raw bytes. Past the end this is an empty line.
    pub fn read_line(&mut self) -> &[u8] {
        let mut navigator = ByteNavigator::at(&self.buffer, self.position);
        let start = navigator.position();
        let length = navigator.read_line().len();
        self.position = navigator.position();
        &self.buffer[start..start + length]
    }

    /// Read one line in the codepage.
    pub fn read_ansi(&mut self) -> String {
        decode_ansi(self.read_line())
    }

    /// Read one line in UTF-8.
    pub fn read_utf(&mut self) -> String {
        decode_utf8(self.read_line())
    }

    /// Read one line as a decimal integer.
    ///
    /// # Errors
    ///
    /// Returns `IrbisError::MalformedResponse` if the line is not a number.
    pub fn read_int(&mut self) -> Result<i32> {
        let line = self.read_ansi();
        line.trim().parse().map_err(|_| {
            IrbisError::MalformedResponse(format!("expected a number, got {line:?}"))
        })
    }

    /// Read the return code line and remember it.
    ///
    /// # Errors
    ///
    /// Returns `IrbisError::MalformedResponse` if the line is not a number.
    pub fn get_return_code(&mut self) -> Result<i32> {
        self.return_code = self.read_int()?;
        Ok(self.return_code)
    }

    /// Read the return code and check it.
    ///
    /// Non-negative codes succeed, and so do negative codes in `allowed`.
    ///
    /// # Errors
    ///
    /// Returns `IrbisError::Server` with the code for any other negative
    /// code, or `IrbisError::MalformedResponse` if the line is not a number.
    pub fn check_return_code(&mut self, allowed: &[i32]) -> Result<i32> {
        let code = self.get_return_code()?;
        if code < 0 && !allowed.contains(&code) {
            return Err(IrbisError::Server(code));
        }
        Ok(code)
    }

    /// Everything from the cursor to the end; the cursor moves to the end.
    pub fn remaining_bytes(&mut self) -> &[u8] {
        let start = self.position.min(self.buffer.len());
        self.position = self.buffer.len();
        &self.buffer[start..]
    }

    /// The rest of the reply decoded from the codepage, trailing line breaks trimmed.
    pub fn remaining_ansi_text(&mut self) -> String {
        let mut text = decode_ansi(self.remaining_bytes());
        trim_line_breaks(&mut text);
        text
    }

    /// The rest of the reply decoded from UTF-8, trailing line breaks trimmed.
    pub fn remaining_utf_text(&mut self) -> String {
        let mut text = decode_utf8(self.remaining_bytes());
        trim_line_breaks(&mut text);
        text
    }

    /// The rest of the reply in the codepage, split into lines.
    pub fn remaining_ansi_lines(&mut self) -> Vec<String> {
        let text = self.remaining_ansi_text();
        if text.is_empty() {
            return Vec::new();
        }
        text.split('\n')
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect()
    }

    /// UTF-8 lines up to the first empty one, which is consumed.
    pub fn remaining_utf_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_utf();
            if line.is_empty() {
                break;
            }
            lines.push(line);
        }
        lines
    }
}

fn trim_line_breaks(text: &mut String) {
    let kept = text.trim_end_matches(['\r', '\n']).len();
    text.truncate(kept);
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "K\r\n100500\r\n3\r\n77\r\n64.2014\r\n\r\n\r\n\r\n\r\n\r\n";

    fn response(body: &[u8]) -> Response {
        let mut bytes = HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(body);
        Response::parse(bytes).unwrap()
    }

    #[test]
    fn test_header() {
        let response = response(b"");
        assert_eq!(response.command(), "K");
        assert_eq!(response.client_id(), 100_500);
        assert_eq!(response.query_id(), 3);
        assert_eq!(response.answer_size(), 77);
        assert_eq!(response.server_version(), "64.2014");
        assert!(response.eot());
    }

    #[test]
    fn test_bad_header_number() {
        let result = Response::parse(b"K\r\nabc\r\n".to_vec());
        assert!(matches!(result, Err(IrbisError::MalformedResponse(_))));
    }

    #[test]
    fn test_read_int_then_eot() {
        let mut response = response(b"5\n");
        assert_eq!(response.read_int().unwrap(), 5);
        assert!(response.eot());
    }

    #[test]
    fn test_read_past_end_is_empty() {
        let mut response = response(b"");
        assert!(response.read_line().is_empty());
        assert_eq!(response.read_utf(), "");
        assert!(response.read_int().is_err());
    }

    #[test]
    fn test_check_return_code() {
        assert_eq!(response(b"0\r\n").check_return_code(&[]).unwrap(), 0);
        assert_eq!(response(b"12\r\n").check_return_code(&[]).unwrap(), 12);
        assert_eq!(
            response(b"-201\r\n").check_return_code(&[-201, -600]).unwrap(),
            -201
        );

        let mut failed = response(b"-140\r\n");
        assert!(matches!(
            failed.check_return_code(&[-201]),
            Err(IrbisError::Server(-140))
        ));
        assert_eq!(failed.return_code(), -140);
    }

    #[test]
    fn test_remaining_text() {
        let mut response = response("0\r\nПривет\r\nмир\r\n".as_bytes());
        response.get_return_code().unwrap();
        assert_eq!(response.remaining_utf_text(), "Привет\r\nмир");
        assert!(response.eot());
        assert_eq!(response.remaining_utf_text(), "");
    }

    #[test]
    fn test_remaining_ansi_lines() {
        let mut response = response(&[0xCF, b'\r', b'\n', b'b', b'\r', b'\n']);
        assert_eq!(response.remaining_ansi_lines(), vec!["П", "b"]);
        assert!(response.remaining_ansi_lines().is_empty());
    }

    #[test]
    fn test_remaining_utf_lines_stop_at_empty() {
        let mut response = response(b"1#0\r\n0#1\r\n200#^aX\r\n\r\ntrailer\r\n");
        assert_eq!(response.remaining_utf_lines(), vec!["1#0", "0#1", "200#^aX"]);
        assert_eq!(response.read_utf(), "trailer");
    }
}
