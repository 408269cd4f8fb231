//! Common test helpers and utilities shared across test suite.

#![allow(dead_code)]

use irbis::{Connection, ConnectionSettings, Field, Record, Transport};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

/// Route log output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A reply header followed by `body`.
///
/// The header has the command, client id, query id, answer size, server
/// version, and five reserved lines.
pub fn reply(command: &str, body: &str) -> Vec<u8> {
    let mut bytes = format!(
        "{command}\r\n123456\r\n1\r\n{}\r\n64.2014\r\n\r\n\r\n\r\n\r\n\r\n",
        body.len()
    )
    .into_bytes();
    bytes.extend_from_slice(body.as_bytes());
    bytes
}

/// A reply carrying only a return code line.
pub fn code_reply(command: &str, code: i32) -> Vec<u8> {
    reply(command, &format!("{code}\r\n"))
}

/// A successful login reply.
pub fn login_reply() -> Vec<u8> {
    reply("A", "0\r\n30\r\n[MAIN]\r\nDBNNAMECAT=dbnam2.mnu\r\n")
}

/// What the mock saw and what it will answer next.
#[derive(Debug, Default)]
pub struct MockState {
    /// Scripted replies, `None` for a failing exchange
    pub replies: VecDeque<Option<Vec<u8>>>,
    /// Every packet sent, in order
    pub sent: Vec<Vec<u8>>,
    /// Reply being delivered
    current: Vec<u8>,
    /// Delivery offset in `current`
    offset: usize,
    /// Number of opens
    pub opens: usize,
    /// Number of closes
    pub closes: usize,
}

/// Scripted [`Transport`] sharing its state with the test.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    pub state: Rc<RefCell<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport::default()
    }

    /// Queue a reply for the next exchange.
    pub fn push_reply(&self, bytes: Vec<u8>) {
        self.state.borrow_mut().replies.push_back(Some(bytes));
    }

    /// Make the next exchange fail on send.
    pub fn push_failure(&self) {
        self.state.borrow_mut().replies.push_back(None);
    }

    /// Packets sent so far.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state.borrow().sent.clone()
    }

    /// Body lines of packet `index`, without the length prefix.
    pub fn sent_lines(&self, index: usize) -> Vec<String> {
        let packet = self.state.borrow().sent[index].clone();
        let text = String::from_utf8_lossy(&packet).into_owned();
        let (_, body) = text.split_once('\n').unwrap();
        body.split('\n').map(ToString::to_string).collect()
    }

    /// Command letters of every packet sent.
    pub fn commands(&self) -> Vec<String> {
        (0..self.sent().len())
            .map(|index| self.sent_lines(index)[0].clone())
            .collect()
    }
}

impl Transport for MockTransport {
    fn open(&mut self, _host: &str, _port: u16) -> io::Result<()> {
        self.state.borrow_mut().opens += 1;
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        state.sent.push(data.to_vec());
        match state.replies.pop_front() {
            Some(Some(reply)) => {
                state.current = reply;
                state.offset = 0;
                Ok(())
            },
            Some(None) => Err(io::Error::new(io::ErrorKind::ConnectionReset, "scripted failure")),
            None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no reply scripted")),
        }
    }

    fn receive(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        // Hand out small chunks to exercise the receive loop.
        let remaining = state.current.len() - state.offset;
        let count = remaining.min(buffer.len()).min(7);
        let start = state.offset;
        buffer[..count].copy_from_slice(&state.current[start..start + count]);
        state.offset += count;
        Ok(count)
    }

    fn close(&mut self) -> io::Result<()> {
        self.state.borrow_mut().closes += 1;
        Ok(())
    }
}

/// Settings used by every connection test.
pub fn settings() -> ConnectionSettings {
    ConnectionSettings::new("irbis.test", 6666, "librarian", "secret").with_database("IBIS")
}

/// A disconnected client over `transport` with deterministic client ids.
pub fn connection(transport: &MockTransport) -> Connection<MockTransport> {
    let mut next_id = 200_000;
    Connection::with_transport(settings(), transport.clone()).with_client_id_source(move || {
        next_id += 1;
        next_id
    })
}

/// A connected client; the login reply is consumed.
pub fn connected(transport: &MockTransport) -> Connection<MockTransport> {
    transport.push_reply(login_reply());
    let mut connection = connection(transport);
    connection.connect().unwrap();
    connection
}

/// A realistic catalog record.
pub fn sample_record() -> Record {
    Record::builder()
        .field(Field::with_value(920, "PAZK"))
        .field(
            Field::builder(700)
                .subfield('a', "Пушкин")
                .subfield('b', "А. С.")
                .subfield('g', "Александр Сергеевич")
                .build(),
        )
        .field(
            Field::builder(200)
                .subfield('a', "Евгений Онегин")
                .subfield('e', "роман в стихах")
                .build(),
        )
        .field(
            Field::builder(910)
                .subfield('a', "0")
                .subfield('b', "1001")
                .subfield('d', "ФКХ")
                .build(),
        )
        .field(
            Field::builder(910)
                .subfield('a', "0")
                .subfield('b', "1002")
                .subfield('d', "ЧЗ")
                .build(),
        )
        .build()
}
