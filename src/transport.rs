//! Byte transport between the client and the server.
//!
//! The server closes the socket after every reply, so a transport is opened
//! at the start of each round trip and closed at its end. A receive of zero
//! bytes marks the end of the reply.
//!
//! [`TcpTransport`] is the production implementation. Tests and alternative
//! channels implement [`Transport`] themselves.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

const RECEIVE_CHUNK: usize = 32 * 1024;

/// A blocking byte channel used for one request/reply exchange at a time.
pub trait Transport {
    /// Open the channel to `host:port`.
    ///
    /// # Errors
    ///
    /// Returns any error raised while connecting.
    fn open(&mut self, host: &str, port: u16) -> io::Result<()>;

    /// Send all of `data`.
    ///
    /// # Errors
    ///
    /// Returns any error raised while writing.
    fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Receive up to `buffer.len()` bytes; `0` means the reply is complete.
    ///
    /// # Errors
    ///
    /// Returns any error raised while reading.
    fn receive(&mut self, buffer: &mut [u8]) -> io::Result<usize>;

    /// Close the channel. Closing a closed channel does nothing.
    ///
    /// # Errors
    ///
    /// Returns any error raised while shutting down.
    fn close(&mut self) -> io::Result<()>;
}

/// Send `packet` and collect the whole reply.
///
/// The transport is closed before returning, whether the exchange succeeded
/// or not.
///
/// # Errors
///
/// Returns the first I/O error of the exchange.
pub fn exchange<T: Transport + ?Sized>(
    transport: &mut T,
    host: &str,
    port: u16,
    packet: &[u8],
) -> io::Result<Vec<u8>> {
    transport.open(host, port)?;
    let result = send_and_receive(transport, packet);
    let closed = transport.close();
    let reply = result?;
    closed?;
    Ok(reply)
}

fn send_and_receive<T: Transport + ?Sized>(transport: &mut T, packet: &[u8]) -> io::Result<Vec<u8>> {
    transport.send(packet)?;

    let mut reply = Vec::new();
    let mut chunk = vec![0u8; RECEIVE_CHUNK];
    loop {
        let count = transport.receive(&mut chunk)?;
        if count == 0 {
            break;
        }
        reply.extend_from_slice(&chunk[..count]);
    }
    Ok(reply)
}

/// [`Transport`] over a plain TCP socket.
#[derive(Debug, Default)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Create a closed transport.
    #[must_use]
    pub fn new() -> Self {
        TcpTransport::default()
    }

    fn stream(&mut self) -> io::Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "transport is not open"))
    }
}

impl Transport for TcpTransport {
    fn open(&mut self, host: &str, port: u16) -> io::Result<()> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_nodelay(true)?;
        self.stream = Some(stream);
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        let stream = self.stream()?;
        stream.write_all(data)?;
        stream.flush()
    }

    fn receive(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.stream()?.read(buffer)
    }

    fn close(&mut self) -> io::Result<()> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };
        match stream.shutdown(Shutdown::Both) {
            Err(error) if error.kind() != io::ErrorKind::NotConnected => Err(error),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_tcp_exchange() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut request = [0u8; 5];
            socket.read_exact(&mut request).unwrap();
            socket.write_all(b"pong!").unwrap();
            request
        });

        let mut transport = TcpTransport::new();
        let reply = exchange(&mut transport, "127.0.0.1", port, b"ping!").unwrap();
        assert_eq!(reply, b"pong!");
        assert_eq!(&server.join().unwrap(), b"ping!");
        assert!(transport.stream.is_none());
    }

    #[test]
    fn test_closed_transport_refuses_io() {
        let mut transport = TcpTransport::new();
        assert!(transport.send(b"x").is_err());
        assert!(transport.receive(&mut [0u8; 4]).is_err());
        assert!(transport.close().is_ok());
    }
}
