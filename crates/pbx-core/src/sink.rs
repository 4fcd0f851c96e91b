//! Abstraction over a TU's byte connection to its client.

use std::io;
use std::io::Write;
use std::net::{Shutdown, TcpStream};

/// A byte sink bound to one client connection.
///
/// Kept as a trait, rather than a concrete `TcpStream`, so the TU and
/// registry state machines can be driven in tests without opening a real
/// socket (see `tests/common/mock_sink.rs`).
pub trait ClientSink: Write + Send + 'static {
    /// Forcibly closes both halves of the underlying connection. Used by
    /// the registry during shutdown to unblock a session's read loop
    /// without needing that TU's state lock.
    fn shutdown(&self) -> io::Result<()>;
}

impl ClientSink for TcpStream {
    fn shutdown(&self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}
