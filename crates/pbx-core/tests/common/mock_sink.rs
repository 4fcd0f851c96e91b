use std::io;
use std::io::Write;
use std::sync::{Arc, Mutex};

use pbx_core::ClientSink;

/// A client sink that collects written bytes for later inspection instead
/// of touching a real socket.
///
/// Cloning shares the same backing buffer, mirroring the way a TU keeps a
/// separate write handle and shutdown handle over one real connection.
#[derive(Clone, Default)]
pub struct MockSink {
    lines: Arc<Mutex<Vec<u8>>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every line written so far, in order, with terminators
    /// stripped.
    pub fn take_lines(&self) -> Vec<String> {
        let mut buf = self.lines.lock().unwrap();
        let text = String::from_utf8(std::mem::take(&mut buf)).expect("non-utf8 sink content");
        text.lines().map(str::to_string).collect()
    }
}

impl Write for MockSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lines.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ClientSink for MockSink {
    fn shutdown(&self) -> io::Result<()> {
        Ok(())
    }
}
