//! Line protocol spoken between a PBX server and its connected clients.
//!
//! Inbound commands and outbound notifications are both single lines of
//! text. This crate owns only the wire format: parsing a command line into
//! a [`Command`], and rendering a [`Notification`] back into a line. It
//! knows nothing about TUs, extensions beyond their numeric value, or
//! locking; `pbx-core` is the only consumer.

pub mod command;
pub mod notification;

pub use command::Command;
pub use notification::Notification;

/// Terminator written after every outbound notification line.
pub const EOL: &str = "\r\n";
