//! The PBX switchboard: TU state machine and registry.
//!
//! This crate has no notion of sockets or threads beyond the `ClientSink`
//! trait it asks its caller to supply; `pbx-server` supplies `TcpStream`
//! and drives a thread per connection on top of it.

pub mod error;
pub mod registry;
pub mod sink;
pub mod state;
pub mod tu;

pub use error::PbxError;
pub use registry::{Pbx, MAX_EXTENSIONS};
pub use sink::ClientSink;
pub use state::TuState;
pub use tu::Tu;
