//! Per-connection agent: reads one command per line and drives its TU.

use std::io::{BufRead, BufReader};
use std::net::TcpStream;
use std::sync::Arc;

use pbx_core::{Pbx, Tu};
use pbx_proto::Command;

/// Runs a single connection to completion: creates and registers a TU,
/// dispatches commands until the client disconnects, then unregisters.
pub fn run(pbx: Arc<Pbx<TcpStream>>, stream: TcpStream) {
    let peer = stream.peer_addr().ok();

    let reader_stream = match stream.try_clone() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(?peer, error = %e, "failed to clone connection for reading");
            return;
        }
    };
    let shutdown_stream = match stream.try_clone() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(?peer, error = %e, "failed to clone connection for shutdown");
            return;
        }
    };

    let tu = Tu::new(stream, shutdown_stream);
    let ext = match pbx.register(&tu) {
        Ok(ext) => ext,
        Err(e) => {
            tracing::warn!(?peer, error = %e, "failed to register TU");
            return;
        }
    };
    tracing::info!(?peer, tu = tu.id(), ext, "session started");

    let mut reader = BufReader::new(reader_stream);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let text = line.strip_suffix('\n').unwrap_or(&line);
                if let Some(command) = pbx_proto::command::parse(text) {
                    dispatch(&pbx, &tu, command);
                }
            }
            Err(e) => {
                tracing::warn!(?peer, tu = tu.id(), error = %e, "read error, closing session");
                break;
            }
        }
    }

    if let Err(e) = pbx.unregister(&tu) {
        tracing::warn!(?peer, tu = tu.id(), error = %e, "failed to unregister TU");
    }
    tracing::info!(?peer, tu = tu.id(), "session ended");
}

fn dispatch(pbx: &Arc<Pbx<TcpStream>>, tu: &Arc<Tu<TcpStream>>, command: Command) {
    match command {
        Command::Pickup => tu.pickup(),
        Command::Hangup => tu.hangup(),
        Command::Dial(ext) => pbx.dial(tu, ext),
        Command::Chat(msg) => tu.chat(&msg),
    }
}
