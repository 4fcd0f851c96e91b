use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use clap::Parser;

use pbx_core::Pbx;
use pbx_server::version::PBX_VERSION;
use pbx_server::{logging, session};

/// PBX telephone exchange simulator.
///
/// The only supported flag is `-p <port>`; any other argument, or a
/// missing `-p`, is a usage error (enforced by `clap` itself).
#[derive(Parser, Debug)]
#[command(author, version, about = "PBX telephone exchange simulator")]
struct Args {
    /// TCP port to listen on
    #[arg(short = 'p')]
    port: u16,
}

fn main() {
    let args = Args::parse();
    logging::init();
    tracing::info!(version = PBX_VERSION, "starting pbx");

    let listener = match TcpListener::bind(("0.0.0.0", args.port)) {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("failed to bind port {}: {e}", args.port);
            std::process::exit(1);
        }
    };
    let local_addr = listener
        .local_addr()
        .expect("bound listener has a local address");

    let pbx = Pbx::new();
    let shutting_down = Arc::new(AtomicBool::new(false));

    let handler_flag = Arc::clone(&shutting_down);
    ctrlc::set_handler(move || {
        if !handler_flag.swap(true, Ordering::SeqCst) {
            tracing::info!("shutdown signal received");
            // accept() does not return on its own when a signal arrives;
            // connecting to ourselves unblocks one pending call so the
            // loop can observe the flag.
            let _ = TcpStream::connect(local_addr);
        }
    })
    .expect("failed to install signal handler");

    for incoming in listener.incoming() {
        if shutting_down.load(Ordering::SeqCst) {
            break;
        }
        match incoming {
            Ok(stream) => {
                let pbx = Arc::clone(&pbx);
                thread::spawn(move || session::run(pbx, stream));
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
            }
        }
    }

    drop(listener);
    tracing::info!("accept loop exited, draining sessions");
    pbx.shutdown();
    tracing::info!("pbx terminated");
}
