//! The PBX registry: a fixed-capacity extension table coordinating
//! registration, dialing, and graceful shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use crate::error::PbxError;
use crate::sink::ClientSink;
use crate::tu::Tu;

/// Compile-time size of the extension table.
pub const MAX_EXTENSIONS: usize = 1024;

struct State<S: ClientSink> {
    slots: Vec<Option<Arc<Tu<S>>>>,
    active: usize,
}

/// The PBX switchboard: maps extensions to TUs and tracks how many are
/// currently registered, so a shutdown can wait for the last one to drain.
pub struct Pbx<S: ClientSink> {
    state: Mutex<State<S>>,
    quiescent: Condvar,
    shut_down: AtomicBool,
}

impl<S: ClientSink> Pbx<S> {
    pub fn new() -> Arc<Self> {
        Self::with_capacity(MAX_EXTENSIONS)
    }

    pub fn with_capacity(capacity: usize) -> Arc<Self> {
        Arc::new(Pbx {
            state: Mutex::new(State {
                slots: (0..capacity).map(|_| None).collect(),
                active: 0,
            }),
            quiescent: Condvar::new(),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Registers `tu` at the first free slot, assigning it that slot's
    /// extension. Fails if the table is full.
    pub fn register(&self, tu: &Arc<Tu<S>>) -> Result<i32, PbxError> {
        let mut state = self.state.lock().unwrap();
        let ext = state
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(PbxError::NoFreeExtension)?;
        tu.set_extension(ext as i32);
        state.slots[ext] = Some(Arc::clone(tu));
        state.active += 1;
        tracing::info!(tu = tu.id(), ext, "registered");
        Ok(ext as i32)
    }

    /// Tears down any in-progress call on `tu` and removes it from the
    /// table.
    pub fn unregister(&self, tu: &Arc<Tu<S>>) -> Result<(), PbxError> {
        let mut state = self.state.lock().unwrap();
        let ext = tu.extension();
        let registered = usize::try_from(ext)
            .ok()
            .and_then(|idx| state.slots.get(idx))
            .is_some_and(|slot| matches!(slot, Some(t) if Arc::ptr_eq(t, tu)));
        if !registered {
            return Err(PbxError::NotRegistered);
        }
        tu.hangup();
        state.slots[ext as usize] = None;
        state.active -= 1;
        tracing::info!(tu = tu.id(), ext, "unregistered");
        if state.active == 0 {
            self.quiescent.notify_all();
        }
        Ok(())
    }

    /// Looks up `target_ext` and, if found, invokes the TU dial operation.
    /// The registry lock is released before the call, so a blocking
    /// notification write during dialing does not serialize unrelated
    /// calls against each other.
    pub fn dial(&self, src: &Arc<Tu<S>>, target_ext: i32) {
        let target = {
            let state = self.state.lock().unwrap();
            target_ext
                .try_into()
                .ok()
                .and_then(|idx: usize| state.slots.get(idx))
                .and_then(|slot| slot.clone())
        };
        src.dial(target.as_ref());
    }

    /// Closes every registered TU's connection, then blocks until the last
    /// one has unregistered. A one-shot guard makes a second call a no-op:
    /// without it, a repeat call would re-signal `shutdown` on TUs already
    /// torn down, or wait on a condvar nobody will notify again.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut state = self.state.lock().unwrap();
        for tu in state.slots.iter().flatten() {
            if let Err(e) = tu.shutdown() {
                tracing::warn!(tu = tu.id(), error = %e, "failed to shut down TU connection");
            }
        }
        while state.active != 0 {
            state = self.quiescent.wait(state).unwrap();
        }
        tracing::info!("registry quiescent");
    }

    /// Number of currently registered TUs. Exposed for tests.
    pub fn active_count(&self) -> usize {
        self.state.lock().unwrap().active
    }
}
