//! A single telephone unit: its state, peer link, and client sink.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use pbx_proto::notification::render_chat;
use pbx_proto::Notification;

use crate::sink::ClientSink;
use crate::state::TuState;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

struct TuInner<S: ClientSink> {
    ext: i32,
    state: TuState,
    peer: Option<Arc<Tu<S>>>,
    sink: S,
}

/// One telephone unit. Always handled behind an `Arc`, whose strong count
/// realizes the reference count a registered, possibly call-bound, TU
/// needs: one clone held by the registry slot, one by each end of an
/// active call's peer link, one by the owning session.
pub struct Tu<S: ClientSink> {
    id: u64,
    inner: Mutex<TuInner<S>>,
    shutdown_sink: S,
}

/// Locks two TUs' state mutexes in a fixed, process-wide order (by `id`)
/// regardless of call order, so two threads locking the same pair never
/// deadlock. Returns `(x`'s guard, `y`'s guard)` no matter which physical
/// mutex was taken first.
fn lock_two<'a, S: ClientSink>(
    x: &'a Tu<S>,
    y: &'a Tu<S>,
) -> (MutexGuard<'a, TuInner<S>>, MutexGuard<'a, TuInner<S>>) {
    if x.id < y.id {
        let gx = x.inner.lock().unwrap();
        let gy = y.inner.lock().unwrap();
        (gx, gy)
    } else {
        let gy = y.inner.lock().unwrap();
        let gx = x.inner.lock().unwrap();
        (gx, gy)
    }
}

fn notify<S: ClientSink>(id: u64, inner: &mut TuInner<S>, peer_ext_if_connected: Option<i32>) {
    let note = match inner.state {
        TuState::OnHook => Notification::OnHook { ext: inner.ext },
        TuState::Ringing => Notification::Ringing,
        TuState::DialTone => Notification::DialTone,
        TuState::RingBack => Notification::RingBack,
        TuState::BusySignal => Notification::BusySignal,
        TuState::Connected => Notification::Connected {
            peer_ext: peer_ext_if_connected.unwrap_or(-1),
        },
        TuState::Error => Notification::Error,
    };
    let line = note.render();
    tracing::debug!(tu = id, state = ?inner.state, "notify");
    if let Err(e) = inner.sink.write_all(line.as_bytes()) {
        tracing::warn!(tu = id, error = %e, "failed to write notification");
    }
}

impl<S: ClientSink> Tu<S> {
    /// Builds a new, unregistered TU in the `OnHook` state. `sink` is the
    /// handle used for notification writes; `shutdown_sink` is a second,
    /// unlocked handle over the same connection used purely to force the
    /// connection closed during registry shutdown (see `Tu::shutdown`).
    pub fn new(sink: S, shutdown_sink: S) -> Arc<Self> {
        Arc::new(Tu {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            inner: Mutex::new(TuInner {
                ext: -1,
                state: TuState::OnHook,
                peer: None,
                sink,
            }),
            shutdown_sink,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn extension(&self) -> i32 {
        self.inner.lock().unwrap().ext
    }

    pub fn state(&self) -> TuState {
        self.inner.lock().unwrap().state
    }

    /// Forcibly closes the underlying connection without taking this TU's
    /// state lock, unblocking a session stuck reading from it.
    pub fn shutdown(&self) -> std::io::Result<()> {
        self.shutdown_sink.shutdown()
    }

    /// Assigns this TU's extension. Called exactly once, by the registry,
    /// while the registry lock is held (nesting this TU's lock inside it).
    pub(crate) fn set_extension(self: &Arc<Self>, ext: i32) {
        let mut inner = self.inner.lock().unwrap();
        inner.ext = ext;
        notify(self.id, &mut inner, None);
    }

    pub fn pickup(self: &Arc<Self>) {
        loop {
            let mut inner = self.inner.lock().unwrap();
            match inner.state {
                TuState::OnHook => {
                    inner.state = TuState::DialTone;
                    notify(self.id, &mut inner, None);
                    return;
                }
                TuState::Ringing => {
                    let Some(peer) = inner.peer.clone() else {
                        notify(self.id, &mut inner, None);
                        return;
                    };
                    drop(inner);
                    if self.pickup_paired(&peer) {
                        return;
                    }
                }
                _ => {
                    notify(self.id, &mut inner, None);
                    return;
                }
            }
        }
    }

    fn pickup_paired(self: &Arc<Self>, peer: &Arc<Tu<S>>) -> bool {
        let (mut a, mut b) = lock_two(self, peer);
        let still_ringing = a.state == TuState::Ringing
            && matches!(&a.peer, Some(p) if Arc::ptr_eq(p, peer));
        if !still_ringing {
            return false;
        }
        a.state = TuState::Connected;
        b.state = TuState::Connected;
        let peer_ext = b.ext;
        let self_ext = a.ext;
        notify(self.id, &mut a, Some(peer_ext));
        notify(peer.id, &mut b, Some(self_ext));
        true
    }

    pub fn hangup(self: &Arc<Self>) {
        loop {
            let mut inner = self.inner.lock().unwrap();
            match inner.state {
                TuState::OnHook => {
                    notify(self.id, &mut inner, None);
                    return;
                }
                TuState::DialTone | TuState::BusySignal | TuState::Error => {
                    inner.state = TuState::OnHook;
                    notify(self.id, &mut inner, None);
                    return;
                }
                TuState::Connected | TuState::Ringing | TuState::RingBack => {
                    let Some(peer) = inner.peer.clone() else {
                        inner.state = TuState::OnHook;
                        notify(self.id, &mut inner, None);
                        return;
                    };
                    drop(inner);
                    if self.hangup_paired(&peer) {
                        return;
                    }
                }
            }
        }
    }

    fn hangup_paired(self: &Arc<Self>, peer: &Arc<Tu<S>>) -> bool {
        let (mut a, mut b) = lock_two(self, peer);
        let linked = matches!(&a.peer, Some(p) if Arc::ptr_eq(p, peer));
        if !linked {
            return false;
        }
        let peer_was_connected = b.state == TuState::Connected;
        a.state = TuState::OnHook;
        b.state = if peer_was_connected {
            TuState::DialTone
        } else {
            TuState::OnHook
        };
        a.peer = None;
        b.peer = None;
        notify(self.id, &mut a, None);
        notify(peer.id, &mut b, None);
        true
    }

    /// Attempts to dial `target` (`None` if the extension did not resolve
    /// to any registered TU). `target` is resolved by the registry under
    /// its own lock before this call, so no retry is needed here: nothing
    /// else can be concurrently rewriting which TU `target` refers to.
    pub fn dial(self: &Arc<Self>, target: Option<&Arc<Tu<S>>>) {
        match target {
            None => {
                let mut inner = self.inner.lock().unwrap();
                if inner.state != TuState::DialTone {
                    notify(self.id, &mut inner, None);
                    return;
                }
                inner.state = TuState::Error;
                notify(self.id, &mut inner, None);
            }
            Some(target) if Arc::ptr_eq(self, target) => {
                let mut inner = self.inner.lock().unwrap();
                if inner.state != TuState::DialTone {
                    notify(self.id, &mut inner, None);
                    return;
                }
                inner.state = TuState::BusySignal;
                notify(self.id, &mut inner, None);
            }
            Some(target) => {
                let (mut a, mut b) = lock_two(self, target);
                if a.state != TuState::DialTone {
                    notify(self.id, &mut a, None);
                    return;
                }
                if b.peer.is_some() || b.state != TuState::OnHook {
                    a.state = TuState::BusySignal;
                    notify(self.id, &mut a, None);
                    return;
                }
                a.peer = Some(Arc::clone(target));
                b.peer = Some(Arc::clone(self));
                a.state = TuState::RingBack;
                b.state = TuState::Ringing;
                notify(self.id, &mut a, None);
                notify(target.id, &mut b, None);
            }
        }
    }

    pub fn chat(self: &Arc<Self>, msg: &str) {
        loop {
            let mut inner = self.inner.lock().unwrap();
            if inner.state != TuState::Connected {
                notify(self.id, &mut inner, None);
                return;
            }
            let Some(peer) = inner.peer.clone() else {
                notify(self.id, &mut inner, None);
                return;
            };
            drop(inner);
            if self.chat_paired(&peer, msg) {
                return;
            }
        }
    }

    fn chat_paired(self: &Arc<Self>, peer: &Arc<Tu<S>>, msg: &str) -> bool {
        let (mut a, mut b) = lock_two(self, peer);
        let linked = a.state == TuState::Connected
            && matches!(&a.peer, Some(p) if Arc::ptr_eq(p, peer));
        if !linked {
            return false;
        }
        let peer_ext = b.ext;
        notify(self.id, &mut a, Some(peer_ext));
        let line = render_chat(msg);
        if let Err(e) = b.sink.write_all(line.as_bytes()) {
            tracing::warn!(tu = peer.id, error = %e, "failed to write chat line");
        }
        true
    }
}
