//! The TU state machine's states.

/// A TU's call state. See the pairing rules enforced by `Tu::pickup`,
/// `Tu::hangup`, and `Tu::dial`: `peer` is `Some` iff the state is one of
/// `Ringing`, `RingBack`, or `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuState {
    OnHook,
    Ringing,
    DialTone,
    RingBack,
    BusySignal,
    Connected,
    Error,
}
