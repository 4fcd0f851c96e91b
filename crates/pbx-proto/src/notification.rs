//! Rendering of outbound state-notification lines.

use crate::EOL;

/// The state-notification a TU's client is told about after an operation.
///
/// Mirrors a TU's state machine, carrying the extra data each line needs:
/// `OnHook` carries the TU's own extension, `Connected` the peer's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    OnHook { ext: i32 },
    Ringing,
    DialTone,
    RingBack,
    BusySignal,
    Connected { peer_ext: i32 },
    Error,
}

impl Notification {
    /// Renders the line this notification puts on the wire, including the
    /// trailing [`EOL`].
    pub fn render(&self) -> String {
        match self {
            Notification::OnHook { ext } => format!("ON HOOK {ext}{EOL}"),
            Notification::Ringing => format!("RINGING{EOL}"),
            Notification::DialTone => format!("DIAL TONE{EOL}"),
            Notification::RingBack => format!("RING BACK{EOL}"),
            Notification::BusySignal => format!("BUSY SIGNAL{EOL}"),
            Notification::Connected { peer_ext } => format!("CONNECTED {peer_ext}{EOL}"),
            Notification::Error => format!("ERROR{EOL}"),
        }
    }
}

/// Renders a `CHAT <msg>` line delivered to a TU's peer.
pub fn render_chat(msg: &str) -> String {
    format!("CHAT {msg}{EOL}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_state_line() {
        assert_eq!(Notification::OnHook { ext: 4 }.render(), "ON HOOK 4\r\n");
        assert_eq!(Notification::Ringing.render(), "RINGING\r\n");
        assert_eq!(Notification::DialTone.render(), "DIAL TONE\r\n");
        assert_eq!(Notification::RingBack.render(), "RING BACK\r\n");
        assert_eq!(Notification::BusySignal.render(), "BUSY SIGNAL\r\n");
        assert_eq!(
            Notification::Connected { peer_ext: 5 }.render(),
            "CONNECTED 5\r\n"
        );
        assert_eq!(Notification::Error.render(), "ERROR\r\n");
    }

    #[test]
    fn renders_chat_line() {
        assert_eq!(render_chat("hello"), "CHAT hello\r\n");
        assert_eq!(render_chat(""), "CHAT \r\n");
    }
}
