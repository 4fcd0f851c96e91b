//! Parsing of inbound client command lines.

/// A single parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pickup,
    Hangup,
    Dial(i32),
    Chat(String),
}

/// Parses one command line.
///
/// `line` must already have its trailing LF removed; a trailing CR, if
/// still present, is stripped here. Unrecognized input, or a `dial`
/// argument that does not parse as a decimal integer, yields `None` —
/// callers ignore such lines rather than treating them as an error.
///
/// `dial` and `chat` are deliberately asymmetric about the delimiter
/// between the command word and its argument, matching `server.c`'s
/// `pbx_client_service`: `dial` requires a space (and something after
/// it) before it will even attempt to parse a target extension, but
/// `chat` only matches on the literal prefix `"chat"` and then skips
/// any leading spaces from there — so `"chatters"` is a `chat` command
/// with message `"ters"`, not an unrecognized line.
pub fn parse(line: &str) -> Option<Command> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line == "pickup" {
        return Some(Command::Pickup);
    }
    if line == "hangup" {
        return Some(Command::Hangup);
    }
    if let Some(rest) = line.strip_prefix("dial ") {
        let ext: i32 = rest.trim_start().parse().ok()?;
        return Some(Command::Dial(ext));
    }
    if let Some(rest) = line.strip_prefix("chat") {
        let msg = rest.trim_start_matches(' ');
        return Some(Command::Chat(msg.to_string()));
    }

    None
}
