//! Inbound line classification and reply formatting
//!
//! A connection's first non-empty line fixes its role: lines starting with
//! `:` come from a message bridge forwarding pre-formatted chat lines, every
//! other line is a client-protocol command. Channel names are opaque tokens;
//! matching is exact-string with no case folding.

use super::constants::{SERVER_IDENT, WELCOME_BANNER};

/// A parsed bridge line: `:<origin> PRIVMSG <channel> <trailing>`
///
/// The raw line is broadcast verbatim; these fields exist for validation
/// and logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedMessage<'a> {
    /// Origin prefix with the leading `:` stripped
    pub origin: &'a str,
    /// Target channel, exactly as it appeared on the wire
    pub channel: &'a str,
    /// Remainder of the line, internal spaces preserved
    pub trailing: &'a str,
}

/// A client-protocol command in steady state
///
/// `NICK` is not classified here: it is only meaningful as the line
/// immediately following `PASS` and is parsed by [`parse_nick`] while the
/// session is in that state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand<'a> {
    /// `PASS <anything>` (the password value is never validated)
    Pass,
    /// Well-formed `JOIN <ch1>[,<ch2>,...]`
    Join(Vec<&'a str>),
    /// A line starting with `JOIN` that is not exactly two tokens
    MalformedJoin,
    /// Anything else (`CAP`, `USER`, `PING`, ...), tolerated and ignored
    Other,
}

/// Split one whitespace-run-delimited token off the front of `s`,
/// returning the token and the unconsumed remainder.
fn split_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(end) => Some((&s[..end], &s[end..])),
        None => Some((s, "")),
    }
}

/// Parse a bridge line into its four fields.
///
/// Returns `None` unless the line is exactly `:<origin> PRIVMSG <channel>
/// <trailing>` with a non-empty trailing part. Fields are separated by runs
/// of whitespace; only the trailing part keeps its internal spacing.
/// Callers treat `None` as report-and-ignore, not as a connection-fatal
/// error.
pub fn parse_forward(line: &str) -> Option<ForwardedMessage<'_>> {
    if !line.starts_with(':') {
        return None;
    }

    let (origin, rest) = split_token(line)?;
    let (command, rest) = split_token(rest)?;
    let (channel, rest) = split_token(rest)?;
    let trailing = rest.trim();

    if command != "PRIVMSG" || trailing.is_empty() {
        return None;
    }

    Some(ForwardedMessage {
        origin: &origin[1..],
        channel,
        trailing,
    })
}

/// Classify a steady-state client line.
pub fn parse_command(line: &str) -> ClientCommand<'_> {
    if line.starts_with("PASS") {
        return ClientCommand::Pass;
    }

    if line.starts_with("JOIN") {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() == 2 && tokens[0] == "JOIN" {
            return ClientCommand::Join(tokens[1].split(',').collect());
        }
        return ClientCommand::MalformedJoin;
    }

    ClientCommand::Other
}

/// Parse the line expected immediately after `PASS`.
///
/// Accepts exactly two whitespace-separated tokens `NICK <nickname>`;
/// anything else is a fatal authentication error for the caller.
pub fn parse_nick(line: &str) -> Option<&str> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["NICK", nickname] => Some(nickname),
        _ => None,
    }
}

/// Render the 7-line welcome banner for a freshly authenticated nickname.
pub fn welcome_banner(nickname: &str) -> Vec<String> {
    WELCOME_BANNER
        .iter()
        .map(|(numeric, text)| format!(":{} {:03} {} :{}", SERVER_IDENT, numeric, nickname, text))
        .collect()
}

/// Render the two-line join reply: JOIN echo plus the single-member 353
/// names listing containing only the joiner.
pub fn join_reply(nickname: &str, channel: &str) -> [String; 2] {
    [
        format!(
            ":{nick}!{nick}@{nick}.{server} JOIN {channel}",
            nick = nickname,
            server = SERVER_IDENT,
            channel = channel
        ),
        format!(
            ":{nick}.{server} 353 {nick} = {channel} :{nick}",
            nick = nickname,
            server = SERVER_IDENT,
            channel = channel
        ),
    ]
}

/// Render a bridge-formatted forward line for `origin` into `#<channel>`.
///
/// This is the producer-side counterpart of [`parse_forward`]; the `#` is
/// prepended here, matching the upstream adapter's formatting.
pub fn format_forward(origin: &str, channel: &str, text: &str) -> String {
    format!(
        ":{origin}!{origin}@{origin}.{server} PRIVMSG #{channel} :{text}",
        origin = origin,
        server = SERVER_IDENT,
        channel = channel,
        text = text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forward_valid() {
        let line = ":alice!alice@alice.tmi.twitch.tv PRIVMSG #lobby :hello there";
        let msg = parse_forward(line).unwrap();

        assert_eq!(msg.origin, "alice!alice@alice.tmi.twitch.tv");
        assert_eq!(msg.channel, "#lobby");
        assert_eq!(msg.trailing, ":hello there");
    }

    #[test]
    fn test_parse_forward_preserves_internal_spaces() {
        let line = ":a PRIVMSG #c :one two  three";
        let msg = parse_forward(line).unwrap();

        assert_eq!(msg.trailing, ":one two  three");
    }

    #[test]
    fn test_parse_forward_tolerates_whitespace_runs() {
        // Fields may be separated by runs of whitespace, not single spaces
        let msg = parse_forward(":a  PRIVMSG #c :x").unwrap();
        assert_eq!(msg.origin, "a");
        assert_eq!(msg.channel, "#c");
        assert_eq!(msg.trailing, ":x");

        let msg = parse_forward(":a\tPRIVMSG  #c  :tabbed out").unwrap();
        assert_eq!(msg.channel, "#c");
        assert_eq!(msg.trailing, ":tabbed out");
    }

    #[test]
    fn test_parse_forward_rejects_wrong_shape() {
        // Not PRIVMSG
        assert!(parse_forward(":a NOTICE #c :x").is_none());
        // Too few fields
        assert!(parse_forward(":a PRIVMSG #c").is_none());
        // No prefix at all
        assert!(parse_forward("a PRIVMSG #c :x").is_none());
        // Empty trailing
        assert!(parse_forward(":a PRIVMSG #c  ").is_none());
    }

    #[test]
    fn test_parse_forward_does_not_validate_channel_prefix() {
        // The '#' check is the caller's (connection-fatal) concern
        let msg = parse_forward(":a PRIVMSG nohash :x").unwrap();
        assert_eq!(msg.channel, "nohash");
    }

    #[test]
    fn test_parse_command_pass() {
        assert_eq!(parse_command("PASS oauth:whatever"), ClientCommand::Pass);
        // Prefix match only, like the upstream service
        assert_eq!(parse_command("PASS"), ClientCommand::Pass);
    }

    #[test]
    fn test_parse_command_join() {
        assert_eq!(
            parse_command("JOIN #lobby"),
            ClientCommand::Join(vec!["#lobby"])
        );
        assert_eq!(
            parse_command("JOIN #a,#b,#c"),
            ClientCommand::Join(vec!["#a", "#b", "#c"])
        );
    }

    #[test]
    fn test_parse_command_malformed_join() {
        assert_eq!(parse_command("JOIN"), ClientCommand::MalformedJoin);
        assert_eq!(parse_command("JOIN #a #b"), ClientCommand::MalformedJoin);
    }

    #[test]
    fn test_parse_command_unknown_tolerated() {
        assert_eq!(
            parse_command("CAP REQ :twitch.tv/tags"),
            ClientCommand::Other
        );
        assert_eq!(parse_command("PING :tmi.twitch.tv"), ClientCommand::Other);
        assert_eq!(parse_command("NICK loner"), ClientCommand::Other);
    }

    #[test]
    fn test_parse_nick() {
        assert_eq!(parse_nick("NICK bob"), Some("bob"));
        assert_eq!(parse_nick("NICK"), None);
        assert_eq!(parse_nick("NICK bob extra"), None);
        assert_eq!(parse_nick("USER bob"), None);
    }

    #[test]
    fn test_welcome_banner_shape() {
        let banner = welcome_banner("bob");

        assert_eq!(banner.len(), 7);
        assert_eq!(banner[0], ":tmi.twitch.tv 001 bob :Welcome, GLHF!");
        assert_eq!(banner[6], ":tmi.twitch.tv 376 bob :>");
        assert!(banner.iter().all(|l| l.contains("bob")));
    }

    #[test]
    fn test_join_reply_shape() {
        let [echo, names] = join_reply("bob", "#lobby");

        assert_eq!(echo, ":bob!bob@bob.tmi.twitch.tv JOIN #lobby");
        assert_eq!(names, ":bob.tmi.twitch.tv 353 bob = #lobby :bob");
    }

    #[test]
    fn test_format_forward_round_trips() {
        let line = format_forward("alice", "lobby", "hello there");
        let msg = parse_forward(&line).unwrap();

        assert_eq!(msg.channel, "#lobby");
        assert_eq!(msg.trailing, ":hello there");
    }
}
