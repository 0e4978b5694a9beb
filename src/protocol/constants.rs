//! Protocol constants
//!
//! Fixed strings of the TMI (Twitch Messaging Interface) subset the relay
//! speaks. Replies are framed exactly as the upstream service frames them so
//! off-the-shelf IRC clients accept them.

/// Synthetic server identity used as the origin of all server replies
pub const SERVER_IDENT: &str = "tmi.twitch.tv";

/// Default listening port (standard IRC)
pub const DEFAULT_PORT: u16 = 6667;

/// Line terminator for the wire protocol
pub const LINE_TERMINATOR: &str = "\r\n";

/// Notice sent before closing when PASS arrives on an authenticated connection
pub const NOTICE_AUTH_FAILED: &str = ":tmi.twitch.tv NOTICE * :Login authentication failed";

/// Notice sent before closing when the line after PASS is not a valid NICK
pub const NOTICE_AUTH_IMPROPER: &str = ":tmi.twitch.tv NOTICE * :Improperly formatted auth";

/// Numeric/text pairs of the welcome banner, in send order
///
/// Each entry becomes `:tmi.twitch.tv <numeric> <nickname> :<text>`.
pub const WELCOME_BANNER: [(u16, &str); 7] = [
    (1, "Welcome, GLHF!"),
    (2, "Your host is tmi.twitch.tv"),
    (3, "This server is rather new"),
    (4, "-"),
    (375, "-"),
    (372, "You are in a maze of twisty passages, all alike."),
    (376, ">"),
];
