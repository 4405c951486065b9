//! Command line arguments

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use spaceroom_core::ConversationKind;

/// Conversation used when a replay does not name one
pub const REPLAY_CONVERSATION: &str = "replay";

/// Terminal client for SpaceRoom conversations.
///
/// Prints the reconciled transcript after every push event.
#[derive(Parser, Debug)]
#[command(name = "spaceroom-chat", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Feed a file of JSON push events, one per line
    Replay {
        /// Event file (JSON lines, `#` comments allowed)
        path: PathBuf,

        /// Conversation whose events are shown
        #[arg(long, default_value = REPLAY_CONVERSATION)]
        conversation: String,

        /// Viewing user, for own-message and read receipt display
        #[arg(long)]
        user: Option<String>,

        /// One-to-one conversation (shows read receipts)
        #[arg(long)]
        direct: bool,
    },

    /// Follow a live push channel and send stdin lines
    Connect {
        /// Push server address
        addr: SocketAddr,

        conversation: String,

        user: String,

        /// One-to-one conversation (shows read receipts)
        #[arg(long)]
        direct: bool,
    },
}

pub fn conversation_kind(direct: bool) -> ConversationKind {
    if direct {
        ConversationKind::Direct
    } else {
        ConversationKind::Group
    }
}

/// Process exit code for a failed parse: 0 for help/version output, 2 otherwise
pub fn exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        let argv = std::iter::once("spaceroom-chat").chain(args.iter().copied());
        Cli::try_parse_from(argv).map(|cli| cli.command)
    }

    #[test]
    fn test_parse_replay_defaults() {
        let cmd = parse(&["replay", "events.jsonl"]).unwrap();
        assert_eq!(
            cmd,
            Command::Replay {
                path: PathBuf::from("events.jsonl"),
                conversation: REPLAY_CONVERSATION.to_string(),
                user: None,
                direct: false,
            }
        );
    }

    #[test]
    fn test_parse_replay_with_flags() {
        let cmd = parse(&[
            "replay",
            "e.jsonl",
            "--user",
            "me",
            "--direct",
            "--conversation",
            "dm-1",
        ])
        .unwrap();
        match cmd {
            Command::Replay {
                conversation,
                user,
                direct,
                ..
            } => {
                assert_eq!(conversation, "dm-1");
                assert_eq!(user.as_deref(), Some("me"));
                assert_eq!(conversation_kind(direct), ConversationKind::Direct);
            }
            other => panic!("Expected replay, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_connect() {
        let cmd = parse(&["connect", "127.0.0.1:7340", "course-42", "me"]).unwrap();
        match cmd {
            Command::Connect {
                addr,
                conversation,
                user,
                direct,
            } => {
                assert_eq!(addr.port(), 7340);
                assert_eq!(conversation, "course-42");
                assert_eq!(user, "me");
                assert_eq!(conversation_kind(direct), ConversationKind::Group);
            }
            other => panic!("Expected connect, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors_exit_with_usage_code() {
        let cases: &[&[&str]] = &[
            &[],
            &["replay"],
            &["connect", "not-an-addr", "c", "u"],
            &["replay", "e.jsonl", "--user"],
            &["replay", "e.jsonl", "--verbose"],
        ];
        for args in cases {
            let err = parse(args).unwrap_err();
            assert_eq!(exit_code(&err), 2, "args: {:?}", args);
        }
    }

    #[test]
    fn test_help_exits_cleanly() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(exit_code(&err), 0);
    }
}
