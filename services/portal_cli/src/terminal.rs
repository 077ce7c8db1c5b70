//! Text rendering of the portal screen and command parsing

use gif_portal::{Body, Notifier, Screen};
use std::fmt::Write;

pub const HELP: &str = "\
Commands:
  connect      Connect to Wallet
  init         Do One-Time Initialization For GIF Program Account
  add <link>   Submit a gif link
  refresh      Re-read the GIF list
  disconnect   Forget the connected wallet
  help         Show this help
  quit         Exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Initialize,
    Add(String),
    Refresh,
    Disconnect,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        let command = match word.to_ascii_lowercase().as_str() {
            "connect" | "c" => Command::Connect,
            "init" | "initialize" => Command::Initialize,
            "add" | "a" | "submit" => Command::Add(rest.trim().to_string()),
            "refresh" | "r" => Command::Refresh,
            "disconnect" => Command::Disconnect,
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(word.to_string()),
        };
        Some(command)
    }
}

/// Draw the screen as plain text
pub fn draw(screen: &Screen, busy: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", screen.header);
    let _ = writeln!(out, "{}", screen.sub_text);
    if let Some(address) = &screen.wallet_address {
        let _ = writeln!(out, "Wallet: {address}");
    }
    let _ = writeln!(out);

    match &screen.body {
        Body::ConnectButton => {
            let _ = writeln!(out, "[connect] Connect to Wallet");
        }
        Body::Connecting => {
            let _ = writeln!(out, "Connecting...");
        }
        Body::InitializeButton => {
            let _ = writeln!(out, "[init] Do One-Time Initialization For GIF Program Account");
        }
        Body::MissingStorage { storage_address } => {
            let _ = writeln!(out, "GIF storage account {storage_address} is not initialized.");
            let _ = writeln!(out, "Run with --deploy-new-storage to create it.");
        }
        Body::Gallery { placeholder, gifs } => {
            let _ = writeln!(out, "[add <link>] {placeholder}");
            if gifs.is_empty() {
                let _ = writeln!(out, "  (no gifs yet)");
            }
            for (i, gif) in gifs.iter().enumerate() {
                let _ = writeln!(out, "  {:>3}. {}  by {}", i + 1, gif.gif_link, gif.user_address);
            }
        }
    }

    if busy {
        let _ = writeln!(out, "(submitting...)");
    }
    let _ = writeln!(out);
    let _ = write!(out, "{} ({})", screen.footer.text, screen.footer.link);
    out
}

/// Prints alerts to the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        tracing::warn!("{}", message);
        println!("! {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gif_portal::{
        view::{Footer, HEADER, INPUT_PLACEHOLDER, SUB_TEXT},
        GifEntry, Identity,
    };
    use solana_sdk::pubkey::Pubkey;

    fn screen(body: Body, wallet_address: Option<Identity>) -> Screen {
        Screen {
            header: HEADER,
            sub_text: SUB_TEXT,
            wallet_address,
            body,
            footer: Footer::default(),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("   "), None);
        assert_eq!(Command::parse("connect"), Some(Command::Connect));
        assert_eq!(Command::parse("INIT"), Some(Command::Initialize));
        assert_eq!(
            Command::parse("add  https://media.giphy.com/a.gif "),
            Some(Command::Add("https://media.giphy.com/a.gif".to_string()))
        );
        assert_eq!(Command::parse("add"), Some(Command::Add(String::new())));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(
            Command::parse("dance now"),
            Some(Command::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn test_draw_disconnected() {
        let text = draw(&screen(Body::ConnectButton, None), false);
        assert!(text.contains(HEADER));
        assert!(text.contains("Connect to Wallet"));
        assert!(!text.contains("Wallet:"));
        assert!(text.ends_with("built on @_buildspace (https://twitter.com/_buildspace)"));
    }

    #[test]
    fn test_draw_gallery() {
        let user = Pubkey::new_unique();
        let body = Body::Gallery {
            placeholder: INPUT_PLACEHOLDER,
            gifs: vec![GifEntry {
                gif_link: "https://a.gif".to_string(),
                user_address: user,
            }],
        };
        let text = draw(&screen(body, Some(Identity::from(user))), true);

        assert!(text.contains(&format!("Wallet: {user}")));
        assert!(text.contains(INPUT_PLACEHOLDER));
        assert!(text.contains("  1. https://a.gif"));
        assert!(text.contains("(submitting...)"));
    }

    #[test]
    fn test_draw_missing_storage() {
        let storage_address = Pubkey::new_unique();
        let text = draw(
            &screen(
                Body::MissingStorage { storage_address },
                Some(Identity::from(Pubkey::new_unique())),
            ),
            false,
        );
        assert!(text.contains(&storage_address.to_string()));
        assert!(!text.contains("One-Time Initialization"));
    }
}
