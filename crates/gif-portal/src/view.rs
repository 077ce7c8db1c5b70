//! View state machine and screen model

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::{
    types::{GifEntry, GifList, Identity},
    StorageMode,
};

pub const HEADER: &str = "🖼 GIF Portal";
pub const SUB_TEXT: &str = "View your GIF collection in the metaverse ✨";
pub const TWITTER_HANDLE: &str = "_buildspace";
pub const INPUT_PLACEHOLDER: &str = "Enter gif link!";

/// Connection phase of the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    #[default]
    Disconnected,
    Connecting,
    ConnectedNoAccount,
    ConnectedHasList,
}

/// Everything the screen is rendered from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    phase: Phase,
    wallet_address: Option<Identity>,
    gif_list: GifList,
}

impl ViewState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn wallet_address(&self) -> Option<&Identity> {
        self.wallet_address.as_ref()
    }

    pub fn gif_list(&self) -> &GifList {
        &self.gif_list
    }

    pub fn is_connected(&self) -> bool {
        self.wallet_address.is_some()
    }

    /// A connect or restore attempt started
    pub fn begin_connecting(&mut self) {
        if self.wallet_address.is_none() {
            self.phase = Phase::Connecting;
        }
    }

    /// The attempt ended without an identity
    pub fn connection_failed(&mut self) {
        if self.wallet_address.is_none() {
            self.phase = Phase::Disconnected;
        }
    }

    /// A pending restore was abandoned. Never leaves the view in `Connecting`:
    /// without an identity it falls back to `Disconnected`, with one the
    /// unfinished fetch counts as a failed read.
    pub fn restore_cancelled(&mut self) {
        if self.phase != Phase::Connecting {
            return;
        }
        if self.wallet_address.is_none() {
            self.phase = Phase::Disconnected;
        } else {
            self.apply_gif_list(GifList::Uninitialized);
        }
    }

    /// Identity acquired; the list is fetched next. Returns false if an identity
    /// was already set for this session.
    pub fn connected(&mut self, identity: Identity) -> bool {
        if self.wallet_address.is_some() {
            return false;
        }
        self.wallet_address = Some(identity);
        self.phase = Phase::Connecting;
        true
    }

    /// Replace the list wholesale after a read
    pub fn apply_gif_list(&mut self, gif_list: GifList) {
        if self.wallet_address.is_none() {
            return;
        }
        self.phase = if gif_list.is_uninitialized() {
            Phase::ConnectedNoAccount
        } else {
            Phase::ConnectedHasList
        };
        self.gif_list = gif_list;
    }

    pub fn disconnect(&mut self) {
        *self = Self::default();
    }

    pub fn render(&self, storage_mode: StorageMode, storage_address: Pubkey) -> Screen {
        let body = match (self.phase, &self.gif_list) {
            (Phase::Disconnected, _) => Body::ConnectButton,
            (Phase::Connecting, _) => Body::Connecting,
            (Phase::ConnectedNoAccount, _) | (Phase::ConnectedHasList, GifList::Uninitialized) => {
                match storage_mode {
                    StorageMode::DeployNew => Body::InitializeButton,
                    StorageMode::UseExisting => Body::MissingStorage { storage_address },
                }
            }
            (Phase::ConnectedHasList, GifList::Loaded(entries)) => Body::Gallery {
                placeholder: INPUT_PLACEHOLDER,
                gifs: entries.clone(),
            },
        };

        Screen {
            header: HEADER,
            sub_text: SUB_TEXT,
            wallet_address: self.wallet_address.clone(),
            body,
            footer: Footer::default(),
        }
    }
}

/// Rendered screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screen {
    pub header: &'static str,
    pub sub_text: &'static str,
    pub wallet_address: Option<Identity>,
    pub body: Body,
    pub footer: Footer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Body {
    ConnectButton,
    Connecting,
    InitializeButton,
    MissingStorage { storage_address: Pubkey },
    Gallery {
        placeholder: &'static str,
        gifs: Vec<GifEntry>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footer {
    pub text: String,
    pub link: String,
}

impl Default for Footer {
    fn default() -> Self {
        Self {
            text: format!("built on @{TWITTER_HANDLE}"),
            link: format!("https://twitter.com/{TWITTER_HANDLE}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::from(Pubkey::new_unique())
    }

    fn entry(link: &str) -> GifEntry {
        GifEntry {
            gif_link: link.to_string(),
            user_address: Pubkey::new_unique(),
        }
    }

    #[test]
    fn test_initial_state_shows_connect_button() {
        let state = ViewState::default();
        assert_eq!(state.phase(), Phase::Disconnected);
        assert_eq!(
            state.render(StorageMode::DeployNew, Pubkey::new_unique()).body,
            Body::ConnectButton
        );
    }

    #[test]
    fn test_connect_then_fetch_branches_on_sentinel() {
        let mut state = ViewState::default();
        state.begin_connecting();
        assert_eq!(state.phase(), Phase::Connecting);

        assert!(state.connected(identity()));
        state.apply_gif_list(GifList::Uninitialized);
        assert_eq!(state.phase(), Phase::ConnectedNoAccount);
        assert_eq!(
            state.render(StorageMode::DeployNew, Pubkey::new_unique()).body,
            Body::InitializeButton
        );

        state.apply_gif_list(GifList::Loaded(vec![entry("https://a.gif")]));
        assert_eq!(state.phase(), Phase::ConnectedHasList);
    }

    #[test]
    fn test_failed_attempt_returns_to_disconnected() {
        let mut state = ViewState::default();
        state.begin_connecting();
        state.connection_failed();
        assert_eq!(state.phase(), Phase::Disconnected);
        assert!(state.wallet_address().is_none());
    }

    #[test]
    fn test_cancelled_restore_leaves_connecting() {
        let mut state = ViewState::default();
        state.begin_connecting();
        state.restore_cancelled();
        assert_eq!(state.phase(), Phase::Disconnected);

        let mut state = ViewState::default();
        state.connected(identity());
        state.restore_cancelled();
        assert_eq!(state.phase(), Phase::ConnectedNoAccount);
        assert!(state.gif_list().is_uninitialized());

        // Settled states are untouched
        let mut state = ViewState::default();
        state.connected(identity());
        state.apply_gif_list(GifList::Loaded(vec![entry("https://a.gif")]));
        let before = state.clone();
        state.restore_cancelled();
        assert_eq!(state, before);
    }

    #[test]
    fn test_identity_is_set_once() {
        let first = identity();
        let mut state = ViewState::default();
        assert!(state.connected(first.clone()));
        assert!(!state.connected(identity()));
        assert_eq!(state.wallet_address(), Some(&first));
    }

    #[test]
    fn test_list_ignored_without_identity() {
        let mut state = ViewState::default();
        state.apply_gif_list(GifList::Loaded(vec![entry("https://a.gif")]));
        assert_eq!(state, ViewState::default());
    }

    #[test]
    fn test_existing_storage_mode_hides_initialize() {
        let storage_address = Pubkey::new_unique();
        let mut state = ViewState::default();
        state.connected(identity());
        state.apply_gif_list(GifList::Uninitialized);

        assert_eq!(
            state.render(StorageMode::UseExisting, storage_address).body,
            Body::MissingStorage { storage_address }
        );
    }

    #[test]
    fn test_gallery_and_footer() {
        let mut state = ViewState::default();
        state.connected(identity());
        state.apply_gif_list(GifList::Loaded(vec![entry("https://a.gif"), entry("https://b.gif")]));

        let screen = state.render(StorageMode::UseExisting, Pubkey::new_unique());
        match screen.body {
            Body::Gallery { placeholder, gifs } => {
                assert_eq!(placeholder, INPUT_PLACEHOLDER);
                assert_eq!(gifs[1].gif_link, "https://b.gif");
            }
            other => panic!("Expected gallery, got {other:?}"),
        }
        assert_eq!(screen.footer.link, "https://twitter.com/_buildspace");
    }

    #[test]
    fn test_disconnect_resets() {
        let mut state = ViewState::default();
        state.connected(identity());
        state.apply_gif_list(GifList::Loaded(Vec::new()));
        state.disconnect();
        assert_eq!(state, ViewState::default());
    }
}
