//! Mint workflow state machine
//!
//! Pure transitions with no I/O. The async driver in `workflow.rs` asks the
//! machine for a ticket before each remote call and hands the outcome back;
//! the machine decides whether the outcome still applies.
//!
//! The remaining counter is decremented locally after a mint instead of being
//! re-read from the ledger, so it can drift if several tabs mint at once.

use crate::config::Cluster;
use crate::stores::mint::errors::{MintError, MintOutcome};
use crate::stores::mint::types::{
    ButtonAffordance, LoadedMint, MintPhase, MintResult, MintState, MintTarget, WalletSession,
};
use crate::utils::format::{explorer_token_url, format_sol};
use crate::utils::DataState;

/// Permission to run one ledger read; stale once the generation moves on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// Permission to run one submit against the loaded target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintTicket {
    pub target: MintTarget,
}

/// Everything the mint panel renders
#[derive(Debug, Clone, PartialEq)]
pub struct MintView {
    pub phase: MintPhase,
    pub connected: bool,
    pub remaining: u64,
    pub price_display: String,
    pub button: ButtonAffordance,
    pub loading: bool,
    pub result: Option<MintResult>,
    pub explorer_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MintMachine {
    phase: MintPhase,
    session: WalletSession,
    remaining: u64,
    price_lamports: u64,
    loaded: Option<MintTarget>,
    fetch_status: DataState<MintState>,
    last_result: Option<MintResult>,
    generation: u64,
    /// Set from `begin_mint` until `finish_mint`, across disconnects
    submitting: bool,
}

#[cfg(test)]
impl MintMachine {
    pub fn phase(&self) -> MintPhase {
        self.phase
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn price_lamports(&self) -> u64 {
        self.price_lamports
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn fetch_status(&self) -> &DataState<MintState> {
        &self.fetch_status
    }

    pub fn last_result(&self) -> Option<&MintResult> {
        self.last_result.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}

impl MintMachine {
    pub fn button(&self) -> ButtonAffordance {
        ButtonAffordance::for_state(self.phase, self.remaining)
    }

    /// Resting phase for the current session and supply
    fn route(&self) -> MintPhase {
        if !self.session.connected {
            MintPhase::Disconnected
        } else if self.submitting {
            MintPhase::Minting
        } else if self.remaining == 0 {
            MintPhase::SoldOut
        } else {
            MintPhase::Idle
        }
    }

    /// Record a wallet session change. Returns a ticket when the mint state
    /// has to be (re)read: on connect, and on account switch unless minting.
    pub fn observe_session(&mut self, session: WalletSession) -> Option<FetchTicket> {
        if session == self.session {
            return None;
        }

        let was_connected = self.session.connected;
        let address_changed = session.public_address != self.session.public_address;
        self.session = session;

        if !self.session.connected {
            // Invalidate any read still in flight
            self.generation += 1;
            self.phase = MintPhase::Disconnected;
            if self.fetch_status.is_loading() {
                self.fetch_status = DataState::Pending;
            }
            return None;
        }

        if was_connected && !address_changed {
            return None;
        }

        if self.submitting {
            log::debug!("Session changed mid-mint, keeping current mint state");
            self.phase = self.route();
            return None;
        }

        self.generation += 1;
        self.fetch_status = DataState::Loading;
        Some(FetchTicket {
            generation: self.generation,
        })
    }

    /// Apply a ledger read. Returns false when the ticket is stale.
    /// A failed read leaves the displayed counters as they were.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, result: MintOutcome<LoadedMint>) -> bool {
        if ticket.generation != self.generation || !self.session.connected {
            log::debug!("Discarding stale mint state read");
            return false;
        }

        match result {
            Ok(loaded) => {
                self.remaining = loaded.state.remaining();
                self.price_lamports = loaded.state.price_lamports;
                self.loaded = Some(loaded.target);
                self.fetch_status = DataState::Loaded(loaded.state);
            }
            Err(e) => {
                log::error!("Error fetching candy machine info: {}", e);
                self.fetch_status = DataState::Error(e.to_string());
            }
        }

        self.phase = self.route();
        true
    }

    /// Guarded entry into `Minting`. `None` means the click is ignored.
    pub fn begin_mint(&mut self) -> Option<MintTicket> {
        if !self.session.connected || self.submitting {
            return None;
        }
        let target = self.loaded.clone()?;
        if self.button().disabled {
            return None;
        }

        self.submitting = true;
        self.phase = MintPhase::Minting;
        Some(MintTicket { target })
    }

    /// Apply a submit outcome. Returns the error, if any, for the caller's hook.
    pub fn finish_mint(&mut self, result: MintOutcome<MintResult>) -> Option<MintError> {
        let in_flight = self.submitting;
        self.submitting = false;

        match result {
            Ok(minted) => {
                log::info!(
                    "Minted {} in transaction {}",
                    minted.minted_asset_address,
                    minted.transaction_signature
                );
                self.last_result = Some(minted);
                self.remaining = self.remaining.saturating_sub(1);
                if in_flight {
                    self.phase = if self.session.connected {
                        MintPhase::Minted
                    } else {
                        MintPhase::Disconnected
                    };
                }
                None
            }
            Err(e) => {
                log::error!("Minting failed: {}", e);
                if in_flight {
                    self.phase = self.route();
                }
                Some(e)
            }
        }
    }

    pub fn view(&self, cluster: Cluster) -> MintView {
        MintView {
            phase: self.phase,
            connected: self.session.connected,
            remaining: self.remaining,
            price_display: format!("{} SOL", format_sol(self.price_lamports)),
            button: self.button(),
            loading: self.fetch_status.is_loading(),
            result: self.last_result.clone(),
            explorer_link: self
                .last_result
                .as_ref()
                .map(|r| explorer_token_url(&r.minted_asset_address, cluster)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(available: u64, minted: u64, price: u64) -> LoadedMint {
        LoadedMint {
            state: MintState {
                items_available: available,
                items_minted: minted,
                price_lamports: price,
            },
            target: MintTarget::default(),
        }
    }

    fn minted(signature: &str, address: &str) -> MintResult {
        MintResult {
            transaction_signature: signature.to_string(),
            minted_asset_address: address.to_string(),
        }
    }

    fn connected_machine(available: u64, minted: u64) -> MintMachine {
        let mut machine = MintMachine::default();
        let ticket = machine.observe_session(WalletSession::connected("wallet-a")).unwrap();
        assert!(machine.apply_fetch(ticket, Ok(loaded(available, minted, 0))));
        machine
    }

    #[test]
    fn test_connect_routes_by_remaining() {
        let machine = connected_machine(100, 95);
        assert_eq!(machine.phase(), MintPhase::Idle);
        assert_eq!(machine.remaining(), 5);

        let machine = connected_machine(10, 10);
        assert_eq!(machine.phase(), MintPhase::SoldOut);
        assert_eq!(machine.button().label, "Sold Out");
    }

    #[test]
    fn test_begin_mint_guard() {
        // Disconnected
        let mut machine = MintMachine::default();
        let before = machine.clone();
        assert!(machine.begin_mint().is_none());
        assert_eq!(machine, before);

        // Connected, state not loaded yet
        let _ticket = machine.observe_session(WalletSession::connected("wallet-a"));
        let before = machine.clone();
        assert!(machine.begin_mint().is_none());
        assert_eq!(machine, before);

        // Sold out
        let mut machine = connected_machine(10, 10);
        let before = machine.clone();
        assert!(machine.begin_mint().is_none());
        assert_eq!(machine, before);
    }

    #[test]
    fn test_reentrant_begin_is_noop() {
        let mut machine = connected_machine(5, 0);
        assert!(machine.begin_mint().is_some());
        assert_eq!(machine.phase(), MintPhase::Minting);
        assert!(machine.begin_mint().is_none());
        assert_eq!(machine.button().label, "Minting...");
    }

    #[test]
    fn test_optimistic_decrement() {
        let mut machine = connected_machine(3, 0);
        machine.begin_mint().unwrap();
        assert!(machine.finish_mint(Ok(minted("abc", "XYZ"))).is_none());
        assert_eq!(machine.remaining(), 2);
        assert_eq!(machine.phase(), MintPhase::Minted);
        assert_eq!(machine.last_result().map(|r| r.minted_asset_address.as_str()), Some("XYZ"));

        // Clamped at zero
        let mut machine = MintMachine::default();
        machine.finish_mint(Ok(minted("abc", "XYZ")));
        assert_eq!(machine.remaining(), 0);
    }

    #[test]
    fn test_result_replaced_on_next_success() {
        let mut machine = connected_machine(5, 0);
        machine.begin_mint().unwrap();
        machine.finish_mint(Ok(minted("sig-1", "first")));

        // Minted allows another click
        assert!(!machine.button().disabled);
        machine.begin_mint().unwrap();
        machine.finish_mint(Ok(minted("sig-2", "second")));
        assert_eq!(machine.last_result().unwrap().transaction_signature, "sig-2");
        assert_eq!(machine.remaining(), 3);
    }

    #[test]
    fn test_submit_failure_returns_to_idle() {
        let mut machine = connected_machine(5, 0);
        machine.begin_mint().unwrap();
        let err = machine.finish_mint(Err(MintError::WalletRejected("closed".to_string())));
        assert!(err.is_some());
        assert_eq!(machine.phase(), MintPhase::Idle);
        assert_eq!(machine.remaining(), 5);
        assert!(machine.last_result().is_none());
    }

    #[test]
    fn test_fetch_failure_keeps_defaults() {
        let mut machine = MintMachine::default();
        let ticket = machine.observe_session(WalletSession::connected("wallet-a")).unwrap();
        assert!(machine.apply_fetch(ticket, Err(MintError::Network("offline".to_string()))));

        assert_eq!(machine.remaining(), 0);
        assert_eq!(machine.price_lamports(), 0);
        assert!(!machine.is_loaded());
        assert!(matches!(
            machine.fetch_status(),
            DataState::Error(msg) if msg == "Network error: offline"
        ));
        assert!(machine.begin_mint().is_none());
    }

    #[test]
    fn test_fetch_failure_keeps_previous_state() {
        let mut machine = connected_machine(100, 95);
        let ticket = machine.observe_session(WalletSession::connected("wallet-b")).unwrap();
        machine.apply_fetch(ticket, Err(MintError::Decode("bad".to_string())));
        assert_eq!(machine.remaining(), 5);
        assert!(machine.is_loaded());
        assert_eq!(machine.phase(), MintPhase::Idle);
    }

    #[test]
    fn test_stale_fetch_discarded() {
        let mut machine = MintMachine::default();
        let first = machine.observe_session(WalletSession::connected("wallet-a")).unwrap();
        let second = machine.observe_session(WalletSession::connected("wallet-b")).unwrap();

        assert!(!machine.apply_fetch(first, Ok(loaded(10, 0, 0))));
        assert_eq!(machine.remaining(), 0);
        assert!(machine.apply_fetch(second, Ok(loaded(10, 1, 0))));
        assert_eq!(machine.remaining(), 9);
    }

    #[test]
    fn test_disconnect_invalidates_fetch() {
        let mut machine = MintMachine::default();
        let ticket = machine.observe_session(WalletSession::connected("wallet-a")).unwrap();
        assert!(machine.observe_session(WalletSession::disconnected()).is_none());
        assert_eq!(machine.phase(), MintPhase::Disconnected);
        assert!(!machine.apply_fetch(ticket, Ok(loaded(10, 0, 0))));
    }

    #[test]
    fn test_same_session_does_not_refetch() {
        let mut machine = connected_machine(5, 0);
        assert!(machine.observe_session(WalletSession::connected("wallet-a")).is_none());
    }

    #[test]
    fn test_account_switch_while_minting_skips_refetch() {
        let mut machine = connected_machine(5, 0);
        machine.begin_mint().unwrap();
        assert!(machine.observe_session(WalletSession::connected("wallet-b")).is_none());
        assert_eq!(machine.phase(), MintPhase::Minting);
        assert_eq!(machine.session().public_address.as_deref(), Some("wallet-b"));
    }

    #[test]
    fn test_disconnect_mid_mint_still_records_result() {
        let mut machine = connected_machine(5, 0);
        machine.begin_mint().unwrap();
        machine.observe_session(WalletSession::disconnected());
        machine.finish_mint(Ok(minted("abc", "XYZ")));
        assert_eq!(machine.phase(), MintPhase::Disconnected);
        assert_eq!(machine.remaining(), 4);
        assert!(machine.last_result().is_some());
        assert!(!machine.is_submitting());
    }

    #[test]
    fn test_reconnect_mid_mint_stays_minting() {
        let mut machine = connected_machine(5, 0);
        machine.begin_mint().unwrap();
        machine.observe_session(WalletSession::disconnected());
        assert_eq!(machine.phase(), MintPhase::Disconnected);
        assert!(machine.is_submitting());

        // Same wallet comes back before the first submit settles
        assert!(machine.observe_session(WalletSession::connected("wallet-a")).is_none());
        assert_eq!(machine.phase(), MintPhase::Minting);
        assert!(machine.begin_mint().is_none());

        machine.finish_mint(Ok(minted("abc", "XYZ")));
        assert_eq!(machine.phase(), MintPhase::Minted);
        assert_eq!(machine.remaining(), 4);
        assert!(machine.begin_mint().is_some());
    }

    #[test]
    fn test_view_formats_price_and_link() {
        let mut machine = MintMachine::default();
        let ticket = machine.observe_session(WalletSession::connected("wallet-a")).unwrap();
        assert!(machine.view(Cluster::MainnetBeta).loading);
        machine.apply_fetch(ticket, Ok(loaded(100, 95, 500_000_000)));

        let view = machine.view(Cluster::MainnetBeta);
        assert_eq!(view.remaining, 5);
        assert_eq!(view.price_display, "0.5 SOL");
        assert!(!view.loading);
        assert!(view.explorer_link.is_none());

        machine.begin_mint().unwrap();
        machine.finish_mint(Ok(minted("abc", "XYZ")));
        let view = machine.view(Cluster::MainnetBeta);
        assert_eq!(view.explorer_link.as_deref(), Some("https://solscan.io/token/XYZ"));
    }
}
