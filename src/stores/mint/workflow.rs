//! Async driver for the mint state machine
//!
//! Runs the two remote calls (ledger read, mint submit) around the pure
//! transitions in `machine.rs`. Everything runs on the browser event loop, so
//! the machine's in-flight submit flag is the only lock the submit path needs.

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::stores::mint::errors::{MintError, MintOutcome};
use crate::stores::mint::machine::MintMachine;
use crate::stores::mint::types::{LoadedMint, MintResult, MintTarget, WalletSession};
use crate::stores::signer::WalletSigner;

/// Reads availability and price for a candy machine
#[async_trait(?Send)]
pub trait LedgerReader {
    async fn fetch_mint_state(&self, contract_address: &str) -> MintOutcome<LoadedMint>;
}

/// Builds, signs and confirms one mint transaction
#[async_trait(?Send)]
pub trait TransactionSubmitter {
    async fn submit_mint(&self, target: &MintTarget, signer: &dyn WalletSigner) -> MintOutcome<MintResult>;
}

/// Where the machine lives: a plain `RefCell` or a UI signal
pub trait MachineCell {
    fn with_mut<T>(&self, f: impl FnOnce(&mut MintMachine) -> T) -> T;
}

impl MachineCell for Rc<RefCell<MintMachine>> {
    fn with_mut<T>(&self, f: impl FnOnce(&mut MintMachine) -> T) -> T {
        f(&mut self.borrow_mut())
    }
}

/// Called after a failed submit has been applied to the machine
pub type SubmitErrorHook = Rc<dyn Fn(&MintError)>;

pub struct MintWorkflow<C, R, S> {
    cell: C,
    reader: R,
    submitter: S,
    contract_address: String,
    alive: Cell<bool>,
    on_submit_error: Option<SubmitErrorHook>,
}

impl<C, R, S> MintWorkflow<C, R, S>
where
    C: MachineCell,
    R: LedgerReader,
    S: TransactionSubmitter,
{
    pub fn new(cell: C, reader: R, submitter: S, contract_address: impl Into<String>) -> Self {
        Self {
            cell,
            reader,
            submitter,
            contract_address: contract_address.into(),
            alive: Cell::new(true),
            on_submit_error: None,
        }
    }

    /// Surface submit failures (toast, banner) without changing transitions
    pub fn with_submit_error_hook(mut self, hook: SubmitErrorHook) -> Self {
        self.on_submit_error = Some(hook);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// The view is gone; pending results are dropped when they arrive
    pub fn teardown(&self) {
        self.alive.set(false);
    }

    /// Feed a wallet session change; reads mint state when the machine asks for it
    pub async fn observe_session(&self, session: WalletSession) {
        if !self.is_alive() {
            return;
        }

        let Some(ticket) = self.cell.with_mut(|m| m.observe_session(session)) else {
            return;
        };

        let result = self.reader.fetch_mint_state(&self.contract_address).await;

        if !self.is_alive() {
            log::debug!("Mint view torn down, dropping mint state read");
            return;
        }

        self.cell.with_mut(|m| m.apply_fetch(ticket, result));
    }

    /// One user click. Silently ignored unless connected, loaded and not busy.
    pub async fn mint(&self, signer: &dyn WalletSigner) {
        if !self.is_alive() {
            return;
        }

        let Some(ticket) = self.cell.with_mut(|m| m.begin_mint()) else {
            log::debug!("Mint request ignored in current state");
            return;
        };

        log::info!("Minting from candy machine {}", ticket.target.candy_machine);
        let result = self.submitter.submit_mint(&ticket.target, signer).await;

        if !self.is_alive() {
            log::debug!("Mint view torn down, dropping mint result");
            return;
        }

        if let Some(err) = self.cell.with_mut(|m| m.finish_mint(result)) {
            if let Some(hook) = &self.on_submit_error {
                hook(&err);
            }
        }
    }
}
