//! use_mint_workflow hook - wires the mint machine to the wallet store
//!
//! The machine lives in a component signal so the panel re-renders on every
//! transition. Wallet session changes trigger a ledger read, clicks go
//! through `MintWorkflow::mint`, and the workflow is torn down with the
//! component so late results never write to a dropped signal.

use dioxus::prelude::*;
use dioxus_primitives::toast::{consume_toast, ToastOptions};
use std::rc::Rc;
use std::time::Duration;

use crate::config::CONFIG;
use crate::services::candy_machine::RpcLedgerReader;
use crate::services::mint_tx::CandyGuardSubmitter;
use crate::services::solana_rpc::SolanaRpc;
use crate::stores::mint::{MachineCell, MintError, MintMachine, MintWorkflow, SubmitErrorHook};
use crate::stores::signer;
use crate::stores::wallet_store::WALLET_SESSION;

type AppWorkflow = MintWorkflow<Signal<MintMachine>, RpcLedgerReader, CandyGuardSubmitter>;

impl MachineCell for Signal<MintMachine> {
    fn with_mut<T>(&self, f: impl FnOnce(&mut MintMachine) -> T) -> T {
        let mut signal = *self;
        let mut machine = signal.write();
        f(&mut machine)
    }
}

/// Return type for the use_mint_workflow hook
#[derive(Clone, Copy)]
pub struct UseMintWorkflow {
    /// Current machine; read `view()` from it when rendering
    pub machine: Signal<MintMachine>,
    /// Mint button handler
    pub mint: Callback<()>,
}

/// Hook owning the mint workflow for the lifetime of the calling component
///
/// # Example
/// ```rust
/// let workflow = use_mint_workflow();
/// let view = workflow.machine.read().view(CONFIG.cluster);
///
/// button {
///     disabled: view.button.disabled,
///     onclick: move |_| workflow.mint.call(()),
///     "{view.button.label}"
/// }
/// ```
pub fn use_mint_workflow() -> UseMintWorkflow {
    let machine = use_signal(MintMachine::default);

    let error_hook: Option<SubmitErrorHook> = if CONFIG.surface_errors {
        let toast = consume_toast();
        Some(Rc::new(move |err: &MintError| {
            if err.is_user_rejection() {
                log::debug!("Mint cancelled in the wallet, no toast");
                return;
            }
            toast.error(
                "Mint failed".to_string(),
                ToastOptions::new()
                    .description(err.to_string())
                    .duration(Duration::from_secs(5))
                    .permanent(false),
            );
        }))
    } else {
        None
    };

    let workflow: Rc<AppWorkflow> = use_hook(move || {
        let rpc = SolanaRpc::new(CONFIG.rpc_url.clone());
        let workflow = MintWorkflow::new(
            machine,
            RpcLedgerReader::new(rpc.clone()),
            CandyGuardSubmitter::new(rpc),
            CONFIG.candy_machine_id.clone(),
        );
        Rc::new(match error_hook {
            Some(hook) => workflow.with_submit_error_hook(hook),
            None => workflow,
        })
    });

    // Re-runs whenever the wallet store publishes a new session
    let session_workflow = workflow.clone();
    use_effect(move || {
        let session = WALLET_SESSION.read().clone();
        let workflow = session_workflow.clone();
        spawn(async move {
            workflow.observe_session(session).await;
        });
    });

    let drop_workflow = workflow.clone();
    use_drop(move || drop_workflow.teardown());

    let mint = use_callback(move |_: ()| {
        let Some(current) = signer::get_signer() else {
            log::warn!("Mint clicked without a connected wallet");
            return;
        };
        let workflow = workflow.clone();
        spawn(async move {
            workflow.mint(current.as_ref()).await;
        });
    });

    UseMintWorkflow { machine, mint }
}
