//! Wallet Standard bridge
//!
//! Injected Solana wallets (Phantom, Solflare, Backpack, ...) register
//! themselves through the `wallet-standard:*` window events. The JS below
//! keeps the registry and exposes connect / sign / change-listener calls that
//! work on raw transaction bytes.

use js_sys::{Array, Uint8Array};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::stores::mint::errors::{MintError, MintOutcome};

#[wasm_bindgen(inline_js = r#"
const wallets = new Map();
let unsubscribeAccounts = null;

function supportsSolana(wallet) {
    const features = wallet.features || {};
    return Boolean(
        features['standard:connect'] &&
        features['solana:signTransaction'] &&
        (wallet.chains || []).some((chain) => chain.startsWith('solana:'))
    );
}

function register(...registered) {
    for (const wallet of registered) {
        if (supportsSolana(wallet)) {
            wallets.set(wallet.name, wallet);
        }
    }
    return () => {
        for (const wallet of registered) {
            wallets.delete(wallet.name);
        }
    };
}

function lookup(name) {
    const wallet = wallets.get(name);
    if (!wallet) {
        throw new Error('Wallet not found: ' + name);
    }
    return wallet;
}

export function discoverWallets() {
    if (!window.__candymintWalletRegistry) {
        const api = Object.freeze({ register });
        window.__candymintWalletRegistry = api;
        window.addEventListener('wallet-standard:register-wallet', (event) => {
            try {
                event.detail(api);
            } catch (e) {
                console.error('Wallet registration failed:', e);
            }
        });
        window.dispatchEvent(new CustomEvent('wallet-standard:app-ready', { detail: api }));
    }
    return Array.from(wallets.keys());
}

export async function connectWallet(name, silent) {
    const wallet = lookup(name);
    const { accounts } = await wallet.features['standard:connect'].connect({ silent });
    const account = (accounts && accounts[0]) || wallet.accounts[0];
    if (!account) {
        throw new Error('No account authorized by ' + name);
    }
    return account.address;
}

export async function disconnectWallet(name) {
    const wallet = wallets.get(name);
    if (wallet && wallet.features['standard:disconnect']) {
        await wallet.features['standard:disconnect'].disconnect();
    }
}

export function offAccountChange() {
    if (unsubscribeAccounts) {
        unsubscribeAccounts();
        unsubscribeAccounts = null;
    }
}

export function onAccountChange(name, callback) {
    const wallet = lookup(name);
    const events = wallet.features['standard:events'];
    offAccountChange();
    if (!events) {
        return;
    }
    unsubscribeAccounts = events.on('change', (properties) => {
        if (properties.accounts) {
            const account = properties.accounts[0];
            callback(account ? account.address : null);
        }
    });
}

export async function signTransaction(name, address, chain, transaction) {
    const wallet = lookup(name);
    const account = wallet.accounts.find((a) => a.address === address);
    if (!account) {
        throw new Error('Account ' + address + ' is not connected');
    }
    const [output] = await wallet.features['solana:signTransaction'].signTransaction({
        account,
        chain,
        transaction,
    });
    return output.signedTransaction;
}
"#)]
extern "C" {
    #[wasm_bindgen(js_name = discoverWallets)]
    fn discover_wallets_js() -> Array;

    #[wasm_bindgen(catch, js_name = connectWallet)]
    async fn connect_wallet_js(name: &str, silent: bool) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = disconnectWallet)]
    async fn disconnect_wallet_js(name: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = onAccountChange)]
    fn on_account_change_js(name: &str, callback: &Closure<dyn FnMut(JsValue)>) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = offAccountChange)]
    fn off_account_change_js();

    #[wasm_bindgen(catch, js_name = signTransaction)]
    async fn sign_transaction_js(
        name: &str,
        address: &str,
        chain: &str,
        transaction: Uint8Array,
    ) -> Result<JsValue, JsValue>;
}

/// Owner of a value that must live exactly as long as a JS subscription.
/// Replacing or clearing the slot drops the previous value.
pub struct ListenerSlot<T>(RefCell<Option<T>>);

impl<T> ListenerSlot<T> {
    pub const fn new() -> Self {
        Self(RefCell::new(None))
    }

    pub fn set(&self, value: T) {
        let previous = self.0.borrow_mut().replace(value);
        drop(previous);
    }

    pub fn clear(&self) {
        let previous = self.0.borrow_mut().take();
        drop(previous);
    }
}

thread_local! {
    /// Callback behind the active `standard:events` subscription
    static ACCOUNT_LISTENER: ListenerSlot<Closure<dyn FnMut(JsValue)>> = const { ListenerSlot::new() };
}

/// Best-effort message out of a thrown JS value
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Names of the Solana wallets registered so far
pub fn discover_wallets() -> Vec<String> {
    discover_wallets_js()
        .iter()
        .filter_map(|name| name.as_string())
        .collect()
}

/// Ask the wallet for its first account; `silent` skips the approval prompt
pub async fn connect(name: &str, silent: bool) -> Result<String, String> {
    let address = connect_wallet_js(name, silent)
        .await
        .map_err(|e| js_error_message(&e))?;
    address
        .as_string()
        .ok_or_else(|| "Wallet returned a non-string address".to_string())
}

pub async fn disconnect(name: &str) -> Result<(), String> {
    disconnect_wallet_js(name)
        .await
        .map(|_| ())
        .map_err(|e| js_error_message(&e))
}

/// Register a listener for account switches, replacing any previous one.
/// `None` means the wallet revoked every account.
pub fn watch_accounts(name: &str, mut on_change: impl FnMut(Option<String>) + 'static) -> Result<(), String> {
    unwatch_accounts();
    let callback = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
        on_change(value.as_string());
    });
    on_account_change_js(name, &callback).map_err(|e| js_error_message(&e))?;
    ACCOUNT_LISTENER.with(|slot| slot.set(callback));
    Ok(())
}

/// Unsubscribe from account changes and release the callback with
/// everything it captured
pub fn unwatch_accounts() {
    off_account_change_js();
    ACCOUNT_LISTENER.with(ListenerSlot::clear);
}

/// A missing wallet or account means the session is gone, anything else
/// came from the wallet's approval flow
fn sign_error(message: String) -> MintError {
    if message.starts_with("Wallet not found") || message.ends_with("is not connected") {
        MintError::WalletUnavailable
    } else {
        MintError::WalletRejected(message)
    }
}

/// Have the wallet add its signature to a serialized transaction
pub async fn sign_transaction(
    name: &str,
    address: &str,
    chain: &str,
    transaction: &[u8],
) -> MintOutcome<Vec<u8>> {
    let signed = sign_transaction_js(name, address, chain, Uint8Array::from(transaction))
        .await
        .map_err(|e| sign_error(js_error_message(&e)))?;

    let bytes = signed
        .dyn_into::<Uint8Array>()
        .map_err(|_| MintError::WalletRejected("Wallet returned no transaction bytes".to_string()))?;
    Ok(bytes.to_vec())
}
