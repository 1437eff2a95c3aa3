use dioxus::prelude::*;
use dioxus::core::spawn_forever;
use gloo_storage::{LocalStorage, Storage};
use tokio::sync::mpsc;

use crate::services::wallet_standard;
use crate::stores::mint::types::WalletSession;
use crate::stores::signer::{self, StandardWalletSigner};

const STORAGE_KEY_WALLET: &str = "candymint_wallet";

/// Connection status for the browser wallet
#[derive(Clone, Debug, PartialEq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error(String),
}

/// Session observed by the mint workflow
pub static WALLET_SESSION: GlobalSignal<WalletSession> = Signal::global(WalletSession::default);

pub static WALLET_STATUS: GlobalSignal<ConnectionStatus> =
    Signal::global(|| ConnectionStatus::Disconnected);

/// Wallets that registered through the Wallet Standard
pub static AVAILABLE_WALLETS: GlobalSignal<Vec<String>> = Signal::global(Vec::new);

/// Name of the connected wallet
pub static CONNECTED_WALLET: GlobalSignal<Option<String>> = Signal::global(|| None);

/// Re-read the wallet registry (extensions may register after startup)
pub fn refresh_wallets() {
    let wallets = wallet_standard::discover_wallets();
    log::debug!("Registered wallets: {:?}", wallets);
    *AVAILABLE_WALLETS.write() = wallets;
}

/// Connect to a wallet by name
pub async fn connect_wallet(name: &str) -> Result<(), String> {
    connect_inner(name, false).await
}

async fn connect_inner(name: &str, silent: bool) -> Result<(), String> {
    *WALLET_STATUS.write() = ConnectionStatus::Connecting;

    let address = match wallet_standard::connect(name, silent).await {
        Ok(address) => address,
        Err(e) => {
            let error_msg = format!("Failed to connect to {}: {}", name, e);
            *WALLET_STATUS.write() = ConnectionStatus::Error(error_msg.clone());
            return Err(error_msg);
        }
    };

    let wallet_signer = StandardWalletSigner::new(name, address.clone()).map_err(|e| {
        let error_msg = e.to_string();
        *WALLET_STATUS.write() = ConnectionStatus::Error(error_msg.clone());
        error_msg
    })?;

    log::info!("Connected to {} as {}", name, address);

    if let Err(e) = LocalStorage::set(STORAGE_KEY_WALLET, name) {
        log::warn!("Failed to remember wallet choice: {}", e);
    }

    signer::set_signer(wallet_signer);
    *CONNECTED_WALLET.write() = Some(name.to_string());
    *WALLET_STATUS.write() = ConnectionStatus::Connected;
    *WALLET_SESSION.write() = WalletSession::connected(address);

    watch_account_changes(name);

    Ok(())
}

/// Follow account switches inside the wallet. The loop ends when the
/// listener is replaced or released on disconnect.
fn watch_account_changes(name: &str) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Option<String>>();

    if let Err(e) = wallet_standard::watch_accounts(name, move |account| {
        let _ = tx.send(account);
    }) {
        log::warn!("Wallet {} does not report account changes: {}", name, e);
        return;
    }

    // Outlives the wallet button that started the connect
    let name = name.to_string();
    spawn_forever(async move {
        while let Some(account) = rx.recv().await {
            if CONNECTED_WALLET.read().as_deref() != Some(name.as_str()) {
                break;
            }
            match account {
                Some(address) => match StandardWalletSigner::new(name.as_str(), address.clone()) {
                    Ok(wallet_signer) => {
                        log::info!("Wallet account switched to {}", address);
                        signer::set_signer(wallet_signer);
                        *WALLET_SESSION.write() = WalletSession::connected(address);
                    }
                    Err(e) => log::error!("Ignoring account change: {}", e),
                },
                None => {
                    log::info!("Wallet {} revoked all accounts", name);
                    disconnect_wallet();
                    break;
                }
            }
        }
    });
}

/// Disconnect from the wallet
pub fn disconnect_wallet() {
    let name = CONNECTED_WALLET.write().take();

    wallet_standard::unwatch_accounts();
    signer::clear_signer();
    *WALLET_STATUS.write() = ConnectionStatus::Disconnected;
    *WALLET_SESSION.write() = WalletSession::disconnected();
    LocalStorage::delete(STORAGE_KEY_WALLET);

    if let Some(name) = name {
        spawn_forever(async move {
            if let Err(e) = wallet_standard::disconnect(&name).await {
                log::warn!("Wallet {} failed to disconnect: {}", name, e);
            }
        });
        log::info!("Disconnected from wallet");
    }
}

/// Reconnect the last used wallet without prompting (auto-connect)
pub async fn restore_connection() {
    let Ok(name) = LocalStorage::get::<String>(STORAGE_KEY_WALLET) else {
        log::debug!("No wallet connection to restore");
        return;
    };

    refresh_wallets();
    if !AVAILABLE_WALLETS.read().contains(&name) {
        // Extensions can register a moment after the page loads
        gloo_timers::future::TimeoutFuture::new(500).await;
        refresh_wallets();
    }

    if !AVAILABLE_WALLETS.read().contains(&name) {
        log::warn!("Wallet {} is no longer available", name);
        LocalStorage::delete(STORAGE_KEY_WALLET);
        return;
    }

    log::info!("Restoring {} connection", name);
    if let Err(e) = connect_inner(&name, true).await {
        log::warn!("Failed to restore wallet connection: {}", e);
        *WALLET_STATUS.write() = ConnectionStatus::Disconnected;
        LocalStorage::delete(STORAGE_KEY_WALLET);
    }
}
