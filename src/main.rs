#![allow(non_snake_case)]

use dioxus::prelude::*;
use dioxus_primitives::toast::ToastProvider;
use stores::wallet_store;

// Modules
mod components;
mod config;
mod hooks;
mod routes;
mod services;
mod stores;
mod utils;

fn main() {
    // Initialize panic hook for better error messages in browser console
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    }

    log::info!(
        "Starting candymint for {} on {:?}",
        config::CONFIG.candy_machine_id,
        config::CONFIG.cluster
    );

    // Launch the Dioxus web app
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    // Pick up wallets and reconnect the last one on mount
    use_effect(move || {
        wallet_store::refresh_wallets();

        spawn(async move {
            wallet_store::restore_connection().await;
        });
    });

    rsx! {
        ToastProvider {
            Router::<routes::Route> {}
        }
    }
}
