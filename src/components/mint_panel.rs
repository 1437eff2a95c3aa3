use dioxus::prelude::*;

use crate::components::{MintSuccessCard, WalletButton, WalletButtonTheme};
use crate::config::CONFIG;
use crate::hooks::use_mint_workflow;
use crate::stores::mint::MintPhase;
use crate::stores::wallet_store::{self, WALLET_SESSION};
use crate::utils::format::truncate_address;

/// Availability, price and the mint action for the configured candy machine
#[component]
pub fn MintPanel(#[props(default)] wallet_theme: WalletButtonTheme) -> Element {
    let workflow = use_mint_workflow();
    let view = workflow.machine.read().view(CONFIG.cluster);
    let address = WALLET_SESSION.read().public_address.clone();

    let minting = view.phase == MintPhase::Minting;
    let button_class = if view.button.disabled {
        "bg-[#4d4d4d] cursor-not-allowed"
    } else {
        "bg-gradient-to-r from-[#ff9800] to-[#ff5722] cursor-pointer hover:-translate-y-0.5 hover:shadow-[0_7px_14px_rgba(255,152,0,0.3)]"
    };

    rsx! {
        div {
            class: "flex flex-col items-center max-w-[480px] mx-auto gap-6",

            div {
                class: "w-full rounded-2xl overflow-hidden shadow-xl border border-[rgba(255,215,0,0.2)] bg-gradient-to-br from-[#2a2417] to-[#1c1810] backdrop-blur",

                div {
                    class: "p-6",

                    div {
                        class: "flex justify-between mb-4 pb-4 border-b border-[rgba(255,215,0,0.2)] text-[#e0e0e0] text-lg",
                        span { class: "font-medieval", "Remaining NFTs" }
                        span {
                            class: "font-bold text-[#ffc107] font-medieval flex items-center gap-2",
                            if view.loading {
                                span {
                                    class: "inline-block w-4 h-4 border-2 border-[#ffc107] border-t-transparent rounded-full animate-spin"
                                }
                            }
                            "{view.remaining}"
                        }
                    }

                    div {
                        class: "flex justify-between text-[#e0e0e0] text-lg",
                        span { class: "font-medieval", "Mint Price" }
                        span {
                            class: "font-bold text-[#ffc107] font-medieval",
                            "{view.price_display}"
                        }
                    }
                }

                div {
                    class: "p-6 bg-black/20",

                    if !view.connected {
                        WalletButton { theme: wallet_theme.clone() }
                    } else {
                        button {
                            class: "w-full h-14 text-lg text-white rounded-lg border-none transition-all duration-300 font-medieval {button_class}",
                            disabled: view.button.disabled,
                            onclick: move |_| workflow.mint.call(()),
                            if minting {
                                span {
                                    class: "flex items-center justify-center gap-2.5",
                                    span {
                                        class: "inline-block w-6 h-6 border-2 border-white border-t-transparent rounded-full animate-spin"
                                    }
                                    span { "{view.button.label}" }
                                }
                            } else {
                                "{view.button.label}"
                            }
                        }

                        if let Some(address) = address {
                            div {
                                class: "flex justify-between items-center mt-3 text-sm text-[#e0e0e0]/70",
                                span { title: "{address}", "{truncate_address(&address)}" }
                                button {
                                    class: "underline hover:text-white transition-colors",
                                    onclick: move |_| wallet_store::disconnect_wallet(),
                                    "Disconnect"
                                }
                            }
                        }
                    }
                }
            }

            if let (Some(result), Some(link)) = (view.result.clone(), view.explorer_link.clone()) {
                MintSuccessCard { result, explorer_link: link }
            }
        }
    }
}
