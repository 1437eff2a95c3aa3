use dioxus::prelude::*;

use crate::stores::mint::MintResult;

/// Shown after a confirmed mint; links the new token on the explorer
#[component]
pub fn MintSuccessCard(result: MintResult, explorer_link: String) -> Element {
    rsx! {
        div {
            class: "w-full rounded-2xl overflow-hidden shadow-xl border border-[rgba(255,215,0,0.2)] bg-gradient-to-br from-[#8a3a1e] to-[#81542e] animate-in fade-in slide-in-from-bottom-4 duration-500",
            "data-signature": "{result.transaction_signature}",

            div {
                class: "p-8 text-center text-white",

                div {
                    class: "w-16 h-16 rounded-full bg-[#ff9800] flex items-center justify-center text-3xl mx-auto mb-4",
                    "✓"
                }

                h3 {
                    class: "text-2xl mb-6 font-medieval",
                    "NFT Minted Successfully!"
                }

                a {
                    class: "inline-block px-6 py-3 rounded-lg bg-[rgba(255,152,0,0.2)] hover:bg-[rgba(255,152,0,0.3)] text-white no-underline transition-all font-medieval",
                    href: "{explorer_link}",
                    target: "_blank",
                    rel: "noopener noreferrer",
                    title: "{result.minted_asset_address}",
                    "View on Solscan"
                }
            }
        }
    }
}
