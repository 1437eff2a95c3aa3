use dioxus::prelude::*;

use crate::components::MintPanel;

const MEDIEVAL_FONT: &str = "https://fonts.googleapis.com/css2?family=MedievalSharp&display=swap";

#[component]
pub fn Home() -> Element {
    rsx! {
        document::Title { "Fantasy NFT Minting" }
        document::Meta { name: "description", content: "Mint your own fantasy NFT" }
        document::Link { rel: "stylesheet", href: MEDIEVAL_FONT }
        document::Style { ".font-medieval {{ font-family: 'MedievalSharp', cursive; }}" }

        div {
            class: "min-h-screen bg-gradient-to-br from-[#121212] to-[#1e1e1e] text-white flex flex-col items-center justify-center p-4",

            main {
                class: "container mx-auto",
                MintPanel {}
            }
        }
    }
}
