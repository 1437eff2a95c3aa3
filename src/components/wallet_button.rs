use dioxus::prelude::*;

use crate::stores::wallet_store::{self, ConnectionStatus, AVAILABLE_WALLETS, WALLET_STATUS};

/// Colors of the wallet picker
#[derive(Clone, Debug, PartialEq)]
pub struct WalletButtonTheme {
    pub button_background: String,
    pub button_text: String,
    pub dropdown_background: String,
    pub dropdown_hover: String,
    pub border: String,
}

impl Default for WalletButtonTheme {
    fn default() -> Self {
        Self {
            button_background: "linear-gradient(90deg, #ff9800 0%, #ff5722 100%)".to_string(),
            button_text: "white".to_string(),
            dropdown_background: "#2a2417".to_string(),
            dropdown_hover: "#ff9800".to_string(),
            border: "rgba(255, 215, 0, 0.2)".to_string(),
        }
    }
}

impl WalletButtonTheme {
    pub fn button_style(&self) -> String {
        format!(
            "background: {}; color: {}; border: none;",
            self.button_background, self.button_text
        )
    }

    pub fn dropdown_style(&self) -> String {
        format!(
            "background: {}; border: 1px solid {};",
            self.dropdown_background, self.border
        )
    }

    pub fn item_style(&self, hovered: bool) -> String {
        let background = if hovered {
            &self.dropdown_hover
        } else {
            &self.dropdown_background
        };
        format!(
            "background: {}; color: {}; border-color: {};",
            background, self.button_text, self.border
        )
    }
}

/// Button that lists the registered wallets and connects the chosen one
#[component]
pub fn WalletButton(#[props(default)] theme: WalletButtonTheme) -> Element {
    let mut open = use_signal(|| false);
    let mut hovered: Signal<Option<usize>> = use_signal(|| None);

    let status = WALLET_STATUS.read().clone();
    let connecting = status == ConnectionStatus::Connecting;
    let wallets = AVAILABLE_WALLETS.read().clone();

    let label = if connecting { "Connecting..." } else { "Select Wallet" };

    rsx! {
        div {
            class: "relative w-full",

            button {
                class: "w-full h-14 text-lg rounded-lg transition-all duration-300 hover:-translate-y-0.5 hover:shadow-lg font-medieval disabled:cursor-not-allowed",
                style: "{theme.button_style()}",
                disabled: connecting,
                onclick: move |_| {
                    wallet_store::refresh_wallets();
                    let is_open = *open.read();
                    open.set(!is_open);
                },
                "{label}"
            }

            if *open.read() {
                ul {
                    class: "absolute left-0 right-0 mt-2 rounded-lg overflow-hidden shadow-xl z-10",
                    style: "{theme.dropdown_style()}",
                    role: "menu",

                    if wallets.is_empty() {
                        li {
                            class: "px-4 py-3 text-sm",
                            style: "{theme.item_style(false)}",
                            "No Solana wallet detected"
                        }
                    }

                    for (index, name) in wallets.into_iter().enumerate() {
                        li {
                            key: "{name}",
                            class: "px-4 py-3 cursor-pointer border-t first:border-t-0 transition-colors font-medieval",
                            style: "{theme.item_style(*hovered.read() == Some(index))}",
                            role: "menuitem",
                            onmouseenter: move |_| hovered.set(Some(index)),
                            onmouseleave: move |_| hovered.set(None),
                            onclick: {
                                let name = name.clone();
                                move |_| {
                                    open.set(false);
                                    let name = name.clone();
                                    spawn(async move {
                                        if let Err(e) = wallet_store::connect_wallet(&name).await {
                                            log::error!("{}", e);
                                        }
                                    });
                                }
                            },
                            "{name}"
                        }
                    }
                }
            }

            if let ConnectionStatus::Error(message) = status {
                p {
                    class: "mt-2 text-sm text-red-400",
                    "{message}"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme_styles() {
        let theme = WalletButtonTheme::default();
        assert_eq!(
            theme.button_style(),
            "background: linear-gradient(90deg, #ff9800 0%, #ff5722 100%); color: white; border: none;"
        );
        assert!(theme.item_style(false).starts_with("background: #2a2417;"));
        assert!(theme.item_style(true).starts_with("background: #ff9800;"));
        assert!(theme.dropdown_style().contains("rgba(255, 215, 0, 0.2)"));
    }
}
