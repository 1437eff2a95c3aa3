// UI Components
// This module contains all reusable UI components

pub mod mint_panel;
pub mod mint_success_card;
pub mod wallet_button;

pub use mint_panel::MintPanel;
pub use mint_success_card::MintSuccessCard;
pub use wallet_button::{WalletButton, WalletButtonTheme};
