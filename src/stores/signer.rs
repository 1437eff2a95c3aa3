// Copyright (c) 2025 Patrick Ulrich
// Distributed under the MIT software license

//! Wallet signer capability handed to the mint submitter

use async_trait::async_trait;
use dioxus::prelude::*;
use dioxus::signals::ReadableExt;
use solana_pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::CONFIG;
use crate::services::wallet_standard;
use crate::stores::mint::errors::{MintError, MintOutcome};

/// Something that can approve a transaction on the user's behalf
#[async_trait(?Send)]
pub trait WalletSigner {
    /// Fee payer and minter of the transaction
    fn public_key(&self) -> Pubkey;

    /// Add the wallet signature to a serialized transaction
    async fn sign_transaction(&self, transaction: Vec<u8>) -> MintOutcome<Vec<u8>>;
}

/// Signer backed by a Wallet Standard browser wallet
#[derive(Debug, Clone, PartialEq)]
pub struct StandardWalletSigner {
    wallet_name: String,
    address: String,
    public_key: Pubkey,
}

impl StandardWalletSigner {
    pub fn new(wallet_name: impl Into<String>, address: impl Into<String>) -> Result<Self, MintError> {
        let address = address.into();
        let public_key = Pubkey::from_str(&address).map_err(|_| MintError::InvalidAddress(address.clone()))?;
        Ok(Self {
            wallet_name: wallet_name.into(),
            address,
            public_key,
        })
    }

}

#[async_trait(?Send)]
impl WalletSigner for StandardWalletSigner {
    fn public_key(&self) -> Pubkey {
        self.public_key
    }

    async fn sign_transaction(&self, transaction: Vec<u8>) -> MintOutcome<Vec<u8>> {
        wallet_standard::sign_transaction(
            &self.wallet_name,
            &self.address,
            CONFIG.cluster.wallet_chain(),
            &transaction,
        )
        .await
    }
}

/// Global signal for the current signer
pub static CURRENT_SIGNER: GlobalSignal<Option<Arc<StandardWalletSigner>>> = Signal::global(|| None);

pub fn set_signer(signer: StandardWalletSigner) {
    *CURRENT_SIGNER.write() = Some(Arc::new(signer));
}

pub fn clear_signer() {
    *CURRENT_SIGNER.write() = None;
}

/// Get the current signer
pub fn get_signer() -> Option<Arc<StandardWalletSigner>> {
    CURRENT_SIGNER.read().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_parses_address() {
        let signer = StandardWalletSigner::new("Phantom", "9BokyUPDNHgsbbNy2gviC5r6aCg6oYoGN3auuuc3J8K9").unwrap();
        assert_eq!(signer.wallet_name, "Phantom");
        assert_eq!(signer.public_key().to_string(), signer.address);

        assert!(matches!(
            StandardWalletSigner::new("Phantom", "not-base58!"),
            Err(MintError::InvalidAddress(_))
        ));
    }
}
