//! Mint workflow data model

use borsh::BorshDeserialize;
use solana_pubkey::Pubkey;

/// Lamports per SOL, the fixed divisor between ledger units and display units
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Availability and price counters read from the candy machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MintState {
    pub items_available: u64,
    pub items_minted: u64,
    pub price_lamports: u64,
}

impl MintState {
    /// Items still claimable, never negative
    pub fn remaining(&self) -> u64 {
        self.items_available.saturating_sub(self.items_minted)
    }
}

/// Observed wallet connection, owned by the wallet store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    pub connected: bool,
    pub public_address: Option<String>,
}

impl WalletSession {
    pub fn connected(address: impl Into<String>) -> Self {
        Self {
            connected: true,
            public_address: Some(address.into()),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }
}

/// Outcome of a confirmed mint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintResult {
    pub transaction_signature: String,
    pub minted_asset_address: String,
}

/// Token standard minted by the candy machine (Token Metadata numbering)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenStandard {
    #[default]
    NonFungible,
    ProgrammableNonFungible,
}

impl TokenStandard {
    pub fn from_u8(value: u8) -> Self {
        match value {
            4 | 5 => Self::ProgrammableNonFungible,
            _ => Self::NonFungible,
        }
    }

    pub fn is_programmable(&self) -> bool {
        matches!(self, Self::ProgrammableNonFungible)
    }
}

/// Sol payment guard settings, in account order
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshDeserialize)]
pub struct SolPayment {
    pub lamports: u64,
    pub destination: Pubkey,
}

/// Everything the submitter needs to build a mint against the loaded machine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintTarget {
    pub candy_machine: Pubkey,
    /// Candy guard address (the machine's mint authority)
    pub candy_guard: Pubkey,
    /// Machine authority, also the collection update authority
    pub authority: Pubkey,
    pub collection_mint: Pubkey,
    pub token_standard: TokenStandard,
    pub sol_payment: Option<SolPayment>,
}

/// Result of a successful ledger read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedMint {
    pub state: MintState,
    pub target: MintTarget,
}

/// Workflow phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MintPhase {
    #[default]
    Disconnected,
    Idle,
    SoldOut,
    Minting,
    Minted,
}

/// Label and enabled state of the mint button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonAffordance {
    pub label: &'static str,
    pub disabled: bool,
}

impl ButtonAffordance {
    /// Pure function of phase and remaining supply
    pub fn for_state(phase: MintPhase, remaining: u64) -> Self {
        match phase {
            MintPhase::Minting => Self { label: "Minting...", disabled: true },
            MintPhase::SoldOut => Self { label: "Sold Out", disabled: true },
            _ if remaining == 0 => Self { label: "Sold Out", disabled: true },
            _ => Self { label: "Mint Now", disabled: false },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_saturates() {
        let state = MintState { items_available: 100, items_minted: 95, price_lamports: 0 };
        assert_eq!(state.remaining(), 5);

        let state = MintState { items_available: 3, items_minted: 7, price_lamports: 0 };
        assert_eq!(state.remaining(), 0);
    }

    #[test]
    fn test_button_affordance() {
        let minting = ButtonAffordance::for_state(MintPhase::Minting, 5);
        assert_eq!(minting.label, "Minting...");
        assert!(minting.disabled);

        let sold_out = ButtonAffordance::for_state(MintPhase::SoldOut, 0);
        assert_eq!(sold_out.label, "Sold Out");
        assert!(sold_out.disabled);

        let idle = ButtonAffordance::for_state(MintPhase::Idle, 5);
        assert_eq!(idle.label, "Mint Now");
        assert!(!idle.disabled);

        // The last item minted leaves the button sold out
        let minted = ButtonAffordance::for_state(MintPhase::Minted, 0);
        assert_eq!(minted.label, "Sold Out");
        assert!(minted.disabled);
    }

    #[test]
    fn test_disabled_iff_sold_out_or_minting() {
        let phases = [
            MintPhase::Idle,
            MintPhase::SoldOut,
            MintPhase::Minting,
            MintPhase::Minted,
        ];
        for available in 0..4u64 {
            for minted in 0..=available {
                let remaining = MintState { items_available: available, items_minted: minted, price_lamports: 0 }
                    .remaining();
                for phase in phases {
                    // SoldOut is only ever entered with nothing remaining
                    if phase == MintPhase::SoldOut && remaining > 0 {
                        continue;
                    }
                    let button = ButtonAffordance::for_state(phase, remaining);
                    assert_eq!(button.disabled, remaining == 0 || phase == MintPhase::Minting);
                }
            }
        }
    }

    #[test]
    fn test_token_standard_from_u8() {
        assert_eq!(TokenStandard::from_u8(0), TokenStandard::NonFungible);
        assert!(TokenStandard::from_u8(4).is_programmable());
    }
}
