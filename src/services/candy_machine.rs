//! Candy Machine v3 / Candy Guard account reads

use async_trait::async_trait;
use borsh::BorshDeserialize;
use solana_pubkey::Pubkey;
use std::str::FromStr;

use crate::services::solana_rpc::SolanaRpc;
use crate::stores::mint::errors::{MintError, MintOutcome};
use crate::stores::mint::types::{LoadedMint, MintState, MintTarget, SolPayment, TokenStandard};
use crate::stores::mint::workflow::LedgerReader;
use crate::utils::anchor::account_body;

/// Guard bit positions in the candy guard feature mask
const GUARD_BOT_TAX: u32 = 0;
const GUARD_SOL_PAYMENT: u32 = 1;

/// Leading fields of the candy machine account, up to `items_available`
#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub struct CandyMachineAccount {
    pub version: u8,
    pub token_standard: u8,
    pub features: [u8; 6],
    pub authority: Pubkey,
    pub mint_authority: Pubkey,
    pub collection_mint: Pubkey,
    pub items_redeemed: u64,
    /// First field of `CandyMachineData`; the rest is metadata
    pub items_available: u64,
}

impl CandyMachineAccount {
    pub fn decode(data: &[u8]) -> MintOutcome<Self> {
        let mut body = account_body(data, "CandyMachine")?;
        Ok(Self::deserialize(&mut body)?)
    }

    pub fn standard(&self) -> TokenStandard {
        TokenStandard::from_u8(self.token_standard)
    }
}

/// Default guard set of a candy guard account (groups are not read)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandyGuardAccount {
    pub base: Pubkey,
    pub authority: Pubkey,
    pub sol_payment: Option<SolPayment>,
}

impl CandyGuardAccount {
    pub fn decode(data: &[u8]) -> MintOutcome<Self> {
        let mut body = account_body(data, "CandyGuard")?;

        let (base, _bump, authority, features): (Pubkey, u8, Pubkey, u64) =
            BorshDeserialize::deserialize(&mut body)?;
        let enabled = |bit: u32| features & (1u64 << bit) != 0;

        if enabled(GUARD_BOT_TAX) {
            // lamports, last_instruction
            let _bot_tax: (u64, bool) = BorshDeserialize::deserialize(&mut body)?;
        }

        let sol_payment = if enabled(GUARD_SOL_PAYMENT) {
            Some(SolPayment::deserialize(&mut body)?)
        } else {
            None
        };

        Ok(Self {
            base,
            authority,
            sol_payment,
        })
    }
}

/// Transport failures while reading are reported as fetch failures
fn fetch_failure(err: MintError) -> MintError {
    match err {
        MintError::Network(msg) => MintError::FetchState(msg),
        other => other,
    }
}

/// Reads mint state from a Solana RPC node
pub struct RpcLedgerReader {
    rpc: SolanaRpc,
}

impl RpcLedgerReader {
    pub fn new(rpc: SolanaRpc) -> Self {
        Self { rpc }
    }

    async fn fetch_candy_machine(&self, address: &Pubkey) -> MintOutcome<CandyMachineAccount> {
        let data = self
            .rpc
            .get_account_data(address)
            .await
            .map_err(fetch_failure)?
            .ok_or_else(|| MintError::AccountNotFound { address: address.to_string() })?;
        let machine = CandyMachineAccount::decode(&data)?;
        log::debug!(
            "Candy machine {} is account version {} with features {:?}",
            address,
            machine.version,
            machine.features
        );
        Ok(machine)
    }

    /// Sol payment guard of the machine, `GuardAbsent` when there is none
    async fn fetch_sol_payment(&self, guard_address: &Pubkey) -> MintOutcome<SolPayment> {
        let data = self
            .rpc
            .get_account_data(guard_address)
            .await
            .map_err(fetch_failure)?
            .ok_or(MintError::GuardAbsent)?;
        CandyGuardAccount::decode(&data)?
            .sol_payment
            .ok_or(MintError::GuardAbsent)
    }
}

#[async_trait(?Send)]
impl LedgerReader for RpcLedgerReader {
    async fn fetch_mint_state(&self, contract_address: &str) -> MintOutcome<LoadedMint> {
        let address = Pubkey::from_str(contract_address)
            .map_err(|_| MintError::InvalidAddress(contract_address.to_string()))?;

        log::info!("Fetching candy machine {} from {}", address, self.rpc.url());
        let machine = self.fetch_candy_machine(&address).await?;

        let sol_payment = match self.fetch_sol_payment(&machine.mint_authority).await {
            Ok(payment) => Some(payment),
            Err(MintError::GuardAbsent) => {
                log::warn!("No sol payment guard on {}, price defaults to 0", machine.mint_authority);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(LoadedMint {
            state: MintState {
                items_available: machine.items_available,
                items_minted: machine.items_redeemed,
                price_lamports: sol_payment.map(|p| p.lamports).unwrap_or(0),
            },
            target: MintTarget {
                candy_machine: address,
                candy_guard: machine.mint_authority,
                authority: machine.authority,
                collection_mint: machine.collection_mint,
                token_standard: machine.standard(),
                sol_payment,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::anchor::account_discriminator;

    fn key(byte: u8) -> Pubkey {
        Pubkey::new_from_array([byte; 32])
    }

    fn candy_machine_bytes(token_standard: u8, redeemed: u64, available: u64) -> Vec<u8> {
        let mut data = account_discriminator("CandyMachine").to_vec();
        data.push(2); // version
        data.push(token_standard);
        data.extend_from_slice(&[0u8; 6]);
        data.extend_from_slice(key(1).as_ref());
        data.extend_from_slice(key(2).as_ref());
        data.extend_from_slice(key(3).as_ref());
        data.extend_from_slice(&redeemed.to_le_bytes());
        data.extend_from_slice(&available.to_le_bytes());
        // symbol "FNT" and the rest of CandyMachineData
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(b"FNT");
        data.extend_from_slice(&500u16.to_le_bytes());
        data
    }

    fn candy_guard_bytes(features: u64, guards: &[u8]) -> Vec<u8> {
        let mut data = account_discriminator("CandyGuard").to_vec();
        data.extend_from_slice(key(7).as_ref());
        data.push(254);
        data.extend_from_slice(key(8).as_ref());
        data.extend_from_slice(&features.to_le_bytes());
        data.extend_from_slice(guards);
        data
    }

    #[test]
    fn test_decode_candy_machine() {
        let machine = CandyMachineAccount::decode(&candy_machine_bytes(0, 95, 100)).unwrap();
        assert_eq!(machine.items_redeemed, 95);
        assert_eq!(machine.items_available, 100);
        assert_eq!(machine.authority, key(1));
        assert_eq!(machine.mint_authority, key(2));
        assert_eq!(machine.collection_mint, key(3));
        assert_eq!(machine.version, 2);
        assert_eq!(machine.standard(), TokenStandard::NonFungible);

        let pnft = CandyMachineAccount::decode(&candy_machine_bytes(4, 0, 10)).unwrap();
        assert!(pnft.standard().is_programmable());
    }

    #[test]
    fn test_decode_truncated_candy_machine() {
        let data = candy_machine_bytes(0, 1, 2);
        assert!(matches!(
            CandyMachineAccount::decode(&data[..100]),
            Err(MintError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_wrong_account_type() {
        let data = candy_guard_bytes(0, &[]);
        assert!(matches!(CandyMachineAccount::decode(&data), Err(MintError::Decode(_))));
    }

    #[test]
    fn test_network_errors_become_fetch_failures() {
        assert_eq!(
            fetch_failure(MintError::Network("offline".to_string())),
            MintError::FetchState("offline".to_string())
        );
        assert_eq!(fetch_failure(MintError::GuardAbsent), MintError::GuardAbsent);
    }

    #[test]
    fn test_decode_sol_payment_after_bot_tax() {
        let mut guards = Vec::new();
        guards.extend_from_slice(&10_000_000u64.to_le_bytes());
        guards.push(1);
        guards.extend_from_slice(&500_000_000u64.to_le_bytes());
        guards.extend_from_slice(key(9).as_ref());

        let guard = CandyGuardAccount::decode(&candy_guard_bytes(0b11, &guards)).unwrap();
        assert_eq!(guard.base, key(7));
        assert_eq!(guard.authority, key(8));
        assert_eq!(
            guard.sol_payment,
            Some(SolPayment { lamports: 500_000_000, destination: key(9) })
        );
    }

    #[test]
    fn test_decode_sol_payment_only() {
        let mut guards = Vec::new();
        guards.extend_from_slice(&1_000_000_000u64.to_le_bytes());
        guards.extend_from_slice(key(4).as_ref());

        let guard = CandyGuardAccount::decode(&candy_guard_bytes(0b10, &guards)).unwrap();
        assert_eq!(guard.sol_payment.map(|p| p.lamports), Some(1_000_000_000));
    }

    #[test]
    fn test_decode_guard_without_payment() {
        // start_date only (bit 3); sol payment absent
        let guard = CandyGuardAccount::decode(&candy_guard_bytes(0b1000, &0i64.to_le_bytes())).unwrap();
        assert!(guard.sol_payment.is_none());
    }
}
