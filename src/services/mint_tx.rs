//! Candy Guard `mint_v2` transaction
//!
//! The transaction has two signers: the connected wallet (fee payer and
//! minter) and a freshly generated keypair for the new NFT mint account. The
//! mint key signs locally before the bytes go to the wallet.

use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey};
use gloo_timers::future::TimeoutFuture;
use solana_hash::Hash;
use solana_instruction::{AccountMeta, Instruction};
use solana_message::Message;
use solana_pubkey::{pubkey, Pubkey};
use solana_signature::Signature;
use solana_signer::{Signer, SignerError};
use solana_transaction::Transaction;

use crate::services::solana_rpc::{SignatureStatus, SolanaRpc};
use crate::stores::mint::errors::{MintError, MintOutcome};
use crate::stores::mint::types::{MintResult, MintTarget};
use crate::stores::mint::workflow::TransactionSubmitter;
use crate::stores::signer::WalletSigner;
use crate::utils::anchor::instruction_discriminator;

pub const CANDY_GUARD_PROGRAM_ID: Pubkey = pubkey!("Guard1JwRhJkVH6XZhzoYxeBVQe872VH6QggF4BWmS9g");
pub const CANDY_MACHINE_PROGRAM_ID: Pubkey = pubkey!("CndyV3LdqHUfDLmE5naZjVN8rBZz4tqhdefbAnjHG3JR");
pub const TOKEN_METADATA_PROGRAM_ID: Pubkey = pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");
pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");
pub const SYSTEM_PROGRAM_ID: Pubkey = pubkey!("11111111111111111111111111111111");
pub const SYSVAR_INSTRUCTIONS_ID: Pubkey = pubkey!("Sysvar1nstructions1111111111111111111111111");
pub const SYSVAR_SLOT_HASHES_ID: Pubkey = pubkey!("SysvarS1otHashes111111111111111111111111111");

const CONFIRM_POLL_MS: u32 = 1_000;

/// Consecutive failed polls tolerated while waiting for confirmation
const MAX_POLL_FAILURES: u32 = 5;

/// Accounts of `mint_v2` before the guard remaining accounts
pub const MINT_V2_ACCOUNT_COUNT: usize = 25;

pub fn candy_machine_authority_pda(candy_machine: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[b"candy_machine", candy_machine.as_ref()],
        &CANDY_MACHINE_PROGRAM_ID,
    )
    .0
}

pub fn metadata_pda(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[b"metadata", TOKEN_METADATA_PROGRAM_ID.as_ref(), mint.as_ref()],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

pub fn master_edition_pda(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[b"metadata", TOKEN_METADATA_PROGRAM_ID.as_ref(), mint.as_ref(), b"edition"],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

pub fn token_record_pda(mint: &Pubkey, token: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            b"metadata",
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
            b"token_record",
            token.as_ref(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

pub fn collection_delegate_record_pda(
    collection_mint: &Pubkey,
    update_authority: &Pubkey,
    delegate: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            b"metadata",
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            collection_mint.as_ref(),
            b"collection_delegate",
            update_authority.as_ref(),
            delegate.as_ref(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}

/// `mint_v2` instruction data: empty guard args and no group label
pub fn mint_v2_data() -> Vec<u8> {
    let mut data = instruction_discriminator("mint_v2").to_vec();
    data.extend_from_slice(&0u32.to_le_bytes());
    data.push(0);
    data
}

/// Builds `mint_v2` for `minter` paying for and receiving `nft_mint`.
/// Absent optional accounts are passed as the guard program id.
pub fn mint_v2_instruction(target: &MintTarget, minter: &Pubkey, nft_mint: &Pubkey) -> Instruction {
    let absent = CANDY_GUARD_PROGRAM_ID;
    let authority_pda = candy_machine_authority_pda(&target.candy_machine);
    let token = associated_token_address(minter, nft_mint);
    let token_record = if target.token_standard.is_programmable() {
        token_record_pda(nft_mint, &token)
    } else {
        absent
    };

    let mut accounts = vec![
        AccountMeta::new_readonly(target.candy_guard, false),
        AccountMeta::new_readonly(CANDY_MACHINE_PROGRAM_ID, false),
        AccountMeta::new(target.candy_machine, false),
        AccountMeta::new(authority_pda, false),
        AccountMeta::new(*minter, true), // payer
        AccountMeta::new(*minter, true), // minter
        AccountMeta::new(*nft_mint, true),
        AccountMeta::new_readonly(*minter, true), // nft mint authority
        AccountMeta::new(metadata_pda(nft_mint), false),
        AccountMeta::new(master_edition_pda(nft_mint), false),
        AccountMeta::new(token, false),
        AccountMeta::new(token_record, false),
        AccountMeta::new_readonly(
            collection_delegate_record_pda(&target.collection_mint, &target.authority, &authority_pda),
            false,
        ),
        AccountMeta::new_readonly(target.collection_mint, false),
        AccountMeta::new(metadata_pda(&target.collection_mint), false),
        AccountMeta::new_readonly(master_edition_pda(&target.collection_mint), false),
        AccountMeta::new_readonly(target.authority, false),
        AccountMeta::new_readonly(TOKEN_METADATA_PROGRAM_ID, false),
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        AccountMeta::new_readonly(SYSVAR_INSTRUCTIONS_ID, false),
        AccountMeta::new_readonly(SYSVAR_SLOT_HASHES_ID, false),
        AccountMeta::new_readonly(absent, false), // authorization rules program
        AccountMeta::new_readonly(absent, false), // authorization rules
    ];

    // Guard remaining accounts
    if let Some(payment) = &target.sol_payment {
        accounts.push(AccountMeta::new(payment.destination, false));
    }

    Instruction::new_with_bytes(CANDY_GUARD_PROGRAM_ID, &mint_v2_data(), accounts)
}

/// Fresh keypair for the NFT mint account
pub struct MintKeypair(SigningKey);

impl MintKeypair {
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut rand::rngs::OsRng))
    }
}

impl Signer for MintKeypair {
    fn try_pubkey(&self) -> Result<Pubkey, SignerError> {
        Ok(Pubkey::new_from_array(self.0.verifying_key().to_bytes()))
    }

    fn try_sign_message(&self, message: &[u8]) -> Result<Signature, SignerError> {
        Ok(Signature::from(self.0.sign(message).to_bytes()))
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// `mint_v2` transaction paid by `minter`, already signed by the mint key.
/// The fee payer signature slot stays empty for the wallet.
pub fn mint_transaction(
    target: &MintTarget,
    minter: &Pubkey,
    mint_key: &MintKeypair,
    blockhash: Hash,
) -> MintOutcome<Transaction> {
    let instruction = mint_v2_instruction(target, minter, &mint_key.pubkey());
    let message = Message::new_with_blockhash(&[instruction], Some(minter), &blockhash);

    let mut transaction = Transaction::new_unsigned(message);
    transaction
        .try_partial_sign(&[mint_key], blockhash)
        .map_err(|e| MintError::Submit(format!("Mint key failed to sign: {}", e)))?;
    Ok(transaction)
}

/// Tracks one sent transaction until it confirms, fails or expires
#[derive(Debug)]
struct ConfirmWatch {
    signature: String,
    last_valid_block_height: u64,
    failures: u32,
}

impl ConfirmWatch {
    fn new(signature: &str, last_valid_block_height: u64) -> Self {
        Self {
            signature: signature.to_string(),
            last_valid_block_height,
            failures: 0,
        }
    }

    /// Network errors are retried on the next poll, up to a limit
    fn tolerate(&mut self, err: MintError) -> MintOutcome<()> {
        match err {
            MintError::Network(msg) if self.failures < MAX_POLL_FAILURES => {
                self.failures += 1;
                log::warn!(
                    "Confirmation poll for {} failed ({}/{}): {}",
                    self.signature,
                    self.failures,
                    MAX_POLL_FAILURES,
                    msg
                );
                Ok(())
            }
            other => Err(other),
        }
    }

    /// `Ok(true)` once the transaction reached confirmed commitment
    fn on_status(&mut self, status: MintOutcome<Option<SignatureStatus>>) -> MintOutcome<bool> {
        match status {
            Ok(Some(status)) => {
                self.failures = 0;
                if let Some(err) = status.err {
                    return Err(MintError::TransactionFailed(err.to_string()));
                }
                Ok(status.is_confirmed())
            }
            Ok(None) => {
                self.failures = 0;
                Ok(false)
            }
            Err(e) => self.tolerate(e).map(|_| false),
        }
    }

    fn on_block_height(&mut self, height: MintOutcome<u64>) -> MintOutcome<()> {
        match height {
            Ok(height) if height > self.last_valid_block_height => Err(MintError::BlockhashExpired {
                signature: self.signature.clone(),
            }),
            Ok(_) => {
                self.failures = 0;
                Ok(())
            }
            Err(e) => self.tolerate(e),
        }
    }
}

/// Submits `mint_v2` through the connected wallet and waits for confirmation
pub struct CandyGuardSubmitter {
    rpc: SolanaRpc,
}

impl CandyGuardSubmitter {
    pub fn new(rpc: SolanaRpc) -> Self {
        Self { rpc }
    }

    async fn confirm(&self, signature: &str, last_valid_block_height: u64) -> MintOutcome<()> {
        let mut watch = ConfirmWatch::new(signature, last_valid_block_height);
        loop {
            if watch.on_status(self.rpc.get_signature_status(signature).await)? {
                return Ok(());
            }
            watch.on_block_height(self.rpc.get_block_height().await)?;

            TimeoutFuture::new(CONFIRM_POLL_MS).await;
        }
    }
}

#[async_trait(?Send)]
impl TransactionSubmitter for CandyGuardSubmitter {
    async fn submit_mint(&self, target: &MintTarget, signer: &dyn WalletSigner) -> MintOutcome<MintResult> {
        let minter = signer.public_key();
        let mint_key = MintKeypair::generate();
        let nft_mint = mint_key.pubkey();

        let blockhash = self.rpc.get_latest_blockhash().await?;
        let transaction = mint_transaction(target, &minter, &mint_key, blockhash.hash)?;
        let wire = bincode::serialize(&transaction)
            .map_err(|e| MintError::Submit(format!("Failed to serialize transaction: {}", e)))?;

        log::info!("Requesting wallet signature for mint {}", nft_mint);
        let signed = signer.sign_transaction(wire).await?;

        let signature = self.rpc.send_transaction(&signed).await?;
        log::info!("Mint transaction sent: {}", signature);

        self.confirm(&signature, blockhash.last_valid_block_height).await?;
        log::info!("Mint transaction confirmed: {}", signature);

        Ok(MintResult {
            transaction_signature: signature,
            minted_asset_address: nft_mint.to_string(),
        })
    }
}
