// Services
// Remote calls: Solana RPC, candy machine reads, mint transactions, wallets

pub mod solana_rpc;
pub mod candy_machine;
pub mod mint_tx;
pub mod wallet_standard;
