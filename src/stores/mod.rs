// Global state management
// Stores provide shared state across the application

pub mod mint;
pub mod signer;
pub mod wallet_store;
