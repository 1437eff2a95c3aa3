//! Mint workflow: pure state machine plus its async driver

pub mod errors;
pub mod machine;
pub mod types;
pub mod workflow;

pub use errors::{MintError, MintOutcome};
pub use machine::{MintMachine, MintView};
pub use types::{ButtonAffordance, MintPhase, MintResult, MintState, WalletSession};
pub use workflow::{LedgerReader, MachineCell, MintWorkflow, SubmitErrorHook, TransactionSubmitter};
