pub mod use_mint_workflow;

pub use use_mint_workflow::{use_mint_workflow, UseMintWorkflow};
