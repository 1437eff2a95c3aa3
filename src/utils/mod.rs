// Utility functions
// Helper functions for common operations

pub mod anchor;
pub mod data_state;
pub mod format;

pub use data_state::DataState;
