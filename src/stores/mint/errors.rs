//! Mint workflow error types
//!
//! Typed errors for the ledger read and transaction submit paths. None of
//! these are fatal: the workflow logs them and falls back to its previous state.

use std::fmt;

/// Mint workflow error type
#[derive(Debug, Clone, PartialEq)]
pub enum MintError {
    // ==========================================================================
    // Ledger Read Errors
    // ==========================================================================
    /// Transport failure while reading mint state
    FetchState(String),
    AccountNotFound { address: String },
    Decode(String),
    /// The candy machine has no candy guard (or no sol payment guard)
    GuardAbsent,
    InvalidAddress(String),

    // ==========================================================================
    // Wallet Errors
    // ==========================================================================
    WalletUnavailable,
    WalletRejected(String),

    // ==========================================================================
    // Submit Errors
    // ==========================================================================
    Rpc { code: i64, message: String },
    Network(String),
    TransactionFailed(String),
    BlockhashExpired { signature: String },
    Submit(String),
}

impl fmt::Display for MintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchState(msg) => write!(f, "Failed to fetch mint state: {}", msg),
            Self::AccountNotFound { address } => write!(f, "Account not found: {}", address),
            Self::Decode(msg) => write!(f, "Failed to decode account data: {}", msg),
            Self::GuardAbsent => write!(f, "Candy machine has no payment guard"),
            Self::InvalidAddress(addr) => write!(f, "Invalid address: {}", addr),

            Self::WalletUnavailable => write!(f, "Wallet not connected"),
            Self::WalletRejected(msg) => write!(f, "Wallet rejected the request: {}", msg),

            Self::Rpc { code, message } => write!(f, "RPC error {}: {}", code, message),
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::TransactionFailed(msg) => write!(f, "Transaction failed: {}", msg),
            Self::BlockhashExpired { signature } => {
                write!(f, "Transaction {} expired before confirmation", signature)
            }
            Self::Submit(msg) => write!(f, "Mint submission failed: {}", msg),
        }
    }
}

impl std::error::Error for MintError {}

/// Result type alias for mint operations
pub type MintOutcome<T> = Result<T, MintError>;

impl MintError {
    /// Whether the user declined the signature request
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::WalletRejected(_))
            || self.to_string().to_lowercase().contains("user rejected")
    }
}

// =============================================================================
// Conversion Traits
// =============================================================================

impl From<gloo_net::Error> for MintError {
    fn from(err: gloo_net::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<base64::DecodeError> for MintError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Borsh reports truncated or malformed account data as I/O errors
impl From<std::io::Error> for MintError {
    fn from(err: std::io::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_rejection() {
        assert!(MintError::WalletRejected("closed".to_string()).is_user_rejection());
        assert!(MintError::Submit("User rejected the request.".to_string()).is_user_rejection());
        assert!(!MintError::Network("timeout".to_string()).is_user_rejection());
    }

    #[test]
    fn test_display() {
        let err = MintError::Rpc { code: -32002, message: "preflight failed".to_string() };
        assert_eq!(err.to_string(), "RPC error -32002: preflight failed");
    }
}
