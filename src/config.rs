//! Build-time configuration
//!
//! The contract address, RPC endpoint and cluster all come from the build
//! environment (`option_env!`), so a devnet build points every collaborator
//! at devnet at once.

use once_cell::sync::Lazy;
use std::str::FromStr;

/// Candy machine minted from when `CANDY_MACHINE_ID` is not set
pub const DEFAULT_CANDY_MACHINE_ID: &str = "9BokyUPDNHgsbbNy2gviC5r6aCg6oYoGN3auuuc3J8K9";

/// Solana cluster the app talks to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cluster {
    #[default]
    MainnetBeta,
    Devnet,
    Testnet,
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "mainnet-beta" => Ok(Cluster::MainnetBeta),
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            other => Err(format!("Unknown Solana cluster: {}", other)),
        }
    }
}

impl Cluster {
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
        }
    }

    /// Wallet Standard chain identifier
    pub fn wallet_chain(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "solana:mainnet",
            Cluster::Devnet => "solana:devnet",
            Cluster::Testnet => "solana:testnet",
        }
    }

    /// `?cluster=` value for explorer links (mainnet needs none)
    pub fn explorer_query(&self) -> Option<&'static str> {
        match self {
            Cluster::MainnetBeta => None,
            Cluster::Devnet => Some("devnet"),
            Cluster::Testnet => Some("testnet"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MintConfig {
    pub candy_machine_id: String,
    pub rpc_url: String,
    pub cluster: Cluster,
    /// Show a toast when a mint fails (log-only otherwise)
    pub surface_errors: bool,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self::from_values(None, None, None, None)
    }
}

impl MintConfig {
    pub fn from_env() -> Self {
        Self::from_values(
            option_env!("CANDY_MACHINE_ID"),
            option_env!("SOLANA_RPC_URL"),
            option_env!("SOLANA_CLUSTER"),
            option_env!("MINT_SURFACE_ERRORS"),
        )
    }

    pub fn from_values(
        candy_machine_id: Option<&str>,
        rpc_url: Option<&str>,
        cluster: Option<&str>,
        surface_errors: Option<&str>,
    ) -> Self {
        let cluster = match cluster.map(str::parse::<Cluster>) {
            Some(Ok(cluster)) => cluster,
            Some(Err(e)) => {
                log::warn!("{}, using mainnet-beta", e);
                Cluster::default()
            }
            None => Cluster::default(),
        };

        let candy_machine_id = candy_machine_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_CANDY_MACHINE_ID)
            .to_string();

        let rpc_url = match rpc_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(raw) => match url::Url::parse(raw) {
                Ok(parsed) if parsed.scheme() == "https" || parsed.scheme() == "http" => raw.to_string(),
                _ => {
                    log::warn!("Ignoring invalid SOLANA_RPC_URL: {}", raw);
                    cluster.default_rpc_url().to_string()
                }
            },
            None => cluster.default_rpc_url().to_string(),
        };

        let surface_errors = surface_errors
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            candy_machine_id,
            rpc_url,
            cluster,
            surface_errors,
        }
    }
}

/// Process-wide configuration
pub static CONFIG: Lazy<MintConfig> = Lazy::new(MintConfig::from_env);
