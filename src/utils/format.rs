use crate::config::Cluster;
use crate::stores::mint::types::LAMPORTS_PER_SOL;

/// Format lamports as SOL without trailing zeros (e.g., 500000000 -> "0.5")
pub fn format_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let fraction = lamports % LAMPORTS_PER_SOL;

    if fraction == 0 {
        return whole.to_string();
    }

    let digits = format!("{:09}", fraction);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Truncates a base58 address to show first 4 and last 4 chars
/// Returns "AbCd..WxYz" format for long strings
pub fn truncate_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}..{}", &address[..4], &address[address.len() - 4..])
}

/// Solscan page for a minted token
pub fn explorer_token_url(mint_address: &str, cluster: Cluster) -> String {
    match cluster.explorer_query() {
        Some(name) => format!("https://solscan.io/token/{}?cluster={}", mint_address, name),
        None => format!("https://solscan.io/token/{}", mint_address),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sol() {
        assert_eq!(format_sol(500_000_000), "0.5");
        assert_eq!(format_sol(1_000_000_000), "1");
        assert_eq!(format_sol(0), "0");
        assert_eq!(format_sol(1_250_000_000), "1.25");
        assert_eq!(format_sol(1), "0.000000001");
    }

    #[test]
    fn test_truncate_address() {
        assert_eq!(
            truncate_address("9BokyUPDNHgsbbNy2gviC5r6aCg6oYoGN3auuuc3J8K9"),
            "9Bok..J8K9"
        );
        assert_eq!(truncate_address("short"), "short");
    }

    #[test]
    fn test_explorer_token_url() {
        assert_eq!(
            explorer_token_url("XYZ", Cluster::MainnetBeta),
            "https://solscan.io/token/XYZ"
        );
        assert_eq!(
            explorer_token_url("XYZ", Cluster::Devnet),
            "https://solscan.io/token/XYZ?cluster=devnet"
        );
    }
}
