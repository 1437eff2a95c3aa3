//! Anchor account/instruction discriminators

use sha2::{Digest, Sha256};

use crate::stores::mint::errors::{MintError, MintOutcome};

/// First 8 bytes of sha256("<namespace>:<name>")
fn sighash(namespace: &str, name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("{}:{}", namespace, name).as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Discriminator prefixed to an instruction's data
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    sighash("global", name)
}

/// Discriminator at the start of an account's data
pub fn account_discriminator(name: &str) -> [u8; 8] {
    sighash("account", name)
}

/// Borsh body of an Anchor account after checking its discriminator
pub fn account_body<'a>(data: &'a [u8], account_name: &str) -> MintOutcome<&'a [u8]> {
    match data.split_at_checked(8) {
        Some((discriminator, body)) if discriminator == account_discriminator(account_name) => Ok(body),
        Some(_) => Err(MintError::Decode(format!("Not a {} account", account_name))),
        None => Err(MintError::Decode(format!("{} account too short", account_name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_discriminator() {
        // Well-known Anchor discriminator for `initialize`
        assert_eq!(
            instruction_discriminator("initialize"),
            [175, 175, 109, 31, 13, 152, 155, 237]
        );
        assert_ne!(instruction_discriminator("mint_v2"), instruction_discriminator("mint"));
    }

    #[test]
    fn test_account_body_checks_discriminator() {
        let mut data = account_discriminator("CandyGuard").to_vec();
        data.extend_from_slice(&[7u8; 4]);

        assert_eq!(account_body(&data, "CandyGuard").unwrap(), &[7u8; 4]);
        assert!(account_body(&data, "CandyMachine").is_err());
        assert!(account_body(&data[..4], "CandyGuard").is_err());
    }
}
