use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AddressValidation {
    Success {
        address: String,
        chain: String,
        is_valid: bool,
        format_description: &'static str,
        message: &'static str,
    },
    Error {
        message: String,
        supported_chains: Vec<&'static str>,
    },
}

struct ChainPattern {
    chain: &'static str,
    pattern: &'static str,
    description: &'static str,
}

const PATTERNS: &[ChainPattern] = &[
    ChainPattern {
        chain: "ethereum",
        pattern: r"^0x[a-fA-F0-9]{40}$",
        description: "Ethereum addresses start with '0x' followed by 40 hexadecimal characters",
    },
    ChainPattern {
        chain: "bitcoin",
        pattern: r"^(1|3|bc1)[a-zA-HJ-NP-Z0-9]{25,62}$",
        description: "Bitcoin addresses start with '1', '3', or 'bc1'",
    },
    ChainPattern {
        chain: "solana",
        pattern: r"^[1-9A-HJ-NP-Za-km-z]{32,44}$",
        description: "Solana addresses are base58 encoded, typically 32-44 characters",
    },
];

/// Wallet address format checker with per-chain patterns compiled once.
pub struct AddressValidator {
    compiled: Vec<(Regex, &'static ChainPattern)>,
}

impl AddressValidator {
    pub fn new() -> Result<Self> {
        let mut compiled = Vec::with_capacity(PATTERNS.len());
        for entry in PATTERNS {
            let regex = Regex::new(entry.pattern).map_err(|e| {
                Error::validation(format!(
                    "Invalid address pattern for {}: {}",
                    entry.chain, e
                ))
            })?;
            compiled.push((regex, entry));
        }
        Ok(Self { compiled })
    }

    pub fn supported_chains(&self) -> Vec<&'static str> {
        self.compiled.iter().map(|(_, entry)| entry.chain).collect()
    }

    /// Check an address against the format for the given chain. This is a
    /// format check only, not proof the address exists on chain.
    pub fn validate(&self, address: &str, chain: &str) -> AddressValidation {
        let chain_key = chain.trim().to_lowercase();

        let Some((regex, entry)) = self
            .compiled
            .iter()
            .find(|(_, entry)| entry.chain == chain_key)
        else {
            return AddressValidation::Error {
                message: format!("Validation not supported for chain: {}", chain),
                supported_chains: self.supported_chains(),
            };
        };

        let is_valid = regex.is_match(address);
        AddressValidation::Success {
            address: address.to_string(),
            chain: chain.to_string(),
            is_valid,
            format_description: entry.description,
            message: if is_valid {
                "Address format is valid!"
            } else {
                "Invalid address format."
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> AddressValidator {
        AddressValidator::new().unwrap()
    }

    #[test]
    fn test_valid_ethereum_address() {
        let result = validator().validate("0x742d35Cc6634C0532925a3b844Bc454e4438f44e", "ethereum");
        match result {
            AddressValidation::Success { is_valid, .. } => assert!(is_valid),
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn test_invalid_ethereum_address() {
        // Too short, and no 0x prefix
        let result = validator().validate("742d35Cc", "ethereum");
        match result {
            AddressValidation::Success {
                is_valid, message, ..
            } => {
                assert!(!is_valid);
                assert_eq!(message, "Invalid address format.");
            }
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn test_bitcoin_address_prefixes() {
        let v = validator();
        for address in [
            "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa",
            "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy",
            "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq",
        ] {
            match v.validate(address, "bitcoin") {
                AddressValidation::Success { is_valid, .. } => {
                    assert!(is_valid, "should accept {}", address)
                }
                _ => panic!("expected success"),
            }
        }
    }

    #[test]
    fn test_solana_address() {
        let result = validator().validate("4Nd1mYvM8LqPXKsj7DqbkMdBmUJACwsa8vdYDyykmgGV", "solana");
        match result {
            AddressValidation::Success { is_valid, .. } => assert!(is_valid),
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn test_unsupported_chain() {
        let result = validator().validate("addr1q9xyz", "cardano");
        match result {
            AddressValidation::Error {
                message,
                supported_chains,
            } => {
                assert!(message.contains("cardano"));
                assert_eq!(supported_chains, vec!["ethereum", "bitcoin", "solana"]);
            }
            _ => panic!("expected error"),
        }
    }

    #[test]
    fn test_chain_name_is_case_insensitive() {
        let result = validator().validate("0x742d35Cc6634C0532925a3b844Bc454e4438f44e", "Ethereum");
        match result {
            AddressValidation::Success { is_valid, chain, .. } => {
                assert!(is_valid);
                // Echoes the caller's casing
                assert_eq!(chain, "Ethereum");
            }
            _ => panic!("expected success"),
        }
    }
}
