use serde::Serialize;

/// Reference data for a supported blockchain network.
#[derive(Debug, Clone, Serialize)]
pub struct ChainInfo {
    pub name: &'static str,
    pub symbol: &'static str,
    pub consensus: &'static str,
    pub avg_block_time: &'static str,
    pub smart_contracts: bool,
    pub launched: &'static str,
    pub founder: &'static str,
    pub website: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChainLookup {
    Success {
        data: ChainInfo,
    },
    NotFound {
        message: String,
        available_chains: Vec<&'static str>,
    },
}

const CHAINS: &[(&str, ChainInfo)] = &[
    (
        "ethereum",
        ChainInfo {
            name: "Ethereum",
            symbol: "ETH",
            consensus: "Proof of Stake (PoS)",
            avg_block_time: "~12 seconds",
            smart_contracts: true,
            launched: "2015",
            founder: "Vitalik Buterin",
            website: "https://ethereum.org",
            description: "A decentralized platform for building dApps and smart contracts.",
        },
    ),
    (
        "bitcoin",
        ChainInfo {
            name: "Bitcoin",
            symbol: "BTC",
            consensus: "Proof of Work (PoW)",
            avg_block_time: "~10 minutes",
            smart_contracts: false,
            launched: "2009",
            founder: "Satoshi Nakamoto",
            website: "https://bitcoin.org",
            description: "The first and most well-known cryptocurrency, designed as a peer-to-peer electronic cash system.",
        },
    ),
    (
        "solana",
        ChainInfo {
            name: "Solana",
            symbol: "SOL",
            consensus: "Proof of History (PoH) + Proof of Stake",
            avg_block_time: "~400 milliseconds",
            smart_contracts: true,
            launched: "2020",
            founder: "Anatoly Yakovenko",
            website: "https://solana.com",
            description: "A high-performance blockchain supporting fast transactions and low fees.",
        },
    ),
    (
        "polygon",
        ChainInfo {
            name: "Polygon",
            symbol: "MATIC",
            consensus: "Proof of Stake (PoS)",
            avg_block_time: "~2 seconds",
            smart_contracts: true,
            launched: "2017",
            founder: "Jaynti Kanani, Sandeep Nailwal, Anurag Arjun",
            website: "https://polygon.technology",
            description: "An Ethereum Layer 2 scaling solution for faster and cheaper transactions.",
        },
    ),
    (
        "binance",
        ChainInfo {
            name: "BNB Chain (Binance Smart Chain)",
            symbol: "BNB",
            consensus: "Proof of Staked Authority (PoSA)",
            avg_block_time: "~3 seconds",
            smart_contracts: true,
            launched: "2020",
            founder: "Changpeng Zhao (CZ)",
            website: "https://www.bnbchain.org",
            description: "A blockchain focusing on fast and low-cost transactions, EVM compatible.",
        },
    ),
    (
        "avalanche",
        ChainInfo {
            name: "Avalanche",
            symbol: "AVAX",
            consensus: "Avalanche Consensus (PoS variant)",
            avg_block_time: "~2 seconds",
            smart_contracts: true,
            launched: "2020",
            founder: "Emin Gun Sirer",
            website: "https://www.avax.network",
            description: "A highly scalable blockchain platform for dApps.",
        },
    ),
    (
        "cardano",
        ChainInfo {
            name: "Cardano",
            symbol: "ADA",
            consensus: "Ouroboros Proof of Stake",
            avg_block_time: "~20 seconds",
            smart_contracts: true,
            launched: "2017",
            founder: "Charles Hoskinson",
            website: "https://cardano.org",
            description: "A research-driven blockchain focused on security.",
        },
    ),
];

pub fn available_chains() -> Vec<&'static str> {
    CHAINS.iter().map(|(key, _)| *key).collect()
}

/// Look up a blockchain by name, case-insensitively.
pub fn blockchain_info(chain_name: &str) -> ChainLookup {
    let chain_key = chain_name.trim().to_lowercase();

    match CHAINS.iter().find(|(key, _)| *key == chain_key) {
        Some((_, info)) => ChainLookup::Success { data: info.clone() },
        None => ChainLookup::NotFound {
            message: format!("Blockchain '{}' not found.", chain_name),
            available_chains: available_chains(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let result = blockchain_info("  Ethereum ");
        match result {
            ChainLookup::Success { data } => {
                assert_eq!(data.symbol, "ETH");
                assert!(data.smart_contracts);
            }
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn test_unknown_chain_lists_alternatives() {
        let result = blockchain_info("dogecoin");
        match result {
            ChainLookup::NotFound {
                message,
                available_chains,
            } => {
                assert!(message.contains("dogecoin"));
                assert_eq!(available_chains.len(), 7);
                assert!(available_chains.contains(&"binance"));
            }
            _ => panic!("expected not_found"),
        }
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(blockchain_info("bitcoin")).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["consensus"], "Proof of Work (PoW)");
        assert_eq!(value["data"]["smart_contracts"], false);

        let value = serde_json::to_value(blockchain_info("nope")).unwrap();
        assert_eq!(value["status"], "not_found");
        assert!(value["available_chains"].is_array());
    }
}
