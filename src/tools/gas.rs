use serde::Serialize;

/// Gas fee reference for one chain.
#[derive(Debug, Clone, Serialize)]
pub struct GasInfo {
    pub fee_name: &'static str,
    pub unit: &'static str,
    pub components: &'static [&'static str],
    pub explanation: &'static str,
    pub typical_costs: TypicalCosts,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypicalCosts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple_transfer: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_transfer: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GasLookup {
    Success {
        chain: String,
        gas_info: GasInfo,
    },
    NotFound {
        message: String,
        available_chains: Vec<&'static str>,
    },
}

const GAS_INFO: &[(&str, GasInfo)] = &[
    (
        "ethereum",
        GasInfo {
            fee_name: "Gas",
            unit: "Gwei (1 Gwei = 0.000000001 ETH)",
            components: &["Base Fee", "Priority Fee (Tip)"],
            explanation: "Ethereum gas fees consist of Base Fee (burned) and Priority Fee (tip to validators).",
            typical_costs: TypicalCosts {
                simple_transfer: Some("21,000 gas units"),
                token_transfer: Some("~65,000 gas units"),
                swap: Some("~150,000 gas units"),
            },
        },
    ),
    (
        "solana",
        GasInfo {
            fee_name: "Transaction Fee",
            unit: "Lamports (1 SOL = 1,000,000,000 Lamports)",
            components: &["Base Fee", "Priority Fee"],
            explanation: "Solana has extremely low fees, typically a fraction of a cent.",
            typical_costs: TypicalCosts {
                simple_transfer: Some("~0.000005 SOL"),
                token_transfer: Some("~0.00001 SOL"),
                swap: None,
            },
        },
    ),
    (
        "polygon",
        GasInfo {
            fee_name: "Gas (MATIC)",
            unit: "Gwei (paid in MATIC)",
            components: &["Base Fee", "Priority Fee"],
            explanation: "Polygon uses a similar gas model to Ethereum but much cheaper.",
            typical_costs: TypicalCosts {
                simple_transfer: Some("~$0.001-0.01"),
                token_transfer: None,
                swap: Some("~$0.05-0.20"),
            },
        },
    ),
];

pub fn available_chains() -> Vec<&'static str> {
    GAS_INFO.iter().map(|(key, _)| *key).collect()
}

pub fn gas_fees(chain: &str) -> GasLookup {
    let chain_key = chain.trim().to_lowercase();

    match GAS_INFO.iter().find(|(key, _)| *key == chain_key) {
        Some((_, info)) => GasLookup::Success {
            chain: chain.to_string(),
            gas_info: info.clone(),
        },
        None => GasLookup::NotFound {
            message: format!("Gas fee information not available for {}", chain),
            available_chains: available_chains(),
        },
    }
}
