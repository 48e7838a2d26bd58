use rust_decimal::Decimal;
use serde::Serialize;

/// Units accepted by the converter, grouped by chain family.
pub const AVAILABLE_UNITS: &[&str] = &[
    "wei", "gwei", "eth", "ether", "satoshi", "sat", "btc", "bitcoin", "lamport", "lamports",
    "sol", "solana",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Ethereum,
    Bitcoin,
    Solana,
}

impl Family {
    fn as_str(self) -> &'static str {
        match self {
            Family::Ethereum => "ethereum",
            Family::Bitcoin => "bitcoin",
            Family::Solana => "solana",
        }
    }
}

/// Base-unit factor for a denomination: wei for Ethereum, satoshi for
/// Bitcoin, lamports for Solana.
fn unit_factor(unit: &str) -> Option<(Family, u64)> {
    match unit {
        "wei" => Some((Family::Ethereum, 1)),
        "gwei" => Some((Family::Ethereum, 1_000_000_000)),
        "eth" | "ether" => Some((Family::Ethereum, 1_000_000_000_000_000_000)),
        "satoshi" | "sat" => Some((Family::Bitcoin, 1)),
        "btc" | "bitcoin" => Some((Family::Bitcoin, 100_000_000)),
        "lamport" | "lamports" => Some((Family::Solana, 1)),
        "sol" | "solana" => Some((Family::Solana, 1_000_000_000)),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitAmount {
    pub amount: Decimal,
    pub unit: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitConversion {
    Success {
        input: UnitAmount,
        output: UnitAmount,
        blockchain: &'static str,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        available_units: Option<Vec<&'static str>>,
    },
}

/// Convert between denominations of the same chain family.
pub fn convert(amount: Decimal, from_unit: &str, to_unit: &str) -> UnitConversion {
    let from_lower = from_unit.trim().to_lowercase();
    let to_lower = to_unit.trim().to_lowercase();

    let (Some((from_family, from_factor)), Some((to_family, to_factor))) =
        (unit_factor(&from_lower), unit_factor(&to_lower))
    else {
        return UnitConversion::Error {
            message: "Invalid unit specified".to_string(),
            available_units: Some(AVAILABLE_UNITS.to_vec()),
        };
    };

    if from_family != to_family {
        return UnitConversion::Error {
            message: format!(
                "Cannot convert between different blockchains ({} to {})",
                from_family.as_str(),
                to_family.as_str()
            ),
            available_units: None,
        };
    }

    let result = amount
        .checked_mul(Decimal::from(from_factor))
        .and_then(|base| base.checked_div(Decimal::from(to_factor)));

    match result {
        Some(converted) => UnitConversion::Success {
            input: UnitAmount {
                amount,
                unit: from_unit.to_string(),
            },
            output: UnitAmount {
                amount: converted.normalize(),
                unit: to_unit.to_string(),
            },
            blockchain: from_family.as_str(),
        },
        None => UnitConversion::Error {
            message: format!("Amount {} is out of range for {}", amount, from_unit),
            available_units: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_gwei_to_eth() {
        match convert(dec("1500000000"), "gwei", "eth") {
            UnitConversion::Success {
                output, blockchain, ..
            } => {
                assert_eq!(output.amount, dec("1.5"));
                assert_eq!(blockchain, "ethereum");
            }
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn test_btc_to_satoshi() {
        match convert(dec("0.5"), "btc", "satoshi") {
            UnitConversion::Success { output, .. } => {
                assert_eq!(output.amount, dec("50000000"));
            }
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn test_wei_to_eth_is_exact() {
        match convert(dec("1"), "wei", "eth") {
            UnitConversion::Success { output, .. } => {
                assert_eq!(output.amount, dec("0.000000000000000001"));
            }
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn test_sol_aliases() {
        match convert(dec("2"), "SOL", "lamports") {
            UnitConversion::Success {
                output, blockchain, ..
            } => {
                assert_eq!(output.amount, dec("2000000000"));
                assert_eq!(blockchain, "solana");
            }
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn test_cross_family_rejected() {
        match convert(dec("1"), "eth", "btc") {
            UnitConversion::Error {
                message,
                available_units,
            } => {
                assert!(message.contains("ethereum to bitcoin"));
                assert!(available_units.is_none());
            }
            _ => panic!("expected error"),
        }
    }

    #[test]
    fn test_unknown_unit_lists_alternatives() {
        match convert(dec("1"), "doge", "eth") {
            UnitConversion::Error {
                available_units, ..
            } => {
                assert_eq!(available_units.unwrap().len(), 12);
            }
            _ => panic!("expected error"),
        }
    }
}
