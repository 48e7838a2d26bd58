pub mod address;
pub mod chains;
pub mod contracts;
pub mod gas;
pub mod units;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::Result;
use crate::models::ToolDeclaration;

pub use address::{AddressValidation, AddressValidator};
pub use chains::{ChainInfo, ChainLookup};
pub use contracts::{ContractTemplate, TemplateLookup};
pub use gas::{GasInfo, GasLookup};
pub use units::UnitConversion;

/// The blockchain helper functions exposed both as direct HTTP endpoints and
/// as callable functions for the model.
pub struct Toolkit {
    address_validator: AddressValidator,
}

impl Toolkit {
    pub fn new() -> Result<Self> {
        Ok(Self {
            address_validator: AddressValidator::new()?,
        })
    }

    pub fn address_validator(&self) -> &AddressValidator {
        &self.address_validator
    }

    /// Function declarations advertised to the model.
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        vec![
            ToolDeclaration {
                name: "get_blockchain_info".to_string(),
                description: "Get basic information about a specific blockchain network."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "chain_name": {
                            "type": "string",
                            "description": "The name of the blockchain (e.g., 'ethereum', 'bitcoin', 'solana', 'polygon')"
                        }
                    },
                    "required": ["chain_name"]
                }),
            },
            ToolDeclaration {
                name: "validate_wallet_address".to_string(),
                description: "Validate a wallet address format for a given blockchain."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "address": {
                            "type": "string",
                            "description": "The wallet address to validate"
                        },
                        "chain": {
                            "type": "string",
                            "description": "The blockchain network (default: 'ethereum')"
                        }
                    },
                    "required": ["address"]
                }),
            },
            ToolDeclaration {
                name: "explain_gas_fees".to_string(),
                description: "Explain how gas fees work on a specific blockchain.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "chain": {
                            "type": "string",
                            "description": "The blockchain network to explain gas fees for"
                        }
                    }
                }),
            },
            ToolDeclaration {
                name: "get_smart_contract_template".to_string(),
                description: "Get a basic smart contract template for common use cases."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "contract_type": {
                            "type": "string",
                            "description": "The type of contract ('erc20', 'erc721', 'simple_storage')"
                        }
                    },
                    "required": ["contract_type"]
                }),
            },
            ToolDeclaration {
                name: "convert_crypto_units".to_string(),
                description: "Convert between different cryptocurrency unit denominations."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "amount": {
                            "type": "number",
                            "description": "The amount to convert"
                        },
                        "from_unit": {
                            "type": "string",
                            "description": "The unit to convert from (e.g., 'eth', 'gwei', 'wei')"
                        },
                        "to_unit": {
                            "type": "string",
                            "description": "The unit to convert to"
                        }
                    },
                    "required": ["amount", "from_unit", "to_unit"]
                }),
            },
        ]
    }

    /// Execute a function call issued by the model. Failures are reported as
    /// error payloads rather than errors so the model can see them and
    /// recover.
    pub fn execute(&self, name: &str, args: &Value) -> Value {
        debug!("Executing tool '{}'", name);

        match name {
            "get_blockchain_info" => match required_str(args, "chain_name") {
                Ok(chain_name) => to_payload(chains::blockchain_info(chain_name)),
                Err(error) => error,
            },
            "validate_wallet_address" => match required_str(args, "address") {
                Ok(address) => {
                    let chain = optional_str(args, "chain", "ethereum");
                    to_payload(self.address_validator.validate(address, chain))
                }
                Err(error) => error,
            },
            "explain_gas_fees" => {
                let chain = optional_str(args, "chain", "ethereum");
                to_payload(gas::gas_fees(chain))
            }
            "get_smart_contract_template" => match required_str(args, "contract_type") {
                Ok(contract_type) => to_payload(contracts::contract_template(contract_type)),
                Err(error) => error,
            },
            "convert_crypto_units" => {
                let amount = match parse_amount(args) {
                    Ok(amount) => amount,
                    Err(error) => return error,
                };
                match (required_str(args, "from_unit"), required_str(args, "to_unit")) {
                    (Ok(from_unit), Ok(to_unit)) => {
                        to_payload(units::convert(amount, from_unit, to_unit))
                    }
                    (Err(error), _) | (_, Err(error)) => error,
                }
            }
            _ => json!({
                "status": "error",
                "message": format!("Unknown tool: {}", name)
            }),
        }
    }
}

fn to_payload(result: impl Serialize) -> Value {
    serde_json::to_value(result).unwrap_or_else(|e| {
        json!({
            "status": "error",
            "message": format!("Failed to encode tool result: {}", e)
        })
    })
}

fn missing_arg(key: &str) -> Value {
    json!({
        "status": "error",
        "message": format!("Missing required argument: {}", key)
    })
}

fn required_str<'a>(args: &'a Value, key: &str) -> std::result::Result<&'a str, Value> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| missing_arg(key))
}

fn optional_str<'a>(args: &'a Value, key: &str, default: &'a str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn parse_amount(args: &Value) -> std::result::Result<Decimal, Value> {
    let Some(raw) = args.get("amount") else {
        return Err(missing_arg("amount"));
    };

    // Accepts both JSON numbers and numeric strings
    serde_json::from_value::<Decimal>(raw.clone()).map_err(|_| {
        json!({
            "status": "error",
            "message": format!("Invalid amount: {}", raw)
        })
    })
}
