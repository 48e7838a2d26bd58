use serde::Serialize;

/// A Solidity starter template.
#[derive(Debug, Clone, Serialize)]
pub struct ContractTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub code: &'static str,
    pub explanation: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TemplateLookup {
    Success {
        template: ContractTemplate,
    },
    NotFound {
        message: String,
        available_templates: Vec<&'static str>,
    },
}

const ERC20_CODE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

import "@openzeppelin/contracts/token/ERC20/ERC20.sol";
import "@openzeppelin/contracts/access/Ownable.sol";

contract MyToken is ERC20, Ownable {
    constructor(
        string memory name,
        string memory symbol,
        uint256 initialSupply
    ) ERC20(name, symbol) Ownable(msg.sender) {
        _mint(msg.sender, initialSupply * 10 ** decimals());
    }

    function mint(address to, uint256 amount) public onlyOwner {
        _mint(to, amount);
    }
}"#;

const ERC721_CODE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

import "@openzeppelin/contracts/token/ERC721/ERC721.sol";
import "@openzeppelin/contracts/token/ERC721/extensions/ERC721URIStorage.sol";
import "@openzeppelin/contracts/access/Ownable.sol";

contract MyNFT is ERC721, ERC721URIStorage, Ownable {
    uint256 private _tokenIdCounter;

    constructor() ERC721("MyNFT", "MNFT") Ownable(msg.sender) {}

    function safeMint(address to, string memory uri) public onlyOwner {
        uint256 tokenId = _tokenIdCounter;
        _tokenIdCounter++;
        _safeMint(to, tokenId);
        _setTokenURI(tokenId, uri);
    }

    function tokenURI(uint256 tokenId)
        public
        view
        override(ERC721, ERC721URIStorage)
        returns (string memory)
    {
        return super.tokenURI(tokenId);
    }

    function supportsInterface(bytes4 interfaceId)
        public
        view
        override(ERC721, ERC721URIStorage)
        returns (bool)
    {
        return super.supportsInterface(interfaceId);
    }
}"#;

const SIMPLE_STORAGE_CODE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

contract SimpleStorage {
    uint256 private storedValue;

    event ValueChanged(uint256 newValue, address changedBy);

    function set(uint256 value) public {
        storedValue = value;
        emit ValueChanged(value, msg.sender);
    }

    function get() public view returns (uint256) {
        return storedValue;
    }
}"#;

const TEMPLATES: &[(&str, ContractTemplate)] = &[
    (
        "erc20",
        ContractTemplate {
            name: "ERC-20 Token",
            description: "Standard fungible token contract",
            code: ERC20_CODE,
            explanation: "This creates a basic ERC-20 token with minting capability. Uses OpenZeppelin for security.",
        },
    ),
    (
        "erc721",
        ContractTemplate {
            name: "ERC-721 NFT",
            description: "Standard non-fungible token (NFT) contract",
            code: ERC721_CODE,
            explanation: "A basic NFT contract with metadata URI storage. Each token is unique and can have its own metadata.",
        },
    ),
    (
        "simple_storage",
        ContractTemplate {
            name: "Simple Storage",
            description: "A basic contract for learning Solidity",
            code: SIMPLE_STORAGE_CODE,
            explanation: "A beginner-friendly contract that stores a single number. Great for learning Solidity basics.",
        },
    ),
];

pub fn available_templates() -> Vec<&'static str> {
    TEMPLATES.iter().map(|(key, _)| *key).collect()
}

pub fn contract_template(contract_type: &str) -> TemplateLookup {
    let contract_key = contract_type.trim().to_lowercase();

    match TEMPLATES.iter().find(|(key, _)| *key == contract_key) {
        Some((_, template)) => TemplateLookup::Success {
            template: template.clone(),
        },
        None => TemplateLookup::NotFound {
            message: format!("Template '{}' not found.", contract_type),
            available_templates: available_templates(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erc20_template() {
        match contract_template("ERC20") {
            TemplateLookup::Success { template } => {
                assert_eq!(template.name, "ERC-20 Token");
                assert!(template.code.contains("contract MyToken is ERC20"));
            }
            _ => panic!("expected success"),
        }
    }

    #[test]
    fn test_unknown_template() {
        match contract_template("erc1155") {
            TemplateLookup::NotFound {
                available_templates,
                ..
            } => {
                assert_eq!(
                    available_templates,
                    vec!["erc20", "erc721", "simple_storage"]
                );
            }
            _ => panic!("expected not_found"),
        }
    }

    #[test]
    fn test_all_templates_carry_solidity_pragma() {
        for key in available_templates() {
            match contract_template(key) {
                TemplateLookup::Success { template } => {
                    assert!(template.code.contains("pragma solidity"));
                }
                _ => panic!("expected success for {}", key),
            }
        }
    }
}
