use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(name = "chainbuddy")]
#[command(about = "Blockchain assistant HTTP API backed by a generative AI model")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Bind address override
        #[arg(long)]
        host: Option<String>,

        /// Port override
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run a blockchain tool directly from the shell
    Tools {
        #[command(subcommand)]
        tool: ToolCommand,
    },
}

#[derive(Subcommand)]
pub enum ToolCommand {
    /// Look up information about a blockchain network
    Chain {
        /// Blockchain name (e.g. ethereum, bitcoin, solana)
        name: String,
    },

    /// Validate a wallet address format
    Address {
        /// The wallet address to check
        address: String,

        /// The blockchain network the address belongs to
        #[arg(short, long, default_value = "ethereum")]
        chain: String,
    },

    /// Show gas fee information for a chain
    Gas {
        /// Blockchain name
        chain: String,
    },

    /// Print a smart contract starter template
    Template {
        /// Template kind (erc20, erc721, simple_storage)
        kind: String,
    },

    /// Convert between crypto unit denominations
    Convert {
        /// Amount to convert
        amount: Decimal,

        /// Unit to convert from (e.g. eth, gwei, wei)
        from_unit: String,

        /// Unit to convert to
        to_unit: String,
    },
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            command: Some(Commands::Serve {
                host: None,
                port: None,
            }),
            config: None,
            debug: false,
        }
    }
}
