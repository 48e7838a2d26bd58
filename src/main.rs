use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use chainbuddy::app::{AppConfig, AppState};
use chainbuddy::cli::{Cli, Commands, ToolCommand};
use chainbuddy::tools::{address, chains, contracts, gas, units};
use chainbuddy::server;

const DEFAULT_CONFIG_FILE: &str = "chainbuddy.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.debug {
        "chainbuddy=debug"
    } else {
        "chainbuddy=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse().unwrap()),
        )
        .init();

    let config_path = PathBuf::from(cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_FILE));

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            info!("Starting ChainBuddy");

            let mut config = AppConfig::load(&config_path).await?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let state = AppState::new(config)?;
            server::serve(state).await?;
        }
        Commands::Tools { tool } => {
            let payload = match tool {
                ToolCommand::Chain { name } => serde_json::to_value(chains::blockchain_info(&name))?,
                ToolCommand::Address { address: addr, chain } => {
                    let validator = address::AddressValidator::new()?;
                    serde_json::to_value(validator.validate(&addr, &chain))?
                }
                ToolCommand::Gas { chain } => serde_json::to_value(gas::gas_fees(&chain))?,
                ToolCommand::Template { kind } => {
                    serde_json::to_value(contracts::contract_template(&kind))?
                }
                ToolCommand::Convert {
                    amount,
                    from_unit,
                    to_unit,
                } => serde_json::to_value(units::convert(amount, &from_unit, &to_unit))?,
            };
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}
