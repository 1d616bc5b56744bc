use std::env;
use std::fs;
use std::path::PathBuf;

use ethers::types::Address;
use serde::Deserialize;

use crate::errors::{AppError, AppResult};

/// cUSD on Alfajores.
pub const CUSD_CONTRACT_ADDRESS: &str = "0x874069Fa1Eb16D44d622F2e0Ca25eeA172369bC1";
pub const EXPLORER_URL: &str = "https://alfajores-blockscout.celo-testnet.org";

const DEFAULT_CONTRACT_JSON: &str = "contract.json";
const DEFAULT_PAGE: &str = "marketplace.html";
const DEFAULT_LOG_FILE: &str = "logs/log.txt";

/// Deployment artifact written next to the marketplace ABI.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_address: Address,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: Option<String>,
    pub wallet_key: Option<String>,
    pub marketplace_address: Address,
    pub cusd_address: Address,
    pub page_path: PathBuf,
    pub log_file: PathBuf,
}

impl Config {
    /// Reads `.env`, the process environment and the contract artifact.
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();

        let marketplace_address = match non_empty_var("MARKETPLACE_ADDRESS") {
            Some(address) => parse_address("MARKETPLACE_ADDRESS", &address)?,
            None => {
                let path = non_empty_var("CONTRACT_JSON")
                    .unwrap_or_else(|| DEFAULT_CONTRACT_JSON.to_string());
                load_artifact(&path)?.contract_address
            }
        };

        let cusd_address = parse_address(
            "CUSD_ADDRESS",
            &non_empty_var("CUSD_ADDRESS").unwrap_or_else(|| CUSD_CONTRACT_ADDRESS.to_string()),
        )?;

        Ok(Config {
            rpc_url: non_empty_var("RPC_URL"),
            wallet_key: non_empty_var("WALLET_KEY"),
            marketplace_address,
            cusd_address,
            page_path: non_empty_var("MARKETPLACE_HTML")
                .unwrap_or_else(|| DEFAULT_PAGE.to_string())
                .into(),
            log_file: non_empty_var("LOG_FILE")
                .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
                .into(),
        })
    }
}

pub fn load_artifact(path: &str) -> AppResult<ContractArtifact> {
    let raw = fs::read_to_string(path)
        .map_err(|err| AppError::Config(format!("cannot read {}: {}", path, err)))?;

    parse_artifact(&raw).map_err(|err| AppError::Config(format!("{}: {}", path, err)))
}

fn parse_artifact(raw: &str) -> Result<ContractArtifact, serde_json::Error> {
    serde_json::from_str(raw)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_address(key: &str, value: &str) -> AppResult<Address> {
    value
        .trim()
        .parse()
        .map_err(|err| AppError::Config(format!("{} is not an address: {}", key, err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_contract_address_from_artifact() {
        let artifact =
            parse_artifact(r#"{"contractAddress": "0x874069Fa1Eb16D44d622F2e0Ca25eeA172369bC1"}"#)
                .unwrap();

        assert_eq!(
            artifact.contract_address,
            CUSD_CONTRACT_ADDRESS.parse::<Address>().unwrap()
        );
    }

    #[test]
    fn rejects_artifact_without_address() {
        assert!(parse_artifact(r#"{"address": "0x00"}"#).is_err());
    }

    #[test]
    fn bad_address_is_a_config_error() {
        assert!(matches!(
            parse_address("CUSD_ADDRESS", "not-an-address"),
            Err(AppError::Config(_))
        ));
    }
}
