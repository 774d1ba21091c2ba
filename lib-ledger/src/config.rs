//! Ledger deployment configuration
//!
//! ```toml
//! initial_supply = "1000000"
//! deployer = "0101..01"
//! treasury = "0303..03"
//! contract_account = "0202..02"
//!
//! [token]
//! name = "Carbon Credit"
//! symbol = "CC"
//! decimals = 18
//! ```
//!
//! `initial_supply` is a decimal string because TOML integers stop at i64.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use lib_types::{Address, Amount};

use crate::engine::{TokenEngine, TokenMetadata};
use crate::errors::{LedgerError, LedgerResult};

/// Largest accepted `decimals`
pub const MAX_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSection {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    MAX_DECIMALS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub token: TokenSection,
    #[serde(default)]
    pub initial_supply: String,
    pub deployer: String,
    pub treasury: String,
    pub contract_account: String,
}

/// A validated configuration with parsed addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub metadata: TokenMetadata,
    pub initial_supply: Amount,
    pub deployer: Address,
    pub treasury: Address,
    pub contract_account: Address,
}

impl LedgerConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).context("failed to parse ledger configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ledger configuration {}", path.display()))?;
        tracing::info!("Loaded ledger configuration from {}", path.display());
        Self::from_toml_str(&raw)
    }

    /// Check every field and parse addresses and amounts
    pub fn validate(&self) -> LedgerResult<ResolvedConfig> {
        let token = &self.token;
        if token.name.trim().is_empty() {
            return Err(LedgerError::Config("token name is empty".to_string()));
        }
        if token.symbol.trim().is_empty() {
            return Err(LedgerError::Config("token symbol is empty".to_string()));
        }
        if token.decimals > MAX_DECIMALS {
            return Err(LedgerError::Config(format!(
                "decimals {} exceeds {}",
                token.decimals, MAX_DECIMALS
            )));
        }

        let initial_supply = if self.initial_supply.trim().is_empty() {
            0
        } else {
            self.initial_supply
                .trim()
                .replace('_', "")
                .parse::<Amount>()
                .map_err(|e| LedgerError::Config(format!("initial_supply: {}", e)))?
        };

        let deployer = parse_account("deployer", &self.deployer)?;
        let treasury = parse_account("treasury", &self.treasury)?;
        let contract_account = parse_account("contract_account", &self.contract_account)?;

        Ok(ResolvedConfig {
            metadata: TokenMetadata::new(token.name.clone(), token.symbol.clone(), token.decimals),
            initial_supply,
            deployer,
            treasury,
            contract_account,
        })
    }
}

fn parse_account(field: &str, value: &str) -> LedgerResult<Address> {
    let address = Address::from_hex(value)
        .map_err(|e| LedgerError::Config(format!("{}: {}", field, e)))?;
    if address.is_zero() {
        return Err(LedgerError::Config(format!("{} is the null address", field)));
    }
    Ok(address)
}

impl TokenEngine {
    /// Deploy a ledger from a validated configuration
    pub fn from_config(config: &LedgerConfig) -> LedgerResult<Self> {
        let resolved = config.validate()?;
        TokenEngine::new(
            resolved.deployer,
            resolved.contract_account,
            resolved.metadata,
            resolved.initial_supply,
            resolved.treasury,
        )
    }
}
