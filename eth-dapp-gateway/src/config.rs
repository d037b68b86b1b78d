use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use eyre::{ensure, Result};
use serde::Deserialize;

use crate::{gas::DONATION_FALLBACK_GAS_LIMIT, price::CRYPTOCOMPARE_PRICE_URL};

/// Service configuration structure
///
/// This structure contains all the configuration parameters for the gateway.
/// Values are layered: built-in defaults, then an optional `dapp-gateway.toml`,
/// then environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Host address to bind the server to (default: 127.0.0.1)
    pub host: String,

    /// Port to listen on (default: 8080)
    pub port: u16,

    /// Ethereum RPC endpoint URL for communicating with the blockchain
    pub ethereum_rpc_url: String,

    /// Hello contract: address, address file or Foundry broadcast log
    pub hello_contract: Option<String>,

    /// Compiler output holding the Hello ABI
    pub hello_abi: Option<String>,

    /// FundraiserFactory contract: address, address file or Foundry broadcast log
    pub fundraiser_factory: Option<String>,

    /// Compiler output holding the FundraiserFactory ABI
    pub fundraiser_factory_abi: Option<String>,

    /// Compiler output holding the Fundraiser ABI
    pub fundraiser_abi: Option<String>,

    /// Directory receiving `<Name>-abi.json` / `<Name>-addr.json` bundles
    pub artifact_export_dir: Option<String>,

    /// Fixed ETH/USD rate; when unset the CryptoCompare feed is used
    pub eth_usd_rate: Option<f64>,

    /// CryptoCompare price endpoint
    pub price_feed_url: String,

    /// Seconds an exchange rate quote is reused
    pub price_cache_ttl_secs: u64,

    /// Interval between `eth_accounts` / `eth_chainId` polls
    pub wallet_poll_interval_ms: u64,

    /// Default number of fundraisers per page
    pub fundraiser_page_size: u64,

    /// Argument passed to `Hello.sumUpTo`
    pub sum_up_to: u64,

    /// Address reported by the blockchain info endpoint
    pub info_target_address: String,

    /// Gas limit for donations the node cannot estimate
    pub donation_fallback_gas_limit: u64,
}

impl Config {
    /// Built-in defaults, before any file or environment source
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("ethereum_rpc_url", "http://localhost:8545")?
            .set_default("price_feed_url", CRYPTOCOMPARE_PRICE_URL)?
            .set_default("price_cache_ttl_secs", 60)?
            .set_default("wallet_poll_interval_ms", 1000)?
            .set_default("fundraiser_page_size", 10)?
            .set_default("sum_up_to", 100)?
            .set_default("donation_fallback_gas_limit", DONATION_FALLBACK_GAS_LIMIT)?
            .set_default(
                "info_target_address",
                "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            )?)
    }

    /// Load configuration from the environment
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - Configuration structure or error
    ///
    /// # Environment Variables
    ///
    /// * `HOST` - Server host address (default: "127.0.0.1")
    /// * `PORT` - Server port (default: 8080)
    /// * `ETHEREUM_RPC_URL` - Ethereum RPC URL (default: "http://localhost:8545")
    /// * `HELLO_CONTRACT`, `FUNDRAISER_FACTORY` - contract locations
    /// * `HELLO_ABI`, `FUNDRAISER_FACTORY_ABI`, `FUNDRAISER_ABI` - ABI files to verify
    /// * `ETH_USD_RATE` - fixed exchange rate
    /// * every other field, upper-cased
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (useful for development)
        let _ = dotenv::dotenv();

        let settings = Self::defaults()?
            .add_source(File::with_name("dapp-gateway").required(false))
            .add_source(Environment::default().try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that deserialize but cannot be used
    pub fn validate(&self) -> Result<()> {
        if let Some(rate) = self.eth_usd_rate {
            ensure!(
                rate.is_finite() && rate > 0.0,
                "eth_usd_rate must be a positive number, got {}",
                rate
            );
        }
        Ok(())
    }
}
