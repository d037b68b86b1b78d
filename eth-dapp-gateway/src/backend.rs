//! The chain-facing seam of the gateway.
//!
//! Every RPC or contract interaction goes through [`ChainBackend`] so the service
//! layer can be exercised against a mock instead of a live node.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use serde::Serialize;

use crate::error::ServiceError;

/// Number and timestamp of the latest block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockSummary {
    pub number: u64,
    pub timestamp: u64,
}

/// Outcome of a mined transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxOutcome {
    /// Transaction hash
    pub hash: TxHash,
    /// Block the transaction was included in
    pub block_number: Option<u64>,
    /// Gas consumed by the transaction
    pub gas_used: u64,
}

/// Values read from the Hello contract
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HelloSnapshot {
    pub greeting: String,
    pub name: String,
    pub max_uint256: U256,
    pub sum: U256,
}

/// Decoded `NameChanged` event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameChange {
    pub changer: Address,
    pub new_name: String,
}

/// Fields submitted to `FundraiserFactory.createFundraiser`
#[derive(Debug, Clone, PartialEq)]
pub struct NewFundraiser {
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub description: String,
    pub beneficiary: Address,
}

/// Public state of a single fundraiser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundraiserDetails {
    pub address: Address,
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub description: String,
    pub beneficiary: Address,
    pub owner: Address,
    pub total_donations: U256,
}

/// One donation as recorded by `Fundraiser.myDonations`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Donation {
    pub value: U256,
    /// Unix timestamp in seconds
    pub date: u64,
}

/// Chain operations needed by the dApps
///
/// Implemented by [`crate::rpc::EthereumClient`] against a JSON-RPC node. Transactions
/// are sent with `eth_sendTransaction`, so `from` must be an account the node manages.
#[mockall::automock]
#[async_trait]
pub trait ChainBackend: Send + Sync {
    /// Chain identifier (`eth_chainId`)
    async fn chain_id(&self) -> Result<u64, ServiceError>;

    /// Latest block number (`eth_blockNumber`)
    async fn block_number(&self) -> Result<u64, ServiceError>;

    /// Number and timestamp of the latest block
    async fn latest_block(&self) -> Result<BlockSummary, ServiceError>;

    /// Current gas price in wei, falling back to the latest base fee, then zero
    async fn gas_price(&self) -> Result<u128, ServiceError>;

    /// Balance of `address` in wei
    async fn balance(&self, address: Address) -> Result<U256, ServiceError>;

    /// Accounts managed by the node (`eth_accounts`)
    async fn accounts(&self) -> Result<Vec<Address>, ServiceError>;

    /// Send `value` wei from `from` to `to` and wait for the receipt
    async fn transfer(
        &self,
        from: Address,
        to: Address,
        value: U256,
        gas_limit: u64,
    ) -> Result<TxOutcome, ServiceError>;

    /// Read greet, getMyName, getMaxUint256 and sumUpTo(n)
    async fn hello_snapshot(&self, contract: Address, n: U256) -> Result<HelloSnapshot, ServiceError>;

    /// Call setMyName and wait for the receipt, decoding the NameChanged event
    async fn set_hello_name(
        &self,
        contract: Address,
        from: Address,
        name: String,
    ) -> Result<(TxOutcome, Option<NameChange>), ServiceError>;

    /// Number of fundraisers created by the factory
    async fn fundraisers_count(&self, factory: Address) -> Result<U256, ServiceError>;

    /// Page of fundraiser addresses
    async fn fundraisers(
        &self,
        factory: Address,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Address>, ServiceError>;

    /// Create a fundraiser through the factory and wait for the receipt
    async fn create_fundraiser(
        &self,
        factory: Address,
        from: Address,
        fundraiser: NewFundraiser,
    ) -> Result<TxOutcome, ServiceError>;

    /// Public state of a fundraiser
    async fn fundraiser_details(&self, fundraiser: Address) -> Result<FundraiserDetails, ServiceError>;

    /// Donations made by `donor` (myDonations called from the donor)
    async fn donations_of(&self, fundraiser: Address, donor: Address) -> Result<Vec<Donation>, ServiceError>;

    /// Gas the node estimates for a donation
    async fn estimate_donation_gas(
        &self,
        fundraiser: Address,
        from: Address,
        value: U256,
    ) -> Result<u64, ServiceError>;

    /// Donate `value` wei and wait for the receipt
    async fn donate(
        &self,
        fundraiser: Address,
        from: Address,
        value: U256,
        gas_limit: u64,
    ) -> Result<TxOutcome, ServiceError>;

    /// Move collected funds to the beneficiary and wait for the receipt
    async fn withdraw(&self, fundraiser: Address, from: Address) -> Result<TxOutcome, ServiceError>;

    /// Replace the beneficiary and wait for the receipt
    async fn set_beneficiary(
        &self,
        fundraiser: Address,
        from: Address,
        beneficiary: Address,
    ) -> Result<TxOutcome, ServiceError>;
}
