use alloy::primitives::{Address, TxHash};
use serde::Serialize;

use crate::backend::{NameChange, TxOutcome};

/// Latest block as reported by the health check
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub latest_block: u64,
    pub timestamp: u64,
}

/// A wei amount with its ether rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    /// Decimal wei string (wei amounts overflow JSON numbers)
    pub wei: String,
    pub ether: String,
}

/// Output of the blockchain-info script
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub chain_id: u64,
    pub block_number: u64,
    pub gas_price_wei: String,
    pub gas_price_gwei: String,
    pub target: Address,
    pub target_balance: Balance,
}

/// One node account and its balance
#[derive(Debug, Serialize)]
pub struct AccountBalance {
    pub account: Address,
    pub balance: Balance,
}

/// Result of connecting a wallet
#[derive(Debug, Serialize)]
pub struct WalletConnection {
    pub account: Address,
    /// Button label such as `Connected: 0xf39F...2266`
    pub label: String,
    pub balance: Balance,
}

/// Balance with the rounded ether figure shown by the transfer form
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormBalance {
    pub address: Address,
    pub wei: String,
    pub ether_rounded: f64,
}

/// Mined transaction summary
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxSummary {
    pub hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

impl From<TxOutcome> for TxSummary {
    fn from(tx: TxOutcome) -> Self {
        Self {
            hash: tx.hash,
            block_number: tx.block_number,
            gas_used: tx.gas_used,
        }
    }
}

/// Result of a transfer with refreshed balances
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub message: String,
    pub transaction: TxSummary,
    pub sender: FormBalance,
    pub receiver: FormBalance,
}

/// Values displayed by the hello viewer
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloView {
    pub contract: Address,
    pub greet: String,
    pub my_name: String,
    /// Decimal string, the value does not fit a JSON number
    pub max_uint256: String,
    pub sum_up_to: u64,
    pub sum: String,
}

/// Result of `setMyName`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameUpdate {
    pub transaction: TxSummary,
    pub event: Option<NameChange>,
    pub updated_name: String,
}

/// A page of fundraiser addresses
#[derive(Debug, Clone, Serialize)]
pub struct FundraiserPage {
    pub total: String,
    pub limit: u64,
    pub offset: u64,
    pub fundraisers: Vec<Address>,
}

/// A donation as listed under "My Donations"
#[derive(Debug, Clone, Serialize)]
pub struct DonationView {
    pub wei: String,
    /// Absent when no exchange rate is available
    pub usd: Option<String>,
    /// Unix timestamp in seconds
    pub date: u64,
}

/// Everything a fundraiser card shows
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundraiserCard {
    pub address: Address,
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub description: String,
    pub beneficiary: Address,
    pub owner: Address,
    pub total_donations_wei: String,
    pub total_donations_usd: Option<String>,
    pub exchange_rate: Option<f64>,
    pub viewer: Option<Address>,
    pub is_owner: bool,
    pub my_donations: Vec<DonationView>,
}

/// Result of a donation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationResponse {
    pub message: String,
    pub transaction: TxSummary,
    pub amount_usd: f64,
    pub amount_wei: String,
    pub amount_ether: String,
    pub gas_limit: u64,
    pub my_donations: Vec<DonationView>,
}

/// Result of an owner-only action
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub message: String,
    pub transaction: TxSummary,
}

/// Donation receipt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub fund: String,
    pub date: String,
    pub money: Option<String>,
}
