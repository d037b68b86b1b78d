use serde::Deserialize;

/// Query for `GET /chain`
#[derive(Debug, Default, Deserialize)]
pub struct ChainInfoQuery {
    /// Address whose balance is reported (defaults to the configured target)
    #[serde(default)]
    pub target: Option<String>,
}

/// Body of `POST /wallet/connect`
#[derive(Debug, Default, Deserialize)]
pub struct ConnectWalletRequest {
    /// Preferred account; must be one the node manages
    #[serde(default)]
    pub account: Option<String>,
}

/// Body of `POST /transfer`
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Sender (optional, defaults to the connected account)
    #[serde(default)]
    pub from: Option<String>,

    /// Receiver address
    pub to: String,

    /// Amount in ether, as typed into the form
    #[serde(rename = "amountEther", alias = "amount")]
    pub amount_ether: String,
}

/// Body of `POST /hello/name`
#[derive(Debug, Deserialize)]
pub struct SetNameRequest {
    #[serde(default)]
    pub from: Option<String>,

    pub name: String,
}

/// Query for `GET /fundraisers`
#[derive(Debug, Default, Deserialize)]
pub struct FundraiserPageQuery {
    #[serde(default)]
    pub limit: Option<u64>,

    #[serde(default)]
    pub offset: Option<u64>,
}

/// Body of `POST /fundraisers`
#[derive(Debug, Deserialize)]
pub struct CreateFundraiserRequest {
    #[serde(default)]
    pub from: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub url: String,

    #[serde(default, rename = "imageUrl")]
    pub image_url: String,

    #[serde(default)]
    pub description: String,

    /// Wallet that receives withdrawn funds
    #[serde(default)]
    pub beneficiary: String,
}

/// Query for `GET /fundraisers/{address}`
#[derive(Debug, Default, Deserialize)]
pub struct FundraiserCardQuery {
    /// Account whose donations and ownership are shown
    #[serde(default)]
    pub viewer: Option<String>,
}

/// Body of `POST /fundraisers/{address}/donate`
#[derive(Debug, Deserialize)]
pub struct DonateRequest {
    #[serde(default)]
    pub from: Option<String>,

    /// Donation in USD, converted to ETH at the current rate
    #[serde(rename = "amountUsd")]
    pub amount_usd: f64,
}

/// Body of `POST /fundraisers/{address}/withdraw`
#[derive(Debug, Default, Deserialize)]
pub struct WithdrawRequest {
    #[serde(default)]
    pub from: Option<String>,
}

/// Body of `POST /fundraisers/{address}/beneficiary`
#[derive(Debug, Deserialize)]
pub struct SetBeneficiaryRequest {
    #[serde(default)]
    pub from: Option<String>,

    pub beneficiary: String,
}

/// Query for `GET /fundraisers/{address}/receipts`
#[derive(Debug, Default, Deserialize)]
pub struct ReceiptsQuery {
    #[serde(default)]
    pub donor: Option<String>,
}
