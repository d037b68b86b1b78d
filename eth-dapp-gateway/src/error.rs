use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use alloy::{
    providers::PendingTransactionError,
    transports::TransportError,
};
use serde::Serialize;
use thiserror::Error;

/// Service-specific error types
///
/// This enum defines all possible errors that can occur while serving a dApp action.
/// Each variant carries the best message available from the failing collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Error talking to the Ethereum RPC node
    #[error("RPC connection error: {0}")]
    RPCConnectionError(String),

    /// A contract call reverted or could not be decoded
    #[error("Contract call failed: {0}")]
    ContractError(String),

    /// A transaction could not be sent, confirmed, or was reverted
    #[error("Transaction failed: {0}")]
    TransactionError(String),

    /// The request carried missing or malformed values
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No account is available to act as the wallet
    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    /// The action is reserved for the fundraiser owner
    #[error("Not the owner: {0}")]
    NotOwner(String),

    /// The contract needed by this action is not configured
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// ETH/USD exchange rate could not be fetched
    #[error("Exchange rate unavailable: {0}")]
    ExchangeRateError(String),

    /// Contract artifact files are missing or malformed
    #[error("Artifact error: {0}")]
    ArtifactError(String),
}

/// Structured error response for the API
///
/// This structure defines the JSON format of error responses returned by the API.
#[derive(Serialize)]
struct ErrorResponse {
    /// Human-readable error message
    error: String,

    /// Machine-readable error code
    error_code: String,

    /// Optional detailed error information
    details: Option<String>,
}

impl ServiceError {
    /// Machine-readable code and the detail carried by the variant
    fn parts(&self) -> (&'static str, &str) {
        match self {
            ServiceError::RPCConnectionError(d) => ("RPC_CONNECTION_ERROR", d),
            ServiceError::ContractError(d) => ("CONTRACT_ERROR", d),
            ServiceError::TransactionError(d) => ("TRANSACTION_ERROR", d),
            ServiceError::InvalidInput(d) => ("INVALID_INPUT", d),
            ServiceError::WalletUnavailable(d) => ("WALLET_UNAVAILABLE", d),
            ServiceError::NotOwner(d) => ("NOT_OWNER", d),
            ServiceError::NotConfigured(d) => ("NOT_CONFIGURED", d),
            ServiceError::ExchangeRateError(d) => ("EXCHANGE_RATE_ERROR", d),
            ServiceError::ArtifactError(d) => ("ARTIFACT_ERROR", d),
        }
    }
}

impl ResponseError for ServiceError {
    /// Convert the error to an HTTP response
    ///
    /// This method generates an appropriate HTTP response based on the error type,
    /// including status code and a JSON error body.
    fn error_response(&self) -> HttpResponse {
        let (error_code, details) = self.parts();

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details: Some(details.to_string()),
        })
    }

    /// Get the HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match *self {
            ServiceError::RPCConnectionError(_) => StatusCode::BAD_GATEWAY,
            ServiceError::ContractError(_) => StatusCode::BAD_REQUEST,
            ServiceError::TransactionError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::WalletUnavailable(_) => StatusCode::PRECONDITION_FAILED,
            ServiceError::NotOwner(_) => StatusCode::FORBIDDEN,
            ServiceError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::ExchangeRateError(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::ArtifactError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Pick the most useful message out of a transport error.
///
/// A JSON-RPC error payload returned by the node (e.g. `execution reverted: not owner`)
/// reads better than the wrapped display string, so it wins when present.
pub fn transport_message(err: &TransportError) -> String {
    match err.as_error_resp() {
        Some(payload) => payload.message.to_string(),
        None => err.to_string(),
    }
}

/// Pick the most useful message out of a contract binding error.
pub fn contract_message(err: &alloy::contract::Error) -> String {
    match err {
        alloy::contract::Error::TransportError(inner) => transport_message(inner),
        other => other.to_string(),
    }
}

impl From<TransportError> for ServiceError {
    fn from(err: TransportError) -> Self {
        ServiceError::RPCConnectionError(transport_message(&err))
    }
}

impl From<alloy::contract::Error> for ServiceError {
    fn from(err: alloy::contract::Error) -> Self {
        ServiceError::ContractError(contract_message(&err))
    }
}

impl From<PendingTransactionError> for ServiceError {
    fn from(err: PendingTransactionError) -> Self {
        match err {
            PendingTransactionError::TransportError(inner) => {
                ServiceError::TransactionError(transport_message(&inner))
            }
            other => ServiceError::TransactionError(other.to_string()),
        }
    }
}
