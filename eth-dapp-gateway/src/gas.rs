use crate::backend::ChainBackend;
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Gas limit for simple Ether transfers (21,000 gas)
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Gas limit used for donations when the node cannot estimate one
pub const DONATION_FALLBACK_GAS_LIMIT: u64 = 650_000;

/// Chooses gas limits for the transactions the gateway sends
///
/// Estimation is delegated to the node; this only decides what to do when the
/// node's answer is unavailable.
#[derive(Clone)]
pub struct GasPlanner {
    /// Chain client used for `eth_estimateGas`
    backend: Arc<dyn ChainBackend>,
    /// Limit used when estimation fails
    donation_fallback: u64,
}

impl GasPlanner {
    /// Creates a planner with the default donation fallback
    pub fn new(backend: Arc<dyn ChainBackend>) -> Self {
        Self {
            backend,
            donation_fallback: DONATION_FALLBACK_GAS_LIMIT,
        }
    }

    /// Overrides the limit used when the node cannot estimate a donation
    pub fn with_donation_fallback(mut self, limit: u64) -> Self {
        self.donation_fallback = limit;
        self
    }

    /// Gas limit for an Ether transfer
    pub fn transfer_gas_limit(&self) -> u64 {
        TRANSFER_GAS_LIMIT
    }

    /// Gas limit for a donation of `value` wei
    ///
    /// Estimation errors (a revert during estimation, an unsupported method) are
    /// logged and replaced by the fallback limit rather than failing the donation.
    #[instrument(skip(self))]
    pub async fn donation_gas_limit(&self, fundraiser: Address, from: Address, value: U256) -> u64 {
        match self.backend.estimate_donation_gas(fundraiser, from, value).await {
            Ok(gas) => {
                debug!("Node estimated {} gas for donation", gas);
                gas
            }
            Err(e) => {
                warn!(
                    "Gas estimation failed ({}), using fallback limit {}",
                    e, self.donation_fallback
                );
                self.donation_fallback
            }
        }
    }
}
