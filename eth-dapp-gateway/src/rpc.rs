use std::future::IntoFuture;

use alloy::{
    // Import the pre-defined typed Ethereum network
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    // The typed RPC request / block / receipt types
    rpc::types::{Block, BlockId, BlockNumberOrTag, TransactionReceipt, TransactionRequest},
    sol_types::SolEvent,
};
use async_trait::async_trait;
use eyre::Result;
use tracing::{debug, info, instrument, warn};

use crate::{
    backend::{
        BlockSummary, ChainBackend, Donation, FundraiserDetails, HelloSnapshot, NameChange,
        NewFundraiser, TxOutcome,
    },
    contracts::{Fundraiser, FundraiserFactory, Hello},
    error::{transport_message, ServiceError},
};

/// Ethereum RPC client for blockchain interactions
///
/// This client provides a typed interface for communicating with Ethereum nodes.
/// It uses the Alloy typed providers to ensure type safety in RPC interactions.
#[derive(Clone)]
pub struct EthereumClient {
    /// Typed provider for Ethereum network
    pub provider: DynProvider<Ethereum>,
}

impl EthereumClient {
    /// Create a new Ethereum client with an HTTP provider
    ///
    /// This constructor establishes a connection to an Ethereum node and
    /// verifies the connection is working by fetching the latest block number.
    ///
    /// # Arguments
    ///
    /// * `rpc_url` - URL of the Ethereum RPC endpoint
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - New client instance or an error
    pub async fn new(rpc_url: &str) -> Result<Self> {
        // Create a provider for the Ethereum network at the specified URL
        let provider = ProviderBuilder::new()
            .network::<Ethereum>()
            .on_http(rpc_url.parse()?);

        // Test the connection by fetching the latest block number
        let block_number = provider.get_block_number().await?;
        info!("Connected to {rpc_url}, latest block number: {block_number}");

        Ok(Self {
            provider: DynProvider::new(provider),
        })
    }

    /// Fetch the latest block from the Ethereum network
    ///
    /// # Returns
    ///
    /// * `Result<Block>` - The latest block or an error
    pub async fn get_latest_block(&self) -> Result<Block, ServiceError> {
        // Request the latest block from the provider
        let maybe_block = self
            .provider
            .get_block(BlockId::Number(BlockNumberOrTag::Latest))
            .await?;

        // Ensure a block was returned
        maybe_block.ok_or_else(|| {
            ServiceError::RPCConnectionError("No latest block returned".to_string())
        })
    }

    /// Wait for a pending transaction to be mined and check that it succeeded
    async fn confirm(
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<TransactionReceipt, ServiceError> {
        let tx_hash = *pending.tx_hash();
        debug!("Waiting for receipt of {}", tx_hash);
        let receipt = pending.get_receipt().await?;

        if !receipt.status() {
            warn!("Transaction {} reverted in block {:?}", tx_hash, receipt.block_number);
            return Err(ServiceError::TransactionError(format!(
                "transaction {} reverted",
                tx_hash
            )));
        }
        debug!("Transaction {} mined in block {:?}", tx_hash, receipt.block_number);
        Ok(receipt)
    }
}

impl From<&TransactionReceipt> for TxOutcome {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used as u64,
        }
    }
}

/// Decode the first log of type `E` found in a receipt
fn first_event<E: SolEvent>(receipt: &TransactionReceipt) -> Option<E> {
    receipt
        .inner
        .logs()
        .iter()
        .find_map(|log| log.log_decode::<E>().ok())
        .map(|decoded| decoded.inner.data)
}

/// Convert a contract-returned uint256 into a `u64`, saturating on overflow
fn saturating_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[async_trait]
impl ChainBackend for EthereumClient {
    async fn chain_id(&self) -> Result<u64, ServiceError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn block_number(&self) -> Result<u64, ServiceError> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn latest_block(&self) -> Result<BlockSummary, ServiceError> {
        let block = self.get_latest_block().await?;
        Ok(BlockSummary {
            number: block.header.number,
            timestamp: block.header.timestamp,
        })
    }

    #[instrument(skip(self), err)]
    async fn gas_price(&self) -> Result<u128, ServiceError> {
        match self.provider.get_gas_price().await {
            Ok(price) => Ok(price),
            Err(e) => {
                // Nodes without eth_gasPrice still expose the base fee
                warn!("eth_gasPrice failed, using latest base fee: {}", e);
                let block = self.get_latest_block().await?;
                Ok(block.header.base_fee_per_gas.map(u128::from).unwrap_or(0))
            }
        }
    }

    async fn balance(&self, address: Address) -> Result<U256, ServiceError> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn accounts(&self) -> Result<Vec<Address>, ServiceError> {
        Ok(self.provider.get_accounts().await?)
    }

    #[instrument(skip(self), err)]
    async fn transfer(
        &self,
        from: Address,
        to: Address,
        value: U256,
        gas_limit: u64,
    ) -> Result<TxOutcome, ServiceError> {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_value(value)
            .with_gas_limit(gas_limit);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ServiceError::TransactionError(transport_message(&e)))?;
        let receipt = Self::confirm(pending).await?;
        Ok(TxOutcome::from(&receipt))
    }

    #[instrument(skip(self), err)]
    async fn hello_snapshot(&self, contract: Address, n: U256) -> Result<HelloSnapshot, ServiceError> {
        let hello = Hello::new(contract, self.provider.clone());

        // The four reads are independent, issue them together
        let greet = hello.greet();
        let my_name = hello.getMyName();
        let max_uint = hello.getMaxUint256();
        let sum = hello.sumUpTo(n);
        let (greeting, name, max_uint256, sum) = tokio::try_join!(
            greet.call().into_future(),
            my_name.call().into_future(),
            max_uint.call().into_future(),
            sum.call().into_future(),
        )?;

        Ok(HelloSnapshot {
            greeting: greeting._0,
            name: name._0,
            max_uint256: max_uint256._0,
            sum: sum._0,
        })
    }

    #[instrument(skip(self), err)]
    async fn set_hello_name(
        &self,
        contract: Address,
        from: Address,
        name: String,
    ) -> Result<(TxOutcome, Option<NameChange>), ServiceError> {
        let hello = Hello::new(contract, self.provider.clone());
        let pending = hello.setMyName(name).from(from).send().await?;
        info!("setMyName sent: {}", pending.tx_hash());

        let receipt = Self::confirm(pending).await?;
        let event = first_event::<Hello::NameChanged>(&receipt).map(|e| NameChange {
            changer: e.changer,
            new_name: e.newName,
        });
        Ok((TxOutcome::from(&receipt), event))
    }

    async fn fundraisers_count(&self, factory: Address) -> Result<U256, ServiceError> {
        let factory = FundraiserFactory::new(factory, self.provider.clone());
        Ok(factory.fundraisersCount().call().await?._0)
    }

    #[instrument(skip(self), err)]
    async fn fundraisers(
        &self,
        factory: Address,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Address>, ServiceError> {
        let factory = FundraiserFactory::new(factory, self.provider.clone());
        let page = factory
            .fundraisers(U256::from(limit), U256::from(offset))
            .call()
            .await?;
        Ok(page.coll)
    }

    #[instrument(skip(self, fundraiser), err)]
    async fn create_fundraiser(
        &self,
        factory: Address,
        from: Address,
        fundraiser: NewFundraiser,
    ) -> Result<TxOutcome, ServiceError> {
        let factory = FundraiserFactory::new(factory, self.provider.clone());
        // Argument order follows the Solidity signature
        let pending = factory
            .createFundraiser(
                fundraiser.name,
                fundraiser.url,
                fundraiser.image_url,
                fundraiser.description,
                fundraiser.beneficiary,
            )
            .from(from)
            .send()
            .await?;

        let receipt = Self::confirm(pending).await?;
        if let Some(created) = first_event::<FundraiserFactory::FundraiserCreated>(&receipt) {
            info!("Fundraiser {} created by {}", created.fundraiser, created.owner);
        }
        Ok(TxOutcome::from(&receipt))
    }

    #[instrument(skip(self), err)]
    async fn fundraiser_details(&self, fundraiser: Address) -> Result<FundraiserDetails, ServiceError> {
        let contract = Fundraiser::new(fundraiser, self.provider.clone());

        let name = contract.name();
        let url = contract.url();
        let image_url = contract.imageUrl();
        let description = contract.description();
        let beneficiary = contract.beneficiary();
        let owner = contract.owner();
        let total = contract.totalDonations();
        let (name, url, image_url, description, beneficiary, owner, total) = tokio::try_join!(
            name.call().into_future(),
            url.call().into_future(),
            image_url.call().into_future(),
            description.call().into_future(),
            beneficiary.call().into_future(),
            owner.call().into_future(),
            total.call().into_future(),
        )?;

        Ok(FundraiserDetails {
            address: fundraiser,
            name: name._0,
            url: url._0,
            image_url: image_url._0,
            description: description._0,
            beneficiary: beneficiary._0,
            owner: owner._0,
            total_donations: total._0,
        })
    }

    #[instrument(skip(self), err)]
    async fn donations_of(&self, fundraiser: Address, donor: Address) -> Result<Vec<Donation>, ServiceError> {
        let contract = Fundraiser::new(fundraiser, self.provider.clone());
        // myDonations keys on msg.sender
        let result = contract.myDonations().from(donor).call().await?;

        if result.values.len() != result.dates.len() {
            return Err(ServiceError::ContractError(format!(
                "myDonations returned {} values but {} dates",
                result.values.len(),
                result.dates.len()
            )));
        }

        Ok(result
            .values
            .into_iter()
            .zip(result.dates)
            .map(|(value, date)| Donation {
                value,
                date: saturating_u64(date),
            })
            .collect())
    }

    async fn estimate_donation_gas(
        &self,
        fundraiser: Address,
        from: Address,
        value: U256,
    ) -> Result<u64, ServiceError> {
        let contract = Fundraiser::new(fundraiser, self.provider.clone());
        Ok(contract.donate().from(from).value(value).estimate_gas().await?)
    }

    #[instrument(skip(self), err)]
    async fn donate(
        &self,
        fundraiser: Address,
        from: Address,
        value: U256,
        gas_limit: u64,
    ) -> Result<TxOutcome, ServiceError> {
        let contract = Fundraiser::new(fundraiser, self.provider.clone());
        let pending = contract
            .donate()
            .from(from)
            .value(value)
            .gas(gas_limit)
            .send()
            .await?;

        let receipt = Self::confirm(pending).await?;
        if let Some(received) = first_event::<Fundraiser::DonationReceived>(&receipt) {
            debug!("DonationReceived: donor {} value {}", received.donor, received.value);
        }
        Ok(TxOutcome::from(&receipt))
    }

    #[instrument(skip(self), err)]
    async fn withdraw(&self, fundraiser: Address, from: Address) -> Result<TxOutcome, ServiceError> {
        let contract = Fundraiser::new(fundraiser, self.provider.clone());
        let pending = contract.withdraw().from(from).send().await?;

        let receipt = Self::confirm(pending).await?;
        if let Some(withdrawn) = first_event::<Fundraiser::Withdraw>(&receipt) {
            info!("Withdrew {} wei from {}", withdrawn.amount, fundraiser);
        }
        Ok(TxOutcome::from(&receipt))
    }

    #[instrument(skip(self), err)]
    async fn set_beneficiary(
        &self,
        fundraiser: Address,
        from: Address,
        beneficiary: Address,
    ) -> Result<TxOutcome, ServiceError> {
        let contract = Fundraiser::new(fundraiser, self.provider.clone());
        let pending = contract.setBeneficiary(beneficiary).from(from).send().await?;

        let receipt = Self::confirm(pending).await?;
        Ok(TxOutcome::from(&receipt))
    }
}
