use std::{sync::Arc, time::Duration};

use alloy::primitives::{Address, U256};
use chrono::{TimeZone, Utc};
use moka::future::Cache;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    backend::{ChainBackend, Donation, FundraiserDetails, NewFundraiser},
    error::ServiceError,
    gas::{GasPlanner, DONATION_FALLBACK_GAS_LIMIT},
    models::{
        hex::{parse_hex_address, parse_optional_address},
        requests::{
            CreateFundraiserRequest, DonateRequest, SetBeneficiaryRequest, SetNameRequest,
            TransferRequest,
        },
        responses::{
            AccountBalance, ActionResponse, Balance, ChainInfo, DonationResponse, DonationView,
            FormBalance, FundraiserCard, FundraiserPage, HealthResponse, HelloView, NameUpdate,
            Receipt, TransferResponse, WalletConnection,
        },
        units::{
            format_ether, format_gwei, parse_ether_amount, round_ether, short_address, usd_to_wei,
            wei_to_usd,
        },
    },
    price::PriceFeed,
    watcher::{WalletEvent, WalletState},
};

/// Deployed contracts the gateway talks to
#[derive(Debug, Clone, Default)]
pub struct ContractBook {
    pub hello: Option<Address>,
    pub fundraiser_factory: Option<Address>,
}

/// Tunables taken from configuration
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Argument passed to `Hello.sumUpTo`
    pub sum_up_to: u64,
    /// Default page size of the fundraiser list
    pub page_size: u64,
    /// Address reported by the blockchain info endpoint
    pub info_target: Address,
    /// How long a fundraiser page stays cached
    pub list_cache_ttl: Duration,
    /// Donation gas limit when estimation fails
    pub donation_fallback_gas_limit: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            sum_up_to: 100,
            page_size: 10,
            info_target: Address::ZERO,
            list_cache_ttl: Duration::from_secs(30),
            donation_fallback_gas_limit: DONATION_FALLBACK_GAS_LIMIT,
        }
    }
}

/// The four dApps behind one service
///
/// Every public method is one user action: a short sequence of awaited chain calls.
/// Failures are logged here and handed back to the caller unchanged.
#[derive(Clone)]
pub struct DappService {
    /// Chain client
    backend: Arc<dyn ChainBackend>,
    /// ETH/USD rate source
    prices: Arc<dyn PriceFeed>,
    /// Gas limit decisions
    gas: GasPlanner,
    /// Configured contracts
    contracts: ContractBook,
    /// Accounts and chain seen by the wallet watcher
    wallet: watch::Receiver<WalletState>,
    /// Account picked by the last wallet connection
    connected: Arc<watch::Sender<Option<Address>>>,
    /// Fundraiser pages keyed by (limit, offset)
    fundraiser_pages: Cache<(u64, u64), FundraiserPage>,
    settings: ServiceSettings,
}

impl DappService {
    pub fn new(
        backend: Arc<dyn ChainBackend>,
        prices: Arc<dyn PriceFeed>,
        contracts: ContractBook,
        wallet: watch::Receiver<WalletState>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            gas: GasPlanner::new(backend.clone())
                .with_donation_fallback(settings.donation_fallback_gas_limit),
            backend,
            prices,
            contracts,
            wallet,
            connected: Arc::new(watch::channel(None).0),
            fundraiser_pages: Cache::builder()
                .max_capacity(64)
                .time_to_live(settings.list_cache_ttl)
                .build(),
            settings,
        }
    }

    /// React to a wallet event
    ///
    /// A chain switch makes every cached fundraiser list stale.
    pub fn on_wallet_event(&self, event: &WalletEvent) {
        match event {
            WalletEvent::ChainChanged(chain_id) => {
                info!("Chain changed to {}, reloading fundraisers", chain_id);
                self.fundraiser_pages.invalidate_all();
            }
            WalletEvent::AccountsChanged(accounts) => {
                debug!("Accounts changed: {:?}", accounts);
                self.connected.send_if_modified(|connected| {
                    let gone = connected.filter(|account| !accounts.contains(account));
                    if let Some(account) = gone {
                        info!("Connected account {} is gone, disconnecting", account);
                        *connected = None;
                    }
                    gone.is_some()
                });
            }
        }
    }

    fn hello_contract(&self) -> Result<Address, ServiceError> {
        self.contracts
            .hello
            .ok_or_else(|| ServiceError::NotConfigured("Hello contract address is not configured".to_string()))
    }

    fn factory_contract(&self) -> Result<Address, ServiceError> {
        self.contracts.fundraiser_factory.ok_or_else(|| {
            ServiceError::NotConfigured("FundraiserFactory contract address is not configured".to_string())
        })
    }

    async fn balance_of(&self, address: Address) -> Result<Balance, ServiceError> {
        let wei = self.backend.balance(address).await?;
        Ok(Balance {
            wei: wei.to_string(),
            ether: format_ether(wei),
        })
    }

    async fn form_balance(&self, address: Address) -> Result<FormBalance, ServiceError> {
        let wei = self.backend.balance(address).await?;
        Ok(FormBalance {
            address,
            wei: wei.to_string(),
            ether_rounded: round_ether(wei, 2),
        })
    }

    /// Account chosen by `connect_wallet`, if it is still managed by the node
    pub fn connected_account(&self) -> Option<Address> {
        *self.connected.borrow()
    }

    /// The connected account, else the first account seen by the watcher
    fn default_account(&self) -> Option<Address> {
        self.connected_account()
            .or_else(|| self.wallet.borrow().primary_account())
    }

    /// Pick the account that acts as the wallet for a request.
    ///
    /// An explicit `from` wins, then the connected account, then the watcher's
    /// primary account; when the watcher has not seen any yet the node is asked directly.
    pub async fn resolve_sender(&self, requested: Option<&str>) -> Result<Address, ServiceError> {
        if let Some(from) = parse_optional_address(requested).map_err(ServiceError::InvalidInput)? {
            return Ok(from);
        }
        if let Some(account) = self.default_account() {
            return Ok(account);
        }

        let accounts = self.backend.accounts().await?;
        accounts.first().copied().ok_or_else(|| {
            ServiceError::WalletUnavailable("No unlocked accounts on the node".to_string())
        })
    }

    /// Latest block number and timestamp
    pub async fn health(&self) -> Result<HealthResponse, ServiceError> {
        let block = self.backend.latest_block().await.map_err(|e| {
            error!("Health check failed: {}", e);
            e
        })?;
        Ok(HealthResponse {
            status: "ok".to_string(),
            latest_block: block.number,
            timestamp: block.timestamp,
        })
    }

    /// Chain id, block number, gas price and the target's balance
    #[instrument(skip(self), err)]
    pub async fn blockchain_info(&self, target: Option<&str>) -> Result<ChainInfo, ServiceError> {
        let target = parse_optional_address(target)
            .map_err(ServiceError::InvalidInput)?
            .unwrap_or(self.settings.info_target);

        let chain_id = self.backend.chain_id().await?;
        let block_number = self.backend.block_number().await?;
        let gas_price = U256::from(self.backend.gas_price().await?);
        let target_balance = self.balance_of(target).await?;

        Ok(ChainInfo {
            chain_id,
            block_number,
            gas_price_wei: gas_price.to_string(),
            gas_price_gwei: format_gwei(gas_price),
            target,
            target_balance,
        })
    }

    /// Every node account with its balance
    #[instrument(skip(self), err)]
    pub async fn account_balances(&self) -> Result<Vec<AccountBalance>, ServiceError> {
        let accounts = self.backend.accounts().await?;
        if accounts.is_empty() {
            info!("No accounts found");
        }

        let mut balances = Vec::with_capacity(accounts.len());
        for account in accounts {
            let balance = self.balance_of(account).await?;
            balances.push(AccountBalance { account, balance });
        }
        Ok(balances)
    }

    /// Accounts and chain as last polled
    pub fn wallet_state(&self) -> WalletState {
        self.wallet.borrow().clone()
    }

    /// Select the wallet account used by later requests that name no sender
    ///
    /// A requested account must be one the node manages; otherwise the first one is used.
    #[instrument(skip(self), err)]
    pub async fn connect_wallet(&self, requested: Option<&str>) -> Result<WalletConnection, ServiceError> {
        let accounts = self.backend.accounts().await?;
        let account = match parse_optional_address(requested).map_err(ServiceError::InvalidInput)? {
            Some(wanted) => accounts.iter().copied().find(|a| *a == wanted).ok_or_else(|| {
                ServiceError::WalletUnavailable(format!("Account {} is not managed by the node", wanted))
            })?,
            None => accounts.first().copied().ok_or_else(|| {
                ServiceError::WalletUnavailable("No unlocked accounts on the node".to_string())
            })?,
        };

        let balance = self.balance_of(account).await?;
        self.connected.send_replace(Some(account));
        info!("Wallet connected: {}", account);
        Ok(WalletConnection {
            account,
            label: format!("Connected: {}", short_address(&account)),
            balance,
        })
    }

    /// Balance of a single address
    pub async fn balance(&self, address: &str) -> Result<Balance, ServiceError> {
        let address = parse_hex_address(address).map_err(ServiceError::InvalidInput)?;
        self.balance_of(address).await
    }

    /// Send Ether and report both balances afterwards
    #[instrument(skip(self), err)]
    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransferResponse, ServiceError> {
        let from = self.resolve_sender(request.from.as_deref()).await?;
        let to = parse_hex_address(&request.to)
            .map_err(|e| ServiceError::InvalidInput(format!("Receiver: {}", e)))?;
        let value = parse_ether_amount(&request.amount_ether)?;

        let tx = self
            .backend
            .transfer(from, to, value, self.gas.transfer_gas_limit())
            .await?;
        info!("Transfer of {} wei from {} to {} mined: {}", value, from, to, tx.hash);

        let sender = self.form_balance(from).await?;
        let receiver = self.form_balance(to).await?;
        Ok(TransferResponse {
            message: "Transfer has been successful".to_string(),
            transaction: tx.into(),
            sender,
            receiver,
        })
    }

    /// Read the Hello contract
    #[instrument(skip(self), err)]
    pub async fn hello_view(&self) -> Result<HelloView, ServiceError> {
        let contract = self.hello_contract()?;
        let n = self.settings.sum_up_to;
        let snapshot = self.backend.hello_snapshot(contract, U256::from(n)).await?;

        Ok(HelloView {
            contract,
            greet: snapshot.greeting,
            my_name: snapshot.name,
            max_uint256: snapshot.max_uint256.to_string(),
            sum_up_to: n,
            sum: snapshot.sum.to_string(),
        })
    }

    /// Change the name stored in the Hello contract
    #[instrument(skip(self), err)]
    pub async fn set_hello_name(&self, request: &SetNameRequest) -> Result<NameUpdate, ServiceError> {
        let contract = self.hello_contract()?;
        let from = self.resolve_sender(request.from.as_deref()).await?;

        let (tx, event) = self
            .backend
            .set_hello_name(contract, from, request.name.clone())
            .await?;
        match &event {
            Some(change) => info!("NameChanged: changer {} newName {}", change.changer, change.new_name),
            None => warn!("setMyName mined without a NameChanged event"),
        }

        let updated_name = self
            .backend
            .hello_snapshot(contract, U256::from(self.settings.sum_up_to))
            .await?
            .name;
        Ok(NameUpdate {
            transaction: tx.into(),
            event,
            updated_name,
        })
    }

    /// A page of fundraiser addresses, cached until it expires or the chain changes
    #[instrument(skip(self), err)]
    pub async fn fundraisers(&self, limit: Option<u64>, offset: Option<u64>) -> Result<FundraiserPage, ServiceError> {
        let factory = self.factory_contract()?;
        let limit = limit.unwrap_or(self.settings.page_size);
        let offset = offset.unwrap_or(0);

        let backend = self.backend.clone();
        self.fundraiser_pages
            .try_get_with((limit, offset), async move {
                let total = backend.fundraisers_count(factory).await?;
                let fundraisers = backend.fundraisers(factory, limit, offset).await?;
                debug!("Loaded {} of {} fundraisers", fundraisers.len(), total);
                Ok::<_, ServiceError>(FundraiserPage {
                    total: total.to_string(),
                    limit,
                    offset,
                    fundraisers,
                })
            })
            .await
            .map_err(|e| (*e).clone())
    }

    /// Create a fundraiser after checking every field
    #[instrument(skip(self), err)]
    pub async fn create_fundraiser(&self, request: &CreateFundraiserRequest) -> Result<ActionResponse, ServiceError> {
        let factory = self.factory_contract()?;
        let fields = [
            &request.name,
            &request.url,
            &request.image_url,
            &request.description,
            &request.beneficiary,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ServiceError::InvalidInput("Please fill in all required fields.".to_string()));
        }
        let beneficiary = parse_hex_address(&request.beneficiary).map_err(|_| {
            ServiceError::InvalidInput("Beneficiary must be a valid Ethereum address.".to_string())
        })?;
        let from = self.resolve_sender(request.from.as_deref()).await?;

        let tx = self
            .backend
            .create_fundraiser(
                factory,
                from,
                NewFundraiser {
                    name: request.name.clone(),
                    url: request.url.clone(),
                    image_url: request.image_url.clone(),
                    description: request.description.clone(),
                    beneficiary,
                },
            )
            .await?;

        self.fundraiser_pages.invalidate_all();
        Ok(ActionResponse {
            message: "Fundraiser is successfully created".to_string(),
            transaction: tx.into(),
        })
    }

    /// Current rate, or `None` when the feed is down
    async fn exchange_rate(&self) -> Option<f64> {
        match self.prices.eth_usd().await {
            Ok(rate) => Some(rate),
            Err(e) => {
                error!("Exchange rate fetch error: {}", e);
                None
            }
        }
    }

    fn donation_views(donations: Vec<Donation>, rate: Option<f64>) -> Vec<DonationView> {
        donations
            .into_iter()
            .map(|d| DonationView {
                wei: d.value.to_string(),
                usd: rate.map(|r| wei_to_usd(d.value, r)),
                date: d.date,
            })
            .collect()
    }

    /// Card for one fundraiser, personalised for `viewer` (default: the connected account)
    #[instrument(skip(self), err)]
    pub async fn fundraiser_card(&self, fundraiser: &str, viewer: Option<&str>) -> Result<FundraiserCard, ServiceError> {
        let fundraiser = parse_hex_address(fundraiser).map_err(ServiceError::InvalidInput)?;
        let viewer = parse_optional_address(viewer)
            .map_err(ServiceError::InvalidInput)?
            .or_else(|| self.default_account());

        let details = self.backend.fundraiser_details(fundraiser).await?;
        let rate = self.exchange_rate().await;

        let (is_owner, my_donations) = match viewer {
            Some(account) => {
                let donations = self.backend.donations_of(fundraiser, account).await?;
                (is_owner(&details, account), Self::donation_views(donations, rate))
            }
            None => (false, Vec::new()),
        };

        Ok(FundraiserCard {
            address: details.address,
            total_donations_usd: rate.map(|r| wei_to_usd(details.total_donations, r)),
            total_donations_wei: details.total_donations.to_string(),
            name: details.name,
            url: details.url,
            image_url: details.image_url,
            description: details.description,
            beneficiary: details.beneficiary,
            owner: details.owner,
            exchange_rate: rate,
            viewer,
            is_owner,
            my_donations,
        })
    }

    /// Donate a USD amount converted to ETH
    #[instrument(skip(self), err)]
    pub async fn donate(&self, fundraiser: &str, request: &DonateRequest) -> Result<DonationResponse, ServiceError> {
        let fundraiser = parse_hex_address(fundraiser).map_err(ServiceError::InvalidInput)?;
        let from = self.resolve_sender(request.from.as_deref()).await?;

        let rate = self.prices.eth_usd().await?;
        let value = usd_to_wei(request.amount_usd, rate)?;
        let gas_limit = self.gas.donation_gas_limit(fundraiser, from, value).await;

        let tx = self.backend.donate(fundraiser, from, value, gas_limit).await?;
        info!("Donation of {} wei to {} mined: {}", value, fundraiser, tx.hash);

        let donations = self.backend.donations_of(fundraiser, from).await?;
        Ok(DonationResponse {
            message: "Donation successful".to_string(),
            transaction: tx.into(),
            amount_usd: request.amount_usd,
            amount_wei: value.to_string(),
            amount_ether: format_ether(value),
            gas_limit,
            my_donations: Self::donation_views(donations, Some(rate)),
        })
    }

    async fn owned_fundraiser(&self, fundraiser: &str, from: Option<&str>) -> Result<(Address, Address), ServiceError> {
        let fundraiser = parse_hex_address(fundraiser).map_err(ServiceError::InvalidInput)?;
        let from = self.resolve_sender(from).await?;

        let details = self.backend.fundraiser_details(fundraiser).await?;
        if !is_owner(&details, from) {
            warn!("{} tried an owner action on {}", from, fundraiser);
            return Err(ServiceError::NotOwner(format!(
                "{} is not the owner of {}",
                from, fundraiser
            )));
        }
        Ok((fundraiser, from))
    }

    /// Send collected donations to the beneficiary
    #[instrument(skip(self), err)]
    pub async fn withdraw(&self, fundraiser: &str, from: Option<&str>) -> Result<ActionResponse, ServiceError> {
        let (fundraiser, from) = self.owned_fundraiser(fundraiser, from).await?;
        let tx = self.backend.withdraw(fundraiser, from).await?;
        Ok(ActionResponse {
            message: "Withdrawal successful".to_string(),
            transaction: tx.into(),
        })
    }

    /// Replace the beneficiary
    #[instrument(skip(self), err)]
    pub async fn set_beneficiary(&self, fundraiser: &str, request: &SetBeneficiaryRequest) -> Result<ActionResponse, ServiceError> {
        let beneficiary = parse_hex_address(&request.beneficiary)
            .map_err(|_| ServiceError::InvalidInput("Invalid beneficiary address.".to_string()))?;
        let (fundraiser, from) = self.owned_fundraiser(fundraiser, request.from.as_deref()).await?;

        let tx = self.backend.set_beneficiary(fundraiser, from, beneficiary).await?;
        Ok(ActionResponse {
            message: "Beneficiary updated".to_string(),
            transaction: tx.into(),
        })
    }

    /// One receipt per donation made by `donor`
    #[instrument(skip(self), err)]
    pub async fn donation_receipts(&self, fundraiser: &str, donor: Option<&str>) -> Result<Vec<Receipt>, ServiceError> {
        let fundraiser = parse_hex_address(fundraiser).map_err(ServiceError::InvalidInput)?;
        let donor = self.resolve_sender(donor).await?;

        let details = self.backend.fundraiser_details(fundraiser).await?;
        let donations = self.backend.donations_of(fundraiser, donor).await?;
        let rate = self.exchange_rate().await;

        Ok(donations
            .into_iter()
            .map(|d| receipt(&details.name, d.date, rate.map(|r| wei_to_usd(d.value, r))))
            .collect())
    }
}

/// Whether `account` owns the fundraiser
fn is_owner(details: &FundraiserDetails, account: Address) -> bool {
    details.owner == account
}

/// Receipt for a donation made at `date` (unix seconds)
///
/// `money` is the USD value, absent when no exchange rate is available.
pub fn receipt(fund: &str, date: u64, money: Option<String>) -> Receipt {
    let date = i64::try_from(date)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .map(|d| d.format("%a %b %d %Y %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| date.to_string());

    Receipt {
        fund: fund.to_string(),
        date,
        money,
    }
}
