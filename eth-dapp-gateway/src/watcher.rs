//! Account and chain change notifications.
//!
//! A node offers no push notification for its account list or chain id, so the
//! watcher polls `eth_accounts` and `eth_chainId` and turns differences into
//! [`WalletEvent`]s.

use std::{sync::Arc, time::Duration};

use alloy::primitives::Address;
use serde::Serialize;
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{backend::ChainBackend, error::ServiceError};

/// Accounts and chain as last seen by the watcher
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WalletState {
    pub chain_id: Option<u64>,
    pub accounts: Vec<Address>,
}

impl WalletState {
    /// The account used when a request does not name one
    pub fn primary_account(&self) -> Option<Address> {
        self.accounts.first().copied()
    }
}

/// A change observed between two polls
#[derive(Debug, Clone, PartialEq)]
pub enum WalletEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

pub struct WalletWatcher {
    backend: Arc<dyn ChainBackend>,
    interval: Duration,
    state: watch::Sender<WalletState>,
    events: broadcast::Sender<WalletEvent>,
    hydrated: bool,
}

impl WalletWatcher {
    pub fn new(backend: Arc<dyn ChainBackend>, interval: Duration) -> Self {
        let (state, _) = watch::channel(WalletState::default());
        let (events, _) = broadcast::channel(16);
        Self {
            backend,
            interval,
            state,
            events,
            hydrated: false,
        }
    }

    /// Receiver for the latest wallet state
    pub fn state(&self) -> watch::Receiver<WalletState> {
        self.state.subscribe()
    }

    /// Receiver for change events
    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    /// Poll the node once, publish the new state and return the events it produced.
    ///
    /// The first successful poll only hydrates the state and emits nothing.
    pub async fn poll_once(&mut self) -> Result<Vec<WalletEvent>, ServiceError> {
        let chain_id = self.backend.chain_id().await?;
        let accounts = self.backend.accounts().await?;

        let previous = self.state.borrow().clone();
        let mut events = Vec::new();
        if self.hydrated {
            if previous.chain_id != Some(chain_id) {
                info!("Chain changed: {:?} -> {}", previous.chain_id, chain_id);
                events.push(WalletEvent::ChainChanged(chain_id));
            }
            if previous.accounts != accounts {
                info!("Accounts changed: {:?}", accounts);
                events.push(WalletEvent::AccountsChanged(accounts.clone()));
            }
        } else {
            debug!("Wallet state hydrated: chain {}, {} accounts", chain_id, accounts.len());
            self.hydrated = true;
        }

        self.state.send_replace(WalletState {
            chain_id: Some(chain_id),
            accounts,
        });
        for event in &events {
            // No subscribers is fine
            let _ = self.events.send(event.clone());
        }
        Ok(events)
    }

    /// Run the polling loop on the runtime until the task is aborted
    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                if let Err(e) = self.poll_once().await {
                    warn!("Wallet poll failed: {}", e);
                }
            }
        })
    }
}
