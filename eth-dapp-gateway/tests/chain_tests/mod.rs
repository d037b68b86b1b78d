//! Tests against a live anvil node
//!
//! Each test spawns its own anvil instance, so these need `anvil` on the PATH.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

pub mod node_tests;
pub mod transfer_tests;

static INIT: Once = Once::new();

/// Initializes the global logger (only once).
pub fn init_logger() {
    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive("eth_dapp_gateway=info".parse().unwrap())
            .add_directive("actix_web=error".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());
        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}
