use actix_web::{web, App, HttpServer};
use eth_dapp_gateway::{
    api, artifacts,
    backend::ChainBackend,
    config,
    models::hex::parse_hex_address,
    price::{CryptoComparePriceFeed, FixedPriceFeed, PriceFeed},
    rpc,
    service::{DappService, ServiceSettings},
    watcher::WalletWatcher,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

/// Application entry point
///
/// This is the main function that:
/// 1. Sets up logging
/// 2. Loads configuration
/// 3. Establishes connection to Ethereum node
/// 4. Resolves the deployed contracts and the exchange rate source
/// 5. Starts the wallet watcher
/// 6. Starts the HTTP server with all endpoints
#[actix_web::main] // Actix will build a multithreaded runtime
async fn main() -> std::io::Result<()> {
    // Configure logging with appropriate log levels for different components
    // - Info level for our service
    // - Lower levels for dependencies to reduce noise
    let filter = EnvFilter::from_default_env()
        .add_directive("eth_dapp_gateway=info".parse().unwrap())
        .add_directive("actix_web=error".parse().unwrap())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("reqwest=warn".parse().unwrap());

    // Initialize the tracing subscriber with our filter
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration from defaults, an optional file and the environment
    let config = config::Config::from_env().expect("Failed to load config");

    // Create Ethereum RPC client and handle potential connection errors
    let eth_client = rpc::EthereumClient::new(&config.ethereum_rpc_url)
        .await
        .expect("Failed to connect to Ethereum");
    let backend: Arc<dyn ChainBackend> = Arc::new(eth_client);

    let contracts = artifacts::load_contracts(&config).expect("Failed to load contract artifacts");

    let prices: Arc<dyn PriceFeed> = match config.eth_usd_rate {
        Some(rate) => {
            info!("Using fixed ETH/USD rate {}", rate);
            Arc::new(FixedPriceFeed::new(rate))
        }
        None => Arc::new(CryptoComparePriceFeed::new(
            &config.price_feed_url,
            Duration::from_secs(config.price_cache_ttl_secs),
        )),
    };

    // Poll accounts and chain id in the background
    let watcher = WalletWatcher::new(
        backend.clone(),
        Duration::from_millis(config.wallet_poll_interval_ms),
    );
    let wallet_state = watcher.state();
    let mut wallet_events = watcher.subscribe();
    watcher.spawn();

    let settings = ServiceSettings {
        sum_up_to: config.sum_up_to,
        page_size: config.fundraiser_page_size,
        donation_fallback_gas_limit: config.donation_fallback_gas_limit,
        info_target: parse_hex_address(&config.info_target_address)
            .expect("Invalid info_target_address"),
        ..ServiceSettings::default()
    };

    // Build the service and wrap it in Arc for thread-safe sharing
    let service = Arc::new(DappService::new(
        backend,
        prices,
        contracts,
        wallet_state,
        settings,
    ));

    // Forward wallet events to the service
    let listener = service.clone();
    tokio::spawn(async move {
        loop {
            match wallet_events.recv().await {
                Ok(event) => listener.on_wallet_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!("Missed {} wallet events", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    info!("Listening on {}:{}", config.host, config.port);

    // Create and start HTTP server
    HttpServer::new(move || {
        App::new()
            // Add logging middleware
            .wrap(TracingLogger::default())
            // Register the service as application data (shared between requests)
            .app_data(web::Data::new(service.clone()))
            // Configure API routes
            .configure(api::configure)
    })
    // Set number of worker threads
    .workers(4)
    // Bind to host/port from configuration
    .bind(format!("{}:{}", config.host, config.port))?
    // Start the server
    .run()
    .await
}
