//! Read-only endpoints served from a real node

use crate::init_logger;
use actix_web::{http::StatusCode, test, App};
use alloy::primitives::address;
use serde_json::Value;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use eth_dapp_gateway::{
    api,
    price::FixedPriceFeed,
    rpc::EthereumClient,
    service::ContractBook,
};

#[path = "../api_tests/helpers.rs"]
mod helpers;
use helpers::{service_data, spawn_anvil, ALICE};

#[actix_web::test]
async fn test_chain_info_and_accounts() {
    init_logger();

    let (mut anvil_process, rpc_url) = spawn_anvil();
    let client = Arc::new(EthereumClient::new(&rpc_url).await.unwrap());

    let data = service_data(
        client,
        Arc::new(FixedPriceFeed::new(2000.0)),
        ContractBook::default(),
        vec![],
    );
    let app = test::init_service(
        App::new()
            .wrap(TracingLogger::default())
            .app_data(data)
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let health: Value = test::read_body_json(resp).await;
    assert_eq!(health["status"], "ok");

    let req = test::TestRequest::get().uri("/api/v1/chain").to_request();
    let info: Value = test::call_and_read_body_json(&app, req).await;
    println!("Chain info: {:?}", info);
    assert_eq!(info["chainId"], 31337);
    assert_eq!(info["targetBalance"]["ether"], "10000.000000000000000000");
    assert!(info["gasPriceWei"].as_str().unwrap().parse::<u128>().unwrap() > 0);

    // anvil unlocks ten funded accounts
    let req = test::TestRequest::get().uri("/api/v1/accounts").to_request();
    let accounts: Value = test::call_and_read_body_json(&app, req).await;
    let accounts = accounts.as_array().unwrap();
    assert_eq!(accounts.len(), 10);
    assert!(accounts[0]["account"]
        .as_str()
        .unwrap()
        .eq_ignore_ascii_case(&ALICE.to_string()));

    let req = test::TestRequest::post()
        .uri("/api/v1/wallet/connect")
        .to_request();
    let wallet: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(wallet["label"], "Connected: 0xf39F...2266");

    anvil_process.kill().expect("Failed to kill anvil process");
}

#[actix_web::test]
async fn test_contract_without_code_is_a_contract_error() {
    init_logger();

    let (mut anvil_process, rpc_url) = spawn_anvil();
    let client = Arc::new(EthereumClient::new(&rpc_url).await.unwrap());

    // Nothing is deployed at this address on a fresh node
    let contracts = ContractBook {
        hello: Some(address!("5FbDB2315678afecb367f032d93F642f64180aa3")),
        fundraiser_factory: None,
    };
    let data = service_data(
        client,
        Arc::new(FixedPriceFeed::new(2000.0)),
        contracts,
        vec![],
    );
    let app = test::init_service(App::new().app_data(data).configure(api::configure)).await;

    let req = test::TestRequest::get().uri("/api/v1/hello").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_code"], "CONTRACT_ERROR");

    let req = test::TestRequest::get().uri("/api/v1/fundraisers").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    anvil_process.kill().expect("Failed to kill anvil process");
}
