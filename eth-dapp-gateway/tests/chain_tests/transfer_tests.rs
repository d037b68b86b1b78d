//! Ether transfers mined by anvil

use crate::init_logger;
use actix_web::{http::StatusCode, test, App};
use serde_json::{json, Value};
use std::sync::Arc;

use eth_dapp_gateway::{
    api,
    price::FixedPriceFeed,
    rpc::EthereumClient,
    service::ContractBook,
};

#[path = "../api_tests/helpers.rs"]
mod helpers;
use helpers::{service_data, spawn_anvil, ALICE, BOB};

#[actix_web::test]
async fn test_transfer_one_ether() {
    init_logger();

    let (mut anvil_process, rpc_url) = spawn_anvil();
    let client = Arc::new(EthereumClient::new(&rpc_url).await.unwrap());

    let data = service_data(
        client,
        Arc::new(FixedPriceFeed::new(2000.0)),
        ContractBook::default(),
        vec![ALICE],
    );
    let app = test::init_service(App::new().app_data(data).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/transfer")
        .set_json(json!({
            "to": BOB.to_string(),
            "amountEther": "1"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let response: Value = test::read_body_json(resp).await;
    println!("Transfer: {:?}", response);
    assert_eq!(response["message"], "Transfer has been successful");
    assert_eq!(response["transaction"]["gasUsed"], 21_000);
    assert_eq!(response["receiver"]["wei"], "10001000000000000000000");
    // Gas costs disappear when rounding to cents
    assert_eq!(response["sender"]["etherRounded"], 9999.0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/balance/{}", BOB))
        .to_request();
    let balance: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(balance["ether"], "10001.000000000000000000");

    anvil_process.kill().expect("Failed to kill anvil process");
}

#[actix_web::test]
async fn test_transfer_beyond_balance_fails() {
    init_logger();

    let (mut anvil_process, rpc_url) = spawn_anvil();
    let client = Arc::new(EthereumClient::new(&rpc_url).await.unwrap());

    let data = service_data(
        client,
        Arc::new(FixedPriceFeed::new(2000.0)),
        ContractBook::default(),
        vec![ALICE],
    );
    let app = test::init_service(App::new().app_data(data).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/transfer")
        .set_json(json!({
            "from": ALICE.to_string(),
            "to": BOB.to_string(),
            "amountEther": "20000"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error() || resp.status().is_server_error());

    let response: Value = test::read_body_json(resp).await;
    assert!(response["details"].as_str().is_some());

    anvil_process.kill().expect("Failed to kill anvil process");
}
