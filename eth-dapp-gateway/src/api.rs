use crate::{
    error::ServiceError,
    models::requests::{
        ChainInfoQuery, ConnectWalletRequest, CreateFundraiserRequest, DonateRequest,
        FundraiserCardQuery, FundraiserPageQuery, ReceiptsQuery, SetBeneficiaryRequest,
        SetNameRequest, TransferRequest, WithdrawRequest,
    },
    service::DappService,
};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::{debug, info};

type Service = web::Data<Arc<DappService>>;

/// Service health check endpoint that verifies RPC connection is working
#[post("/api/v1/health")]
async fn health_check(service: Service) -> Result<HttpResponse, ServiceError> {
    info!("Health check requested");
    Ok(HttpResponse::Ok().json(service.health().await?))
}

/// Chain id, latest block, gas price and the balance of a target address
#[get("/api/v1/chain")]
async fn chain_info(
    service: Service,
    query: web::Query<ChainInfoQuery>,
) -> Result<HttpResponse, ServiceError> {
    let info = service.blockchain_info(query.target.as_deref()).await?;
    Ok(HttpResponse::Ok().json(info))
}

/// All accounts the node manages, with balances
#[get("/api/v1/accounts")]
async fn accounts(service: Service) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.account_balances().await?))
}

#[get("/api/v1/balance/{address}")]
async fn balance(
    service: Service,
    address: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.balance(&address).await?))
}

/// Accounts and chain id seen by the last wallet poll
#[get("/api/v1/wallet")]
async fn wallet_state(service: Service) -> HttpResponse {
    HttpResponse::Ok().json(service.wallet_state())
}

#[post("/api/v1/wallet/connect")]
async fn connect_wallet(
    req: HttpRequest,
    service: Service,
    body: Option<web::Json<ConnectWalletRequest>>,
) -> Result<HttpResponse, ServiceError> {
    debug!(
        "Wallet connection requested from {}",
        req.peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );
    let requested = body.as_ref().and_then(|b| b.account.as_deref());
    Ok(HttpResponse::Ok().json(service.connect_wallet(requested).await?))
}

/// Send Ether with a fixed 21000 gas limit
#[post("/api/v1/transfer")]
async fn transfer(
    service: Service,
    request: web::Json<TransferRequest>,
) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.transfer(&request).await?))
}

#[get("/api/v1/hello")]
async fn hello(service: Service) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.hello_view().await?))
}

#[post("/api/v1/hello/name")]
async fn set_hello_name(
    service: Service,
    request: web::Json<SetNameRequest>,
) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.set_hello_name(&request).await?))
}

#[get("/api/v1/fundraisers")]
async fn list_fundraisers(
    service: Service,
    query: web::Query<FundraiserPageQuery>,
) -> Result<HttpResponse, ServiceError> {
    let page = service.fundraisers(query.limit, query.offset).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/api/v1/fundraisers")]
async fn create_fundraiser(
    service: Service,
    request: web::Json<CreateFundraiserRequest>,
) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.create_fundraiser(&request).await?))
}

#[get("/api/v1/fundraisers/{address}")]
async fn fundraiser_card(
    service: Service,
    address: web::Path<String>,
    query: web::Query<FundraiserCardQuery>,
) -> Result<HttpResponse, ServiceError> {
    let card = service
        .fundraiser_card(&address, query.viewer.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(card))
}

#[post("/api/v1/fundraisers/{address}/donate")]
async fn donate(
    service: Service,
    address: web::Path<String>,
    request: web::Json<DonateRequest>,
) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.donate(&address, &request).await?))
}

#[post("/api/v1/fundraisers/{address}/withdraw")]
async fn withdraw(
    service: Service,
    address: web::Path<String>,
    request: Option<web::Json<WithdrawRequest>>,
) -> Result<HttpResponse, ServiceError> {
    let from = request.as_ref().and_then(|r| r.from.as_deref());
    Ok(HttpResponse::Ok().json(service.withdraw(&address, from).await?))
}

#[post("/api/v1/fundraisers/{address}/beneficiary")]
async fn set_beneficiary(
    service: Service,
    address: web::Path<String>,
    request: web::Json<SetBeneficiaryRequest>,
) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(service.set_beneficiary(&address, &request).await?))
}

#[get("/api/v1/fundraisers/{address}/receipts")]
async fn receipts(
    service: Service,
    address: web::Path<String>,
    query: web::Query<ReceiptsQuery>,
) -> Result<HttpResponse, ServiceError> {
    let receipts = service
        .donation_receipts(&address, query.donor.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(receipts))
}

/// Configure the API routes for the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(chain_info)
        .service(accounts)
        .service(balance)
        .service(wallet_state)
        .service(connect_wallet)
        .service(transfer)
        .service(hello)
        .service(set_hello_name)
        .service(list_fundraisers)
        .service(create_fundraiser)
        .service(fundraiser_card)
        .service(donate)
        .service(withdraw)
        .service(set_beneficiary)
        .service(receipts);
}
