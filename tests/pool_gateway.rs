use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use withdrawal_job_engine::service::chain_service::{
    HttpVaultChain, NATIVE_MINT_ADDRESS, VaultChain,
};
use withdrawal_job_engine::service::pool_service::{
    HttpShieldedPool, PoolWithdrawal, ShieldedPool,
};

const RECIPIENT: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";
const OWNER: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";

async fn mount_config(server: &MockServer, max_deposit_amount: u64) {
    Mock::given(method("GET"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deposit_fee_rate": 0.0,
            "withdraw_fee_rate": 0.003,
            "max_deposit_amount": max_deposit_amount,
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn deposit_round_trip_fetches_config_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deposit_fee_rate": 0.0,
            "withdraw_fee_rate": 0.003,
            "max_deposit_amount": 10_000_000u64,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/deposit"))
        .and(body_partial_json(json!({"amount": 1_000_000u64})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "signature": "dep-sig-1",
        })))
        .expect(2)
        .mount(&server)
        .await;

    let pool = HttpShieldedPool::new(&server.uri(), Duration::from_secs(5)).expect("client");

    let first = pool.deposit_native(1_000_000).await.expect("deposit");
    assert_eq!(first.signature, "dep-sig-1");
    let second = pool.deposit_native(1_000_000).await.expect("deposit");
    assert_eq!(second.signature, "dep-sig-1");
}

#[tokio::test]
async fn deposit_rejection_preserves_collaborator_error() {
    let server = MockServer::start().await;
    mount_config(&server, 10_000_000).await;
    Mock::given(method("POST"))
        .and(path("/deposit"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "insufficient pool liquidity",
        })))
        .mount(&server)
        .await;

    let pool = HttpShieldedPool::new(&server.uri(), Duration::from_secs(5)).expect("client");

    let err = pool.deposit_native(1_000_000).await.unwrap_err();
    assert_eq!(err, "insufficient pool liquidity");
}

#[tokio::test]
async fn deposit_above_pool_maximum_is_refused_locally() {
    let server = MockServer::start().await;
    mount_config(&server, 1_000).await;

    let pool = HttpShieldedPool::new(&server.uri(), Duration::from_secs(5)).expect("client");

    // no /deposit mock is mounted: the exact message proves the cap check
    // never left the process
    let err = pool.deposit_native(5_000).await.unwrap_err();
    assert_eq!(err, "deposit amount 5000 exceeds pool maximum 1000");
}

#[tokio::test]
async fn withdraw_round_trip_returns_signature_and_proof() {
    let server = MockServer::start().await;
    mount_config(&server, 10_000_000).await;
    Mock::given(method("POST"))
        .and(path("/withdraw"))
        .and(body_partial_json(json!({
            "amount": 250_000u64,
            "recipient_address": RECIPIENT,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "signature": "wd-sig-1",
            "proof": {"proof_bytes": "0xdeadbeef"},
        })))
        .mount(&server)
        .await;

    let pool = HttpShieldedPool::new(&server.uri(), Duration::from_secs(5)).expect("client");

    let payout = pool
        .withdraw_native(PoolWithdrawal {
            amount: 250_000,
            recipient_address: RECIPIENT.to_string(),
            notes: vec![json!({"commitment": "c1"})],
        })
        .await
        .expect("withdraw");
    assert_eq!(payout.signature, "wd-sig-1");
    assert_eq!(payout.proof, Some(json!({"proof_bytes": "0xdeadbeef"})));
}

#[tokio::test]
async fn unreachable_gateway_surfaces_transport_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let pool = HttpShieldedPool::new(&uri, Duration::from_secs(2)).expect("client");

    let err = pool.deposit_native(1_000).await.unwrap_err();
    assert!(err.starts_with("pool config fetch failed"));
}

#[tokio::test]
async fn unwrap_reports_missing_holding_account_as_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/unwrap"))
        .and(body_partial_json(json!({"mint_address": NATIVE_MINT_ADDRESS})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "closed": false,
        })))
        .mount(&server)
        .await;

    let chain = HttpVaultChain::new(&server.uri(), Duration::from_secs(5)).expect("client");

    let released = chain.release_collateral().await.expect("unwrap");
    assert!(released.is_none());
}

#[tokio::test]
async fn unwrap_returns_signature_when_account_closed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/unwrap"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "closed": true,
            "signature": "unwrap-sig-1",
        })))
        .mount(&server)
        .await;

    let chain = HttpVaultChain::new(&server.uri(), Duration::from_secs(5)).expect("client");

    let released = chain.release_collateral().await.expect("unwrap");
    assert_eq!(released.as_deref(), Some("unwrap-sig-1"));
}

#[tokio::test]
async fn complete_withdrawal_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/complete-withdrawal"))
        .and(body_partial_json(json!({
            "owner_address": OWNER,
            "mint_address": NATIVE_MINT_ADDRESS,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "signature": "complete-sig-1",
        })))
        .mount(&server)
        .await;

    let chain = HttpVaultChain::new(&server.uri(), Duration::from_secs(5)).expect("client");

    let signature = chain
        .complete_withdrawal(OWNER, NATIVE_MINT_ADDRESS)
        .await
        .expect("complete withdrawal");
    assert_eq!(signature, "complete-sig-1");
}

#[tokio::test]
async fn complete_withdrawal_rejection_preserves_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/complete-withdrawal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "vault account mismatch",
        })))
        .mount(&server)
        .await;

    let chain = HttpVaultChain::new(&server.uri(), Duration::from_secs(5)).expect("client");

    let err = chain
        .complete_withdrawal(OWNER, NATIVE_MINT_ADDRESS)
        .await
        .unwrap_err();
    assert_eq!(err, "vault account mismatch");
}
