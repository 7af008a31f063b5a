//! HTTP client tests against a mock query service.

use mockito::{Matcher, Server};
use serde_json::json;

use ledgerline_protocol::account::AccountState;
use ledgerline_protocol::amount::{Amount, Price};
use ledgerline_protocol::asset::Asset;
use ledgerline_protocol::codec::{
    Encode, OfferEffect, OfferEntry, OfferOutcome, OperationOutcome, OperationResult,
    TransactionResult, TransactionResultCode, XdrWriter,
};
use ledgerline_protocol::config::NetworkConfig;
use ledgerline_protocol::crypto::KeyPair;
use ledgerline_protocol::operation::{OperationBuilder, OperationKind};
use ledgerline_protocol::submission::{ClientError, HorizonClient, LedgerApi, SubmissionResult};
use ledgerline_protocol::transaction::{SignatureCollector, TransactionAssembler, TransactionEnvelope};

fn client_for(server: &Server) -> HorizonClient {
    let mut network = NetworkConfig::testnet().with_horizon_url(server.url());
    network.friendbot_url = Some(format!("{}/friendbot", server.url()));
    HorizonClient::new(network).unwrap()
}

fn signed_offer(kp: &KeyPair, network: &NetworkConfig) -> TransactionEnvelope {
    let usd = Asset::credit("USD", KeyPair::from_seed_bytes(&[7u8; 32]).address()).unwrap();
    let envelope = TransactionAssembler::new(&AccountState::new(kp.address(), 41))
        .add_operation(OperationBuilder::manage_sell_offer(Asset::Native, usd, "100", "0.25", 0).unwrap())
        .unwrap()
        .seal()
        .unwrap();
    SignatureCollector::new(envelope, network).sign(kp).unwrap().finish()
}

#[tokio::test]
async fn fetches_account_snapshot() {
    let mut server = Server::new_async().await;
    let kp = KeyPair::from_seed_bytes(&[1u8; 32]);
    let cosigner = KeyPair::from_seed_bytes(&[2u8; 32]);
    let body = json!({
        "account_id": kp.address().to_string(),
        "sequence": "103420918407103",
        "thresholds": {"low_threshold": 1, "med_threshold": 2, "high_threshold": 3},
        "balances": [{"balance": "9999.9999900", "asset_type": "native"}],
        "signers": [
            {"key": cosigner.address().to_string(), "weight": 2, "type": "ed25519_public_key"},
            {"key": kp.address().to_string(), "weight": 1, "type": "ed25519_public_key"}
        ],
        "data": {"config": "b24="}
    });
    let mock = server
        .mock("GET", format!("/accounts/{}", kp.address()).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let account = client_for(&server).get_account(&kp.address()).await.unwrap();
    mock.assert_async().await;

    assert_eq!(account.sequence.value(), 103_420_918_407_103);
    assert_eq!(account.thresholds.master_weight, 1);
    assert_eq!(account.thresholds.high, 3);
    assert_eq!(account.signer_weight(&cosigner.address()), 2);
    assert_eq!(account.native_balance(), Amount::parse("9999.99999").unwrap());
    assert_eq!(account.data.get("config").map(Vec::as_slice), Some(&b"on"[..]));
}

#[tokio::test]
async fn missing_account_is_not_found() {
    let mut server = Server::new_async().await;
    let kp = KeyPair::generate();
    server
        .mock("GET", format!("/accounts/{}", kp.address()).as_str())
        .with_status(404)
        .with_body(r#"{"title": "Resource Missing", "status": 404}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(matches!(
        client.get_account(&kp.address()).await,
        Err(ClientError::NotFound { .. })
    ));
    assert!(!client.account_exists(&kp.address()).await.unwrap());
}

#[tokio::test]
async fn successful_submission_decodes_offer_result() {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    let kp = KeyPair::from_seed_bytes(&[1u8; 32]);
    let envelope = signed_offer(&kp, client.network());
    let hash = envelope.hash_hex(&client.network().network_id());

    let result = TransactionResult {
        fee_charged: 100,
        code: TransactionResultCode::Success,
        operations: vec![OperationResult::success(
            OperationKind::ManageSellOffer,
            OperationOutcome::Offer(OfferOutcome {
                claimed: vec![],
                effect: OfferEffect::Created(OfferEntry {
                    seller: kp.address(),
                    offer_id: 777,
                    selling: Asset::Native,
                    buying: Asset::credit("USD", KeyPair::from_seed_bytes(&[7u8; 32]).address())
                        .unwrap(),
                    amount: Amount::parse("100").unwrap(),
                    price: Price::new(1, 4).unwrap(),
                    flags: 0,
                }),
            }),
        )],
        inner: None,
    };
    let mock = server
        .mock("POST", "/transactions")
        .match_body(Matcher::UrlEncoded("tx".into(), envelope.to_base64()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"hash": hash, "ledger": 4242, "result_xdr": result.to_base64(), "successful": true})
                .to_string(),
        )
        .create_async()
        .await;

    let success = client.submit(&envelope).await.unwrap().into_result().unwrap();
    mock.assert_async().await;

    assert_eq!(success.hash, hash);
    assert_eq!(success.ledger, 4242);
    assert_eq!(success.fee_charged, 100);
    let offer = success.operation_results[0].offer().unwrap();
    assert!(!offer.traded());
    assert_eq!(offer.resting().unwrap().offer_id, 777);
}

#[tokio::test]
async fn accepted_submission_with_unreadable_result_is_still_success() {
    use base64::Engine;

    let mut server = Server::new_async().await;
    let client = client_for(&server);
    let kp = KeyPair::from_seed_bytes(&[1u8; 32]);
    let envelope = signed_offer(&kp, client.network());

    // Fee, tx_success, one operation result with an operation type this
    // crate does not know.
    let mut w = XdrWriter::new();
    w.write_i64(100);
    w.write_i32(0);
    w.write_u32(1);
    w.write_i32(0);
    w.write_i32(24);
    let result_xdr = base64::engine::general_purpose::STANDARD.encode(w.into_bytes());

    server
        .mock("POST", "/transactions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"hash": "abcd", "ledger": 7, "result_xdr": result_xdr}).to_string())
        .create_async()
        .await;

    let success = client.submit(&envelope).await.unwrap().into_result().unwrap();
    assert_eq!(success.hash, "abcd");
    assert_eq!(success.ledger, 7);
    assert!(success.operation_results.is_empty());
    assert_eq!(success.result_xdr.as_deref(), Some(result_xdr.as_str()));
}

#[tokio::test]
async fn rejected_submission_carries_codes() {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    let kp = KeyPair::from_seed_bytes(&[1u8; 32]);
    let envelope = signed_offer(&kp, client.network());

    server
        .mock("POST", "/transactions")
        .with_status(400)
        .with_header("content-type", "application/problem+json")
        .with_body(
            json!({
                "type": "https://stellar.org/horizon-errors/transaction_failed",
                "title": "Transaction Failed",
                "status": 400,
                "extras": {"result_codes": {"transaction": "tx_failed", "operations": ["op_underfunded"]}}
            })
            .to_string(),
        )
        .create_async()
        .await;

    match client.submit(&envelope).await.unwrap() {
        SubmissionResult::Failure(failure) => {
            assert_eq!(failure.title, "Transaction Failed");
            assert_eq!(failure.operation_codes, vec!["op_underfunded"]);
            assert_eq!(
                failure.messages(),
                vec!["The source account does not have enough funds.".to_string()]
            );
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn bad_sequence_maps_to_stale_state() {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    let kp = KeyPair::from_seed_bytes(&[1u8; 32]);

    server
        .mock("POST", "/transactions")
        .with_status(400)
        .with_body(
            json!({
                "type": "https://stellar.org/horizon-errors/transaction_failed",
                "title": "Transaction Failed",
                "extras": {"result_codes": {"transaction": "tx_bad_seq"}}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = client
        .submit(&signed_offer(&kp, client.network()))
        .await
        .unwrap()
        .into_result()
        .unwrap_err();
    assert!(err.is_stale_state());
}

#[tokio::test]
async fn server_error_is_a_client_error() {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    let kp = KeyPair::from_seed_bytes(&[1u8; 32]);

    server
        .mock("POST", "/transactions")
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    assert!(matches!(
        client.submit(&signed_offer(&kp, client.network())).await,
        Err(ClientError::UnexpectedStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn friendbot_funds_account() {
    let mut server = Server::new_async().await;
    let client = client_for(&server);
    let kp = KeyPair::generate();

    let mock = server
        .mock("GET", "/friendbot")
        .match_query(Matcher::UrlEncoded("addr".into(), kp.address().to_string()))
        .with_status(200)
        .with_body(json!({"hash": "ab".repeat(32), "ledger": 7}).to_string())
        .create_async()
        .await;

    let result = client.fund(&kp.address()).await.unwrap();
    mock.assert_async().await;
    assert_eq!(result.hash(), Some("ab".repeat(32).as_str()));
}

#[tokio::test]
async fn public_network_has_no_friendbot() {
    let client = HorizonClient::new(NetworkConfig::public()).unwrap();
    assert!(matches!(
        client.fund(&KeyPair::generate().address()).await,
        Err(ClientError::NoFriendbot(_))
    ));
}
