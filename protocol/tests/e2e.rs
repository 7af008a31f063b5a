//! End-to-end tests for the build → sign → submit lifecycle.
//!
//! The network is an in-memory [`LedgerApi`] that enforces the two rules a
//! client can get wrong: the sequence number must be exactly one past the
//! account's, and every required account must have met its threshold.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ledgerline_protocol::account::{AccountState, ClaimableBalanceEntry, Signer, Thresholds};
use ledgerline_protocol::asset::Asset;
use ledgerline_protocol::codec::{
    export_for_external_signing, import_signed_envelope, OperationOutcome, OperationResult,
};
use ledgerline_protocol::config::NetworkConfig;
use ledgerline_protocol::crypto::{Address, KeyPair};
use ledgerline_protocol::error::LedgerError;
use ledgerline_protocol::operation::{ClaimableBalanceId, OperationBody, OperationBuilder, ThresholdClass};
use ledgerline_protocol::submission::{
    ClientError, LedgerApi, SubmissionFailure, SubmissionResult, SubmissionSuccess,
};
use ledgerline_protocol::transaction::{
    authorization_status, required_signers, select_signers, FeeBumpTransaction,
    SignatureCollector, TransactionAssembler, TransactionEnvelope,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

struct StubLedger {
    network: NetworkConfig,
    accounts: Mutex<HashMap<Address, AccountState>>,
}

impl StubLedger {
    fn new(accounts: impl IntoIterator<Item = AccountState>) -> Self {
        Self {
            network: NetworkConfig::testnet(),
            accounts: Mutex::new(accounts.into_iter().map(|a| (a.address, a)).collect()),
        }
    }

    fn reject(code: &str) -> SubmissionResult {
        SubmissionResult::Failure(SubmissionFailure {
            title: "Transaction Failed".into(),
            detail: None,
            transaction_code: code.into(),
            operation_codes: vec![],
            result_xdr: None,
        })
    }
}

#[async_trait]
impl LedgerApi for StubLedger {
    async fn get_account(&self, address: &Address) -> Result<AccountState, ClientError> {
        self.accounts
            .lock()
            .await
            .get(address)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                resource: format!("account {}", address),
            })
    }

    async fn get_claimable_balance(
        &self,
        id: &ClaimableBalanceId,
    ) -> Result<ClaimableBalanceEntry, ClientError> {
        Err(ClientError::NotFound {
            resource: format!("claimable balance {}", id),
        })
    }

    async fn submit(&self, envelope: &TransactionEnvelope) -> Result<SubmissionResult, ClientError> {
        let mut accounts = self.accounts.lock().await;
        let tx = envelope.transaction();
        let Some(source) = accounts.get(&tx.source).cloned() else {
            return Ok(Self::reject("tx_no_source_account"));
        };
        if tx.sequence.value() != source.sequence.value() + 1 {
            return Ok(Self::reject("tx_bad_seq"));
        }
        let known: Vec<AccountState> = accounts.values().cloned().collect();
        if !authorization_status(envelope, &self.network, &known).is_satisfied() {
            return Ok(Self::reject("tx_bad_auth"));
        }

        for op in &tx.operations {
            if let OperationBody::CreateAccount { destination, .. } = &op.body {
                accounts.insert(*destination, AccountState::new(*destination, 0));
            }
        }
        accounts.insert(tx.source, source.increment_sequence().unwrap());

        Ok(SubmissionResult::Success(SubmissionSuccess {
            hash: envelope.hash_hex(&self.network.network_id()),
            ledger: 1,
            fee_charged: envelope.max_fee(),
            operation_results: tx
                .operations
                .iter()
                .map(|op| OperationResult::success(op.kind(), OperationOutcome::None))
                .collect(),
            result_xdr: None,
        }))
    }

    async fn fund(&self, address: &Address) -> Result<SubmissionResult, ClientError> {
        self.accounts
            .lock()
            .await
            .insert(*address, AccountState::new(*address, 0));
        Ok(SubmissionResult::Success(SubmissionSuccess {
            hash: "00".repeat(32),
            ledger: 1,
            fee_charged: 100,
            operation_results: vec![],
            result_xdr: None,
        }))
    }
}

fn keypair(seed: u8) -> KeyPair {
    KeyPair::from_seed_bytes(&[seed; 32])
}

fn payment_envelope(snapshot: &AccountState, dest: Address) -> TransactionEnvelope {
    TransactionAssembler::new(snapshot)
        .add_operation(OperationBuilder::payment(dest, Asset::Native, "10").unwrap())
        .unwrap()
        .set_timeout(30)
        .seal()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn payment_lifecycle() {
    let alice = keypair(1);
    let bob = keypair(2);
    let ledger = StubLedger::new([AccountState::new(alice.address(), 5)]);

    let snapshot = ledger.get_account(&alice.address()).await.unwrap();
    let envelope = payment_envelope(&snapshot, bob.address());
    assert_eq!(envelope.transaction().sequence.value(), 6);
    assert_eq!(envelope.transaction().fee, 100);

    let collector = SignatureCollector::new(envelope, &ledger.network).sign(&alice).unwrap();
    let expected_hash = collector.hash_hex();
    let success = ledger
        .submit(&collector.finish())
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(success.hash, expected_hash);
    assert!(success.operation_results[0].is_success());
    let after = ledger.get_account(&alice.address()).await.unwrap();
    assert_eq!(after.sequence.value(), 6);
}

#[tokio::test]
async fn reused_snapshot_is_stale() {
    let alice = keypair(1);
    let ledger = StubLedger::new([AccountState::new(alice.address(), 5)]);
    let snapshot = ledger.get_account(&alice.address()).await.unwrap();

    let first = SignatureCollector::new(payment_envelope(&snapshot, keypair(2).address()), &ledger.network)
        .sign(&alice)
        .unwrap()
        .finish();
    let second = SignatureCollector::new(payment_envelope(&snapshot, keypair(3).address()), &ledger.network)
        .sign(&alice)
        .unwrap()
        .finish();

    ledger.submit(&first).await.unwrap().into_result().unwrap();
    let err = ledger.submit(&second).await.unwrap().into_result().unwrap_err();
    assert!(err.is_stale_state());

    // Re-fetching recovers.
    let fresh = ledger.get_account(&alice.address()).await.unwrap();
    let retry = SignatureCollector::new(payment_envelope(&fresh, keypair(3).address()), &ledger.network)
        .sign(&alice)
        .unwrap()
        .finish();
    assert_eq!(retry.transaction().sequence.value(), 7);
    assert!(ledger.submit(&retry).await.unwrap().is_success());
}

#[tokio::test]
async fn unsigned_envelope_is_rejected() {
    let alice = keypair(1);
    let ledger = StubLedger::new([AccountState::new(alice.address(), 5)]);
    let envelope = payment_envelope(&AccountState::new(alice.address(), 5), keypair(2).address());

    match ledger.submit(&envelope).await.unwrap().into_result() {
        Err(LedgerError::Submission(failure)) => {
            assert_eq!(failure.transaction_code, "tx_bad_auth");
            assert_eq!(failure.messages().len(), 1);
        }
        other => panic!("expected Submission error, got {:?}", other),
    }
}

#[tokio::test]
async fn fee_bump_lifecycle() {
    let alice = keypair(1);
    let payer = keypair(9);
    let ledger = StubLedger::new([
        AccountState::new(alice.address(), 5),
        AccountState::new(payer.address(), 70),
    ]);

    let inner = SignatureCollector::new(
        payment_envelope(&AccountState::new(alice.address(), 5), keypair(2).address()),
        &ledger.network,
    )
    .sign(&alice)
    .unwrap()
    .finish();

    let bump = FeeBumpTransaction::new(inner.clone(), payer.address(), 500)
        .unwrap()
        .into_envelope();
    let bump = SignatureCollector::new(bump, &ledger.network).sign(&payer).unwrap().finish();

    // The fee bump travels as text, like any externally signed envelope.
    let received = import_signed_envelope(&export_for_external_signing(&bump)).unwrap();
    assert_eq!(received.transaction(), inner.transaction());
    assert_eq!(received.max_fee(), 500);

    let success = ledger.submit(&received).await.unwrap().into_result().unwrap();
    assert_eq!(success.fee_charged, 500);
    // The inner source's sequence is consumed; the payer's is not.
    assert_eq!(ledger.get_account(&alice.address()).await.unwrap().sequence.value(), 6);
    assert_eq!(ledger.get_account(&payer.address()).await.unwrap().sequence.value(), 70);
}

#[tokio::test]
async fn sponsorship_sandwich_needs_both_signatures() {
    let sponsor = keypair(1);
    let newcomer = keypair(4);
    let ledger = StubLedger::new([AccountState::new(sponsor.address(), 10)]);
    let snapshot = ledger.get_account(&sponsor.address()).await.unwrap();

    let envelope = TransactionAssembler::new(&snapshot)
        .add_operations([
            OperationBuilder::begin_sponsoring_future_reserves(newcomer.address()).unwrap(),
            OperationBuilder::create_account(newcomer.address(), "1").unwrap(),
            OperationBuilder::end_sponsoring_future_reserves(newcomer.address()),
        ])
        .unwrap()
        .seal()
        .unwrap();

    let required: Vec<Address> = required_signers(&envelope).iter().map(|r| r.account).collect();
    assert_eq!(required, vec![sponsor.address(), newcomer.address()]);

    let half = SignatureCollector::new(envelope, &ledger.network).sign(&sponsor).unwrap();
    assert!(!ledger.submit(half.envelope()).await.unwrap().is_success());

    let full = half.sign(&newcomer).unwrap().finish();
    assert!(ledger.submit(&full).await.unwrap().is_success());
    assert!(ledger.account_exists(&newcomer.address()).await.unwrap());
}

#[tokio::test]
async fn multisig_account_selects_enough_signers() {
    let treasury = keypair(1);
    let cosigner_a = keypair(5);
    let cosigner_b = keypair(6);
    let mut state = AccountState::new(treasury.address(), 20);
    state.thresholds = Thresholds {
        master_weight: 1,
        low: 1,
        medium: 2,
        high: 3,
    };
    state.signers = vec![
        Signer {
            key: cosigner_a.address(),
            weight: 2,
        },
        Signer {
            key: cosigner_b.address(),
            weight: 1,
        },
    ];
    let ledger = StubLedger::new([state.clone()]);

    let envelope = TransactionAssembler::new(&state)
        .add_operation(
            OperationBuilder::set_options()
                .remove_signer(cosigner_b.address())
                .build()
                .unwrap(),
        )
        .unwrap()
        .seal()
        .unwrap();
    assert_eq!(required_signers(&envelope)[0].class, ThresholdClass::High);

    let keys = [treasury.clone(), cosigner_a.clone(), cosigner_b.clone()];
    let chosen = select_signers(&state, ThresholdClass::High, &keys).unwrap();
    assert_eq!(chosen.len(), 2);

    let signed = SignatureCollector::new(envelope, &ledger.network)
        .sign_all(chosen)
        .unwrap()
        .finish();
    assert!(authorization_status(&signed, &ledger.network, &[state]).is_satisfied());
    assert!(ledger.submit(&signed).await.unwrap().is_success());
}

#[tokio::test]
async fn friendbot_funding_creates_account() {
    let ledger = StubLedger::new([]);
    let kp = KeyPair::generate();
    assert!(!ledger.account_exists(&kp.address()).await.unwrap());
    assert!(ledger.fund(&kp.address()).await.unwrap().is_success());
    assert_eq!(ledger.get_account(&kp.address()).await.unwrap().sequence.value(), 0);
}
