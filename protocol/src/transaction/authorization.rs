//! Who has to sign, and have they?
//!
//! Authorization is derived per operation: each operation needs its
//! *effective* source account (the operation's own source, or the
//! transaction's) to meet the operation's threshold class. The transaction
//! source also needs at least the low threshold, for the fee and sequence
//! number. A sponsorship sandwich therefore needs both the sponsor and the
//! sponsored account to sign, even though only one of them is the
//! transaction source.
//!
//! For a fee bump the wrapper and the wrapped transaction are signed over
//! different payloads, so requirements are reported per [`SignatureScope`].
//!
//! Everything here is advisory. The network enforces thresholds; these
//! functions let a caller find out before submitting.

use serde::Serialize;

use crate::account::AccountState;
use crate::config::NetworkConfig;
use crate::crypto::{Address, DecoratedSignature, KeyPair};
use crate::operation::ThresholdClass;

use super::envelope::{TransactionEnvelope, TransactionV1Envelope};
use super::signing::SigningError;
use super::types::Transaction;

/// Which signature list a requirement applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureScope {
    /// The transaction that carries the operations. For a fee bump, the
    /// inner transaction.
    Transaction,
    /// The fee bump wrapper.
    FeeBump,
}

/// One account that must sign, and the threshold it must meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RequiredSigner {
    pub account: Address,
    pub class: ThresholdClass,
    pub scope: SignatureScope,
}

fn transaction_requirements(tx: &Transaction) -> Vec<RequiredSigner> {
    let mut out: Vec<RequiredSigner> = vec![RequiredSigner {
        account: tx.source,
        class: ThresholdClass::Low,
        scope: SignatureScope::Transaction,
    }];
    for op in &tx.operations {
        let account = op.effective_source(&tx.source);
        let class = op.threshold_class();
        match out.iter_mut().find(|r| r.account == account) {
            Some(existing) => existing.class = existing.class.max(class),
            None => out.push(RequiredSigner {
                account,
                class,
                scope: SignatureScope::Transaction,
            }),
        }
    }
    out
}

/// Every account that must sign `envelope`, at the highest class any of
/// its operations demands, in first-seen order.
pub fn required_signers(envelope: &TransactionEnvelope) -> Vec<RequiredSigner> {
    match envelope {
        TransactionEnvelope::Transaction(env) => transaction_requirements(&env.tx),
        TransactionEnvelope::FeeBump(env) => {
            let mut out = transaction_requirements(&env.tx.inner.tx);
            out.push(RequiredSigner {
                account: env.tx.fee_source,
                class: ThresholdClass::Low,
                scope: SignatureScope::FeeBump,
            });
            out
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// How close one required account is to its threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignerStatus {
    pub account: Address,
    pub class: ThresholdClass,
    pub scope: SignatureScope,
    /// Sum of weights of distinct signers with a valid signature.
    pub weight: u32,
    pub required: u32,
}

impl SignerStatus {
    pub fn is_satisfied(&self) -> bool {
        self.weight >= self.required
    }
}

/// Result of [`authorization_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationStatus {
    pub signers: Vec<SignerStatus>,
}

impl AuthorizationStatus {
    pub fn is_satisfied(&self) -> bool {
        self.signers.iter().all(SignerStatus::is_satisfied)
    }

    pub fn missing(&self) -> impl Iterator<Item = &SignerStatus> {
        self.signers.iter().filter(|s| !s.is_satisfied())
    }
}

/// Accumulated weight of distinct signers of `account` with a valid
/// signature in `signatures` over `payload`. A signer counts once no matter
/// how many copies of its signature are attached.
fn signed_weight(account: &AccountState, signatures: &[DecoratedSignature], payload: &[u8]) -> u32 {
    account
        .weighted_signers()
        .into_iter()
        .filter(|(key, _)| {
            signatures
                .iter()
                .any(|sig| sig.is_valid_for(key.public_key(), payload))
        })
        .map(|(_, weight)| u32::from(weight))
        .sum()
}

/// Evaluates every requirement of `envelope` against the signatures it
/// already carries.
///
/// `accounts` supplies the signer lists and thresholds. Any required
/// account not in the slice is evaluated as a fresh account: master key
/// weight 1, all thresholds 0.
pub fn authorization_status(
    envelope: &TransactionEnvelope,
    network: &NetworkConfig,
    accounts: &[AccountState],
) -> AuthorizationStatus {
    let network_id = network.network_id();
    let outer_payload = envelope.signature_payload(&network_id);
    let inner: Option<(&TransactionV1Envelope, [u8; 32])> = match envelope {
        TransactionEnvelope::FeeBump(env) => {
            Some((&env.tx.inner, env.tx.inner.signature_payload(&network_id)))
        }
        TransactionEnvelope::Transaction(_) => None,
    };

    let signers = required_signers(envelope)
        .into_iter()
        .map(|req| {
            let state = accounts
                .iter()
                .find(|a| a.address == req.account)
                .cloned()
                .unwrap_or_else(|| AccountState::new(req.account, 0));
            let (signatures, payload) = match (req.scope, &inner) {
                (SignatureScope::Transaction, Some((inner_env, inner_payload))) => {
                    (inner_env.signatures.as_slice(), inner_payload)
                }
                _ => (envelope.signatures(), &outer_payload),
            };
            SignerStatus {
                account: req.account,
                class: req.class,
                scope: req.scope,
                weight: signed_weight(&state, signatures, payload),
                required: state.thresholds.required_weight(req.class),
            }
        })
        .collect();

    AuthorizationStatus { signers }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Picks keys from `available` that can sign for `account` until `class`
/// is met, heaviest signers first, so the fewest signatures are used.
///
/// Only keys that hold a secret count. Fails with
/// [`SigningError::InsufficientSigners`] if every usable key together still
/// falls short.
pub fn select_signers<'a>(
    account: &AccountState,
    class: ThresholdClass,
    available: &'a [KeyPair],
) -> Result<Vec<&'a KeyPair>, SigningError> {
    let need = account.thresholds.required_weight(class);

    let mut candidates: Vec<(&KeyPair, u8)> = account
        .weighted_signers()
        .into_iter()
        .filter_map(|(key, weight)| {
            available
                .iter()
                .find(|kp| kp.can_sign() && kp.address() == key)
                .map(|kp| (kp, weight))
        })
        .collect();
    // Stable sort keeps ledger order among equal weights.
    candidates.sort_by(|a, b| b.1.cmp(&a.1));

    let mut have = 0u32;
    let mut chosen = Vec::new();
    for (kp, weight) in candidates {
        if have >= need {
            break;
        }
        have += u32::from(weight);
        chosen.push(kp);
    }

    if have < need {
        return Err(SigningError::InsufficientSigners {
            account: account.address.to_string(),
            class,
            have,
            need,
        });
    }
    Ok(chosen)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Signer, Thresholds};
    use crate::asset::Asset;
    use crate::operation::OperationBuilder;
    use crate::transaction::{FeeBumpTransaction, SignatureCollector, TransactionAssembler};

    fn key(seed: u8) -> KeyPair {
        KeyPair::from_seed_bytes(&[seed; 32])
    }

    fn sandwich() -> TransactionEnvelope {
        let sponsor = key(1);
        let sponsored = key(2);
        TransactionAssembler::new(&AccountState::new(sponsor.address(), 10))
            .add_operation(
                OperationBuilder::begin_sponsoring_future_reserves(sponsored.address()).unwrap(),
            )
            .unwrap()
            .add_operation(
                OperationBuilder::change_trust(Asset::credit("USD", key(9).address()).unwrap(), None)
                    .unwrap()
                    .with_source(sponsored.address()),
            )
            .unwrap()
            .add_operation(OperationBuilder::end_sponsoring_future_reserves(
                sponsored.address(),
            ))
            .unwrap()
            .seal()
            .unwrap()
    }

    #[test]
    fn sandwich_requires_both_parties() {
        let required = required_signers(&sandwich());
        let accounts: Vec<Address> = required.iter().map(|r| r.account).collect();
        assert_eq!(accounts, vec![key(1).address(), key(2).address()]);
        assert!(required.iter().all(|r| r.class == ThresholdClass::Medium));
    }

    #[test]
    fn class_is_the_maximum_per_account() {
        let source = key(1);
        let env = TransactionAssembler::new(&AccountState::new(source.address(), 1))
            .add_operation(OperationBuilder::payment(key(2).address(), Asset::Native, "1").unwrap())
            .unwrap()
            .add_operation(
                OperationBuilder::set_options()
                    .remove_signer(key(3).address())
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .seal()
            .unwrap();
        let required = required_signers(&env);
        assert_eq!(required.len(), 1);
        assert_eq!(required[0].class, ThresholdClass::High);
    }

    #[test]
    fn status_tracks_each_party() {
        let network = NetworkConfig::testnet();
        let half = SignatureCollector::new(sandwich(), &network)
            .sign(&key(1))
            .unwrap();
        let status = authorization_status(half.envelope(), &network, &[]);
        assert!(!status.is_satisfied());
        let missing: Vec<Address> = status.missing().map(|s| s.account).collect();
        assert_eq!(missing, vec![key(2).address()]);

        let full = half.sign(&key(2)).unwrap();
        assert!(authorization_status(full.envelope(), &network, &[]).is_satisfied());
    }

    #[test]
    fn duplicate_signatures_count_once() {
        let network = NetworkConfig::testnet();
        let source = key(1);
        let collector = SignatureCollector::new(
            TransactionAssembler::new(&AccountState::new(source.address(), 1))
                .add_operation(
                    OperationBuilder::payment(key(2).address(), Asset::Native, "1").unwrap(),
                )
                .unwrap()
                .seal()
                .unwrap(),
            &network,
        )
        .sign(&source)
        .unwrap();

        // Forge a decoded envelope that carries the same signature twice.
        let mut env = collector.finish();
        let dup = env.signatures()[0].clone();
        env.signatures_mut().push(dup);

        let mut state = AccountState::new(source.address(), 0);
        state.thresholds = Thresholds {
            master_weight: 1,
            low: 2,
            medium: 2,
            high: 2,
        };
        let status = authorization_status(&env, &network, &[state]);
        assert_eq!(status.signers[0].weight, 1);
        assert!(!status.is_satisfied());
    }

    #[test]
    fn fee_bump_scopes_are_separate() {
        let network = NetworkConfig::testnet();
        let source = key(1);
        let payer = key(4);
        let inner = SignatureCollector::new(
            TransactionAssembler::new(&AccountState::new(source.address(), 1))
                .add_operation(
                    OperationBuilder::payment(key(2).address(), Asset::Native, "1").unwrap(),
                )
                .unwrap()
                .seal()
                .unwrap(),
            &network,
        )
        .sign(&source)
        .unwrap()
        .finish();
        let bump = FeeBumpTransaction::new(inner, payer.address(), 500)
            .unwrap()
            .into_envelope();

        let status = authorization_status(&bump, &network, &[]);
        let fee_bump: Vec<&SignerStatus> = status
            .signers
            .iter()
            .filter(|s| s.scope == SignatureScope::FeeBump)
            .collect();
        assert_eq!(fee_bump.len(), 1);
        assert!(!fee_bump[0].is_satisfied());
        assert!(status
            .signers
            .iter()
            .filter(|s| s.scope == SignatureScope::Transaction)
            .all(SignerStatus::is_satisfied));

        let signed = SignatureCollector::new(bump, &network).sign(&payer).unwrap();
        assert!(authorization_status(signed.envelope(), &network, &[]).is_satisfied());
    }

    #[test]
    fn select_prefers_heavy_signers() {
        let master = key(1);
        let heavy = key(2);
        let light = key(3);
        let mut account = AccountState::new(master.address(), 1);
        account.signers = vec![
            Signer {
                key: light.address(),
                weight: 1,
            },
            Signer {
                key: heavy.address(),
                weight: 5,
            },
        ];
        account.thresholds = Thresholds {
            master_weight: 1,
            low: 1,
            medium: 5,
            high: 6,
        };
        let keys = vec![master.clone(), heavy.clone(), light.clone()];

        let chosen = select_signers(&account, ThresholdClass::Medium, &keys).unwrap();
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].address(), heavy.address());

        let chosen = select_signers(&account, ThresholdClass::High, &keys).unwrap();
        assert_eq!(chosen.len(), 2);
    }

    #[test]
    fn select_reports_shortfall() {
        let master = key(1);
        let mut account = AccountState::new(master.address(), 1);
        account.thresholds.high = 3;
        let keys = vec![master.clone(), KeyPair::from_address(&key(7).address())];
        match select_signers(&account, ThresholdClass::High, &keys) {
            Err(SigningError::InsufficientSigners { have: 1, need: 3, .. }) => {}
            other => panic!("expected InsufficientSigners, got {:?}", other),
        }
    }
}
