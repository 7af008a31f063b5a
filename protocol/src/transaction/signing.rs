//! Signature collection.
//!
//! Signing is a separate step from assembly because the keys may not be
//! available where the transaction is built (another process, another
//! machine, another person). [`SignatureCollector`] takes an envelope and
//! the network it is destined for, computes the signing payload once, and
//! attaches signatures to it one at a time.
//!
//! Signing with the same key twice is a no-op. Whether enough weight has
//! been collected is a separate, advisory question answered by
//! [`super::authorization`]; the network is the final judge.

use thiserror::Error;
use tracing::debug;

use crate::config::{NetworkConfig, MAX_SIGNATURES};
use crate::crypto::{DecoratedSignature, KeyError, KeyPair, PublicKey};
use crate::operation::ThresholdClass;

use super::envelope::TransactionEnvelope;

/// Errors from signing and signer selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error(transparent)]
    Key(#[from] KeyError),

    /// An externally supplied signature does not verify against the
    /// claimed signer over this envelope's payload.
    #[error("signature does not verify for {signer}")]
    InvalidSignature { signer: String },

    /// Envelopes carry at most 20 signatures.
    #[error("envelope already carries the maximum of {max} signatures")]
    TooManySignatures { max: usize },

    /// The available keys cannot reach the account's threshold.
    #[error("insufficient signers for {account} ({class} threshold): have weight {have}, need {need}")]
    InsufficientSigners {
        account: String,
        class: ThresholdClass,
        have: u32,
        need: u32,
    },
}

/// Attaches signatures to one envelope for one network.
#[derive(Debug, Clone)]
pub struct SignatureCollector {
    envelope: TransactionEnvelope,
    payload: [u8; 32],
}

impl SignatureCollector {
    /// Computes the signing payload for `envelope` on `network`.
    pub fn new(envelope: TransactionEnvelope, network: &NetworkConfig) -> Self {
        let payload = envelope.signature_payload(&network.network_id());
        Self { envelope, payload }
    }

    /// The 32 bytes every signer signs. Also the transaction hash.
    pub fn payload(&self) -> &[u8; 32] {
        &self.payload
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.payload)
    }

    pub fn envelope(&self) -> &TransactionEnvelope {
        &self.envelope
    }

    pub fn signature_count(&self) -> usize {
        self.envelope.signatures().len()
    }

    /// `true` if `key` already has a valid signature on this envelope.
    pub fn has_signed(&self, key: &PublicKey) -> bool {
        self.envelope
            .signatures()
            .iter()
            .any(|sig| sig.is_valid_for(key, &self.payload))
    }

    /// Signs with `keypair`. Signing again with the same key changes
    /// nothing.
    pub fn sign(mut self, keypair: &KeyPair) -> Result<Self, SigningError> {
        if self.has_signed(keypair.public_key()) {
            debug!(signer = %keypair.address(), "already signed, skipping");
            return Ok(self);
        }
        self.ensure_capacity()?;
        let signature = keypair.sign_decorated(&self.payload)?;
        self.envelope.signatures_mut().push(signature);
        debug!(
            signer = %keypair.address(),
            signatures = self.signature_count(),
            "added signature"
        );
        Ok(self)
    }

    /// Signs with every key in turn.
    pub fn sign_all<'a>(
        self,
        keypairs: impl IntoIterator<Item = &'a KeyPair>,
    ) -> Result<Self, SigningError> {
        keypairs.into_iter().try_fold(self, Self::sign)
    }

    /// Attaches a signature produced elsewhere, after checking it verifies
    /// for `signer` over this envelope's payload.
    pub fn add_signature(
        mut self,
        signature: DecoratedSignature,
        signer: &PublicKey,
    ) -> Result<Self, SigningError> {
        if !signature.is_valid_for(signer, &self.payload) {
            return Err(SigningError::InvalidSignature {
                signer: signer.to_address().to_string(),
            });
        }
        if self.has_signed(signer) {
            return Ok(self);
        }
        self.ensure_capacity()?;
        self.envelope.signatures_mut().push(signature);
        Ok(self)
    }

    /// The signed envelope.
    pub fn finish(self) -> TransactionEnvelope {
        self.envelope
    }

    fn ensure_capacity(&self) -> Result<(), SigningError> {
        if self.signature_count() >= MAX_SIGNATURES {
            return Err(SigningError::TooManySignatures {
                max: MAX_SIGNATURES,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountState;
    use crate::asset::Asset;
    use crate::operation::OperationBuilder;
    use crate::transaction::TransactionAssembler;

    fn envelope(source: &KeyPair) -> TransactionEnvelope {
        let dest = KeyPair::from_seed_bytes(&[9u8; 32]);
        TransactionAssembler::new(&AccountState::new(source.address(), 5))
            .add_operation(OperationBuilder::payment(dest.address(), Asset::Native, "10").unwrap())
            .unwrap()
            .unbounded()
            .seal()
            .unwrap()
    }

    #[test]
    fn sign_attaches_verifiable_signature() {
        let kp = KeyPair::generate();
        let network = NetworkConfig::testnet();
        let collector = SignatureCollector::new(envelope(&kp), &network).sign(&kp).unwrap();

        assert_eq!(collector.signature_count(), 1);
        let sig = &collector.envelope().signatures()[0];
        assert_eq!(sig.hint, kp.hint());
        assert!(kp.verify(collector.payload(), &sig.signature));
    }

    #[test]
    fn signing_twice_is_idempotent() {
        let kp = KeyPair::generate();
        let collector = SignatureCollector::new(envelope(&kp), &NetworkConfig::testnet())
            .sign(&kp)
            .unwrap()
            .sign(&kp)
            .unwrap();
        assert_eq!(collector.signature_count(), 1);
    }

    #[test]
    fn public_only_key_cannot_sign() {
        let kp = KeyPair::generate();
        let public_only = KeyPair::from_address(&kp.address());
        match SignatureCollector::new(envelope(&kp), &NetworkConfig::testnet()).sign(&public_only)
        {
            Err(SigningError::Key(KeyError::PublicOnly { .. })) => {}
            other => panic!("expected PublicOnly, got {:?}", other.map(|c| c.signature_count())),
        }
    }

    #[test]
    fn payload_depends_on_network() {
        let kp = KeyPair::generate();
        let env = envelope(&kp);
        let test = SignatureCollector::new(env.clone(), &NetworkConfig::testnet());
        let public = SignatureCollector::new(env, &NetworkConfig::public());
        assert_ne!(test.payload(), public.payload());
    }

    #[test]
    fn external_signature_is_verified() {
        let kp = KeyPair::generate();
        let other = KeyPair::generate();
        let network = NetworkConfig::testnet();
        let collector = SignatureCollector::new(envelope(&kp), &network);

        let good = kp.sign_decorated(collector.payload()).unwrap();
        let bad = other.sign_decorated(collector.payload()).unwrap();

        assert!(matches!(
            collector.clone().add_signature(bad, kp.public_key()),
            Err(SigningError::InvalidSignature { .. })
        ));
        let collector = collector.add_signature(good, kp.public_key()).unwrap();
        assert!(collector.has_signed(kp.public_key()));
    }

    #[test]
    fn signature_limit_is_enforced() {
        let source = KeyPair::generate();
        let keys: Vec<KeyPair> = (0..21).map(|_| KeyPair::generate()).collect();
        let result = SignatureCollector::new(envelope(&source), &NetworkConfig::testnet())
            .sign_all(&keys);
        assert!(matches!(
            result,
            Err(SigningError::TooManySignatures { max: 20 })
        ));
    }
}
