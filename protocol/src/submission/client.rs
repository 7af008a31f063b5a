use async_trait::async_trait;

use crate::account::{AccountState, ClaimableBalanceEntry};
use crate::crypto::Address;
use crate::operation::ClaimableBalanceId;
use crate::transaction::TransactionEnvelope;

use super::error::ClientError;
use super::result::SubmissionResult;

/// Read and write access to a ledger network.
///
/// [`super::HorizonClient`] talks to a real query service; tests substitute
/// an in-memory implementation.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Current snapshot of an account. [`ClientError::NotFound`] if it does
    /// not exist.
    async fn get_account(&self, address: &Address) -> Result<AccountState, ClientError>;

    async fn get_claimable_balance(
        &self,
        id: &ClaimableBalanceId,
    ) -> Result<ClaimableBalanceEntry, ClientError>;

    /// Submits a signed envelope and waits for the network's verdict. A
    /// rejection is `Ok(SubmissionResult::Failure)`; `Err` means the verdict
    /// never arrived.
    async fn submit(&self, envelope: &TransactionEnvelope)
        -> Result<SubmissionResult, ClientError>;

    /// Creates and funds `address` on a test network.
    async fn fund(&self, address: &Address) -> Result<SubmissionResult, ClientError>;

    async fn account_exists(&self, address: &Address) -> Result<bool, ClientError> {
        match self.get_account(address).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
