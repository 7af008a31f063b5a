//! [`LedgerApi`] over the ledger's HTTP query service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::account::{AccountState, ClaimableBalanceEntry, HorizonAccount, HorizonClaimableBalance};
use crate::codec::{Decode, Encode, TransactionResult};
use crate::config::{NetworkConfig, DEFAULT_HTTP_TIMEOUT};
use crate::crypto::Address;
use crate::operation::ClaimableBalanceId;
use crate::transaction::TransactionEnvelope;

use super::client::LedgerApi;
use super::error::ClientError;
use super::result::{SubmissionFailure, SubmissionResult, SubmissionSuccess};

/// Body of an accepted transaction.
#[derive(Debug, Deserialize)]
struct TransactionRecord {
    hash: String,
    ledger: u32,
    #[serde(default)]
    result_xdr: Option<String>,
}

/// RFC 7807 problem body returned for rejected requests.
#[derive(Debug, Default, Deserialize)]
struct Problem {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    extras: Option<ProblemExtras>,
}

#[derive(Debug, Default, Deserialize)]
struct ProblemExtras {
    #[serde(default)]
    result_codes: Option<ResultCodes>,
    #[serde(default)]
    result_xdr: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultCodes {
    #[serde(default)]
    transaction: String,
    #[serde(default)]
    operations: Vec<String>,
}

impl Problem {
    fn into_failure(self) -> SubmissionFailure {
        let extras = self.extras.unwrap_or_default();
        let codes = extras.result_codes.unwrap_or_default();
        // Problems without result codes (friendbot, bad requests) fall back
        // to the last segment of the problem type.
        let transaction_code = if codes.transaction.is_empty() {
            self.kind
                .rsplit('/')
                .next()
                .filter(|s| !s.is_empty())
                .unwrap_or("unknown")
                .to_string()
        } else {
            codes.transaction
        };
        SubmissionFailure {
            title: self.title,
            detail: self.detail,
            transaction_code,
            operation_codes: codes.operations,
            result_xdr: extras.result_xdr,
        }
    }
}

/// HTTP client for one network's query service.
#[derive(Debug, Clone)]
pub struct HorizonClient {
    http: Client,
    network: NetworkConfig,
    base_url: String,
}

impl HorizonClient {
    pub fn new(network: NetworkConfig) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(DEFAULT_HTTP_TIMEOUT).build()?;
        Ok(Self::with_http_client(http, network))
    }

    /// Reuses an existing `reqwest` client (connection pool, proxies).
    pub fn with_http_client(http: Client, network: NetworkConfig) -> Self {
        let base_url = network.horizon_url.trim_end_matches('/').to_string();
        Self {
            http,
            network,
            base_url,
        }
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: String,
    ) -> Result<T, ClientError> {
        debug!(url, "GET");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound { resource }),
            s if s.is_success() => {
                serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
            }
            s => Err(ClientError::UnexpectedStatus {
                status: s.as_u16(),
                body,
            }),
        }
    }

    /// Interprets the response to a submission or a friendbot request.
    async fn read_verdict(&self, response: reqwest::Response) -> Result<SubmissionResult, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let record: TransactionRecord =
                serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
            // Accepted stays accepted: an unreadable result is only logged.
            let result = match record.result_xdr.as_deref().map(TransactionResult::from_base64) {
                Some(Ok(result)) => Some(result),
                Some(Err(e)) => {
                    warn!(hash = %record.hash, error = %e, "accepted transaction has an undecodable result");
                    None
                }
                None => None,
            };
            let (fee_charged, operation_results) =
                result.map_or((0, Vec::new()), |r| (r.fee_charged, r.operations));
            info!(hash = %record.hash, ledger = record.ledger, fee_charged, "transaction accepted");
            return Ok(SubmissionResult::Success(SubmissionSuccess {
                hash: record.hash,
                ledger: record.ledger,
                fee_charged,
                operation_results,
                result_xdr: record.result_xdr,
            }));
        }

        match serde_json::from_str::<Problem>(&body) {
            Ok(problem) if status.is_client_error() && !problem.title.is_empty() => {
                let failure = problem.into_failure();
                warn!(
                    status = status.as_u16(),
                    title = %failure.title,
                    transaction = %failure.transaction_code,
                    operations = ?failure.operation_codes,
                    "transaction rejected"
                );
                Ok(SubmissionResult::Failure(failure))
            }
            _ => Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

#[async_trait]
impl LedgerApi for HorizonClient {
    async fn get_account(&self, address: &Address) -> Result<AccountState, ClientError> {
        let url = format!("{}/accounts/{}", self.base_url, address);
        let record: HorizonAccount = self.get_json(&url, format!("account {}", address)).await?;
        Ok(AccountState::try_from(record)?)
    }

    async fn get_claimable_balance(
        &self,
        id: &ClaimableBalanceId,
    ) -> Result<ClaimableBalanceEntry, ClientError> {
        let url = format!("{}/claimable_balances/{}", self.base_url, id);
        let record: HorizonClaimableBalance = self
            .get_json(&url, format!("claimable balance {}", id))
            .await?;
        Ok(ClaimableBalanceEntry::try_from(record)?)
    }

    async fn submit(&self, envelope: &TransactionEnvelope) -> Result<SubmissionResult, ClientError> {
        let hash = envelope.hash_hex(&self.network.network_id());
        info!(
            hash = %hash,
            network = %self.network.name,
            fee_bump = envelope.is_fee_bump(),
            signatures = envelope.signatures().len(),
            "submitting transaction"
        );
        let response = self
            .http
            .post(format!("{}/transactions", self.base_url))
            .form(&[("tx", envelope.to_base64())])
            .send()
            .await?;
        self.read_verdict(response).await
    }

    async fn fund(&self, address: &Address) -> Result<SubmissionResult, ClientError> {
        let friendbot = self
            .network
            .friendbot_url
            .as_deref()
            .ok_or_else(|| ClientError::NoFriendbot(self.network.name.clone()))?;
        info!(account = %address, network = %self.network.name, "requesting friendbot funding");
        let response = self
            .http
            .get(friendbot)
            .query(&[("addr", address.to_string())])
            .send()
            .await?;
        self.read_verdict(response).await
    }
}
