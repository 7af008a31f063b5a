//! # Protocol Configuration & Constants
//!
//! Every magic number in Ledgerline lives here, next to the one piece of
//! runtime configuration the library needs: which network it is talking to.
//!
//! There is no global "current network". A [`NetworkConfig`] is constructed
//! once and handed to the submission client and the signature collector.
//! Signing a testnet transaction with the public network passphrase produces
//! a perfectly valid signature over the wrong payload, so the choice has to
//! be visible at every call site.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Fee Parameters
// ---------------------------------------------------------------------------

/// Minimum fee per operation, in stroops.
pub const BASE_FEE: u32 = 100;

/// Stroops per whole unit of any asset. Amounts carry 7 decimal places.
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Number of fractional digits an amount or price string may carry.
pub const AMOUNT_DECIMALS: usize = 7;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Maximum operations per transaction.
pub const MAX_OPERATIONS: usize = 100;

/// Maximum signatures attached to a single envelope.
pub const MAX_SIGNATURES: usize = 20;

/// Default validity window when the caller never sets a timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3_600);

/// Maximum text memo length in bytes.
pub const MAX_MEMO_TEXT_LENGTH: usize = 28;

// ---------------------------------------------------------------------------
// Operation Limits
// ---------------------------------------------------------------------------

/// Asset codes: 1-4 characters for alphanum4, 5-12 for alphanum12.
pub const MAX_ASSET_CODE_LENGTH: usize = 12;

/// Data entry names and values.
pub const MAX_DATA_NAME_LENGTH: usize = 64;
pub const MAX_DATA_VALUE_LENGTH: usize = 64;

/// Account home domain.
pub const MAX_HOME_DOMAIN_LENGTH: usize = 32;

/// Intermediate hops in a path payment.
pub const MAX_PATH_LENGTH: usize = 5;

/// Claimants on one claimable balance.
pub const MAX_CLAIMANTS: usize = 10;

/// Levels of a claim predicate, counting the root. The ledger rejects
/// anything deeper.
pub const MAX_PREDICATE_DEPTH: usize = 4;

/// Constant-product pool fee, in basis points. The only fee the network
/// currently accepts.
pub const LIQUIDITY_POOL_FEE_BPS: i32 = 30;

// ---------------------------------------------------------------------------
// Network Passphrases
// ---------------------------------------------------------------------------

pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const PUBLIC_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

const TESTNET_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";
const PUBLIC_HORIZON_URL: &str = "https://horizon.stellar.org";
const TESTNET_FRIENDBOT_URL: &str = "https://friendbot.stellar.org";
const TESTNET_EXPLORER_URL: &str = "https://stellar.expert/explorer/testnet";
const PUBLIC_EXPLORER_URL: &str = "https://stellar.expert/explorer/public";

/// Per-request timeout for the HTTP client.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// NetworkConfig
// ---------------------------------------------------------------------------

/// Errors loading a network configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown network {0:?} (expected testnet or public)")]
    UnknownNetwork(String),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// The network a client talks to and signs for.
///
/// The passphrase salts every signing payload. The URLs locate the ledger
/// API service, the test-network funding service (if any) and a block
/// explorer for human-facing links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub passphrase: String,
    pub horizon_url: String,
    #[serde(default)]
    pub friendbot_url: Option<String>,
    #[serde(default)]
    pub explorer_url: Option<String>,
}

impl NetworkConfig {
    /// The public test network.
    pub fn testnet() -> Self {
        Self {
            name: "testnet".to_string(),
            passphrase: TESTNET_PASSPHRASE.to_string(),
            horizon_url: TESTNET_HORIZON_URL.to_string(),
            friendbot_url: Some(TESTNET_FRIENDBOT_URL.to_string()),
            explorer_url: Some(TESTNET_EXPLORER_URL.to_string()),
        }
    }

    /// The production network. No friendbot here; money is real.
    pub fn public() -> Self {
        Self {
            name: "public".to_string(),
            passphrase: PUBLIC_PASSPHRASE.to_string(),
            horizon_url: PUBLIC_HORIZON_URL.to_string(),
            friendbot_url: None,
            explorer_url: Some(PUBLIC_EXPLORER_URL.to_string()),
        }
    }

    /// Looks up a preset by name (`testnet`/`test` or `public`/`mainnet`).
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "testnet" | "test" => Ok(Self::testnet()),
            "public" | "mainnet" | "pubnet" => Ok(Self::public()),
            _ => Err(ConfigError::UnknownNetwork(name.to_string())),
        }
    }

    /// Parses a TOML document with the same field names as this struct.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Loads a custom network (e.g. a private standalone ledger) from disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Replaces the ledger API base URL, keeping everything else.
    pub fn with_horizon_url(mut self, url: impl Into<String>) -> Self {
        self.horizon_url = url.into();
        self
    }

    /// The 32-byte network identifier that salts signing payloads.
    pub fn network_id(&self) -> [u8; 32] {
        crate::crypto::hash::network_id(&self.passphrase)
    }

    /// Human-facing explorer link for a transaction, if an explorer is known.
    pub fn explorer_tx_url(&self, hash: &str) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), hash))
    }

    /// Human-facing explorer link for an order-book offer.
    pub fn explorer_offer_url(&self, offer_id: i64) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/offer/{}", base.trim_end_matches('/'), offer_id))
    }
}
