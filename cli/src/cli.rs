//! # CLI Interface
//!
//! Defines the command-line argument structure for `ledgerline` using
//! `clap` derive. Every flag that carries a network choice or a secret also
//! reads from the environment, so secrets need not appear in shell history.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use ledgerline_protocol::asset::Asset;
use ledgerline_protocol::config::NetworkConfig;
use ledgerline_protocol::crypto::Address;

/// Build, sign and submit ledger transactions.
#[derive(Parser, Debug)]
#[command(
    name = "ledgerline",
    about = "Build, sign and submit ledger transactions",
    version,
    propagate_version = true
)]
pub struct LedgerlineCli {
    #[command(flatten)]
    pub network: NetworkArgs,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

/// Which network to talk to and sign for.
#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    /// Network preset: `testnet` or `public`.
    #[arg(long, global = true, env = "LEDGERLINE_NETWORK", default_value = "testnet")]
    pub network: String,

    /// TOML file describing a custom network. Takes precedence over
    /// `--network`.
    #[arg(long, global = true, env = "LEDGERLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overrides the query service URL of the chosen network.
    #[arg(long, global = true, env = "LEDGERLINE_HORIZON_URL")]
    pub horizon_url: Option<String>,
}

impl NetworkArgs {
    pub fn resolve(&self) -> Result<NetworkConfig> {
        let network = match &self.config {
            Some(path) => NetworkConfig::from_toml_file(path)
                .with_context(|| format!("failed to load network config {}", path.display()))?,
            None => NetworkConfig::from_name(&self.network)?,
        };
        Ok(match &self.horizon_url {
            Some(url) => network.with_horizon_url(url.clone()),
            None => network,
        })
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new keypair and print its address and secret.
    Keygen,
    /// Create and fund an account on a test network.
    Fund(FundArgs),
    /// Print an account's current state as JSON.
    Account(AccountArgs),
    /// Build, sign and submit a payment.
    Pay(PayArgs),
    /// Build an unsigned payment and print it as base64 for signing
    /// elsewhere.
    ExportPayment(ExportPaymentArgs),
    /// Add a signature to a base64 envelope.
    Sign(SignArgs),
    /// Submit a signed base64 envelope.
    Submit(EnvelopeArgs),
    /// Wrap a signed envelope in a fee bump paid by another account.
    FeeBump(FeeBumpArgs),
    /// Print a base64 envelope as JSON, with its hash and required signers.
    Decode(EnvelopeArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Args, Debug)]
pub struct FundArgs {
    pub address: Address,
}

#[derive(Args, Debug)]
pub struct AccountArgs {
    pub address: Address,
}

/// Payment details shared by `pay` and `export-payment`.
#[derive(Args, Debug)]
pub struct PaymentArgs {
    /// Destination account.
    #[arg(long)]
    pub to: Address,

    /// Decimal amount, at most 7 fractional digits.
    #[arg(long)]
    pub amount: String,

    /// `native` or `CODE:ISSUER`.
    #[arg(long, default_value = "native")]
    pub asset: Asset,

    /// Text memo, at most 28 bytes.
    #[arg(long)]
    pub memo: Option<String>,

    /// Seconds the transaction stays valid. Defaults to one hour.
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct PayArgs {
    /// Secret seed of the paying account.
    #[arg(long, env = "LEDGERLINE_SECRET", hide_env_values = true)]
    pub secret: String,

    #[command(flatten)]
    pub payment: PaymentArgs,
}

#[derive(Args, Debug)]
pub struct ExportPaymentArgs {
    /// Paying account. Its secret is not needed.
    #[arg(long)]
    pub from: Address,

    #[command(flatten)]
    pub payment: PaymentArgs,
}

#[derive(Args, Debug)]
pub struct EnvelopeArgs {
    /// Base64 envelope. Read from stdin when omitted or `-`.
    pub envelope: Option<String>,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Secret seed to sign with.
    #[arg(long, env = "LEDGERLINE_SECRET", hide_env_values = true)]
    pub secret: String,

    #[command(flatten)]
    pub input: EnvelopeArgs,
}

#[derive(Args, Debug)]
pub struct FeeBumpArgs {
    /// Secret seed of the account paying the fee.
    #[arg(long, env = "LEDGERLINE_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Total fee in stroops for the wrapper and the inner transaction.
    #[arg(long)]
    pub fee: i64,

    /// Submit the fee bump instead of printing it.
    #[arg(long)]
    pub submit: bool,

    #[command(flatten)]
    pub input: EnvelopeArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        LedgerlineCli::command().debug_assert();
    }

    #[test]
    fn parses_payment() {
        use ledgerline_protocol::crypto::KeyPair;

        let payer = KeyPair::generate();
        let dest = KeyPair::generate().address().to_string();
        let secret = payer.secret_seed().unwrap();
        let cli = LedgerlineCli::try_parse_from([
            "ledgerline",
            "--network",
            "public",
            "pay",
            "--secret",
            secret.as_str(),
            "--to",
            dest.as_str(),
            "--amount",
            "10.5",
            "--timeout",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.network.network, "public");
        match cli.command {
            Commands::Pay(args) => {
                assert_eq!(args.payment.to.to_string(), dest);
                assert_eq!(args.payment.amount, "10.5");
                assert_eq!(args.payment.timeout, Some(30));
                assert!(args.payment.asset.is_native());
            }
            other => panic!("expected pay, got {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_address() {
        let result = LedgerlineCli::try_parse_from(["ledgerline", "account", "not-an-address"]);
        assert!(result.is_err());
    }

    #[test]
    fn network_resolution() {
        let args = NetworkArgs {
            network: "testnet".into(),
            config: None,
            horizon_url: Some("http://localhost:8000".into()),
        };
        let network = args.resolve().unwrap();
        assert_eq!(network.horizon_url, "http://localhost:8000");
        assert_eq!(network.passphrase, NetworkConfig::testnet().passphrase);

        let unknown = NetworkArgs {
            network: "moonnet".into(),
            config: None,
            horizon_url: None,
        };
        assert!(unknown.resolve().is_err());
    }

    #[test]
    fn network_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.toml");
        std::fs::write(
            &path,
            "name = \"local\"\npassphrase = \"Standalone Network\"\nhorizon_url = \"http://127.0.0.1:8000\"\n",
        )
        .unwrap();
        let args = NetworkArgs {
            network: "testnet".into(),
            config: Some(path),
            horizon_url: None,
        };
        let network = args.resolve().unwrap();
        assert_eq!(network.name, "local");
        assert!(network.friendbot_url.is_none());
    }
}
