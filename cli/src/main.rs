// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledgerline CLI
//!
//! Entry point for the `ledgerline` binary. Parses arguments, initializes
//! logging, and runs one subcommand against the chosen network.
//!
//! - `keygen`         — generate a keypair
//! - `fund`           — fund an account through the test network's friendbot
//! - `account`        — print an account snapshot
//! - `pay`            — build, sign and submit a payment
//! - `export-payment` — build an unsigned payment for external signing
//! - `sign`           — add a signature to a base64 envelope
//! - `submit`         — submit a base64 envelope
//! - `fee-bump`       — wrap a signed envelope in a fee bump
//! - `decode`         — print an envelope as JSON
//! - `version`        — print build version information

mod cli;
mod logging;

use std::io::Read;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde_json::json;

use ledgerline_protocol::account::AccountState;
use ledgerline_protocol::codec::{export_for_external_signing, import_signed_envelope};
use ledgerline_protocol::config::NetworkConfig;
use ledgerline_protocol::crypto::KeyPair;
use ledgerline_protocol::operation::OperationBuilder;
use ledgerline_protocol::submission::{HorizonClient, LedgerApi, SubmissionResult};
use ledgerline_protocol::transaction::{
    required_signers, FeeBumpTransaction, Memo, SignatureCollector, TransactionAssembler,
    TransactionEnvelope,
};

use cli::{Commands, LedgerlineCli, PaymentArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = LedgerlineCli::parse();
    logging::init_logging("ledgerline=info,ledgerline_protocol=warn", cli.log_format.into());

    match cli.command {
        Commands::Keygen => keygen(),
        Commands::Version => {
            print_version();
            Ok(())
        }
        command => {
            let network = cli.network.resolve()?;
            tracing::debug!(network = %network.name, horizon = %network.horizon_url, "network resolved");
            run(command, network).await
        }
    }
}

/// Subcommands that need a network.
async fn run(command: Commands, network: NetworkConfig) -> Result<()> {
    match command {
        Commands::Fund(args) => {
            let client = HorizonClient::new(network.clone())?;
            let result = client
                .fund(&args.address)
                .await
                .with_context(|| format!("failed to fund {}", args.address))?;
            report(result, &network)
        }
        Commands::Account(args) => {
            let client = HorizonClient::new(network)?;
            let account = client
                .get_account(&args.address)
                .await
                .with_context(|| format!("failed to load account {}", args.address))?;
            println!("{}", serde_json::to_string_pretty(&account)?);
            Ok(())
        }
        Commands::Pay(args) => pay(args, network).await,
        Commands::ExportPayment(args) => {
            let client = HorizonClient::new(network)?;
            let account = client
                .get_account(&args.from)
                .await
                .with_context(|| format!("failed to load account {}", args.from))?;
            let envelope = payment_envelope(&account, &args.payment)?;
            println!("{}", export_for_external_signing(&envelope));
            Ok(())
        }
        Commands::Sign(args) => {
            let keypair = keypair_from_secret(&args.secret)?;
            let envelope = read_envelope(args.input.envelope)?;
            let signed = SignatureCollector::new(envelope, &network)
                .sign(&keypair)?
                .finish();
            tracing::info!(signer = %keypair.address(), signatures = signed.signatures().len(), "envelope signed");
            println!("{}", export_for_external_signing(&signed));
            Ok(())
        }
        Commands::Submit(args) => {
            let envelope = read_envelope(args.envelope)?;
            let client = HorizonClient::new(network.clone())?;
            let result = client.submit(&envelope).await.context("submission failed")?;
            report(result, &network)
        }
        Commands::FeeBump(args) => {
            let keypair = keypair_from_secret(&args.secret)?;
            let inner = read_envelope(args.input.envelope)?;
            let bump = FeeBumpTransaction::new(inner, keypair.address(), args.fee)?.into_envelope();
            let signed = SignatureCollector::new(bump, &network)
                .sign(&keypair)?
                .finish();
            if args.submit {
                let client = HorizonClient::new(network.clone())?;
                let result = client.submit(&signed).await.context("submission failed")?;
                report(result, &network)
            } else {
                println!("{}", export_for_external_signing(&signed));
                Ok(())
            }
        }
        Commands::Decode(args) => {
            let envelope = read_envelope(args.envelope)?;
            let output = json!({
                "hash": envelope.hash_hex(&network.network_id()),
                "fee_bump": envelope.is_fee_bump(),
                "max_fee": envelope.max_fee(),
                "required_signers": required_signers(&envelope),
                "envelope": envelope,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Commands::Keygen => keygen(),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn keygen() -> Result<()> {
    let keypair = KeyPair::generate();
    let secret = keypair
        .secret_seed()
        .ok_or_else(|| anyhow!("generated keypair has no secret"))?;
    println!("address: {}", keypair.address());
    println!("secret:  {}", secret);
    Ok(())
}

async fn pay(args: cli::PayArgs, network: NetworkConfig) -> Result<()> {
    let keypair = keypair_from_secret(&args.secret)?;
    let client = HorizonClient::new(network.clone())?;
    let account = client
        .get_account(&keypair.address())
        .await
        .with_context(|| format!("failed to load account {}", keypair.address()))?;

    let envelope = payment_envelope(&account, &args.payment)?;
    let collector = SignatureCollector::new(envelope, &network).sign(&keypair)?;
    tracing::info!(
        hash = %collector.hash_hex(),
        to = %args.payment.to,
        amount = %args.payment.amount,
        asset = %args.payment.asset,
        "submitting payment"
    );

    let result = client
        .submit(collector.envelope())
        .await
        .context("submission failed")?;
    report(result, &network)
}

fn payment_envelope(account: &AccountState, payment: &PaymentArgs) -> Result<TransactionEnvelope> {
    let op = OperationBuilder::payment(payment.to, payment.asset.clone(), &payment.amount)?;
    let mut assembler = TransactionAssembler::new(account).add_operation(op)?;
    if let Some(text) = &payment.memo {
        assembler = assembler.memo(Memo::text(text.as_str())?);
    }
    if let Some(secs) = payment.timeout {
        assembler = assembler.set_timeout(secs);
    }
    Ok(assembler.seal()?)
}

fn keypair_from_secret(secret: &str) -> Result<KeyPair> {
    KeyPair::from_secret(secret.trim()).context("invalid secret seed")
}

/// Reads a base64 envelope from the argument, or from stdin when the
/// argument is absent or `-`.
fn read_envelope(arg: Option<String>) -> Result<TransactionEnvelope> {
    let text = match arg.as_deref() {
        Some(text) if text != "-" => text.to_string(),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read envelope from stdin")?;
            buf
        }
    };
    import_signed_envelope(text.trim()).context("invalid envelope")
}

/// Prints a successful submission, or turns a rejection into an error whose
/// message lists every failure reason.
fn report(result: SubmissionResult, network: &NetworkConfig) -> Result<()> {
    match result {
        SubmissionResult::Success(success) => {
            println!("hash:   {}", success.hash);
            println!("ledger: {}", success.ledger);
            println!("fee:    {} stroops", success.fee_charged);
            if let Some(url) = network.explorer_tx_url(&success.hash) {
                println!("view:   {}", url);
            }
            for (index, op) in success.operation_results.iter().enumerate() {
                let Some(offer) = op.offer() else { continue };
                match offer.resting() {
                    Some(entry) => {
                        println!("offer {}: resting as #{}", index, entry.offer_id);
                        if let Some(url) = network.explorer_offer_url(entry.offer_id) {
                            println!("         {}", url);
                        }
                    }
                    None => println!("offer {}: fully filled", index),
                }
            }
            Ok(())
        }
        SubmissionResult::Failure(failure) => {
            let mut message = failure.title.clone();
            for line in failure.messages() {
                message.push_str("\n  - ");
                message.push_str(&line);
            }
            bail!(message)
        }
    }
}

fn print_version() {
    println!("ledgerline {}", env!("CARGO_PKG_VERSION"));
    println!("protocol   {}", ledgerline_protocol::VERSION);
}
