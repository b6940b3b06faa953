// Copyright (c) 2026 Levy Ledger Contributors. MIT License.
// See LICENSE for details.

//! # Levy Node
//!
//! Entry point for the `levy-node` binary. Parses CLI arguments, initializes
//! logging, and runs one command against a deployment snapshot.
//!
//! - `keygen` : generate a signing key
//! - `init`   : deploy a ledger and write its snapshot
//! - `status` : print deployment metadata and supply
//! - `balance`: print one account
//! - `call`   : apply a JSON call as the key holder
//! - `sign`   : sign a call as a forward request
//! - `relay`  : execute a signed forward request
//! - `upgrade`: activate a newer behavior version
//! - `version`: print build version information

mod cli;
mod logging;
mod store;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::fs;

use levy_contracts::{BehaviorVersion, Deployment, LedgerCall, LedgerEvent, SignedForwardRequest};
use levy_protocol::config::LATEST_BEHAVIOR_VERSION;
use levy_protocol::crypto::LevyKeypair;
use levy_protocol::Address;

use cli::{Commands, LevyNodeCli};

fn main() -> Result<()> {
    let cli = LevyNodeCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Keygen(args) => keygen(args),
        Commands::Init(args) => init(args),
        Commands::Status(args) => status(args),
        Commands::Balance(args) => balance(args),
        Commands::Call(args) => call(args),
        Commands::Sign(args) => sign(args),
        Commands::Relay(args) => relay(args),
        Commands::Upgrade(args) => upgrade(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn keygen(args: cli::KeygenArgs) -> Result<()> {
    let keypair = LevyKeypair::generate();
    let address = Address::from(keypair.public_key());

    match args.out {
        Some(path) => {
            fs::write(&path, keypair.secret_key_hex())
                .with_context(|| format!("failed to write key to {}", path.display()))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
            }
            tracing::info!(address = %address, key_path = %path.display(), "keypair generated");
            println!("address : {}", address);
            println!("secret  : {}", path.display());
        }
        None => {
            println!("address : {}", address);
            println!("secret  : {}", keypair.secret_key_hex());
        }
    }
    Ok(())
}

fn init(args: cli::InitArgs) -> Result<()> {
    let mut config = store::load_config(args.config.as_deref())?;
    if let Some(admin) = args.admin {
        config.admin = admin;
    }
    if config.admin == Address::ZERO {
        bail!("no administrator configured (pass --admin or set it in the config file)");
    }

    let deployment = Deployment::new(config).context("deployment failed")?;
    store::create(&args.state.state, &deployment, args.force)?;

    println!("Ledger deployed.");
    println!("  Snapshot  : {}", args.state.state.display());
    println!("  Token     : {}", deployment.token().address());
    println!("  Forwarder : {}", deployment.forwarder().address());
    println!("  Admin     : {}", deployment.token().admin());
    Ok(())
}

fn status(args: cli::StateArgs) -> Result<()> {
    let d = store::load(&args.state)?;
    let t = d.token();
    let version = t
        .version()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "none".to_string());
    let supply = t
        .total_supply()
        .context("snapshot has burned more than it minted")?;
    let fee_recipient = t
        .fee_recipient()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "-".to_string());

    println!("name          : {}", t.name());
    println!("symbol        : {}", t.symbol());
    println!("decimals      : {}", t.decimals());
    println!("version       : {}", version);
    println!("token         : {}", t.address());
    println!("forwarder     : {}", d.forwarder().address());
    println!("admin         : {}", t.admin());
    println!("fee recipient : {}", fee_recipient);
    println!("paused        : {}", t.is_paused());
    println!("total supply  : {}", supply);
    println!("total minted  : {}", t.total_minted());
    println!("total burned  : {}", t.total_burned());
    Ok(())
}

fn balance(args: cli::BalanceArgs) -> Result<()> {
    let d = store::load(&args.state.state)?;
    let t = d.token();
    let account = args.account;

    println!("account          : {}", account);
    println!("balance          : {} {}", t.balance_of(&account), t.symbol());
    println!("denied           : {}", t.is_denied(&account));
    println!("forwarder nonce  : {}", d.forwarder().nonce_of(&account));
    if t.is_minter(&account) {
        println!("minter allowance : {}", t.minter_allowance(&account));
    }
    Ok(())
}

fn parse_call(json: &str) -> Result<LedgerCall> {
    serde_json::from_str(json).context("failed to parse ledger call JSON")
}

fn print_events(events: &[LedgerEvent]) -> Result<()> {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

fn call(args: cli::CallArgs) -> Result<()> {
    let caller = Address::from(args.key.keypair()?.public_key());
    let mut d = store::load(&args.state.state)?;
    let ledger_call = parse_call(&args.call)?;
    let name = ledger_call.name();

    if let Err(e) = d.token_mut().call(caller, ledger_call) {
        let kind = e.kind();
        return Err(anyhow::Error::new(e).context(format!("{} rejected ({})", name, kind)));
    }
    store::save(&args.state.state, &d)?;
    print_events(&d.token_mut().drain_events())
}

fn sign(args: cli::SignArgs) -> Result<()> {
    let d = store::load(&args.state.state)?;
    let keypair = args.key.keypair()?;
    let ledger_call = parse_call(&args.call)?;

    let signed = d.sign_call(&keypair, &ledger_call)?;
    let json = serde_json::to_string_pretty(&signed)?;
    match args.out {
        Some(path) => fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    tracing::info!(
        signer = %signed.request.from,
        nonce = signed.request.nonce,
        "forward request signed"
    );
    Ok(())
}

fn relay(args: cli::RelayArgs) -> Result<()> {
    let mut d = store::load(&args.state.state)?;
    let raw = fs::read_to_string(&args.request)
        .with_context(|| format!("failed to read {}", args.request.display()))?;
    let signed: SignedForwardRequest =
        serde_json::from_str(&raw).context("failed to parse signed request")?;

    let execution = d.relay(&signed).context("forwarder rejected the request")?;
    // The nonce is spent even when the call itself fails.
    store::save(&args.state.state, &d)?;
    print_events(&d.token_mut().drain_events())?;

    execution
        .outcome
        .map(|_| ())
        .with_context(|| format!("relayed call failed (nonce {} consumed)", execution.nonce))
}

fn upgrade(args: cli::UpgradeArgs) -> Result<()> {
    let version = BehaviorVersion::from_number(args.version).ok_or_else(|| {
        anyhow!(
            "unknown behavior version {} (latest is {})",
            args.version,
            LATEST_BEHAVIOR_VERSION
        )
    })?;
    let caller = Address::from(args.key.keypair()?.public_key());
    let mut d = store::load(&args.state.state)?;
    d.upgrade_to(caller, version)
        .with_context(|| format!("upgrade to {} rejected", version))?;
    store::save(&args.state.state, &d)?;
    print_events(&d.token_mut().drain_events())
}

fn print_version() {
    println!("levy-node {}", env!("CARGO_PKG_VERSION"));
    println!("behavior  v{}", LATEST_BEHAVIOR_VERSION);
}
