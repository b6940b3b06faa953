//! # CLI Interface
//!
//! Command-line structure for `levy-node`. Every command that touches a
//! ledger reads the deployment snapshot named by `--state` and, if the
//! command changes anything, writes it back.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use levy_protocol::crypto::LevyKeypair;
use levy_protocol::Address;

use crate::logging::LogFormat;

/// Operator tool for a Levy ledger deployment.
///
/// Keeps a forwarder and the taxed token that trusts it in a JSON snapshot,
/// applies calls as a given account, and signs or relays forward requests.
#[derive(Parser, Debug)]
#[command(
    name = "levy-node",
    about = "Levy ledger operator CLI",
    version,
    propagate_version = true
)]
pub struct LevyNodeCli {
    /// Log output format.
    #[arg(long, global = true, env = "LEVY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, env = "LEVY_LOG_LEVEL", default_value = "levy_node=info,levy_contracts=info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an Ed25519 keypair and print its account address.
    Keygen(KeygenArgs),
    /// Deploy a fresh ledger and write its snapshot.
    Init(InitArgs),
    /// Print metadata, supply and version of a deployment.
    Status(StateArgs),
    /// Print an account's balance, quota and deny-list status.
    Balance(BalanceArgs),
    /// Apply a JSON ledger call as the holder of `--key`.
    Call(CallArgs),
    /// Sign a ledger call as a forward request.
    Sign(SignArgs),
    /// Execute a signed forward request through the forwarder.
    Relay(RelayArgs),
    /// Activate a newer behavior version.
    Upgrade(UpgradeArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Args, Debug)]
pub struct StateArgs {
    /// Path of the deployment snapshot.
    #[arg(long, short = 's', env = "LEVY_STATE", default_value = "levy-state.json")]
    pub state: PathBuf,
}

/// The account a command acts as, proven by its secret key.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Hex-encoded 32-byte secret of the acting account.
    #[arg(long, env = "LEVY_SIGNER_KEY", hide_env_values = true)]
    pub key: String,
}

impl KeyArgs {
    pub fn keypair(&self) -> Result<LevyKeypair> {
        LevyKeypair::from_hex(&self.key).context("invalid signer key")
    }
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the hex secret here (mode 0600) instead of printing it.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub state: StateArgs,

    /// JSON deployment config. Missing fields take their defaults.
    #[arg(long, short = 'c', env = "LEVY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Administrator account; overrides the config file.
    #[arg(long, env = "LEVY_ADMIN")]
    pub admin: Option<Address>,

    /// Replace an existing snapshot.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct BalanceArgs {
    #[command(flatten)]
    pub state: StateArgs,

    pub account: Address,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    #[command(flatten)]
    pub state: StateArgs,

    #[command(flatten)]
    pub key: KeyArgs,

    /// The call as JSON. Amounts are base-unit strings, e.g.
    /// `{"transfer":{"to":"0x…","amount":"10000000000000000000"}}` for 10 tokens.
    pub call: String,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    #[command(flatten)]
    pub state: StateArgs,

    #[command(flatten)]
    pub key: KeyArgs,

    /// The call as JSON.
    pub call: String,

    /// Write the signed request here instead of stdout.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RelayArgs {
    #[command(flatten)]
    pub state: StateArgs,

    /// File holding a signed forward request as JSON.
    pub request: PathBuf,
}

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    #[command(flatten)]
    pub state: StateArgs,

    #[command(flatten)]
    pub key: KeyArgs,

    /// Target behavior version.
    #[arg(id = "target_version", long = "to", value_name = "VERSION")]
    pub version: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        LevyNodeCli::command().debug_assert();
    }

    #[test]
    fn parses_addresses_and_defaults() {
        let admin = Address::repeat_byte(0xad).to_string();
        let cli = LevyNodeCli::try_parse_from(["levy-node", "init", "--admin", &admin]).unwrap();
        match cli.command {
            Commands::Init(args) => {
                assert_eq!(args.admin, Some(Address::repeat_byte(0xad)));
                assert_eq!(args.state.state, PathBuf::from("levy-state.json"));
                assert!(!args.force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn direct_calls_act_as_the_key_holder() {
        let keypair = LevyKeypair::from_seed(&[0x0a; 32]);
        let secret = keypair.secret_key_hex();
        let cli = LevyNodeCli::try_parse_from([
            "levy-node",
            "call",
            "--key",
            &secret,
            r#"{"setPaused":{"paused":true}}"#,
        ])
        .unwrap();
        match cli.command {
            Commands::Call(args) => {
                let acting = args.key.keypair().unwrap();
                assert_eq!(acting.public_key(), keypair.public_key());
            }
            other => panic!("unexpected command: {:?}", other),
        }

        // No key, no call.
        assert!(LevyNodeCli::try_parse_from(["levy-node", "upgrade", "--to", "2"]).is_err());
    }

    #[test]
    fn malformed_key_is_reported() {
        let args = KeyArgs {
            key: "not-hex".to_string(),
        };
        let err = args.keypair().unwrap_err();
        assert!(format!("{:#}", err).contains("invalid signer key"));
    }

    #[test]
    fn rejects_malformed_address() {
        assert!(LevyNodeCli::try_parse_from(["levy-node", "balance", "0x1234"]).is_err());
    }
}
