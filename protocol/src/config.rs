//! # Ledger Constants
//!
//! Every magic number of the ledger lives here. Anything that affects how
//! value is split or how signatures are bound to a deployment is part of the
//! ledger's observable behavior, so changing one of these is a breaking change
//! for every snapshot and every signed request already in flight.

// ---------------------------------------------------------------------------
// Token Metadata
// ---------------------------------------------------------------------------

/// Decimal places of the ledger unit. One whole token is `10^18` base units.
pub const DECIMALS: u8 = 18;

/// `10^DECIMALS`, the number of base units in one whole token.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Default human-readable token name.
pub const DEFAULT_TOKEN_NAME: &str = "ONEamericas";

/// Default ticker symbol.
pub const DEFAULT_TOKEN_SYMBOL: &str = "ONEAM";

/// Whole tokens minted to the administrator by the version-1 setup routine.
pub const DEFAULT_INITIAL_SUPPLY_TOKENS: u128 = 100_000_000_000;

// ---------------------------------------------------------------------------
// Tax Parameters
// ---------------------------------------------------------------------------

/// Transfer tax in basis points. 100 bps = 1% of the gross amount.
pub const TAX_RATE_BPS: u128 = 100;

/// Basis point denominator.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Permanent-removal sink: the conventional `0x…dEaD` identifier,
/// right-aligned in 32 bytes.
pub const SINK_ACCOUNT_BYTES: [u8; 32] = {
    let mut bytes = [0u8; 32];
    bytes[30] = 0xde;
    bytes[31] = 0xad;
    bytes
};

/// Treasury account that receives the second half of every tax.
pub const TREASURY_ACCOUNT_BYTES: [u8; 32] = [0x22; 32];

// ---------------------------------------------------------------------------
// Forwarder Domain
// ---------------------------------------------------------------------------

/// Name mixed into the forwarder's domain separator.
pub const FORWARDER_DOMAIN_NAME: &str = "MinimalForwarder";

/// Version mixed into the forwarder's domain separator.
pub const FORWARDER_DOMAIN_VERSION: &str = "0.0.1";

/// BLAKE3 `derive_key` context for forward-request digests.
pub const FORWARD_REQUEST_CONTEXT: &str = "levy-ledger 2026 forward-request v1";

/// BLAKE3 `derive_key` context for the forwarder domain separator.
pub const FORWARDER_DOMAIN_CONTEXT: &str = "levy-ledger 2026 forwarder-domain v1";

/// Chain id used when none is configured.
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Gas figure placed in requests built by the deployment helpers. Signed,
/// never metered.
pub const DEFAULT_FORWARD_GAS: u64 = 1_000_000;

/// BLAKE3 `derive_key` context for deriving forwarder and token addresses
/// from deployment parameters.
pub const DEPLOYMENT_ADDRESS_CONTEXT: &str = "levy-ledger 2026 deployment-address v1";

// ---------------------------------------------------------------------------
// Behavior Versions
// ---------------------------------------------------------------------------

/// Highest behavior version this build knows how to run.
pub const LATEST_BEHAVIOR_VERSION: u32 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_matches_decimals() {
        assert_eq!(UNIT, 10u128.pow(DECIMALS as u32));
    }

    #[test]
    fn tax_rate_is_one_percent() {
        assert_eq!(TAX_RATE_BPS * 100, BPS_DENOMINATOR);
    }

    #[test]
    fn tax_destinations_are_distinct() {
        assert_ne!(SINK_ACCOUNT_BYTES, TREASURY_ACCOUNT_BYTES);
        assert_eq!(&SINK_ACCOUNT_BYTES[30..], &[0xde, 0xad]);
        assert!(SINK_ACCOUNT_BYTES[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn domain_contexts_differ() {
        assert_ne!(FORWARD_REQUEST_CONTEXT, FORWARDER_DOMAIN_CONTEXT);
        assert_ne!(FORWARDER_DOMAIN_CONTEXT, DEPLOYMENT_ADDRESS_CONTEXT);
    }
}
