//! Deployment parameters.
//!
//! Compile-time constants live in [`levy_protocol::config`]; this is the
//! runtime side, chosen once when a ledger is deployed and persisted with it.

use serde::{Deserialize, Serialize};

use levy_protocol::config::{
    DEFAULT_CHAIN_ID, DEFAULT_INITIAL_SUPPLY_TOKENS, DEFAULT_TOKEN_NAME, DEFAULT_TOKEN_SYMBOL,
    UNIT,
};
use levy_protocol::{Address, Amount};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Human-readable token name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Account allowed to run administrator-gated entry points.
    pub admin: Address,
    /// Receives the first half of every transfer tax.
    pub sink: Address,
    /// Receives the second half of every transfer tax.
    pub treasury: Address,
    /// Receives the untaxed fee of a forwarded transfer once version 2 is
    /// active.
    pub fee_recipient: Address,
    /// Minted to `admin` by the version-1 setup routine.
    pub initial_supply: Amount,
    /// Mixed into the forwarder's domain separator.
    pub chain_id: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_TOKEN_NAME.to_string(),
            symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            admin: Address::ZERO,
            sink: Address::SINK,
            treasury: Address::TREASURY,
            fee_recipient: Address::TREASURY,
            initial_supply: Amount::from_base_units(DEFAULT_INITIAL_SUPPLY_TOKENS * UNIT),
            chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

impl LedgerConfig {
    /// Default parameters administered by `admin`.
    pub fn with_admin(admin: Address) -> Self {
        Self {
            admin,
            ..Self::default()
        }
    }

    /// Same parameters without an initial supply. Useful when every unit
    /// should come from a quota-limited minter.
    pub fn without_initial_supply(mut self) -> Self {
        self.initial_supply = Amount::ZERO;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cfg = LedgerConfig::default();
        assert_eq!(cfg.name, "ONEamericas");
        assert_eq!(cfg.symbol, "ONEAM");
        assert_eq!(cfg.sink, Address::SINK);
        assert_eq!(cfg.treasury, Address::TREASURY);
        assert_eq!(cfg.fee_recipient, Address::TREASURY);
        assert_eq!(cfg.initial_supply.to_string(), "100000000000");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: LedgerConfig = serde_json::from_str(r#"{"symbol":"ONEUSD"}"#).unwrap();
        assert_eq!(cfg.symbol, "ONEUSD");
        assert_eq!(cfg.name, "ONEamericas");
        assert_eq!(cfg.chain_id, DEFAULT_CHAIN_ID);
    }
}
