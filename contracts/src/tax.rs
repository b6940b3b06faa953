//! # Transfer Tax
//!
//! A flat 1% of the gross amount, split between the sink and the treasury.
//!
//! ```text
//! tax          = floor(amount * 100 / 10_000)
//! sink_share   = floor(tax / 2)
//! treasury     = tax - sink_share
//! net          = amount - tax
//! ```
//!
//! `net + sink_share + treasury_share == amount` holds for every input, and
//! the two shares differ by at most one base unit.

use levy_protocol::config::{BPS_DENOMINATOR, TAX_RATE_BPS};
use levy_protocol::{Address, Amount};

use crate::error::LedgerError;

/// Result of taxing one gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxSplit {
    pub net: Amount,
    pub sink_share: Amount,
    pub treasury_share: Amount,
}

impl TaxSplit {
    pub fn tax(&self) -> Amount {
        // Cannot overflow: both shares come from one tax value.
        Amount::from_base_units(self.sink_share.base_units() + self.treasury_share.base_units())
    }
}

/// Tax destinations and rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxPolicy {
    pub sink: Address,
    pub treasury: Address,
    pub rate_bps: u128,
}

impl TaxPolicy {
    pub fn new(sink: Address, treasury: Address) -> Self {
        Self {
            sink,
            treasury,
            rate_bps: TAX_RATE_BPS,
        }
    }

    pub fn apply_tax(&self, amount: Amount) -> Result<TaxSplit, LedgerError> {
        let tax = amount
            .mul_div_floor(self.rate_bps, BPS_DENOMINATOR)
            .ok_or(LedgerError::Overflow)?;
        let net = amount.checked_sub(tax).ok_or(LedgerError::Overflow)?;
        let (sink_share, treasury_share) = tax.split_half();
        Ok(TaxSplit {
            net,
            sink_share,
            treasury_share,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> TaxPolicy {
        TaxPolicy::new(Address::SINK, Address::TREASURY)
    }

    fn amt(s: &str) -> Amount {
        Amount::parse_decimal(s).unwrap()
    }

    #[test]
    fn ten_tokens() {
        let split = policy().apply_tax(amt("10")).unwrap();
        assert_eq!(split.net, amt("9.9"));
        assert_eq!(split.sink_share, amt("0.05"));
        assert_eq!(split.treasury_share, amt("0.05"));
        assert_eq!(split.tax(), amt("0.1"));
    }

    #[test]
    fn odd_tax_goes_to_treasury() {
        // 300 base units -> tax 3 -> 1 to sink, 2 to treasury.
        let split = policy().apply_tax(Amount::from_base_units(300)).unwrap();
        assert_eq!(split.sink_share.base_units(), 1);
        assert_eq!(split.treasury_share.base_units(), 2);
        assert_eq!(split.net.base_units(), 297);
    }

    #[test]
    fn dust_is_untaxed() {
        let split = policy().apply_tax(Amount::from_base_units(99)).unwrap();
        assert_eq!(split.net.base_units(), 99);
        assert!(split.tax().is_zero());
    }

    #[test]
    fn conservation_over_many_amounts() {
        for units in (0u128..5_000).chain([u128::MAX / 100, u128::MAX / 10_000]) {
            let amount = Amount::from_base_units(units);
            let s = policy().apply_tax(amount).unwrap();
            let total = s.net.base_units() + s.sink_share.base_units() + s.treasury_share.base_units();
            assert_eq!(total, units);
            assert!(s.treasury_share.base_units() - s.sink_share.base_units() <= 1);
        }
    }

    #[test]
    fn max_amount_does_not_wrap() {
        let split = policy().apply_tax(Amount::MAX).unwrap();
        let total = split
            .net
            .checked_add(split.sink_share)
            .and_then(|a| a.checked_add(split.treasury_share));
        assert_eq!(total, Some(Amount::MAX));
    }
}
