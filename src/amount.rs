use std::fmt;

use anyhow::{bail, Context as _, Result};
use ethers::types::U256;
use ethers::utils::parse_units;
use rand::Rng;

/// Fractional digits kept for transfer amounts.
pub const AMOUNT_DECIMALS: u32 = 6;

/// Base-unit digits of the native token (wei).
const TOKEN_DECIMALS: usize = 18;

/// A token amount with 6 decimals of precision, stored as integer micro-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(u64);

impl Amount {
    pub fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub fn micros(&self) -> u64 {
        self.0
    }

    /// Amount in the chain's base unit
    pub fn wei(&self) -> U256 {
        U256::from(self.0) * U256::exp10(TOKEN_DECIMALS - AMOUNT_DECIMALS as usize)
    }

    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.starts_with('-') {
            bail!("amount {value} must not be negative");
        }
        if let Some((_, fraction)) = value.split_once('.') {
            if fraction.len() > AMOUNT_DECIMALS as usize {
                bail!("amount {value} has more than {AMOUNT_DECIMALS} decimals");
            }
        }
        let units: U256 = parse_units(value, AMOUNT_DECIMALS)
            .with_context(|| format!("invalid amount '{value}'"))?
            .into();
        if units > U256::from(u64::MAX) {
            bail!("amount {value} is too large");
        }
        Ok(Self(units.as_u64()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = 10u64.pow(AMOUNT_DECIMALS);
        write!(f, "{}.{:06}", self.0 / scale, self.0 % scale)
    }
}

/// Range transfer amounts are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    min: Amount,
    max: Amount,
}

impl AmountRange {
    pub fn new(min: Amount, max: Amount) -> Result<Self> {
        if min > max {
            bail!("minimum amount {min} is greater than maximum amount {max}");
        }
        Ok(Self { min, max })
    }

    pub fn parse(min: &str, max: &str) -> Result<Self> {
        let min = Amount::parse(min).context("failed to parse minimum amount")?;
        let max = Amount::parse(max).context("failed to parse maximum amount")?;
        Self::new(min, max)
    }

    pub fn min(&self) -> Amount {
        self.min
    }

    pub fn max(&self) -> Amount {
        self.max
    }

    /// Draws a uniformly random amount in `[min, max)`, or `min` if both bounds are equal.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Amount {
        if self.min == self.max {
            return self.min;
        }
        Amount(rng.gen_range(self.min.0..self.max.0))
    }
}

impl fmt::Display for AmountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_parse_amounts() {
        assert_eq!(Amount::parse("0.001").unwrap().micros(), 1_000);
        assert_eq!(Amount::parse("1").unwrap().micros(), 1_000_000);
        assert_eq!(Amount::parse(" 0.000001 ").unwrap().micros(), 1);
        assert!(Amount::parse("0.0000001").is_err());
        assert!(Amount::parse("abc").is_err());
        let err = Amount::parse("-0.001").unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn test_display_keeps_six_decimals() {
        assert_eq!(Amount::from_micros(1_234).to_string(), "0.001234");
        assert_eq!(Amount::from_micros(2_500_000).to_string(), "2.500000");
    }

    #[test]
    fn test_wei_conversion() {
        let amount = Amount::parse("0.001").unwrap();
        assert_eq!(amount.wei(), U256::exp10(15));
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(AmountRange::parse("0.002", "0.001").is_err());
        assert!(AmountRange::parse("0.001", "0.001").is_ok());
    }

    #[test]
    fn test_samples_stay_in_half_open_range() {
        let range = AmountRange::parse("0.001", "0.002").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let amount = range.sample(&mut rng);
            assert!(amount >= range.min());
            assert!(amount < range.max());
        }
    }

    #[test]
    fn test_degenerate_range_returns_min() {
        let range = AmountRange::parse("0.5", "0.5").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(range.sample(&mut rng), range.min());
    }
}
