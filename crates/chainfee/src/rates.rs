use std::fmt;

use bitcoin::{Amount, FeeRate, Weight};
use serde::{Deserialize, Serialize};

/// Lowest fee rate that still relays under the default 1 sat/vbyte policy once the weight of
/// a transaction is rounded up to whole vbytes.
pub const FEE_PER_KW_FLOOR: SatPerKWeight = SatPerKWeight::from_sat(253);

/// Exact conversion of 1 sat/vbyte, without rounding slack.
pub const ABSOLUTE_FEE_PER_KW_FLOOR: SatPerKWeight = SatPerKWeight::from_sat(250);

/// Fee rate in satoshis per 1000 weight units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SatPerKWeight(u64);

impl SatPerKWeight {
    /// Creates a fee rate of `sat` satoshis per kilo-weight.
    pub const fn from_sat(sat: u64) -> Self {
        Self(sat)
    }

    /// Satoshis per kilo-weight.
    pub const fn to_sat(self) -> u64 {
        self.0
    }

    /// Fee for a transaction of `weight`, rounded down to the satoshi.
    pub const fn fee_for_weight(self, weight: Weight) -> Amount {
        Amount::from_sat(self.0.saturating_mul(weight.to_wu()) / 1000)
    }

    /// The same rate expressed per kilo-vbyte.
    pub const fn fee_per_kvbyte(self) -> SatPerKVByte {
        SatPerKVByte(self.0.saturating_mul(4))
    }
}

impl fmt::Display for SatPerKWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sat/kw", self.0)
    }
}

impl From<SatPerKWeight> for FeeRate {
    fn from(rate: SatPerKWeight) -> Self {
        FeeRate::from_sat_per_kwu(rate.0)
    }
}

impl From<FeeRate> for SatPerKWeight {
    fn from(rate: FeeRate) -> Self {
        Self(rate.to_sat_per_kwu())
    }
}

/// Fee rate in satoshis per 1000 virtual bytes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SatPerKVByte(u64);

impl SatPerKVByte {
    /// Creates a fee rate of `sat` satoshis per kilo-vbyte.
    pub const fn from_sat(sat: u64) -> Self {
        Self(sat)
    }

    /// Satoshis per kilo-vbyte.
    pub const fn to_sat(self) -> u64 {
        self.0
    }

    /// Fee for a transaction of `vsize` virtual bytes, rounded down to the satoshi.
    pub const fn fee_for_vsize(self, vsize: u64) -> Amount {
        Amount::from_sat(self.0.saturating_mul(vsize) / 1000)
    }

    /// The same rate expressed per kilo-weight, rounded down.
    pub const fn fee_per_kweight(self) -> SatPerKWeight {
        SatPerKWeight(self.0 / 4)
    }
}

impl fmt::Display for SatPerKVByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sat/kb", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_rounds_down() {
        let rate = SatPerKWeight::from_sat(253);
        assert_eq!(rate.fee_for_weight(Weight::from_wu(1_000)), Amount::from_sat(253));
        assert_eq!(rate.fee_for_weight(Weight::from_wu(999)), Amount::from_sat(252));
        assert_eq!(rate.fee_for_weight(Weight::ZERO), Amount::ZERO);

        let rate = SatPerKVByte::from_sat(1_000);
        assert_eq!(rate.fee_for_vsize(141), Amount::from_sat(141));
        assert_eq!(SatPerKVByte::from_sat(1_500).fee_for_vsize(3), Amount::from_sat(4));
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(FEE_PER_KW_FLOOR.fee_per_kvbyte(), SatPerKVByte::from_sat(1_012));
        assert_eq!(
            SatPerKVByte::from_sat(1_000).fee_per_kweight(),
            ABSOLUTE_FEE_PER_KW_FLOOR
        );
        assert_eq!(
            SatPerKVByte::from_sat(1_003).fee_per_kweight(),
            SatPerKWeight::from_sat(250)
        );

        let fee_rate = FeeRate::from(FEE_PER_KW_FLOOR);
        assert_eq!(fee_rate.to_sat_per_kwu(), 253);
        assert_eq!(SatPerKWeight::from(fee_rate), FEE_PER_KW_FLOOR);
        assert_eq!(
            FeeRate::from(ABSOLUTE_FEE_PER_KW_FLOOR),
            FeeRate::from_sat_per_vb_unchecked(1)
        );
    }

    #[test]
    fn floor_covers_rounded_vsize() {
        // A weight that is not a multiple of 4 is charged for the rounded-up vbyte.
        let weight = Weight::from_wu(1_001);
        let min_relay_fee = SatPerKVByte::from_sat(1_000).fee_for_vsize(weight.to_vbytes_ceil());

        assert!(FEE_PER_KW_FLOOR.fee_for_weight(weight) >= min_relay_fee);
        assert!(ABSOLUTE_FEE_PER_KW_FLOOR.fee_for_weight(weight) < min_relay_fee);
    }

    #[test]
    fn display_and_serde() {
        assert_eq!(FEE_PER_KW_FLOOR.to_string(), "253 sat/kw");
        assert_eq!(SatPerKVByte::from_sat(1_012).to_string(), "1012 sat/kb");

        let json = serde_json::to_string(&FEE_PER_KW_FLOOR).expect("must serialize");
        assert_eq!(json, "253");
        let rate: SatPerKVByte = serde_json::from_str("2000").expect("must deserialize");
        assert_eq!(rate, SatPerKVByte::from_sat(2_000));
    }
}
