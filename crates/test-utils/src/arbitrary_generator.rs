//! Module to generate arbitrary values for testing.

use arbitrary::{Arbitrary, Unstructured};
use bitcoin::{hashes::Hash, OutPoint, Txid};
use proptest::prelude::*;
use rand_core::{OsRng, TryCryptoRng};

/// The default buffer size for the `ArbitraryGenerator`.
const ARB_GEN_LEN: usize = 1024;

/// A generator for producing arbitrary data based on a persistent buffer.
#[derive(Debug)]
pub struct ArbitraryGenerator {
    buf: Vec<u8>,
}

impl Default for ArbitraryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArbitraryGenerator {
    /// Creates a new `ArbitraryGenerator` with a default buffer size.
    pub fn new() -> Self {
        Self::new_with_size(ARB_GEN_LEN)
    }

    /// Creates a new `ArbitraryGenerator` whose buffer holds `size` bytes.
    ///
    /// Types that consume more entropy than `size` bytes fall back to the defaults `arbitrary`
    /// uses for an exhausted input.
    pub fn new_with_size(size: usize) -> Self {
        Self {
            buf: vec![0u8; size],
        }
    }

    /// Generates an arbitrary instance of type `T` using [`OsRng`].
    pub fn generate<'a, T>(&'a mut self) -> T
    where
        T: Arbitrary<'a> + Clone,
    {
        self.generate_with_rng::<T, OsRng>(&mut OsRng)
    }

    /// Generates an arbitrary instance of type `T`, refilling the buffer from `rng`.
    ///
    /// # Panics
    ///
    /// If `rng` fails or `T` cannot be built from the buffer.
    pub fn generate_with_rng<'a, T, R>(&'a mut self, rng: &mut R) -> T
    where
        T: Arbitrary<'a> + Clone,
        R: TryCryptoRng,
    {
        rng.try_fill_bytes(&mut self.buf)
            .expect("must be able to generate random bytes");
        let mut u = Unstructured::new(&self.buf);
        T::arbitrary(&mut u).expect("Failed to generate arbitrary instance")
    }
}

/// Generates an arbitrary Txid.
pub fn arb_txid() -> impl Strategy<Value = Txid> {
    any::<[u8; 32]>().prop_map(Txid::from_byte_array)
}

/// Generates an arbitrary [`OutPoint`].
pub fn arb_outpoint() -> impl Strategy<Value = OutPoint> {
    (arb_txid(), any::<u32>()).prop_map(|(txid, vout)| OutPoint { txid, vout })
}

/// Generates a non-empty `Vec<OutPoint>` of 1 to 10 distinct entries.
pub fn arb_outpoints() -> impl Strategy<Value = Vec<OutPoint>> {
    proptest::collection::hash_set(arb_outpoint(), 1..=10)
        .prop_map(|outpoints| outpoints.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_from_fresh_entropy() {
        let mut generator = ArbitraryGenerator::new();

        let first: [u8; 32] = generator.generate();
        let second: [u8; 32] = generator.generate();
        assert_ne!(first, second, "buffer must be refilled on every call");
    }

    proptest! {
        #[test]
        fn outpoints_are_distinct(outpoints in arb_outpoints()) {
            prop_assert!(!outpoints.is_empty() && outpoints.len() <= 10);

            let mut sorted = outpoints.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), outpoints.len());
        }
    }
}
