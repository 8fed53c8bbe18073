//! Errors that can occur while crafting the witness for an input.

use bitcoin::{OutPoint, Txid};
use thiserror::Error;

use crate::witness_type::WitnessType;

/// Errors returned by a [`Signer`](crate::signer::Signer).
///
/// These are produced by the signing collaborator and are handed back to the caller of
/// [`Input::craft_input_script`](crate::input::Input::craft_input_script) unchanged.
#[derive(Debug, Error)]
pub enum SignError {
    /// The signer does not hold the key referenced by the sign descriptor.
    #[error("key not found for locator {family}/{index}")]
    KeyNotFound {
        /// Key family of the requested key.
        family: u32,
        /// Index of the requested key within its family.
        index: u32,
    },

    /// Applying a tweak to the signing key failed.
    #[error("invalid key tweak: {0}")]
    Tweak(#[from] secp256k1::Error),

    /// The signature hash could not be computed.
    #[error("sighash: {0}")]
    Sighash(#[from] SighashError),

    /// Any other failure of the signing backend.
    #[error("signing backend: {0}")]
    Backend(String),
}

/// Errors while computing a segwit v0 signature hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SighashError {
    /// The input index does not refer to an input of the transaction.
    #[error("input index {index} out of range for transaction with {inputs} inputs")]
    InputIndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of inputs of the transaction.
        inputs: usize,
    },

    /// The sighash cache was computed for another transaction.
    #[error("sighash cache built for {expected}, but asked to sign {actual}")]
    TxMismatch {
        /// Txid the cache was built for.
        expected: Txid,
        /// Txid of the transaction being signed.
        actual: Txid,
    },
}

/// Errors that can occur while crafting the input script of a sweep input.
#[derive(Debug, Error)]
pub enum InputError {
    /// The signer failed.
    #[error(transparent)]
    Sign(#[from] SignError),

    /// The call context does not match the transaction.
    #[error("malformed call context: {0}")]
    Sighash(#[from] SighashError),

    /// The transaction input at the requested index spends another output than this input.
    #[error("input spends {actual}, expected {expected}")]
    OutPointMismatch {
        /// Outpoint of the input being crafted.
        expected: OutPoint,
        /// Outpoint found at the requested index of the transaction.
        actual: OutPoint,
    },

    /// The witness requires a public key that the sign descriptor does not carry.
    #[error("sign descriptor has no public key, required by {0}")]
    MissingPubKey(WitnessType),

    /// The witness requires the revocation secret (double tweak) that the sign descriptor does
    /// not carry.
    #[error("sign descriptor has no double tweak, required by {0}")]
    MissingDoubleTweak(WitnessType),

    /// A tweak carried by the sign descriptor cannot be applied to its public key.
    #[error("invalid key tweak in sign descriptor: {0}")]
    InvalidTweak(#[source] secp256k1::Error),

    /// HTLC success redemption was requested without a preimage.
    #[error("htlc success redemption requires a preimage")]
    MissingPreimage,

    /// Relative timelocks are only enforced for transaction version 2 and above.
    #[error("version of sweep transaction must be >= 2, not {version}")]
    TxVersion {
        /// Version of the offending transaction.
        version: i32,
    },
}

/// A persisted witness type code does not name any known [`WitnessType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown witness type: {0}")]
pub struct UnknownWitnessType(pub u16);
