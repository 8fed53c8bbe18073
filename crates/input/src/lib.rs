//! Spendable outputs and the witnesses that sweep them.
//!
//! A sweeper discovers outputs it can claim (channel closes, HTLC resolutions, breaches) and
//! wraps each of them in an [`Input`]. Every input knows its [`OutPoint`](bitcoin::OutPoint),
//! the [`WitnessType`] required to spend it, the [`SignDescriptor`] holding the signing material
//! and the chain-relative conditions under which it becomes spendable. Calling
//! [`Input::craft_input_script`] produces the [`Script`] that is installed into the sweep
//! transaction.
//!
//! This crate does not decide *when* an input should be swept, does not batch inputs and does
//! not broadcast anything. It only turns one known output into one valid spend.

pub mod errors;
pub mod input;
pub mod keys;
pub mod prelude;
pub mod script_utils;
pub mod sighash;
pub mod sign_descriptor;
pub mod signer;
pub mod size;
pub mod witness_type;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use errors::{InputError, SighashError, SignError};
pub use input::{BaseInput, HtlcSucceedInput, Input, InputKit};
pub use sighash::TxSigHashes;
pub use sign_descriptor::{KeyDescriptor, KeyLocator, SignDescriptor};
pub use signer::{Script, SignContext, Signer};
pub use witness_type::WitnessType;
