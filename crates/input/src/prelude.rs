//! Just import this if you want a no-brainer `use` statement to get the most of the `input`
//! crate.

pub use crate::{
    errors::{InputError, SighashError, SignError, UnknownWitnessType},
    input::{BaseInput, HtlcSucceedInput, Input, InputKit},
    keys::*,
    script_utils::*,
    sighash::TxSigHashes,
    sign_descriptor::{KeyDescriptor, KeyLocator, SignDescriptor},
    signer::{Script, SignContext, Signer},
    size::{TxWeightEstimator, WitnessSize},
    witness_type::WitnessType,
};
