//! The signing collaborator and the per-call context handed to it.

use bitcoin::{
    ecdsa, hashes::Hash, sighash::SegwitV0Sighash, CompressedPublicKey, ScriptBuf, Transaction,
    Witness,
};

use crate::{
    errors::{SighashError, SignError},
    sighash::TxSigHashes,
    sign_descriptor::SignDescriptor,
};

/// The spending data installed into one input of a sweep transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    /// The witness stack.
    pub witness: Witness,

    /// The legacy signature script. Empty unless the spent output is nested P2SH.
    pub sig_script: ScriptBuf,
}

/// Identifies *what* is being signed for the duration of one craft call.
///
/// The context is built fresh for every call so that the [`SignDescriptor`] itself never has to
/// be mutated.
#[derive(Debug, Clone, Copy)]
pub struct SignContext<'a> {
    /// Shared sighash midstate of the transaction being signed.
    pub sighashes: &'a TxSigHashes,

    /// Index of the input being signed.
    pub input_index: usize,
}

impl<'a> SignContext<'a> {
    /// Creates a new context.
    pub const fn new(sighashes: &'a TxSigHashes, input_index: usize) -> Self {
        Self {
            sighashes,
            input_index,
        }
    }

    /// Computes the signature hash that `desc` commits to in `tx`.
    pub fn sighash(
        &self,
        tx: &Transaction,
        desc: &SignDescriptor,
    ) -> Result<SegwitV0Sighash, SighashError> {
        self.sighashes.segwit_v0_sighash(
            tx,
            self.input_index,
            &desc.script_code(),
            desc.output.value,
            desc.hash_type,
        )
    }
}

/// Produces signatures for the keys referenced by [`SignDescriptor`]s.
///
/// Implementations may be slow (hardware or remote signers), so callers must not hold locks
/// across these calls. A signer must not sign for an input index other than the one in the
/// given [`SignContext`].
pub trait Signer: Send + Sync {
    /// Signs input `ctx.input_index` of `tx` with the key described by `desc`.
    ///
    /// The key is tweaked as requested by the descriptor before signing. The returned signature
    /// carries `desc.hash_type`.
    fn sign_output_raw(
        &self,
        tx: &Transaction,
        desc: &SignDescriptor,
        ctx: &SignContext<'_>,
    ) -> Result<ecdsa::Signature, SignError>;

    /// Builds the complete spend of a P2WKH or nested P2SH-P2WKH output.
    ///
    /// The default implementation signs via [`Signer::sign_output_raw`] and reveals the
    /// (tweaked) public key of the descriptor. For a nested output it also sets the signature
    /// script to a push of the P2WKH program.
    fn compute_input_script(
        &self,
        tx: &Transaction,
        desc: &SignDescriptor,
        ctx: &SignContext<'_>,
    ) -> Result<Script, SignError> {
        let pub_key = desc
            .signing_pub_key()?
            .ok_or(SignError::KeyNotFound {
                family: desc.key_desc.key_locator.family,
                index: desc.key_desc.key_locator.index,
            })?;
        let pub_key = CompressedPublicKey(pub_key);

        let sig = self.sign_output_raw(tx, desc, ctx)?;

        let mut witness = Witness::new();
        witness.push(sig.to_vec());
        witness.push(pub_key.to_bytes());

        let sig_script = if desc.output.script_pubkey.is_p2sh() {
            let mut program = [0u8; 22];
            program[1] = 0x14;
            program[2..].copy_from_slice(pub_key.wpubkey_hash().as_byte_array());

            ScriptBuf::builder().push_slice(program).into_script()
        } else {
            ScriptBuf::new()
        };

        Ok(Script {
            witness,
            sig_script,
        })
    }
}
