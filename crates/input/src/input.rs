//! The [`Input`] abstraction: one spendable output and the knowledge of how to spend it.

use std::fmt;

use bitcoin::{OutPoint, ScriptBuf, Sequence, Transaction, TxIn};
use tracing::{debug, trace};

use crate::{
    errors::InputError,
    script_utils::sender_htlc_spend_redeem,
    sighash::TxSigHashes,
    sign_descriptor::SignDescriptor,
    signer::{Script, SignContext, Signer},
    size::{htlc_success_witness_size, WitnessSize},
    witness_type::WitnessType,
};

/// An output that can be swept into a transaction the sweeper controls.
///
/// Implementations are immutable once constructed. [`Input::craft_input_script`] takes the
/// transaction context as arguments, so one input can be crafted into several candidate sweep
/// transactions concurrently.
pub trait Input: fmt::Debug + Send + Sync {
    /// The output being spent.
    fn outpoint(&self) -> OutPoint;

    /// The kind of witness required to spend the output.
    fn witness_type(&self) -> WitnessType;

    /// The signing material for the output.
    fn sign_desc(&self) -> &SignDescriptor;

    /// The height at which the output's transaction could have confirmed at the earliest.
    ///
    /// Used by chain watchers as a starting point; never enforced here.
    fn height_hint(&self) -> u32;

    /// The relative lock time, in blocks, that must have passed since the output confirmed
    /// before it can be spent. Zero for outputs without a relative lock time.
    ///
    /// Deciding *when* to sweep is up to the caller; crafting never checks maturity.
    fn blocks_to_maturity(&self) -> u32;

    /// Crafts the witness (and, if needed, the signature script) for input `input_index` of
    /// `tx`.
    ///
    /// `sighashes` must have been built for `tx`. Signer failures are returned unchanged
    /// wrapped in [`InputError::Sign`]. `tx` is never modified; installing the returned
    /// [`Script`] is up to the caller.
    fn craft_input_script(
        &self,
        signer: &dyn Signer,
        tx: &Transaction,
        sighashes: &TxSigHashes,
        input_index: usize,
    ) -> Result<Script, InputError>;

    /// Upper bound of the spending data [`Input::craft_input_script`] produces.
    ///
    /// Defaults to the bound of [`Input::witness_type`]. Inputs whose witness depends on data
    /// beyond the witness type override it.
    fn witness_size(&self) -> WitnessSize {
        self.witness_type().size_upper_bound()
    }

    /// Returns an unsigned [`TxIn`] that spends this input.
    ///
    /// The sequence carries [`Input::blocks_to_maturity`] so that relative lock times are
    /// satisfied once the input is mature.
    fn tx_in(&self) -> TxIn {
        TxIn {
            previous_output: self.outpoint(),
            sequence: Sequence(self.blocks_to_maturity()),
            ..Default::default()
        }
    }
}

/// The fields shared by all [`Input`] implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputKit {
    outpoint: OutPoint,
    witness_type: WitnessType,
    sign_desc: SignDescriptor,
    height_hint: u32,
    blocks_to_maturity: u32,
}

impl InputKit {
    /// Creates a new kit. The kit owns its sign descriptor.
    pub const fn new(
        outpoint: OutPoint,
        witness_type: WitnessType,
        sign_desc: SignDescriptor,
        height_hint: u32,
        blocks_to_maturity: u32,
    ) -> Self {
        Self {
            outpoint,
            witness_type,
            sign_desc,
            height_hint,
            blocks_to_maturity,
        }
    }

    /// See [`Input::outpoint`].
    pub const fn outpoint(&self) -> OutPoint {
        self.outpoint
    }

    /// See [`Input::witness_type`].
    pub const fn witness_type(&self) -> WitnessType {
        self.witness_type
    }

    /// See [`Input::sign_desc`].
    pub const fn sign_desc(&self) -> &SignDescriptor {
        &self.sign_desc
    }

    /// See [`Input::height_hint`].
    pub const fn height_hint(&self) -> u32 {
        self.height_hint
    }

    /// See [`Input::blocks_to_maturity`].
    pub const fn blocks_to_maturity(&self) -> u32 {
        self.blocks_to_maturity
    }

    /// Validates the call context and binds it for the signer.
    ///
    /// Fails if `input_index` is out of range, if `sighashes` was built for another
    /// transaction, or if the input at `input_index` spends another outpoint.
    fn bind<'a>(
        &self,
        tx: &Transaction,
        sighashes: &'a TxSigHashes,
        input_index: usize,
    ) -> Result<SignContext<'a>, InputError> {
        sighashes.check(tx, input_index)?;

        let actual = tx.input[input_index].previous_output;
        if actual != self.outpoint {
            return Err(InputError::OutPointMismatch {
                expected: self.outpoint,
                actual,
            });
        }

        trace!(
            outpoint = %self.outpoint,
            witness_type = %self.witness_type,
            input_index,
            "crafting input script"
        );

        Ok(SignContext::new(sighashes, input_index))
    }
}

/// An input whose witness is fully determined by its [`WitnessType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseInput {
    kit: InputKit,
}

impl BaseInput {
    /// Creates an input without a relative lock time.
    pub const fn new(
        outpoint: OutPoint,
        witness_type: WitnessType,
        sign_desc: SignDescriptor,
        height_hint: u32,
    ) -> Self {
        Self::new_csv(outpoint, witness_type, sign_desc, height_hint, 0)
    }

    /// Creates an input that is only spendable `blocks_to_maturity` blocks after confirmation.
    ///
    /// The lock time is not checked against the witness type.
    pub const fn new_csv(
        outpoint: OutPoint,
        witness_type: WitnessType,
        sign_desc: SignDescriptor,
        height_hint: u32,
        blocks_to_maturity: u32,
    ) -> Self {
        Self {
            kit: InputKit::new(
                outpoint,
                witness_type,
                sign_desc,
                height_hint,
                blocks_to_maturity,
            ),
        }
    }

    /// The shared input fields.
    pub const fn kit(&self) -> &InputKit {
        &self.kit
    }
}

impl Input for BaseInput {
    fn outpoint(&self) -> OutPoint {
        self.kit.outpoint()
    }

    fn witness_type(&self) -> WitnessType {
        self.kit.witness_type()
    }

    fn sign_desc(&self) -> &SignDescriptor {
        self.kit.sign_desc()
    }

    fn height_hint(&self) -> u32 {
        self.kit.height_hint()
    }

    fn blocks_to_maturity(&self) -> u32 {
        self.kit.blocks_to_maturity()
    }

    fn craft_input_script(
        &self,
        signer: &dyn Signer,
        tx: &Transaction,
        sighashes: &TxSigHashes,
        input_index: usize,
    ) -> Result<Script, InputError> {
        let ctx = self.kit.bind(tx, sighashes, input_index)?;

        let script =
            self.kit
                .witness_type
                .generate_witness(signer, &self.kit.sign_desc, tx, &ctx)?;

        debug!(
            outpoint = %self.kit.outpoint,
            witness_type = %self.kit.witness_type,
            witness_elements = script.witness.len(),
            nested = !script.sig_script.is_empty(),
            "crafted input script"
        );

        Ok(script)
    }
}

/// An HTLC offered to us on the counterparty's commitment transaction, redeemed with its
/// payment preimage.
///
/// The witness type is always [`WitnessType::HtlcAcceptedRemoteSuccess`]. The preimage is not
/// checked against the payment hash of the HTLC; a wrong preimage yields a witness that fails
/// script validation.
#[derive(Clone, PartialEq, Eq)]
pub struct HtlcSucceedInput {
    kit: InputKit,
    preimage: Vec<u8>,
}

impl HtlcSucceedInput {
    /// Creates a new HTLC redemption input.
    pub const fn new(
        outpoint: OutPoint,
        sign_desc: SignDescriptor,
        preimage: Vec<u8>,
        height_hint: u32,
        blocks_to_maturity: u32,
    ) -> Self {
        Self {
            kit: InputKit::new(
                outpoint,
                WitnessType::HtlcAcceptedRemoteSuccess,
                sign_desc,
                height_hint,
                blocks_to_maturity,
            ),
            preimage,
        }
    }

    /// The shared input fields.
    pub const fn kit(&self) -> &InputKit {
        &self.kit
    }

    /// The payment preimage.
    pub fn preimage(&self) -> &[u8] {
        &self.preimage
    }
}

impl fmt::Debug for HtlcSucceedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtlcSucceedInput")
            .field("kit", &self.kit)
            .field("preimage", &"<redacted>")
            .finish()
    }
}

impl Input for HtlcSucceedInput {
    fn outpoint(&self) -> OutPoint {
        self.kit.outpoint()
    }

    fn witness_type(&self) -> WitnessType {
        self.kit.witness_type()
    }

    fn sign_desc(&self) -> &SignDescriptor {
        self.kit.sign_desc()
    }

    fn height_hint(&self) -> u32 {
        self.kit.height_hint()
    }

    fn blocks_to_maturity(&self) -> u32 {
        self.kit.blocks_to_maturity()
    }

    fn witness_size(&self) -> WitnessSize {
        htlc_success_witness_size(self.preimage.len())
    }

    fn craft_input_script(
        &self,
        signer: &dyn Signer,
        tx: &Transaction,
        sighashes: &TxSigHashes,
        input_index: usize,
    ) -> Result<Script, InputError> {
        let ctx = self.kit.bind(tx, sighashes, input_index)?;

        let witness =
            sender_htlc_spend_redeem(signer, &self.kit.sign_desc, tx, &ctx, &self.preimage)?;

        debug!(
            outpoint = %self.kit.outpoint,
            witness_elements = witness.len(),
            "crafted htlc success script"
        );

        Ok(Script {
            witness,
            sig_script: ScriptBuf::new(),
        })
    }
}
