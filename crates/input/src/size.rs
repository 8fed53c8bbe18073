//! Upper bounds for witness sizes and a weight estimator for sweep transactions.
//!
//! All witness sizes include the leading element-count byte and assume 73-byte signatures
//! (72-byte DER encoding plus the sighash-type byte).

use bitcoin::{consensus::encode, Transaction, TxOut, VarInt, Weight};

use crate::{input::Input, witness_type::WitnessType};

/// Outpoint (36), empty script length (1) and sequence (4) of a segwit input.
pub const INPUT_SIZE: usize = 32 + 4 + 1 + 4;

/// Value (8), script length (1) and `OP_0 <20 bytes>`.
pub const P2WKH_OUTPUT_SIZE: usize = 8 + 1 + 22;

/// Value (8), script length (1) and `OP_0 <32 bytes>`.
pub const P2WSH_OUTPUT_SIZE: usize = 8 + 1 + 34;

/// Value (8), script length (1) and `OP_1 <32 bytes>`.
pub const P2TR_OUTPUT_SIZE: usize = 8 + 1 + 34;

/// Version (4) and lock time (4).
const BASE_TX_SIZE: usize = 4 + 4;

/// Segwit marker and flag.
const WITNESS_HEADER_SIZE: usize = 2;

/// Maximum size of a signature with its sighash-type byte.
const SIG_SIZE: usize = 73;

/// Length-prefixed signature.
const SIG_ELEMENT_SIZE: usize = 1 + SIG_SIZE;

/// Length-prefixed compressed public key.
const PUB_KEY_ELEMENT_SIZE: usize = 1 + 33;

/// Length-prefixed 32-byte preimage.
const PREIMAGE_ELEMENT_SIZE: usize = 1 + 32;

/// `OP_IF <revoke> OP_ELSE <delay> OP_CSV OP_DROP <delay_key> OP_ENDIF OP_CHECKSIG` with a
/// 4-byte delay push.
pub const TO_LOCAL_SCRIPT_SIZE: usize = 1 + 34 + 1 + 5 + 1 + 1 + 34 + 1 + 1;

/// `<sig> <> <to_local script>`
pub const TO_LOCAL_TIMEOUT_WITNESS_SIZE: usize =
    1 + SIG_ELEMENT_SIZE + 1 + 1 + TO_LOCAL_SCRIPT_SIZE;

/// `<sig> 1 <to_local script>`
pub const TO_LOCAL_PENALTY_WITNESS_SIZE: usize =
    1 + SIG_ELEMENT_SIZE + 2 + 1 + TO_LOCAL_SCRIPT_SIZE;

/// `<sig> <pubkey>`
pub const P2WKH_WITNESS_SIZE: usize = 1 + SIG_ELEMENT_SIZE + PUB_KEY_ELEMENT_SIZE;

/// Push of the 22-byte P2WKH program in the signature script of a nested P2WKH input.
pub const NESTED_P2WKH_SIG_SCRIPT_SIZE: usize = 1 + 22;

/// `<key> OP_CHECKSIGVERIFY 1 OP_CSV`
pub const TO_REMOTE_CONFIRMED_SCRIPT_SIZE: usize = 34 + 1 + 1 + 1;

/// `<sig> <to_remote script>`
pub const TO_REMOTE_CONFIRMED_WITNESS_SIZE: usize =
    1 + SIG_ELEMENT_SIZE + 1 + TO_REMOTE_CONFIRMED_SCRIPT_SIZE;

/// `<key> OP_CHECKSIG OP_IFDUP OP_NOTIF 16 OP_CSV OP_ENDIF`
pub const ANCHOR_SCRIPT_SIZE: usize = 34 + 1 + 1 + 1 + 1 + 1 + 1;

/// `<sig> <anchor script>`
pub const ANCHOR_WITNESS_SIZE: usize = 1 + SIG_ELEMENT_SIZE + 1 + ANCHOR_SCRIPT_SIZE;

/// Offered HTLC script with the `1 OP_CSV OP_DROP` clause of anchor channels.
pub const OFFERED_HTLC_SCRIPT_SIZE: usize = 133 + 3;

/// Accepted HTLC script with a 4-byte CLTV push and the `1 OP_CSV OP_DROP` clause of anchor
/// channels.
pub const ACCEPTED_HTLC_SCRIPT_SIZE: usize = 140 + 3;

/// `<sig> <> <accepted htlc script>`
pub const ACCEPTED_HTLC_TIMEOUT_WITNESS_SIZE: usize =
    1 + SIG_ELEMENT_SIZE + 1 + 1 + ACCEPTED_HTLC_SCRIPT_SIZE;

/// `<sig> <revocation pubkey> <accepted htlc script>`
pub const ACCEPTED_HTLC_PENALTY_WITNESS_SIZE: usize =
    1 + SIG_ELEMENT_SIZE + PUB_KEY_ELEMENT_SIZE + 1 + ACCEPTED_HTLC_SCRIPT_SIZE;

/// `<sig> <preimage> <offered htlc script>`
pub const OFFERED_HTLC_SUCCESS_WITNESS_SIZE: usize =
    1 + SIG_ELEMENT_SIZE + PREIMAGE_ELEMENT_SIZE + 1 + OFFERED_HTLC_SCRIPT_SIZE;

/// `<sig> <revocation pubkey> <offered htlc script>`
pub const OFFERED_HTLC_PENALTY_WITNESS_SIZE: usize =
    1 + SIG_ELEMENT_SIZE + PUB_KEY_ELEMENT_SIZE + 1 + OFFERED_HTLC_SCRIPT_SIZE;

/// Upper bound of an HTLC success witness, `<sig> <preimage> <offered htlc script>`, whose
/// preimage is `preimage_len` bytes long.
pub fn htlc_success_witness_size(preimage_len: usize) -> WitnessSize {
    let preimage_element = VarInt(preimage_len as u64).size() + preimage_len;

    WitnessSize::witness(1 + SIG_ELEMENT_SIZE + preimage_element + 1 + OFFERED_HTLC_SCRIPT_SIZE)
}

/// Upper bound of the spending data of one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WitnessSize {
    /// Serialized witness size, including the element count.
    pub witness: usize,

    /// Whether the input also carries a [`NESTED_P2WKH_SIG_SCRIPT_SIZE`] signature script.
    pub nested_p2sh: bool,
}

impl WitnessSize {
    const fn witness(witness: usize) -> Self {
        Self {
            witness,
            nested_p2sh: false,
        }
    }
}

impl WitnessType {
    /// Returns an upper bound of the witness that spends an output of this type.
    ///
    /// For [`WitnessType::HtlcAcceptedRemoteSuccess`] the preimage is assumed to be 32 bytes;
    /// [`HtlcSucceedInput`](crate::input::HtlcSucceedInput) sizes its actual preimage through
    /// [`Input::witness_size`].
    pub const fn size_upper_bound(self) -> WitnessSize {
        match self {
            Self::CommitmentTimeLock
            | Self::HtlcOfferedTimeoutSecondLevel
            | Self::HtlcAcceptedSuccessSecondLevel => {
                WitnessSize::witness(TO_LOCAL_TIMEOUT_WITNESS_SIZE)
            }
            Self::CommitmentRevoke | Self::HtlcSecondLevelRevoke => {
                WitnessSize::witness(TO_LOCAL_PENALTY_WITNESS_SIZE)
            }
            Self::CommitmentNoDelay | Self::CommitSpendNoDelayTweakless | Self::WitnessKeyHash => {
                WitnessSize::witness(P2WKH_WITNESS_SIZE)
            }
            Self::NestedWitnessKeyHash => WitnessSize {
                witness: P2WKH_WITNESS_SIZE,
                nested_p2sh: true,
            },
            Self::CommitmentToRemoteConfirmed => {
                WitnessSize::witness(TO_REMOTE_CONFIRMED_WITNESS_SIZE)
            }
            Self::CommitmentAnchor => WitnessSize::witness(ANCHOR_WITNESS_SIZE),
            // The counterparty's commitment carries our offered HTLCs as accepted ones and
            // vice versa.
            Self::HtlcOfferedRevoke => WitnessSize::witness(ACCEPTED_HTLC_PENALTY_WITNESS_SIZE),
            Self::HtlcAcceptedRevoke => WitnessSize::witness(OFFERED_HTLC_PENALTY_WITNESS_SIZE),
            Self::HtlcOfferedRemoteTimeout => {
                WitnessSize::witness(ACCEPTED_HTLC_TIMEOUT_WITNESS_SIZE)
            }
            Self::HtlcAcceptedRemoteSuccess => {
                WitnessSize::witness(OFFERED_HTLC_SUCCESS_WITNESS_SIZE)
            }
        }
    }
}

/// Estimates the weight of a segwit transaction before it is signed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxWeightEstimator {
    has_witness: bool,
    input_count: usize,
    output_count: usize,
    input_size: usize,
    input_witness_size: usize,
    output_size: usize,
}

impl TxWeightEstimator {
    /// Creates an empty estimator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a segwit input whose witness serializes to `witness_size` bytes.
    pub fn add_witness_input(&mut self, witness_size: usize) -> &mut Self {
        self.input_size += INPUT_SIZE;
        self.input_witness_size += witness_size;
        self.input_count += 1;
        self.has_witness = true;

        self
    }

    /// Adds a P2WKH input nested in P2SH.
    pub fn add_nested_p2wkh_input(&mut self) -> &mut Self {
        self.input_size += INPUT_SIZE + NESTED_P2WKH_SIG_SCRIPT_SIZE;
        self.input_witness_size += P2WKH_WITNESS_SIZE;
        self.input_count += 1;
        self.has_witness = true;

        self
    }

    /// Adds `input` using the upper bound it reports through [`Input::witness_size`].
    pub fn add_input(&mut self, input: &dyn Input) -> &mut Self {
        let size = input.witness_size();
        if size.nested_p2sh {
            self.add_nested_p2wkh_input()
        } else {
            self.add_witness_input(size.witness)
        }
    }

    /// Adds an arbitrary output.
    pub fn add_output(&mut self, output: &TxOut) -> &mut Self {
        self.output_size += encode::serialize(output).len();
        self.output_count += 1;

        self
    }

    /// Adds a P2WKH output.
    pub fn add_p2wkh_output(&mut self) -> &mut Self {
        self.output_size += P2WKH_OUTPUT_SIZE;
        self.output_count += 1;

        self
    }

    /// Adds a P2WSH output.
    pub fn add_p2wsh_output(&mut self) -> &mut Self {
        self.output_size += P2WSH_OUTPUT_SIZE;
        self.output_count += 1;

        self
    }

    /// Adds a P2TR output.
    pub fn add_p2tr_output(&mut self) -> &mut Self {
        self.output_size += P2TR_OUTPUT_SIZE;
        self.output_count += 1;

        self
    }

    /// The estimated weight of the transaction.
    pub fn weight(&self) -> Weight {
        let base_size = BASE_TX_SIZE
            + VarInt(self.input_count as u64).size()
            + self.input_size
            + VarInt(self.output_count as u64).size()
            + self.output_size;

        let mut weight = base_size * 4;
        if self.has_witness {
            weight += WITNESS_HEADER_SIZE + self.input_witness_size;
        }

        Weight::from_wu(weight as u64)
    }

    /// The estimated virtual size of the transaction, rounded up.
    pub fn vsize(&self) -> u64 {
        self.weight().to_vbytes_ceil()
    }
}

impl From<&Transaction> for TxWeightEstimator {
    /// Estimates from the outputs of `tx` only; inputs must be added separately.
    fn from(tx: &Transaction) -> Self {
        let mut estimator = Self::new();
        for output in &tx.output {
            estimator.add_output(output);
        }

        estimator
    }
}
