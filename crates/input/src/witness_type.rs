//! The closed set of output categories a sweeper knows how to spend.

use std::fmt;

use arbitrary::Arbitrary;
use bitcoin::{ScriptBuf, Transaction};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{InputError, UnknownWitnessType},
    script_utils,
    sign_descriptor::SignDescriptor,
    signer::{Script, SignContext, Signer},
};

/// Identifies the witness required to spend an output.
///
/// Each variant maps to exactly one witness-generation strategy in
/// [`WitnessType::generate_witness`]. The numeric codes are persisted by callers and must never
/// be reassigned.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Arbitrary, Serialize, Deserialize,
)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum WitnessType {
    /// The delayed output of our own commitment transaction, spendable once the CSV delay has
    /// passed.
    CommitmentTimeLock = 0,

    /// The tweaked P2WKH `to_remote` output of the counterparty's commitment transaction.
    CommitmentNoDelay = 1,

    /// The delayed output of a revoked commitment transaction, swept with the revocation key.
    CommitmentRevoke = 2,

    /// An HTLC we offered on a revoked commitment transaction of the counterparty, swept with
    /// the revocation key. The output carries the counterparty's accepted HTLC script.
    HtlcOfferedRevoke = 3,

    /// An HTLC we accepted on a revoked commitment transaction of the counterparty, swept with
    /// the revocation key. The output carries the counterparty's offered HTLC script.
    HtlcAcceptedRevoke = 4,

    /// The delayed output of our second-level HTLC timeout transaction.
    HtlcOfferedTimeoutSecondLevel = 5,

    /// The delayed output of our second-level HTLC success transaction.
    HtlcAcceptedSuccessSecondLevel = 6,

    /// An HTLC we offered on the counterparty's commitment transaction, swept after its CLTV
    /// expiry.
    HtlcOfferedRemoteTimeout = 7,

    /// An HTLC offered to us on the counterparty's commitment transaction, redeemed with the
    /// payment preimage. Only [`HtlcSucceedInput`](crate::input::HtlcSucceedInput) can spend it.
    HtlcAcceptedRemoteSuccess = 8,

    /// The output of a revoked second-level HTLC transaction, swept with the revocation key.
    HtlcSecondLevelRevoke = 9,

    /// A plain P2WKH output.
    WitnessKeyHash = 10,

    /// A P2WKH output nested in P2SH.
    NestedWitnessKeyHash = 11,

    /// The untweaked P2WKH `to_remote` output of the counterparty's commitment transaction.
    CommitSpendNoDelayTweakless = 12,

    /// The `to_remote` output of an anchor channel, which carries a one block CSV delay.
    CommitmentToRemoteConfirmed = 13,

    /// Our own anchor output.
    CommitmentAnchor = 14,
}

impl WitnessType {
    /// Every witness type, in code order.
    pub const ALL: [WitnessType; 15] = [
        Self::CommitmentTimeLock,
        Self::CommitmentNoDelay,
        Self::CommitmentRevoke,
        Self::HtlcOfferedRevoke,
        Self::HtlcAcceptedRevoke,
        Self::HtlcOfferedTimeoutSecondLevel,
        Self::HtlcAcceptedSuccessSecondLevel,
        Self::HtlcOfferedRemoteTimeout,
        Self::HtlcAcceptedRemoteSuccess,
        Self::HtlcSecondLevelRevoke,
        Self::WitnessKeyHash,
        Self::NestedWitnessKeyHash,
        Self::CommitSpendNoDelayTweakless,
        Self::CommitmentToRemoteConfirmed,
        Self::CommitmentAnchor,
    ];

    /// Returns the persisted code of this witness type.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Stable, human readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CommitmentTimeLock => "commitment_time_lock",
            Self::CommitmentNoDelay => "commitment_no_delay",
            Self::CommitmentRevoke => "commitment_revoke",
            Self::HtlcOfferedRevoke => "htlc_offered_revoke",
            Self::HtlcAcceptedRevoke => "htlc_accepted_revoke",
            Self::HtlcOfferedTimeoutSecondLevel => "htlc_offered_timeout_second_level",
            Self::HtlcAcceptedSuccessSecondLevel => "htlc_accepted_success_second_level",
            Self::HtlcOfferedRemoteTimeout => "htlc_offered_remote_timeout",
            Self::HtlcAcceptedRemoteSuccess => "htlc_accepted_remote_success",
            Self::HtlcSecondLevelRevoke => "htlc_second_level_revoke",
            Self::WitnessKeyHash => "witness_key_hash",
            Self::NestedWitnessKeyHash => "nested_witness_key_hash",
            Self::CommitSpendNoDelayTweakless => "commit_spend_no_delay_tweakless",
            Self::CommitmentToRemoteConfirmed => "commitment_to_remote_confirmed",
            Self::CommitmentAnchor => "commitment_anchor",
        }
    }

    /// Generates the witness (and, for nested P2SH, the signature script) that spends input
    /// `ctx.input_index` of `tx`.
    ///
    /// [`WitnessType::HtlcAcceptedRemoteSuccess`] needs a preimage that this generic path does
    /// not carry and therefore fails with [`InputError::MissingPreimage`].
    pub fn generate_witness(
        self,
        signer: &dyn Signer,
        desc: &SignDescriptor,
        tx: &Transaction,
        ctx: &SignContext<'_>,
    ) -> Result<Script, InputError> {
        let witness = match self {
            Self::CommitmentTimeLock => script_utils::commit_spend_timeout(signer, desc, tx, ctx)?,
            Self::CommitmentNoDelay => {
                script_utils::commit_spend_no_delay(signer, desc, tx, ctx, false)?
            }
            Self::CommitSpendNoDelayTweakless => {
                script_utils::commit_spend_no_delay(signer, desc, tx, ctx, true)?
            }
            Self::CommitmentRevoke => script_utils::commit_spend_revoke(signer, desc, tx, ctx)?,
            Self::CommitmentToRemoteConfirmed => {
                script_utils::commit_spend_to_remote_confirmed(signer, desc, tx, ctx)?
            }
            Self::CommitmentAnchor => script_utils::commit_spend_anchor(signer, desc, tx, ctx)?,
            Self::HtlcOfferedRevoke => {
                script_utils::receiver_htlc_spend_revoke(signer, desc, tx, ctx)?
            }
            Self::HtlcAcceptedRevoke => {
                script_utils::sender_htlc_spend_revoke(signer, desc, tx, ctx)?
            }
            Self::HtlcOfferedTimeoutSecondLevel | Self::HtlcAcceptedSuccessSecondLevel => {
                script_utils::htlc_second_level_spend(signer, desc, tx, ctx)?
            }
            Self::HtlcOfferedRemoteTimeout => {
                script_utils::receiver_htlc_spend_timeout(signer, desc, tx, ctx)?
            }
            Self::HtlcSecondLevelRevoke => script_utils::htlc_spend_revoke(signer, desc, tx, ctx)?,
            Self::HtlcAcceptedRemoteSuccess => return Err(InputError::MissingPreimage),
            Self::WitnessKeyHash | Self::NestedWitnessKeyHash => {
                return Ok(signer.compute_input_script(tx, desc, ctx)?);
            }
        };

        Ok(Script {
            witness,
            sig_script: ScriptBuf::new(),
        })
    }
}

impl fmt::Display for WitnessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<WitnessType> for u16 {
    fn from(witness_type: WitnessType) -> Self {
        witness_type.code()
    }
}

impl TryFrom<u16> for WitnessType {
    type Error = UnknownWitnessType;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(UnknownWitnessType(code))
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::{consensus, transaction};
    use lnsweep_test_utils::ArbitraryGenerator;

    use super::*;
    use crate::{sighash::TxSigHashes, test_utils::SpendFixture};

    #[test]
    fn codes_are_stable() {
        for (index, witness_type) in WitnessType::ALL.into_iter().enumerate() {
            assert_eq!(usize::from(witness_type.code()), index);
            assert_eq!(WitnessType::try_from(witness_type.code()), Ok(witness_type));
        }

        assert_eq!(u16::from(WitnessType::CommitmentAnchor), 14);
        assert_eq!(WitnessType::try_from(15), Err(UnknownWitnessType(15)));
        assert_eq!(
            WitnessType::try_from(u16::MAX),
            Err(UnknownWitnessType(u16::MAX))
        );
    }

    #[test]
    fn display_uses_stable_names() {
        assert_eq!(
            WitnessType::HtlcAcceptedRemoteSuccess.to_string(),
            "htlc_accepted_remote_success"
        );
        assert_eq!(
            WitnessType::CommitSpendNoDelayTweakless.to_string(),
            "commit_spend_no_delay_tweakless"
        );
    }

    #[test]
    fn serde_uses_codes() {
        let json = serde_json::to_string(&WitnessType::HtlcOfferedRemoteTimeout).unwrap();
        assert_eq!(json, "7");

        let decoded: WitnessType = serde_json::from_str("12").unwrap();
        assert_eq!(decoded, WitnessType::CommitSpendNoDelayTweakless);

        assert!(serde_json::from_str::<WitnessType>("99").is_err());
    }

    #[test]
    fn arbitrary_witness_types_roundtrip_through_codes() {
        let mut generator = ArbitraryGenerator::new();

        for _ in 0..32 {
            let witness_type: WitnessType = generator.generate();
            assert_eq!(WitnessType::try_from(u16::from(witness_type)), Ok(witness_type));
        }
    }

    #[test]
    fn every_strategy_satisfies_its_script() {
        for witness_type in WitnessType::ALL {
            if witness_type == WitnessType::HtlcAcceptedRemoteSuccess {
                continue;
            }

            let fixture = SpendFixture::new(witness_type);
            let mut tx = fixture.spend_tx();
            let hashes = TxSigHashes::new(&tx);

            let script = witness_type
                .generate_witness(
                    &fixture.signer,
                    &fixture.sign_desc,
                    &tx,
                    &SignContext::new(&hashes, 0),
                )
                .unwrap_or_else(|err| panic!("{witness_type}: {err}"));

            assert_eq!(
                script.sig_script.is_empty(),
                witness_type != WitnessType::NestedWitnessKeyHash,
                "{witness_type}"
            );

            tx.input[0].witness = script.witness;
            tx.input[0].script_sig = script.sig_script;

            let output = &fixture.sign_desc.output;
            output
                .script_pubkey
                .verify(0, output.value, &consensus::serialize(&tx))
                .unwrap_or_else(|err| panic!("{witness_type}: {err}"));
        }
    }

    #[test]
    fn csv_strategies_need_version_two() {
        for witness_type in [
            WitnessType::CommitmentTimeLock,
            WitnessType::HtlcOfferedTimeoutSecondLevel,
            WitnessType::HtlcAcceptedSuccessSecondLevel,
        ] {
            let fixture = SpendFixture::new(witness_type);
            let mut tx = fixture.spend_tx();
            tx.version = transaction::Version::ONE;
            let hashes = TxSigHashes::new(&tx);

            let result = witness_type.generate_witness(
                &fixture.signer,
                &fixture.sign_desc,
                &tx,
                &SignContext::new(&hashes, 0),
            );

            assert!(
                matches!(result, Err(InputError::TxVersion { version: 1 })),
                "{witness_type}"
            );
        }
    }

    #[test]
    fn htlc_success_is_not_generic() {
        let fixture = SpendFixture::new(WitnessType::HtlcAcceptedRemoteSuccess);
        let tx = fixture.spend_tx();
        let hashes = TxSigHashes::new(&tx);

        let result = WitnessType::HtlcAcceptedRemoteSuccess.generate_witness(
            &fixture.signer,
            &fixture.sign_desc,
            &tx,
            &SignContext::new(&hashes, 0),
        );

        assert!(matches!(result, Err(InputError::MissingPreimage)));
    }
}
