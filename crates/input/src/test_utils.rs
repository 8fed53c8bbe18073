//! Deterministic signer and spendable-output fixtures for tests.

use std::collections::HashMap;

use bitcoin::{
    absolute::LockTime,
    ecdsa,
    hashes::{sha256, Hash},
    transaction, Amount, EcdsaSighashType, OutPoint, ScriptBuf, Sequence, Transaction, TxIn,
    TxOut, Txid,
};
use secp256k1::{Message, PublicKey, SecretKey, SECP256K1};

use crate::{
    errors::SignError,
    keys::{
        derive_revocation_privkey, derive_revocation_pubkey, single_tweak_bytes,
        tweak_priv_key, tweak_pub_key,
    },
    script_utils::{
        commit_script_anchor, commit_script_to_remote_confirmed, commit_script_to_self,
        commit_script_unencumbered, receiver_htlc_script, sender_htlc_script,
        witness_script_hash,
    },
    sign_descriptor::{KeyDescriptor, KeyLocator, SignDescriptor},
    signer::{SignContext, Signer},
    witness_type::WitnessType,
};

/// CSV delay of the delayed outputs built by [`SpendFixture`].
pub const CSV_DELAY: u32 = 144;

/// CLTV expiry of the HTLC outputs built by [`SpendFixture`].
pub const CLTV_EXPIRY: u32 = 700_000;

/// Preimage of the payment hash committed to by the HTLC outputs built by [`SpendFixture`].
pub const PREIMAGE: [u8; 32] = [0x42; 32];

/// Value of the outputs built by [`SpendFixture`].
pub const OUTPUT_VALUE: Amount = Amount::from_sat(100_000);

/// Returns the secret key `[n; 32]`.
///
/// # Panics
///
/// If `n` is zero.
pub fn secret_key(n: u8) -> SecretKey {
    SecretKey::from_slice(&[n; 32]).expect("must be a valid scalar")
}

fn sweep_script() -> ScriptBuf {
    commit_script_unencumbered(&PublicKey::from_secret_key(SECP256K1, &secret_key(0xee)))
}

/// Creates a version 2 transaction with `inputs` unsigned inputs and one P2WKH output.
pub fn sweep_tx(inputs: usize) -> Transaction {
    Transaction {
        version: transaction::Version::TWO,
        lock_time: LockTime::ZERO,
        input: (0..inputs)
            .map(|i| TxIn {
                previous_output: OutPoint {
                    txid: Txid::from_byte_array([i as u8 + 1; 32]),
                    vout: i as u32,
                },
                sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
                ..Default::default()
            })
            .collect(),
        output: vec![TxOut {
            value: Amount::from_sat(10_000),
            script_pubkey: sweep_script(),
        }],
    }
}

/// A software [`Signer`] holding base secret keys, looked up by their public key.
///
/// Signatures are deterministic (RFC 6979), so crafting the same input twice yields the same
/// witness.
#[derive(Debug, Clone, Default)]
pub struct MockSigner {
    keys: HashMap<PublicKey, SecretKey>,
}

impl MockSigner {
    /// Creates a signer that holds `secrets`.
    pub fn new(secrets: impl IntoIterator<Item = SecretKey>) -> Self {
        let keys = secrets
            .into_iter()
            .map(|secret| (PublicKey::from_secret_key(SECP256K1, &secret), secret))
            .collect();

        Self { keys }
    }

    fn signing_key(&self, desc: &SignDescriptor) -> Result<SecretKey, SignError> {
        let locator = desc.key_desc.key_locator;
        let base = desc
            .key_desc
            .pub_key
            .and_then(|pub_key| self.keys.get(&pub_key))
            .ok_or(SignError::KeyNotFound {
                family: locator.family,
                index: locator.index,
            })?;

        let key = match (&desc.single_tweak, &desc.double_tweak) {
            (Some(tweak), _) => tweak_priv_key(base, tweak)?,
            (None, Some(commit_secret)) => derive_revocation_privkey(base, commit_secret)?,
            (None, None) => *base,
        };

        Ok(key)
    }
}

impl Signer for MockSigner {
    fn sign_output_raw(
        &self,
        tx: &Transaction,
        desc: &SignDescriptor,
        ctx: &SignContext<'_>,
    ) -> Result<ecdsa::Signature, SignError> {
        let key = self.signing_key(desc)?;
        let sighash = ctx.sighash(tx, desc)?;
        let message = Message::from_digest(sighash.to_byte_array());

        Ok(ecdsa::Signature {
            signature: SECP256K1.sign_ecdsa(&message, &key),
            sighash_type: desc.hash_type,
        })
    }
}

#[derive(Clone, Copy)]
enum KeyRole {
    Base,
    Tweaked,
    Revocation,
}

/// A spendable output of the given [`WitnessType`] together with everything needed to spend it.
///
/// Keys are derived from a seed so that fixtures built from different seeds share no key
/// material.
#[derive(Debug)]
pub struct SpendFixture {
    /// Signer holding the base secrets of the fixture.
    pub signer: MockSigner,

    /// Descriptor of the output.
    pub sign_desc: SignDescriptor,

    /// The output being spent.
    pub outpoint: OutPoint,

    /// Relative lock time the spend must carry.
    pub blocks_to_maturity: u32,

    /// Absolute lock time the spend must carry.
    pub lock_time: LockTime,
}

impl SpendFixture {
    /// Creates the fixture for `witness_type` with seed 1.
    pub fn new(witness_type: WitnessType) -> Self {
        Self::with_seed(witness_type, 1)
    }

    /// Creates the fixture for `witness_type`, deriving keys `seed..seed + 4`.
    ///
    /// # Panics
    ///
    /// If `seed` is zero or above 251.
    pub fn with_seed(witness_type: WitnessType, seed: u8) -> Self {
        let local_base = secret_key(seed);
        let revoke_base = secret_key(seed + 1);
        let commit_secret = secret_key(seed + 2);

        let local_base_key = PublicKey::from_secret_key(SECP256K1, &local_base);
        let revoke_base_key = PublicKey::from_secret_key(SECP256K1, &revoke_base);
        let commit_point = PublicKey::from_secret_key(SECP256K1, &commit_secret);
        let remote_key = PublicKey::from_secret_key(SECP256K1, &secret_key(seed + 3));

        let single_tweak = single_tweak_bytes(&commit_point, &local_base_key);
        let local_key = tweak_pub_key(&local_base_key, &single_tweak).expect("must tweak");
        let revoke_key =
            derive_revocation_pubkey(&revoke_base_key, &commit_point).expect("must derive");
        let payment_hash = sha256::Hash::hash(&PREIMAGE).to_byte_array();

        use WitnessType::*;
        let (role, witness_script, blocks_to_maturity, lock_time) = match witness_type {
            CommitmentTimeLock | HtlcOfferedTimeoutSecondLevel | HtlcAcceptedSuccessSecondLevel => (
                KeyRole::Tweaked,
                commit_script_to_self(CSV_DELAY, &local_key, &revoke_key),
                CSV_DELAY,
                LockTime::ZERO,
            ),
            CommitmentRevoke | HtlcSecondLevelRevoke => (
                KeyRole::Revocation,
                commit_script_to_self(CSV_DELAY, &local_key, &revoke_key),
                0,
                LockTime::ZERO,
            ),
            CommitmentNoDelay => (
                KeyRole::Tweaked,
                commit_script_unencumbered(&local_key),
                0,
                LockTime::ZERO,
            ),
            CommitSpendNoDelayTweakless | WitnessKeyHash | NestedWitnessKeyHash => (
                KeyRole::Base,
                commit_script_unencumbered(&local_base_key),
                0,
                LockTime::ZERO,
            ),
            CommitmentToRemoteConfirmed => (
                KeyRole::Base,
                commit_script_to_remote_confirmed(&local_base_key),
                1,
                LockTime::ZERO,
            ),
            CommitmentAnchor => (
                KeyRole::Base,
                commit_script_anchor(&local_base_key),
                0,
                LockTime::ZERO,
            ),
            // Our offered HTLC is an accepted HTLC on the counterparty's commitment and the
            // other way round.
            HtlcOfferedRevoke => (
                KeyRole::Revocation,
                receiver_htlc_script(
                    CLTV_EXPIRY,
                    &local_key,
                    &remote_key,
                    &revoke_key,
                    &payment_hash,
                    true,
                ),
                0,
                LockTime::ZERO,
            ),
            HtlcAcceptedRevoke => (
                KeyRole::Revocation,
                sender_htlc_script(&remote_key, &local_key, &revoke_key, &payment_hash, true),
                0,
                LockTime::ZERO,
            ),
            HtlcOfferedRemoteTimeout => (
                KeyRole::Tweaked,
                receiver_htlc_script(
                    CLTV_EXPIRY,
                    &local_key,
                    &remote_key,
                    &revoke_key,
                    &payment_hash,
                    true,
                ),
                1,
                LockTime::from_height(CLTV_EXPIRY).expect("must be a block height"),
            ),
            HtlcAcceptedRemoteSuccess => (
                KeyRole::Tweaked,
                sender_htlc_script(&remote_key, &local_key, &revoke_key, &payment_hash, true),
                1,
                LockTime::ZERO,
            ),
        };

        let script_pubkey = match witness_type {
            CommitmentNoDelay | CommitSpendNoDelayTweakless | WitnessKeyHash => {
                witness_script.clone()
            }
            NestedWitnessKeyHash => witness_script.to_p2sh(),
            _ => witness_script_hash(&witness_script),
        };

        let key_desc = match role {
            KeyRole::Base | KeyRole::Tweaked => KeyDescriptor {
                key_locator: KeyLocator {
                    family: 0,
                    index: u32::from(seed),
                },
                pub_key: Some(local_base_key),
            },
            KeyRole::Revocation => KeyDescriptor {
                key_locator: KeyLocator {
                    family: 5,
                    index: u32::from(seed),
                },
                pub_key: Some(revoke_base_key),
            },
        };

        let sign_desc = SignDescriptor {
            key_desc,
            single_tweak: matches!(role, KeyRole::Tweaked).then_some(single_tweak),
            double_tweak: matches!(role, KeyRole::Revocation).then_some(commit_secret),
            witness_script,
            output: TxOut {
                value: OUTPUT_VALUE,
                script_pubkey,
            },
            hash_type: EcdsaSighashType::All,
        };

        Self {
            signer: MockSigner::new([local_base, revoke_base]),
            sign_desc,
            outpoint: OutPoint {
                txid: Txid::from_byte_array([seed; 32]),
                vout: u32::from(seed),
            },
            blocks_to_maturity,
            lock_time,
        }
    }

    /// Creates an unsigned transaction that spends the fixture's output as its only input.
    pub fn spend_tx(&self) -> Transaction {
        Transaction {
            version: transaction::Version::TWO,
            lock_time: self.lock_time,
            input: vec![TxIn {
                previous_output: self.outpoint,
                sequence: Sequence(self.blocks_to_maturity),
                ..Default::default()
            }],
            output: vec![TxOut {
                value: OUTPUT_VALUE - Amount::from_sat(1_000),
                script_pubkey: sweep_script(),
            }],
        }
    }
}
