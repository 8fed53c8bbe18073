//! Witness scripts of channel outputs and the witnesses that spend them.
//!
//! The scripts follow [BOLT 3](https://github.com/lightning/bolts/blob/master/03-transactions.md)
//! byte for byte. Every witness builder signs exactly once through the [`Signer`] and places the
//! signature, followed by its sighash-type byte, at the bottom of the stack.

use bitcoin::{
    hashes::{hash160, ripemd160, Hash},
    opcodes::all::{
        OP_CHECKMULTISIG, OP_CHECKSIG, OP_CHECKSIGVERIFY, OP_CLTV, OP_CSV, OP_DROP, OP_DUP,
        OP_ELSE, OP_ENDIF, OP_EQUAL, OP_EQUALVERIFY, OP_HASH160, OP_IF, OP_IFDUP, OP_NOTIF,
        OP_SIZE, OP_SWAP,
    },
    script::Builder,
    CompressedPublicKey, Script, ScriptBuf, Transaction, Witness,
};
use secp256k1::PublicKey;

use crate::{
    errors::InputError,
    sign_descriptor::SignDescriptor,
    signer::{SignContext, Signer},
    witness_type::WitnessType,
};

/// Size of a payment hash and of its preimage.
pub const PAYMENT_HASH_SIZE: usize = 32;

/// Creates the script of a `to_local` output, which is also the output script of second-level
/// HTLC transactions:
///
/// ```text
/// OP_IF
///     <revoke_key>
/// OP_ELSE
///     <csv_delay> OP_CSV OP_DROP
///     <delay_key>
/// OP_ENDIF
/// OP_CHECKSIG
/// ```
pub fn commit_script_to_self(
    csv_delay: u32,
    delay_key: &PublicKey,
    revoke_key: &PublicKey,
) -> ScriptBuf {
    Builder::new()
        .push_opcode(OP_IF)
        .push_slice(revoke_key.serialize())
        .push_opcode(OP_ELSE)
        .push_int(i64::from(csv_delay))
        .push_opcode(OP_CSV)
        .push_opcode(OP_DROP)
        .push_slice(delay_key.serialize())
        .push_opcode(OP_ENDIF)
        .push_opcode(OP_CHECKSIG)
        .into_script()
}

/// Creates the P2WKH script pubkey of a `to_remote` output without any encumbrance.
pub fn commit_script_unencumbered(key: &PublicKey) -> ScriptBuf {
    ScriptBuf::new_p2wpkh(&CompressedPublicKey(*key).wpubkey_hash())
}

/// Creates the script of a `to_remote` output of an anchor channel, which can only be spent
/// once the commitment transaction has confirmed:
///
/// ```text
/// <key> OP_CHECKSIGVERIFY 1 OP_CSV
/// ```
pub fn commit_script_to_remote_confirmed(key: &PublicKey) -> ScriptBuf {
    Builder::new()
        .push_slice(key.serialize())
        .push_opcode(OP_CHECKSIGVERIFY)
        .push_int(1)
        .push_opcode(OP_CSV)
        .into_script()
}

/// Creates the script of an anchor output. The owner can spend it right away, anyone can spend
/// it after 16 blocks:
///
/// ```text
/// <key> OP_CHECKSIG OP_IFDUP
/// OP_NOTIF
///     16 OP_CSV
/// OP_ENDIF
/// ```
pub fn commit_script_anchor(key: &PublicKey) -> ScriptBuf {
    Builder::new()
        .push_slice(key.serialize())
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_IFDUP)
        .push_opcode(OP_NOTIF)
        .push_int(16)
        .push_opcode(OP_CSV)
        .push_opcode(OP_ENDIF)
        .into_script()
}

/// Creates the script of an HTLC offered by `sender_key`:
///
/// ```text
/// OP_DUP OP_HASH160 <RIPEMD160(SHA256(revoke_key))> OP_EQUAL
/// OP_IF
///     OP_CHECKSIG
/// OP_ELSE
///     <receiver_key> OP_SWAP OP_SIZE 32 OP_EQUAL
///     OP_NOTIF
///         OP_DROP 2 OP_SWAP <sender_key> 2 OP_CHECKMULTISIG
///     OP_ELSE
///         OP_HASH160 <RIPEMD160(payment_hash)> OP_EQUALVERIFY
///         OP_CHECKSIG
///     OP_ENDIF
///     [1 OP_CSV OP_DROP]
/// OP_ENDIF
/// ```
///
/// The bracketed clause is only present if `confirmed_spend` is set.
pub fn sender_htlc_script(
    sender_key: &PublicKey,
    receiver_key: &PublicKey,
    revoke_key: &PublicKey,
    payment_hash: &[u8; PAYMENT_HASH_SIZE],
    confirmed_spend: bool,
) -> ScriptBuf {
    let builder = revocation_clause(revoke_key)
        .push_slice(receiver_key.serialize())
        .push_opcode(OP_SWAP)
        .push_opcode(OP_SIZE)
        .push_int(PAYMENT_HASH_SIZE as i64)
        .push_opcode(OP_EQUAL)
        .push_opcode(OP_NOTIF)
        .push_opcode(OP_DROP)
        .push_int(2)
        .push_opcode(OP_SWAP)
        .push_slice(sender_key.serialize())
        .push_int(2)
        .push_opcode(OP_CHECKMULTISIG)
        .push_opcode(OP_ELSE)
        .push_opcode(OP_HASH160)
        .push_slice(ripemd160::Hash::hash(payment_hash).to_byte_array())
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_ENDIF);

    confirmed_clause(builder, confirmed_spend)
        .push_opcode(OP_ENDIF)
        .into_script()
}

/// Creates the script of an HTLC accepted by `receiver_key`:
///
/// ```text
/// OP_DUP OP_HASH160 <RIPEMD160(SHA256(revoke_key))> OP_EQUAL
/// OP_IF
///     OP_CHECKSIG
/// OP_ELSE
///     <sender_key> OP_SWAP OP_SIZE 32 OP_EQUAL
///     OP_IF
///         OP_HASH160 <RIPEMD160(payment_hash)> OP_EQUALVERIFY
///         2 OP_SWAP <receiver_key> 2 OP_CHECKMULTISIG
///     OP_ELSE
///         OP_DROP <cltv_expiry> OP_CHECKLOCKTIMEVERIFY OP_DROP
///         OP_CHECKSIG
///     OP_ENDIF
///     [1 OP_CSV OP_DROP]
/// OP_ENDIF
/// ```
///
/// The bracketed clause is only present if `confirmed_spend` is set.
pub fn receiver_htlc_script(
    cltv_expiry: u32,
    sender_key: &PublicKey,
    receiver_key: &PublicKey,
    revoke_key: &PublicKey,
    payment_hash: &[u8; PAYMENT_HASH_SIZE],
    confirmed_spend: bool,
) -> ScriptBuf {
    let builder = revocation_clause(revoke_key)
        .push_slice(sender_key.serialize())
        .push_opcode(OP_SWAP)
        .push_opcode(OP_SIZE)
        .push_int(PAYMENT_HASH_SIZE as i64)
        .push_opcode(OP_EQUAL)
        .push_opcode(OP_IF)
        .push_opcode(OP_HASH160)
        .push_slice(ripemd160::Hash::hash(payment_hash).to_byte_array())
        .push_opcode(OP_EQUALVERIFY)
        .push_int(2)
        .push_opcode(OP_SWAP)
        .push_slice(receiver_key.serialize())
        .push_int(2)
        .push_opcode(OP_CHECKMULTISIG)
        .push_opcode(OP_ELSE)
        .push_opcode(OP_DROP)
        .push_int(i64::from(cltv_expiry))
        .push_opcode(OP_CLTV)
        .push_opcode(OP_DROP)
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_ENDIF);

    confirmed_clause(builder, confirmed_spend)
        .push_opcode(OP_ENDIF)
        .into_script()
}

/// Returns the P2WSH script pubkey that commits to `witness_script`.
pub fn witness_script_hash(witness_script: &Script) -> ScriptBuf {
    witness_script.to_p2wsh()
}

/// `OP_DUP OP_HASH160 <revocation hash> OP_EQUAL OP_IF OP_CHECKSIG OP_ELSE`
fn revocation_clause(revoke_key: &PublicKey) -> Builder {
    Builder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(hash160::Hash::hash(&revoke_key.serialize()).to_byte_array())
        .push_opcode(OP_EQUAL)
        .push_opcode(OP_IF)
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_ELSE)
}

fn confirmed_clause(builder: Builder, confirmed_spend: bool) -> Builder {
    if confirmed_spend {
        builder.push_int(1).push_opcode(OP_CSV).push_opcode(OP_DROP)
    } else {
        builder
    }
}

fn sign(
    signer: &dyn Signer,
    tx: &Transaction,
    desc: &SignDescriptor,
    ctx: &SignContext<'_>,
) -> Result<Vec<u8>, InputError> {
    Ok(signer.sign_output_raw(tx, desc, ctx)?.to_vec())
}

fn require_csv_version(tx: &Transaction) -> Result<(), InputError> {
    if tx.version.0 < 2 {
        return Err(InputError::TxVersion {
            version: tx.version.0,
        });
    }

    Ok(())
}

fn revocation_key(
    desc: &SignDescriptor,
    witness_type: WitnessType,
) -> Result<PublicKey, InputError> {
    if desc.key_desc.pub_key.is_none() {
        return Err(InputError::MissingPubKey(witness_type));
    }
    if desc.double_tweak.is_none() {
        return Err(InputError::MissingDoubleTweak(witness_type));
    }

    desc.revocation_pub_key()
        .map_err(InputError::InvalidTweak)?
        .ok_or(InputError::MissingDoubleTweak(witness_type))
}

/// Spends the delayed output of our own commitment transaction once the CSV delay has passed.
///
/// Witness: `<sig> <> <witness_script>`. The transaction must have version 2 or above.
pub fn commit_spend_timeout(
    signer: &dyn Signer,
    desc: &SignDescriptor,
    tx: &Transaction,
    ctx: &SignContext<'_>,
) -> Result<Witness, InputError> {
    require_csv_version(tx)?;
    let sig = sign(signer, tx, desc, ctx)?;

    Ok(Witness::from_slice::<&[u8]>(&[
        sig.as_slice(),
        &[],
        desc.witness_script.as_bytes(),
    ]))
}

/// Spends the delayed output of a revoked commitment transaction with the revocation key.
///
/// Witness: `<sig> 1 <witness_script>`.
pub fn commit_spend_revoke(
    signer: &dyn Signer,
    desc: &SignDescriptor,
    tx: &Transaction,
    ctx: &SignContext<'_>,
) -> Result<Witness, InputError> {
    let sig = sign(signer, tx, desc, ctx)?;

    Ok(Witness::from_slice::<&[u8]>(&[
        sig.as_slice(),
        &[1],
        desc.witness_script.as_bytes(),
    ]))
}

/// Spends the P2WKH `to_remote` output of the counterparty's commitment transaction.
///
/// Witness: `<sig> <pubkey>`. Unless `tweakless` is set, the revealed key is the descriptor's
/// key with the single tweak applied.
pub fn commit_spend_no_delay(
    signer: &dyn Signer,
    desc: &SignDescriptor,
    tx: &Transaction,
    ctx: &SignContext<'_>,
    tweakless: bool,
) -> Result<Witness, InputError> {
    let witness_type = if tweakless {
        WitnessType::CommitSpendNoDelayTweakless
    } else {
        WitnessType::CommitmentNoDelay
    };

    let pub_key = if tweakless {
        desc.key_desc.pub_key
    } else {
        desc.signing_pub_key().map_err(InputError::InvalidTweak)?
    }
    .ok_or(InputError::MissingPubKey(witness_type))?;

    let sig = sign(signer, tx, desc, ctx)?;

    Ok(Witness::from_slice::<&[u8]>(&[
        sig.as_slice(),
        pub_key.serialize().as_slice(),
    ]))
}

/// Spends the `to_remote` output of an anchor channel. The input must carry a sequence of at
/// least 1.
///
/// Witness: `<sig> <witness_script>`.
pub fn commit_spend_to_remote_confirmed(
    signer: &dyn Signer,
    desc: &SignDescriptor,
    tx: &Transaction,
    ctx: &SignContext<'_>,
) -> Result<Witness, InputError> {
    let sig = sign(signer, tx, desc, ctx)?;

    Ok(Witness::from_slice::<&[u8]>(&[
        sig.as_slice(),
        desc.witness_script.as_bytes(),
    ]))
}

/// Spends our own anchor output.
///
/// Witness: `<sig> <witness_script>`.
pub fn commit_spend_anchor(
    signer: &dyn Signer,
    desc: &SignDescriptor,
    tx: &Transaction,
    ctx: &SignContext<'_>,
) -> Result<Witness, InputError> {
    let sig = sign(signer, tx, desc, ctx)?;

    Ok(Witness::from_slice::<&[u8]>(&[
        sig.as_slice(),
        desc.witness_script.as_bytes(),
    ]))
}

/// Sweeps an HTLC offered by the owner of a revoked commitment transaction with the
/// revocation key. This is how [`WitnessType::HtlcAcceptedRevoke`] is spent.
///
/// Witness: `<sig> <revocation pubkey> <witness_script>`.
pub fn sender_htlc_spend_revoke(
    signer: &dyn Signer,
    desc: &SignDescriptor,
    tx: &Transaction,
    ctx: &SignContext<'_>,
) -> Result<Witness, InputError> {
    htlc_spend_with_revocation_key(signer, desc, tx, ctx, WitnessType::HtlcAcceptedRevoke)
}

/// Sweeps an HTLC accepted by the owner of a revoked commitment transaction with the
/// revocation key. This is how [`WitnessType::HtlcOfferedRevoke`] is spent.
///
/// Witness: `<sig> <revocation pubkey> <witness_script>`.
pub fn receiver_htlc_spend_revoke(
    signer: &dyn Signer,
    desc: &SignDescriptor,
    tx: &Transaction,
    ctx: &SignContext<'_>,
) -> Result<Witness, InputError> {
    htlc_spend_with_revocation_key(signer, desc, tx, ctx, WitnessType::HtlcOfferedRevoke)
}

fn htlc_spend_with_revocation_key(
    signer: &dyn Signer,
    desc: &SignDescriptor,
    tx: &Transaction,
    ctx: &SignContext<'_>,
    witness_type: WitnessType,
) -> Result<Witness, InputError> {
    let revoke_key = revocation_key(desc, witness_type)?;
    let sig = sign(signer, tx, desc, ctx)?;

    Ok(Witness::from_slice::<&[u8]>(&[
        sig.as_slice(),
        revoke_key.serialize().as_slice(),
        desc.witness_script.as_bytes(),
    ]))
}

/// Times out an HTLC we offered on the counterparty's commitment transaction.
///
/// The lock time of `tx` must already be at or past the CLTV expiry committed in the script.
///
/// Witness: `<sig> <> <witness_script>`.
pub fn receiver_htlc_spend_timeout(
    signer: &dyn Signer,
    desc: &SignDescriptor,
    tx: &Transaction,
    ctx: &SignContext<'_>,
) -> Result<Witness, InputError> {
    let sig = sign(signer, tx, desc, ctx)?;

    Ok(Witness::from_slice::<&[u8]>(&[
        sig.as_slice(),
        &[],
        desc.witness_script.as_bytes(),
    ]))
}

/// Redeems an HTLC offered to us on the counterparty's commitment transaction with the
/// payment preimage.
///
/// The preimage is placed on the stack as given; it is not checked against the payment hash.
///
/// Witness: `<sig> <preimage> <witness_script>`.
pub fn sender_htlc_spend_redeem(
    signer: &dyn Signer,
    desc: &SignDescriptor,
    tx: &Transaction,
    ctx: &SignContext<'_>,
    preimage: &[u8],
) -> Result<Witness, InputError> {
    let sig = sign(signer, tx, desc, ctx)?;

    Ok(Witness::from_slice::<&[u8]>(&[
        sig.as_slice(),
        preimage,
        desc.witness_script.as_bytes(),
    ]))
}

/// Sweeps the output of one of our second-level HTLC transactions once its CSV delay has
/// passed.
///
/// Witness: `<sig> <> <witness_script>`. The transaction must have version 2 or above.
pub fn htlc_second_level_spend(
    signer: &dyn Signer,
    desc: &SignDescriptor,
    tx: &Transaction,
    ctx: &SignContext<'_>,
) -> Result<Witness, InputError> {
    require_csv_version(tx)?;
    let sig = sign(signer, tx, desc, ctx)?;

    Ok(Witness::from_slice::<&[u8]>(&[
        sig.as_slice(),
        &[],
        desc.witness_script.as_bytes(),
    ]))
}

/// Sweeps the output of a revoked second-level HTLC transaction with the revocation key.
///
/// Witness: `<sig> 1 <witness_script>`.
pub fn htlc_spend_revoke(
    signer: &dyn Signer,
    desc: &SignDescriptor,
    tx: &Transaction,
    ctx: &SignContext<'_>,
) -> Result<Witness, InputError> {
    let sig = sign(signer, tx, desc, ctx)?;

    Ok(Witness::from_slice::<&[u8]>(&[
        sig.as_slice(),
        &[1],
        desc.witness_script.as_bytes(),
    ]))
}

#[cfg(test)]
mod tests {
    use bitcoin::{
        absolute::LockTime, consensus, hashes::sha256, opcodes::all::OP_PUSHNUM_16,
        script::Instruction, transaction, Amount, EcdsaSighashType, Sequence, TxOut,
    };
    use secp256k1::SECP256K1;

    use super::*;
    use crate::{
        keys::derive_revocation_pubkey,
        sighash::TxSigHashes,
        sign_descriptor::KeyDescriptor,
        test_utils::{secret_key, sweep_tx, MockSigner},
    };

    fn key(n: u8) -> PublicKey {
        PublicKey::from_secret_key(SECP256K1, &secret_key(n))
    }

    fn p2wsh_descriptor(pub_key: PublicKey, witness_script: ScriptBuf) -> SignDescriptor {
        SignDescriptor {
            key_desc: KeyDescriptor::from_pub_key(pub_key),
            single_tweak: None,
            double_tweak: None,
            output: TxOut {
                value: Amount::from_sat(20_000),
                script_pubkey: witness_script_hash(&witness_script),
            },
            witness_script,
            hash_type: EcdsaSighashType::All,
        }
    }

    fn verifies(tx: &Transaction, desc: &SignDescriptor) -> bool {
        desc.output
            .script_pubkey
            .verify(0, desc.output.value, &consensus::serialize(tx))
            .is_ok()
    }

    #[test]
    fn script_sizes() {
        let payment_hash = [0x11; 32];

        assert_eq!(commit_script_to_self(144, &key(1), &key(2)).len(), 77);
        assert_eq!(commit_script_unencumbered(&key(1)).len(), 22);
        assert_eq!(commit_script_to_remote_confirmed(&key(1)).len(), 37);
        assert_eq!(commit_script_anchor(&key(1)).len(), 40);

        assert_eq!(
            sender_htlc_script(&key(1), &key(2), &key(3), &payment_hash, false).len(),
            133
        );
        assert_eq!(
            sender_htlc_script(&key(1), &key(2), &key(3), &payment_hash, true).len(),
            136
        );

        // 3-byte CLTV push.
        assert_eq!(
            receiver_htlc_script(500_000, &key(1), &key(2), &key(3), &payment_hash, false).len(),
            139
        );
        assert_eq!(
            receiver_htlc_script(500_000, &key(1), &key(2), &key(3), &payment_hash, true).len(),
            142
        );
    }

    #[test]
    fn anchor_script_layout() {
        let key = key(5);
        let script = commit_script_anchor(&key);

        let instructions = script
            .instructions()
            .collect::<Result<Vec<_>, _>>()
            .expect("anchor script must parse");

        assert_eq!(instructions.len(), 7);
        assert_eq!(
            instructions[0].push_bytes().map(|bytes| bytes.as_bytes()),
            Some(&key.serialize()[..])
        );
        assert_eq!(instructions[4], Instruction::Op(OP_PUSHNUM_16));
        assert_eq!(instructions[6], Instruction::Op(OP_ENDIF));
    }

    #[test]
    fn htlc_scripts_commit_to_payment_hash() {
        let preimage = [0x42; 32];
        let payment_hash = sha256::Hash::hash(&preimage).to_byte_array();
        let committed = ripemd160::Hash::hash(&payment_hash).to_byte_array();

        let offered = sender_htlc_script(&key(1), &key(2), &key(3), &payment_hash, false);
        let accepted = receiver_htlc_script(100, &key(1), &key(2), &key(3), &payment_hash, false);

        for script in [offered, accepted] {
            assert!(script
                .as_bytes()
                .windows(committed.len())
                .any(|window| window == committed));
        }
    }

    #[test]
    fn timeout_rejects_version_one() {
        let desc = p2wsh_descriptor(key(1), commit_script_to_self(144, &key(1), &key(2)));
        let signer = MockSigner::new([secret_key(1)]);

        let mut tx = sweep_tx(1);
        tx.version = transaction::Version::ONE;
        let hashes = TxSigHashes::new(&tx);
        let ctx = SignContext::new(&hashes, 0);

        assert!(matches!(
            commit_spend_timeout(&signer, &desc, &tx, &ctx),
            Err(InputError::TxVersion { version: 1 })
        ));
        assert!(matches!(
            htlc_second_level_spend(&signer, &desc, &tx, &ctx),
            Err(InputError::TxVersion { version: 1 })
        ));
    }

    #[test]
    fn revocation_spend_requires_double_tweak() {
        let desc = p2wsh_descriptor(
            key(2),
            sender_htlc_script(&key(1), &key(2), &key(3), &[0; 32], false),
        );
        let signer = MockSigner::new([secret_key(2)]);

        let tx = sweep_tx(1);
        let hashes = TxSigHashes::new(&tx);
        let ctx = SignContext::new(&hashes, 0);

        assert!(matches!(
            sender_htlc_spend_revoke(&signer, &desc, &tx, &ctx),
            Err(InputError::MissingDoubleTweak(WitnessType::HtlcAcceptedRevoke))
        ));

        let mut desc = desc;
        desc.key_desc.pub_key = None;
        assert!(matches!(
            receiver_htlc_spend_revoke(&signer, &desc, &tx, &ctx),
            Err(InputError::MissingPubKey(WitnessType::HtlcOfferedRevoke))
        ));
    }

    #[test]
    fn offered_htlc_revocation_spend_verifies() {
        let revoke_base = secret_key(2);
        let commit_secret = secret_key(3);
        let commit_point = PublicKey::from_secret_key(SECP256K1, &commit_secret);
        let revoke_key = derive_revocation_pubkey(&key(2), &commit_point).unwrap();

        let script = sender_htlc_script(&key(1), &key(4), &revoke_key, &[0x07; 32], true);
        let mut desc = p2wsh_descriptor(key(2), script);
        desc.double_tweak = Some(commit_secret);
        let signer = MockSigner::new([revoke_base]);

        let mut tx = sweep_tx(1);
        let hashes = TxSigHashes::new(&tx);
        let witness =
            sender_htlc_spend_revoke(&signer, &desc, &tx, &SignContext::new(&hashes, 0)).unwrap();

        assert_eq!(&witness[1], &revoke_key.serialize()[..]);

        tx.input[0].witness = witness;
        assert!(
            verifies(&tx, &desc),
            "revocation spend must satisfy the offered htlc script"
        );
    }

    #[test]
    fn accepted_htlc_timeout_needs_lock_time() {
        let cltv_expiry = 700_000;
        let script =
            receiver_htlc_script(cltv_expiry, &key(1), &key(4), &key(5), &[0x07; 32], false);
        let desc = p2wsh_descriptor(key(1), script);
        let signer = MockSigner::new([secret_key(1)]);

        // Too early: lock time below the expiry.
        let mut early = sweep_tx(1);
        early.lock_time = LockTime::from_height(cltv_expiry - 1).unwrap();
        early.input[0].sequence = Sequence::ZERO;
        let hashes = TxSigHashes::new(&early);
        early.input[0].witness =
            receiver_htlc_spend_timeout(&signer, &desc, &early, &SignContext::new(&hashes, 0))
                .unwrap();
        assert!(!verifies(&early, &desc));

        let mut tx = sweep_tx(1);
        tx.lock_time = LockTime::from_height(cltv_expiry).unwrap();
        tx.input[0].sequence = Sequence::ZERO;
        let hashes = TxSigHashes::new(&tx);
        tx.input[0].witness =
            receiver_htlc_spend_timeout(&signer, &desc, &tx, &SignContext::new(&hashes, 0))
                .unwrap();
        assert!(
            verifies(&tx, &desc),
            "timeout spend must satisfy the accepted htlc script"
        );
    }

    #[test]
    fn offered_htlc_redeem_verifies_only_with_matching_preimage() {
        let preimage = [0x42; 32];
        let payment_hash = sha256::Hash::hash(&preimage).to_byte_array();
        let script = sender_htlc_script(&key(4), &key(1), &key(5), &payment_hash, false);
        let desc = p2wsh_descriptor(key(1), script);
        let signer = MockSigner::new([secret_key(1)]);

        let mut tx = sweep_tx(1);
        let hashes = TxSigHashes::new(&tx);
        let ctx = SignContext::new(&hashes, 0);

        tx.input[0].witness =
            sender_htlc_spend_redeem(&signer, &desc, &tx, &ctx, &preimage).unwrap();
        assert!(verifies(&tx, &desc), "redeem with the right preimage must verify");

        let wrong = [0x43; 32];
        let witness = sender_htlc_spend_redeem(&signer, &desc, &tx, &ctx, &wrong).unwrap();
        assert_eq!(&witness[1], &wrong[..]);

        tx.input[0].witness = witness;
        assert!(!verifies(&tx, &desc));
    }
}
