//! Per-commitment key tweaking as defined in
//! [BOLT 3](https://github.com/lightning/bolts/blob/master/03-transactions.md#key-derivation).
//!
//! Sign descriptors reference a *base* key and carry the tweak that turns it into the key that
//! actually appears in the output script. These functions are the arithmetic behind those
//! tweaks; signers apply them to secret keys, the witness builders apply them to public keys.

use bitcoin::hashes::{sha256, Hash, HashEngine};
use secp256k1::{PublicKey, Scalar, SecretKey, SECP256K1};

/// Computes `SHA256(first || second)` over the compressed encodings of both points.
fn hash_points(first: &PublicKey, second: &PublicKey) -> [u8; 32] {
    let mut engine = sha256::Hash::engine();
    engine.input(&first.serialize());
    engine.input(&second.serialize());

    sha256::Hash::from_engine(engine).to_byte_array()
}

fn to_scalar(bytes: [u8; 32]) -> Result<Scalar, secp256k1::Error> {
    Scalar::from_be_bytes(bytes).map_err(|_| secp256k1::Error::InvalidTweak)
}

/// Computes the single tweak `SHA256(commit_point || base_point)` that is stored in a
/// [`SignDescriptor`](crate::sign_descriptor::SignDescriptor).
pub fn single_tweak_bytes(commit_point: &PublicKey, base_point: &PublicKey) -> [u8; 32] {
    hash_points(commit_point, base_point)
}

/// Tweaks a base point: `base_point + single_tweak * G`.
pub fn tweak_pub_key(
    base_point: &PublicKey,
    single_tweak: &[u8; 32],
) -> Result<PublicKey, secp256k1::Error> {
    base_point.add_exp_tweak(SECP256K1, &to_scalar(*single_tweak)?)
}

/// Tweaks a base secret: `base_secret + single_tweak`.
///
/// This is the private counterpart of [`tweak_pub_key`].
pub fn tweak_priv_key(
    base_secret: &SecretKey,
    single_tweak: &[u8; 32],
) -> Result<SecretKey, secp256k1::Error> {
    base_secret.add_tweak(&to_scalar(*single_tweak)?)
}

/// Derives the revocation public key from the revocation base point and the per-commitment
/// point:
///
/// ```text
/// revocation_base * SHA256(revocation_base || commit_point)
///     + commit_point * SHA256(commit_point || revocation_base)
/// ```
pub fn derive_revocation_pubkey(
    revoke_base: &PublicKey,
    commit_point: &PublicKey,
) -> Result<PublicKey, secp256k1::Error> {
    let revoke_tweak = to_scalar(hash_points(revoke_base, commit_point))?;
    let commit_tweak = to_scalar(hash_points(commit_point, revoke_base))?;

    let revoke_part = revoke_base.mul_tweak(SECP256K1, &revoke_tweak)?;
    let commit_part = commit_point.mul_tweak(SECP256K1, &commit_tweak)?;

    revoke_part.combine(&commit_part)
}

/// Derives the revocation secret key from the revocation base secret and the revealed
/// per-commitment secret.
///
/// This is the private counterpart of [`derive_revocation_pubkey`]. Only the party that learns
/// the per-commitment secret of a revoked state can compute it.
pub fn derive_revocation_privkey(
    revoke_base_secret: &SecretKey,
    commit_secret: &SecretKey,
) -> Result<SecretKey, secp256k1::Error> {
    let revoke_base = PublicKey::from_secret_key(SECP256K1, revoke_base_secret);
    let commit_point = PublicKey::from_secret_key(SECP256K1, commit_secret);

    let revoke_tweak = to_scalar(hash_points(&revoke_base, &commit_point))?;
    let commit_tweak = to_scalar(hash_points(&commit_point, &revoke_base))?;

    let revoke_part = revoke_base_secret.mul_tweak(&revoke_tweak)?;
    let commit_part = commit_secret.mul_tweak(&commit_tweak)?;

    revoke_part.add_tweak(&Scalar::from(commit_part))
}
