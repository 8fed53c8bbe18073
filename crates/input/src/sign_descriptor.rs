//! The [`SignDescriptor`] describes how to produce a signature for one output.

use bitcoin::{EcdsaSighashType, ScriptBuf, TxOut};
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use serde::{Deserialize, Serialize};

use crate::keys::{derive_revocation_pubkey, tweak_pub_key};

/// Locates a key inside the signer's key hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyLocator {
    /// The key family, i.e. the purpose the key is used for.
    pub family: u32,

    /// Index of the key within its family.
    pub index: u32,
}

/// Reference to a key held by the signer.
///
/// The signer may locate the key either by its [`KeyLocator`] or by its public key. The public
/// key is mandatory for witnesses that have to reveal it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyDescriptor {
    /// Where the key lives in the signer's hierarchy.
    pub key_locator: KeyLocator,

    /// The *untweaked* public key.
    pub pub_key: Option<PublicKey>,
}

impl KeyDescriptor {
    /// Creates a descriptor that references a key only by its public key.
    pub const fn from_pub_key(pub_key: PublicKey) -> Self {
        Self {
            key_locator: KeyLocator {
                family: 0,
                index: 0,
            },
            pub_key: Some(pub_key),
        }
    }
}

/// All the information a [`Signer`](crate::signer::Signer) needs to sign for one output.
///
/// The descriptor is pure data: it says *which* key signs, *what* script is being satisfied and
/// *how much* the output is worth. Which transaction and which input index are signed is not
/// part of the descriptor; that is supplied per call through a
/// [`SignContext`](crate::signer::SignContext).
///
/// # Tweaks
///
/// At most one of [`Self::single_tweak`] and [`Self::double_tweak`] is expected to be set:
///
/// - `single_tweak` turns the base key into a per-commitment key, see
///   [`tweak_pub_key`](crate::keys::tweak_pub_key).
/// - `double_tweak` is the per-commitment secret of a revoked state and turns the revocation base
///   key into the revocation key, see
///   [`derive_revocation_pubkey`](crate::keys::derive_revocation_pubkey).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignDescriptor {
    /// The base key that signs.
    pub key_desc: KeyDescriptor,

    /// Additive tweak applied to the base key.
    pub single_tweak: Option<[u8; 32]>,

    /// Per-commitment secret used to derive a revocation key from the base key.
    pub double_tweak: Option<SecretKey>,

    /// The script being satisfied: the witness script of a P2WSH output, or the P2WKH script
    /// pubkey for key-hash outputs.
    pub witness_script: ScriptBuf,

    /// The output being spent; its value commits to the signature hash.
    pub output: TxOut,

    /// Signature hash type of the signature.
    pub hash_type: EcdsaSighashType,
}

impl SignDescriptor {
    /// Returns the script code committed to by the segwit v0 signature hash.
    ///
    /// For P2WKH the script code is the corresponding P2PKH script, for everything else it is
    /// the witness script itself.
    pub fn script_code(&self) -> ScriptBuf {
        self.witness_script
            .p2wpkh_script_code()
            .unwrap_or_else(|| self.witness_script.clone())
    }

    /// Returns the public key that verifies the signature, with the single tweak applied.
    ///
    /// Returns `Ok(None)` if the descriptor carries no public key.
    pub fn signing_pub_key(&self) -> Result<Option<PublicKey>, secp256k1::Error> {
        let Some(pub_key) = self.key_desc.pub_key else {
            return Ok(None);
        };

        match &self.single_tweak {
            Some(tweak) => tweak_pub_key(&pub_key, tweak).map(Some),
            None => Ok(Some(pub_key)),
        }
    }

    /// Returns the revocation public key derived from the base key and the double tweak.
    ///
    /// Returns `Ok(None)` if either of them is missing.
    pub fn revocation_pub_key(&self) -> Result<Option<PublicKey>, secp256k1::Error> {
        let (Some(base), Some(commit_secret)) = (self.key_desc.pub_key, self.double_tweak) else {
            return Ok(None);
        };
        let commit_point = PublicKey::from_secret_key(SECP256K1, &commit_secret);

        derive_revocation_pubkey(&base, &commit_point).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::{Amount, CompressedPublicKey};

    use super::*;
    use crate::{keys::single_tweak_bytes, test_utils::secret_key};

    fn descriptor(pub_key: PublicKey, witness_script: ScriptBuf) -> SignDescriptor {
        SignDescriptor {
            key_desc: KeyDescriptor::from_pub_key(pub_key),
            single_tweak: None,
            double_tweak: None,
            output: TxOut {
                value: Amount::from_sat(100_000),
                script_pubkey: witness_script.to_p2wsh(),
            },
            witness_script,
            hash_type: EcdsaSighashType::All,
        }
    }

    #[test]
    fn script_code_of_key_hash_is_p2pkh() {
        let pub_key = PublicKey::from_secret_key(SECP256K1, &secret_key(1));
        let wpkh = CompressedPublicKey(pub_key).wpubkey_hash();
        let desc = descriptor(pub_key, ScriptBuf::new_p2wpkh(&wpkh));

        let script_code = desc.script_code();

        assert!(script_code.is_p2pkh());
        assert_eq!(
            script_code,
            ScriptBuf::new_p2pkh(&CompressedPublicKey(pub_key).pubkey_hash())
        );
    }

    #[test]
    fn script_code_of_witness_script_is_itself() {
        let pub_key = PublicKey::from_secret_key(SECP256K1, &secret_key(1));
        let script = crate::script_utils::commit_script_anchor(&pub_key);
        let desc = descriptor(pub_key, script.clone());

        assert_eq!(desc.script_code(), script);
    }

    #[test]
    fn signing_pub_key_applies_single_tweak() {
        let base = PublicKey::from_secret_key(SECP256K1, &secret_key(1));
        let commit_point = PublicKey::from_secret_key(SECP256K1, &secret_key(2));
        let mut desc = descriptor(base, ScriptBuf::new());

        assert_eq!(desc.signing_pub_key().unwrap(), Some(base));

        let tweak = single_tweak_bytes(&commit_point, &base);
        desc.single_tweak = Some(tweak);
        assert_eq!(
            desc.signing_pub_key().unwrap(),
            Some(tweak_pub_key(&base, &tweak).unwrap())
        );

        desc.key_desc.pub_key = None;
        assert_eq!(desc.signing_pub_key().unwrap(), None);
    }

    #[test]
    fn revocation_pub_key_requires_double_tweak() {
        let base = PublicKey::from_secret_key(SECP256K1, &secret_key(1));
        let mut desc = descriptor(base, ScriptBuf::new());
        assert_eq!(desc.revocation_pub_key().unwrap(), None);

        let commit_secret = secret_key(2);
        desc.double_tweak = Some(commit_secret);
        let commit_point = PublicKey::from_secret_key(SECP256K1, &commit_secret);

        assert_eq!(
            desc.revocation_pub_key().unwrap(),
            Some(derive_revocation_pubkey(&base, &commit_point).unwrap())
        );
    }

    #[test]
    fn serde_roundtrip_keeps_tweaks() {
        let base = PublicKey::from_secret_key(SECP256K1, &secret_key(7));
        let mut desc = descriptor(base, crate::script_utils::commit_script_anchor(&base));
        desc.key_desc.key_locator = KeyLocator {
            family: 3,
            index: 42,
        };
        desc.double_tweak = Some(secret_key(9));
        desc.hash_type = EcdsaSighashType::SinglePlusAnyoneCanPay;

        let json = serde_json::to_string(&desc).unwrap();
        let decoded: SignDescriptor = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, desc);
    }
}
