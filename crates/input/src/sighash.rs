//! Per-transaction signature hash cache shared by all inputs of a sweep transaction.
//!
//! Every input of a sweep transaction is signed with a segwit v0 signature hash. The parts of
//! the [BIP 143](https://github.com/bitcoin/bips/blob/master/bip-0143.mediawiki) digest that only
//! depend on the transaction are computed once by [`SighashCache`] and reused for every input.

use std::sync::{Mutex, PoisonError};

use bitcoin::{
    sighash::{SegwitV0Sighash, SighashCache},
    Amount, EcdsaSighashType, Script, Transaction, Txid,
};

use crate::errors::SighashError;

/// Signature hash cache of one transaction.
///
/// The cache remembers the txid it was built for. Witnesses are not part of the txid, so the
/// cache stays valid while the witnesses of the transaction are filled in one input at a time.
/// The inner cache is locked only while a digest is computed.
#[derive(Debug)]
pub struct TxSigHashes {
    txid: Txid,
    cache: Mutex<SighashCache<Transaction>>,
}

impl TxSigHashes {
    /// Creates the cache for `tx`.
    pub fn new(tx: &Transaction) -> Self {
        Self {
            txid: tx.compute_txid(),
            cache: Mutex::new(SighashCache::new(tx.clone())),
        }
    }

    /// The txid of the transaction this cache was built for.
    pub const fn txid(&self) -> Txid {
        self.txid
    }

    /// Checks that `input_index` names an input of `tx` and that this cache was built for `tx`.
    pub fn check(&self, tx: &Transaction, input_index: usize) -> Result<(), SighashError> {
        if input_index >= tx.input.len() {
            return Err(SighashError::InputIndexOutOfRange {
                index: input_index,
                inputs: tx.input.len(),
            });
        }

        let actual = tx.compute_txid();
        if actual != self.txid {
            return Err(SighashError::TxMismatch {
                expected: self.txid,
                actual,
            });
        }

        Ok(())
    }

    /// Computes the segwit v0 signature hash of input `input_index` of `tx`.
    ///
    /// `script_code` is committed as given: the witness script for P2WSH and the equivalent
    /// P2PKH script for P2WKH. `value` is the amount of the output being spent.
    pub fn segwit_v0_sighash(
        &self,
        tx: &Transaction,
        input_index: usize,
        script_code: &Script,
        value: Amount,
        sighash_type: EcdsaSighashType,
    ) -> Result<SegwitV0Sighash, SighashError> {
        self.check(tx, input_index)?;

        // The cache only memoizes hashes of the unsigned transaction, so a poisoned lock still
        // holds valid state.
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        cache
            .p2wsh_signature_hash(input_index, script_code, value, sighash_type)
            .map_err(|_| SighashError::InputIndexOutOfRange {
                index: input_index,
                inputs: tx.input.len(),
            })
    }
}
