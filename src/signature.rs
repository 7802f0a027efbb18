//! Signature and public key encoding rules, and ECDSA verification against
//! a transaction

use crate::error::{ConsensusError, Result, ScriptErrorCode};
use crate::interpreter::SignatureChecker;
use crate::script_flags::*;
use crate::transaction_hash::{signature_hash, PrecomputedTransactionData, SigHashType};
use crate::types::{Amount, Transaction};
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, VerifyOnly};
use std::sync::OnceLock;

/// Verification-only context shared by every checker. Verification does not
/// mutate the context, so one instance serves all threads.
static VERIFY_CONTEXT: OnceLock<Secp256k1<VerifyOnly>> = OnceLock::new();

fn verify_context() -> &'static Secp256k1<VerifyOnly> {
    VERIFY_CONTEXT.get_or_init(Secp256k1::verification_only)
}

/// Strict DER encoding of a signature followed by its hash type byte.
///
/// `0x30 [total-len] 0x02 [R-len] [R] 0x02 [S-len] [S] [sighash]`, with
/// minimal, positive R and S.
pub fn is_valid_signature_encoding(sig: &[u8]) -> bool {
    if sig.len() < 9 || sig.len() > 73 {
        return false;
    }
    if sig[0] != 0x30 || sig[1] as usize != sig.len() - 3 {
        return false;
    }

    let len_r = sig[3] as usize;
    if 5 + len_r >= sig.len() {
        return false;
    }
    let len_s = sig[5 + len_r] as usize;
    if len_r + len_s + 7 != sig.len() {
        return false;
    }

    // R
    if sig[2] != 0x02 || len_r == 0 || sig[4] & 0x80 != 0 {
        return false;
    }
    if len_r > 1 && sig[4] == 0x00 && sig[5] & 0x80 == 0 {
        return false;
    }

    // S
    let s = 6 + len_r;
    if sig[s - 2] != 0x02 || len_s == 0 || sig[s] & 0x80 != 0 {
        return false;
    }
    if len_s > 1 && sig[s] == 0x00 && sig[s + 1] & 0x80 == 0 {
        return false;
    }
    true
}

/// S is at most half the curve order. `sig` includes the hash type byte.
pub fn is_low_der_signature(sig: &[u8]) -> Result<()> {
    if !is_valid_signature_encoding(sig) {
        return Err(ConsensusError::script(ScriptErrorCode::SigDer));
    }
    let der = &sig[..sig.len() - 1];
    let Ok(parsed) = Signature::from_der_lax(der) else {
        return Err(ConsensusError::script(ScriptErrorCode::SigHighS));
    };
    let mut normalized = parsed;
    normalized.normalize_s();
    if normalized != parsed {
        return Err(ConsensusError::script(ScriptErrorCode::SigHighS));
    }
    Ok(())
}

/// Apply the DERSIG, LOW_S and STRICTENC rules to a signature. The empty
/// signature always passes so that a failed CHECKSIG can be forced cheaply.
pub fn check_signature_encoding(sig: &[u8], flags: u32) -> Result<()> {
    if sig.is_empty() {
        return Ok(());
    }
    if flags & (SCRIPT_VERIFY_DERSIG | SCRIPT_VERIFY_LOW_S | SCRIPT_VERIFY_STRICTENC) != 0
        && !is_valid_signature_encoding(sig)
    {
        return Err(ConsensusError::script(ScriptErrorCode::SigDer));
    }
    if flags & SCRIPT_VERIFY_LOW_S != 0 {
        is_low_der_signature(sig)?;
    }
    if flags & SCRIPT_VERIFY_STRICTENC != 0 && !SigHashType::from_signature(sig).is_defined() {
        return Err(ConsensusError::script(ScriptErrorCode::SigHashType));
    }
    Ok(())
}

fn is_compressed_pubkey(pubkey: &[u8]) -> bool {
    pubkey.len() == 33 && matches!(pubkey[0], 0x02 | 0x03)
}

fn is_compressed_or_uncompressed_pubkey(pubkey: &[u8]) -> bool {
    match pubkey.first() {
        Some(0x04) => pubkey.len() == 65,
        Some(0x02 | 0x03) => pubkey.len() == 33,
        _ => false,
    }
}

pub fn check_pubkey_encoding(pubkey: &[u8], flags: u32) -> Result<()> {
    if flags & SCRIPT_VERIFY_STRICTENC != 0 && !is_compressed_or_uncompressed_pubkey(pubkey) {
        return Err(ConsensusError::script(ScriptErrorCode::PubkeyType));
    }
    if flags & SCRIPT_VERIFY_COMPRESSED_PUBKEYTYPE != 0 && !is_compressed_pubkey(pubkey) {
        return Err(ConsensusError::script(ScriptErrorCode::PubkeyType));
    }
    Ok(())
}

/// Verify a DER signature (without hash type) over `digest`. High-S
/// signatures are normalized first; the LOW_S flag is what rejects them.
pub fn verify_ecdsa(pubkey: &[u8], der: &[u8], digest: [u8; 32]) -> bool {
    let Ok(pubkey) = PublicKey::from_slice(pubkey) else {
        return false;
    };
    let Ok(mut sig) = Signature::from_der_lax(der) else {
        return false;
    };
    sig.normalize_s();
    let msg = Message::from_digest(digest);
    verify_context().verify_ecdsa(&msg, &sig, &pubkey).is_ok()
}

/// Checks signatures for one input of a transaction.
pub struct TransactionSignatureChecker<'a> {
    tx: &'a Transaction,
    n_in: usize,
    amount: Amount,
    txdata: Option<&'a PrecomputedTransactionData>,
}

impl<'a> TransactionSignatureChecker<'a> {
    pub fn new(tx: &'a Transaction, n_in: usize, amount: Amount) -> Self {
        TransactionSignatureChecker {
            tx,
            n_in,
            amount,
            txdata: None,
        }
    }

    pub fn with_precomputed(
        tx: &'a Transaction,
        n_in: usize,
        amount: Amount,
        txdata: &'a PrecomputedTransactionData,
    ) -> Self {
        TransactionSignatureChecker {
            tx,
            n_in,
            amount,
            txdata: Some(txdata),
        }
    }
}

impl SignatureChecker for TransactionSignatureChecker<'_> {
    fn check_sig(&self, sig: &[u8], pubkey: &[u8], script_code: &[u8]) -> bool {
        let Some((_, der)) = sig.split_last() else {
            return false;
        };
        let sighash_type = SigHashType::from_signature(sig);
        let Ok(digest) = signature_hash(
            script_code,
            self.tx,
            self.n_in,
            sighash_type,
            self.amount,
            self.txdata,
        ) else {
            return false;
        };
        verify_ecdsa(pubkey, der, digest)
    }
}
