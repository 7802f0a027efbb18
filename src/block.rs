//! Block hashing and merkle commitment

use crate::crypto::hash256;
use crate::error::{ConsensusError, Result};
use crate::serialization::block::serialize_block_header;
use crate::transaction::txid;
use crate::types::*;

/// Double SHA256 of the 80-byte header, in internal byte order.
///
/// This is not the Novo block id and must not be passed to
/// [`crate::pow::check_proof_of_work`]: Novo headers are identified by a
/// different hash, so known block ids live in
/// [`crate::chainparams::ChainParams`] as constants.
pub fn header_sha256d(header: &BlockHeader) -> Hash {
    hash256(&serialize_block_header(header))
}

/// Merkle root over `txids`, duplicating the last hash of every odd level.
///
/// The flag reports two identical adjacent hashes on some level. Such a tree
/// has the same root as a different transaction list (CVE-2012-2459), so a
/// block whose tree is mutated must be rejected without marking its header
/// invalid. An empty list has the zero root.
pub fn compute_merkle_root(txids: &[Hash]) -> (Hash, bool) {
    if txids.is_empty() {
        return ([0u8; 32], false);
    }
    let mut level = txids.to_vec();
    let mut mutated = false;

    while level.len() > 1 {
        mutated |= level.chunks_exact(2).any(|pair| pair[0] == pair[1]);

        if level.len() % 2 == 1 {
            level.push(level[level.len() - 1]);
        }

        let mut combined = [0u8; 64];
        level = level
            .chunks_exact(2)
            .map(|pair| {
                combined[..32].copy_from_slice(&pair[0]);
                combined[32..].copy_from_slice(&pair[1]);
                hash256(&combined)
            })
            .collect();
    }
    (level[0], mutated)
}

/// Merkle root over the transaction ids of `block`.
pub fn block_merkle_root(block: &Block) -> (Hash, bool) {
    let txids: Vec<Hash> = block.transactions.iter().map(txid).collect();
    compute_merkle_root(&txids)
}

#[cold]
fn make_block_error(reason: &'static str) -> ConsensusError {
    ConsensusError::BlockValidation(reason.into())
}

/// Check that the header commits to the block's transactions.
pub fn check_merkle_root(block: &Block) -> Result<()> {
    let (root, mutated) = block_merkle_root(block);
    if root != block.header.merkle_root {
        return Err(make_block_error("bad-txnmrklroot"));
    }
    if mutated {
        return Err(make_block_error("bad-txns-duplicate"));
    }
    Ok(())
}
