//! Signature operation counting
//!
//! Sigops are counted statically from script bytes to bound the signature
//! checking work a block can demand. Counting never executes a script.
//!
//! A multisig count the counter cannot read exactly is reported as an error,
//! never guessed.

use crate::opcodes::*;
use crate::script::get_op;
use crate::script_num::ScriptNum;
use crate::types::*;

/// Longest push accepted as a multisig key count.
const MAX_KEY_COUNT_PUSH: usize = 4;

/// Count of a CHECKMULTISIG from the instruction preceding it, or `None` when
/// that instruction is a push that is not a valid non-negative 4-byte number.
///
/// OP_1NEGATE carries no operand and counts as 0 like any other non-push.
fn multisig_key_count(prev: Option<(Opcode, &[u8])>) -> Option<u64> {
    match prev {
        Some((Opcode::PushNum(n), _)) => Some(n as u64),
        Some((
            Opcode::PushEmpty
            | Opcode::PushBytes(_)
            | Opcode::PushData1
            | Opcode::PushData2
            | Opcode::PushData4,
            data,
        )) => {
            let n = ScriptNum::from_bytes(data, true, MAX_KEY_COUNT_PUSH).ok()?;
            if n.is_negative() {
                return None;
            }
            Some(n.to_i64_saturating() as u64)
        }
        _ => Some(0),
    }
}

/// Count sigops in `script`. The flag is `true` when the count cannot be
/// trusted; the count is then 0.
///
/// A truncated push or an OP_INVALIDOPCODE byte ends the walk and keeps the
/// count accumulated so far.
pub fn sig_op_count(script: &[u8]) -> (u64, bool) {
    let mut count = 0u64;
    let mut prev: Option<(Opcode, &[u8])> = None;
    let mut pc = 0usize;

    while pc < script.len() {
        let Ok(ins) = get_op(script, &mut pc) else {
            break;
        };
        if ins.opcode.to_u8() == OP_INVALIDOPCODE {
            break;
        }
        match ins.opcode {
            Opcode::CheckSig | Opcode::CheckSigVerify => count += 1,
            Opcode::CheckMultiSig | Opcode::CheckMultiSigVerify => {
                match multisig_key_count(prev) {
                    Some(n) => count = count.saturating_add(n),
                    None => return (0, true),
                }
            }
            _ => {}
        }
        prev = Some((ins.opcode, ins.data));
    }
    (count, false)
}

/// Sum of [`sig_op_count`] over every scriptSig and scriptPubKey of `tx`.
pub fn transaction_sig_op_count(tx: &Transaction) -> (u64, bool) {
    let scripts = tx
        .inputs
        .iter()
        .map(|input| input.script_sig.as_slice())
        .chain(tx.outputs.iter().map(|output| output.script_pubkey.as_slice()));

    let mut total = 0u64;
    for script in scripts {
        let (count, error) = sig_op_count(script);
        if error {
            return (0, true);
        }
        total = total.saturating_add(count);
    }
    (total, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptBuilder;

    fn multisig_with_count(count: &[u8]) -> Vec<u8> {
        let mut script = vec![OP_1];
        script.extend_from_slice(&[33u8]);
        script.extend_from_slice(&[2u8; 33]);
        script.extend_from_slice(count);
        script.push(OP_CHECKMULTISIG);
        script
    }

    #[test]
    fn test_checksig_counts_one() {
        assert_eq!(sig_op_count(&[OP_CHECKSIG]), (1, false));
        assert_eq!(
            sig_op_count(&[OP_CHECKSIG, OP_CHECKSIGVERIFY, OP_NOP]),
            (2, false)
        );
        assert_eq!(sig_op_count(&[]), (0, false));
    }

    #[test]
    fn test_multisig_small_int() {
        assert_eq!(sig_op_count(&multisig_with_count(&[OP_2])), (2, false));
        assert_eq!(sig_op_count(&[OP_16, OP_CHECKMULTISIG]), (16, false));
        assert_eq!(sig_op_count(&[OP_0, OP_CHECKMULTISIGVERIFY]), (0, false));
    }

    #[test]
    fn test_multisig_numeric_push() {
        let script = ScriptBuilder::new()
            .push_int(32)
            .push_opcode(OP_CHECKMULTISIG)
            .into_bytes();
        assert_eq!(sig_op_count(&script), (32, false));

        let four_bytes = ScriptBuilder::new()
            .push_int(0x7fff_ffff)
            .push_opcode(OP_CHECKMULTISIG)
            .into_bytes();
        assert_eq!(sig_op_count(&four_bytes), (0x7fff_ffff, false));
    }

    #[test]
    fn test_multisig_invalid_count_is_error() {
        // Non-minimal 32.
        assert_eq!(sig_op_count(&[2, 32, 0, OP_CHECKMULTISIG]), (0, true));
        // Five bytes.
        assert_eq!(
            sig_op_count(&[5, 1, 0, 0, 0, 1, OP_CHECKMULTISIG]),
            (0, true)
        );
        // Negative.
        assert_eq!(sig_op_count(&[1, 0x81, OP_CHECKMULTISIG]), (0, true));
    }

    #[test]
    fn test_multisig_after_one_negate_counts_zero() {
        assert_eq!(sig_op_count(&[OP_1NEGATE, OP_CHECKMULTISIG]), (0, false));
        assert_eq!(
            sig_op_count(&[OP_CHECKSIG, OP_1NEGATE, OP_CHECKMULTISIGVERIFY]),
            (1, false)
        );
    }

    #[test]
    fn test_invalid_opcode_ends_count() {
        assert_eq!(sig_op_count(&[OP_INVALIDOPCODE, OP_CHECKSIG]), (0, false));
        assert_eq!(
            sig_op_count(&[OP_CHECKSIG, OP_INVALIDOPCODE, OP_CHECKSIG, OP_CHECKSIG]),
            (1, false)
        );
        // Other undefined opcodes do not stop the walk.
        assert_eq!(sig_op_count(&[0xfe, OP_CHECKSIG]), (1, false));
    }

    #[test]
    fn test_multisig_after_non_push_counts_zero() {
        assert_eq!(sig_op_count(&[OP_DUP, OP_CHECKMULTISIG]), (0, false));
        assert_eq!(sig_op_count(&[OP_CHECKMULTISIG]), (0, false));
    }

    #[test]
    fn test_push_data_is_not_counted() {
        let script = ScriptBuilder::new()
            .push_data(&[OP_CHECKSIG; 100])
            .push_opcode(OP_CHECKSIG)
            .into_bytes();
        assert_eq!(sig_op_count(&script), (1, false));
    }

    #[test]
    fn test_truncated_push_keeps_count() {
        let script = vec![OP_CHECKSIG, OP_CHECKSIG, OP_PUSHDATA1, 10, 1];
        assert_eq!(sig_op_count(&script), (2, false));
    }

    #[test]
    fn test_transaction_count() {
        let tx = Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prevout: OutPoint::null(),
                script_sig: vec![OP_CHECKSIG],
                sequence: 0,
            }],
            outputs: vec![
                TransactionOutput {
                    value: 0,
                    script_pubkey: vec![OP_3, OP_CHECKMULTISIG],
                },
                TransactionOutput {
                    value: 0,
                    script_pubkey: vec![OP_CHECKSIGVERIFY],
                },
            ],
            lock_time: 0,
        };
        assert_eq!(transaction_sig_op_count(&tx), (5, false));

        let mut bad = tx.clone();
        bad.outputs[1].script_pubkey = vec![1, 0x81, OP_CHECKMULTISIG];
        assert_eq!(transaction_sig_op_count(&bad), (0, true));
    }
}
