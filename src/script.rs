//! Script primitives
//!
//! A script is an immutable byte sequence read as a stream of instructions:
//! an opcode optionally followed by a length-prefixed operand. Decoding never
//! panics; a push that declares more bytes than remain is reported as an
//! error and ends iteration.

use crate::constants::MAX_SCRIPT_SIZE;
use crate::error::{ConsensusError, Result, ScriptErrorCode};
use crate::opcodes::*;
use crate::script_num::ScriptNum;
use serde::{Deserialize, Serialize};

#[cold]
fn make_truncated_push_error(pc: usize) -> ConsensusError {
    ConsensusError::script_with(
        ScriptErrorCode::BadOpcode,
        format!("Push at offset {pc} runs past end of script"),
    )
}

/// One decoded instruction, borrowing its operand from the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    pub opcode: Opcode,
    pub data: &'a [u8],
}

/// Decode the instruction at `*pc` and advance the cursor past it.
///
/// `*pc` must point inside `bytes`. On failure the cursor is left at the end
/// of the script so a caller looping on it terminates.
pub fn get_op<'a>(bytes: &'a [u8], pc: &mut usize) -> Result<Instruction<'a>> {
    let start = *pc;
    let Some(&byte) = bytes.get(start) else {
        *pc = bytes.len();
        return Err(make_truncated_push_error(start));
    };
    let mut cursor = start + 1;

    let len = match byte {
        0x01..=0x4b => byte as usize,
        OP_PUSHDATA1 | OP_PUSHDATA2 | OP_PUSHDATA4 => {
            let width = match byte {
                OP_PUSHDATA1 => 1,
                OP_PUSHDATA2 => 2,
                _ => 4,
            };
            let Some(prefix) = bytes.get(cursor..cursor + width) else {
                *pc = bytes.len();
                return Err(make_truncated_push_error(start));
            };
            cursor += width;
            let mut le = [0u8; 4];
            le[..width].copy_from_slice(prefix);
            u32::from_le_bytes(le) as usize
        }
        _ => 0,
    };

    let end = match cursor.checked_add(len) {
        Some(end) if end <= bytes.len() => end,
        _ => {
            *pc = bytes.len();
            return Err(make_truncated_push_error(start));
        }
    };
    *pc = end;
    Ok(Instruction {
        opcode: Opcode::from_u8(byte),
        data: &bytes[cursor..end],
    })
}

/// Iterator over the instructions of a byte script.
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    bytes: &'a [u8],
    pc: usize,
}

impl<'a> Instructions<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Instructions { bytes, pc: 0 }
    }

    /// Offset of the next instruction.
    pub fn position(&self) -> usize {
        self.pc
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pc >= self.bytes.len() {
            return None;
        }
        Some(get_op(self.bytes, &mut self.pc))
    }
}

/// True when `opcode` is the shortest way to push `data`.
pub fn check_minimal_push(data: &[u8], opcode: u8) -> bool {
    match data.len() {
        0 => opcode == OP_0,
        1 if (1..=16).contains(&data[0]) => opcode == OP_N_BASE + data[0],
        1 if data[0] == 0x81 => opcode == OP_1NEGATE,
        n if n <= 75 => opcode as usize == n,
        n if n <= 255 => opcode == OP_PUSHDATA1,
        n if n <= 65535 => opcode == OP_PUSHDATA2,
        _ => true,
    }
}

/// Only push opcodes (up to OP_16). A script that fails to parse is not push-only.
pub fn is_push_only(script: &[u8]) -> bool {
    Instructions::new(script).all(|ins| matches!(ins, Ok(i) if i.opcode.is_push()))
}

/// `OP_HASH160 <20 bytes> OP_EQUAL`
pub fn is_pay_to_script_hash(script: &[u8]) -> bool {
    script.len() == 23 && script[0] == OP_HASH160 && script[1] == 0x14 && script[22] == OP_EQUAL
}

/// Outputs that can never be spent and may be pruned from the coin set.
pub fn is_unspendable(script: &[u8]) -> bool {
    match script {
        [OP_RETURN, ..] | [OP_FALSE, OP_RETURN, ..] => true,
        _ => script.len() as u64 > MAX_SCRIPT_SIZE,
    }
}

/// `OP_FALSE OP_RETURN <"dust">`, the marker for an output that deliberately
/// burns a dust amount.
pub fn is_dust_return_script(script: &[u8]) -> bool {
    script == [OP_FALSE, OP_RETURN, 0x04, b'd', b'u', b's', b't']
}

/// Number of times `opcode` appears as an instruction (operands are skipped).
pub fn count_op(script: &[u8], opcode: u8) -> usize {
    Instructions::new(script)
        .map_while(|ins| ins.ok())
        .filter(|ins| ins.opcode.to_u8() == opcode)
        .count()
}

/// Remove every instruction-aligned occurrence of `pattern` from `script`.
///
/// Returns the rewritten script and the number of occurrences removed.
pub fn find_and_delete(script: &[u8], pattern: &[u8]) -> (Vec<u8>, usize) {
    if pattern.is_empty() {
        return (script.to_vec(), 0);
    }

    let mut result = Vec::with_capacity(script.len());
    let mut found = 0;
    let mut pc = 0;
    let mut kept_from = 0;
    loop {
        result.extend_from_slice(&script[kept_from..pc]);
        while script[pc..].starts_with(pattern) {
            pc += pattern.len();
            found += 1;
        }
        kept_from = pc;
        if pc >= script.len() || get_op(script, &mut pc).is_err() {
            break;
        }
    }

    if found == 0 {
        return (script.to_vec(), 0);
    }
    result.extend_from_slice(&script[kept_from.min(script.len())..]);
    (result, found)
}

/// Split point between the code part and the state part of a stateful script.
///
/// A stateful script ends with `OP_RETURN <state> <state length: LE32> <version: u8>`.
/// The returned offset is the first byte of `<state>`, so the code part
/// (including the `OP_RETURN`) is `script[..offset]` and the state part is
/// `script[offset..]`. Returns `None` when the trailer is absent or its
/// length field does not fit.
pub fn state_iterator(script: &[u8]) -> Option<usize> {
    // OP_RETURN + state length + version
    const TRAILER: usize = 1 + 4 + 1;
    if script.len() < TRAILER {
        return None;
    }
    let len_at = script.len() - 5;
    let mut le = [0u8; 4];
    le.copy_from_slice(&script[len_at..len_at + 4]);
    let state_len = u32::from_le_bytes(le) as usize;
    if script.len() - TRAILER < state_len {
        return None;
    }
    let offset = len_at - state_len;
    (script[offset - 1] == OP_RETURN).then_some(offset)
}

/// Immutable script bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Script(Vec<u8>);

impl Script {
    pub fn new(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn instructions(&self) -> Instructions<'_> {
        Instructions::new(&self.0)
    }

    pub fn is_push_only(&self) -> bool {
        is_push_only(&self.0)
    }

    pub fn is_pay_to_script_hash(&self) -> bool {
        is_pay_to_script_hash(&self.0)
    }

    pub fn is_unspendable(&self) -> bool {
        is_unspendable(&self.0)
    }

    pub fn is_dust_return_script(&self) -> bool {
        is_dust_return_script(&self.0)
    }

    pub fn count_op(&self, opcode: u8) -> usize {
        count_op(&self.0, opcode)
    }

    /// New script with every occurrence of `pattern` removed.
    pub fn find_and_delete(&self, pattern: &Script) -> (Script, usize) {
        let (bytes, n) = find_and_delete(&self.0, &pattern.0);
        (Script(bytes), n)
    }

    pub fn state_iterator(&self) -> Option<usize> {
        state_iterator(&self.0)
    }

    /// Concatenate two scripts into a new one.
    pub fn concat(&self, other: &Script) -> Script {
        let mut bytes = Vec::with_capacity(self.len() + other.len());
        bytes.extend_from_slice(&self.0);
        bytes.extend_from_slice(&other.0);
        Script(bytes)
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl From<&[u8]> for Script {
    fn from(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Builds scripts using the shortest push for every value.
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    bytes: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_opcode(mut self, opcode: u8) -> Self {
        self.bytes.push(opcode);
        self
    }

    pub fn push_data(mut self, data: &[u8]) -> Self {
        match data.len() {
            0 => self.bytes.push(OP_0),
            1 if (1..=16).contains(&data[0]) => self.bytes.push(OP_N_BASE + data[0]),
            1 if data[0] == 0x81 => self.bytes.push(OP_1NEGATE),
            n if n <= 75 => self.bytes.push(n as u8),
            n if n <= 0xff => {
                self.bytes.push(OP_PUSHDATA1);
                self.bytes.push(n as u8);
            }
            n if n <= 0xffff => {
                self.bytes.push(OP_PUSHDATA2);
                self.bytes.extend_from_slice(&(n as u16).to_le_bytes());
            }
            n => {
                self.bytes.push(OP_PUSHDATA4);
                self.bytes.extend_from_slice(&(n as u32).to_le_bytes());
            }
        }
        let pushed_by_opcode =
            data.len() == 1 && ((1..=16).contains(&data[0]) || data[0] == 0x81);
        if !pushed_by_opcode {
            self.bytes.extend_from_slice(data);
        }
        self
    }

    pub fn push_int(self, n: i64) -> Self {
        match n {
            0 => self.push_opcode(OP_0),
            -1 => self.push_opcode(OP_1NEGATE),
            1..=16 => self.push_opcode(OP_N_BASE + n as u8),
            _ => self.push_num(&ScriptNum::from(n)),
        }
    }

    pub fn push_num(self, n: &ScriptNum) -> Self {
        self.push_data(&n.to_bytes())
    }

    /// Append raw bytes without any push prefix.
    pub fn push_raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn into_script(self) -> Script {
        Script(self.bytes)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_truncated_push_is_an_error() {
        let script = [0x05, 0x01, 0x02];
        let mut it = Instructions::new(&script);
        let err = it.next().unwrap().unwrap_err();
        assert_eq!(err.script_code(), Some(ScriptErrorCode::BadOpcode));
        assert!(it.next().is_none());
    }

    #[test]
    fn test_truncated_pushdata_prefix() {
        for script in [&[OP_PUSHDATA1][..], &[OP_PUSHDATA2, 0x01], &[OP_PUSHDATA4, 1, 0, 0]] {
            let mut pc = 0;
            assert!(get_op(script, &mut pc).is_err());
            assert_eq!(pc, script.len());
        }
    }

    #[test]
    fn test_pushdata_decoding() {
        let script = [OP_PUSHDATA2, 0x03, 0x00, 0xaa, 0xbb, 0xcc, OP_DUP];
        let ins: Vec<_> = Instructions::new(&script).collect::<Result<_>>().unwrap();
        assert_eq!(ins.len(), 2);
        assert_eq!(ins[0].opcode, Opcode::PushData2);
        assert_eq!(ins[0].data, &[0xaa, 0xbb, 0xcc]);
        assert_eq!(ins[1].opcode, Opcode::Dup);
    }

    #[test]
    fn test_minimal_push_rules() {
        assert!(check_minimal_push(&[], OP_0));
        assert!(!check_minimal_push(&[], 0x01));
        assert!(check_minimal_push(&[5], OP_5));
        assert!(!check_minimal_push(&[5], 0x01));
        assert!(check_minimal_push(&[0x81], OP_1NEGATE));
        assert!(check_minimal_push(&[0u8; 75], 75));
        assert!(!check_minimal_push(&[0u8; 75], OP_PUSHDATA1));
        assert!(check_minimal_push(&[0u8; 76], OP_PUSHDATA1));
        assert!(check_minimal_push(&[0u8; 256], OP_PUSHDATA2));
    }

    #[test]
    fn test_p2sh_and_unspendable() {
        let mut p2sh = vec![OP_HASH160, 0x14];
        p2sh.extend_from_slice(&[0u8; 20]);
        p2sh.push(OP_EQUAL);
        assert!(is_pay_to_script_hash(&p2sh));
        assert!(!is_pay_to_script_hash(&p2sh[..22]));

        assert!(is_unspendable(&[OP_RETURN]));
        assert!(is_unspendable(&[OP_FALSE, OP_RETURN, 0x01, 0x00]));
        assert!(!is_unspendable(&[OP_TRUE]));
        assert!(!is_unspendable(&[]));
    }

    #[test]
    fn test_dust_return_script() {
        assert!(is_dust_return_script(&[0x00, 0x6a, 0x04, b'd', b'u', b's', b't']));
        assert!(!is_dust_return_script(&[0x00, 0x6a, 0x04, b'd', b'u', b's', b'k']));
    }

    #[test]
    fn test_push_only() {
        assert!(is_push_only(&[OP_0, OP_16, 0x01, 0xff, OP_1NEGATE]));
        assert!(!is_push_only(&[OP_1, OP_DUP]));
        assert!(!is_push_only(&[0x02, 0x01]));
    }

    #[test]
    fn test_find_and_delete() {
        let sig = [0x02, 0xaa, 0xbb];
        let script = [0x02, 0xaa, 0xbb, OP_DUP, 0x02, 0xaa, 0xbb, OP_CHECKSIG];
        let (out, n) = find_and_delete(&script, &sig);
        assert_eq!(n, 2);
        assert_eq!(out, vec![OP_DUP, OP_CHECKSIG]);

        // Occurrence inside an operand is not instruction-aligned.
        let script = [0x03, 0x02, 0xaa, 0xbb, OP_DUP];
        let (out, n) = find_and_delete(&script, &sig);
        assert_eq!(n, 0);
        assert_eq!(out, script.to_vec());
    }

    #[test]
    fn test_state_iterator_reads_trailer() {
        // code: OP_DUP OP_RETURN, state: 0xaa 0xbb, length 2, version 0
        let script = [OP_DUP, OP_RETURN, 0xaa, 0xbb, 0x02, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(state_iterator(&script), Some(2));

        // empty state directly after OP_RETURN
        let script = [OP_RETURN, 0x00, 0x00, 0x00, 0x00, 0x01];
        assert_eq!(state_iterator(&script), Some(1));

        // length field points past the start of the script
        let script = [OP_RETURN, 0xaa, 0x09, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(state_iterator(&script), None);

        // byte before the state is not OP_RETURN
        let script = [OP_DUP, 0xaa, 0x01, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(state_iterator(&script), None);
        assert_eq!(state_iterator(&[OP_DUP]), None);
    }

    #[test]
    fn test_builder_push_int() {
        let script = ScriptBuilder::new()
            .push_int(0)
            .push_int(-1)
            .push_int(16)
            .push_int(17)
            .push_int(-2)
            .into_bytes();
        assert_eq!(script, vec![OP_0, OP_1NEGATE, OP_16, 0x01, 0x11, 0x01, 0x82]);
    }

    #[test]
    fn test_count_op() {
        let script = [OP_CHECKSIG, 0x01, OP_CHECKSIG, OP_CHECKSIG];
        assert_eq!(count_op(&script, OP_CHECKSIG), 2);
    }

    proptest! {
        #[test]
        fn prop_push_data_decodes_back(data in proptest::collection::vec(any::<u8>(), 0..600)) {
            let script = ScriptBuilder::new().push_data(&data).into_bytes();
            let mut pc = 0;
            let ins = get_op(&script, &mut pc).unwrap();
            prop_assert_eq!(pc, script.len());
            prop_assert!(check_minimal_push(&data, ins.opcode.to_u8()));
            match ins.opcode {
                Opcode::PushNum(n) => prop_assert_eq!(data.clone(), vec![n]),
                Opcode::Push1Negate => prop_assert_eq!(data.clone(), vec![0x81]),
                _ => prop_assert_eq!(ins.data, &data[..]),
            }
        }
    }
}
