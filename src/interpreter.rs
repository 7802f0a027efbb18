//! Script interpreter
//!
//! Executes a script against a memory-bounded stack. Numbers are arbitrary
//! precision and limited only by the configured script number length; byte
//! strings are limited only by the stack memory budget. Every limit is read
//! from a [`LimitsView`] in either the consensus or the policy regime, so the
//! same code path serves block validation and relay.
//!
//! Failures are returned as [`ConsensusError::ScriptErrorWithCode`] and never
//! unwind.

use crate::cancellation::CancellationToken;
use crate::crypto::{hash160, hash256, ripemd160, sha1, sha256};
use crate::error::{ConsensusError, Result, ScriptErrorCode};
use crate::limits::LimitsView;
use crate::opcodes::*;
use crate::script::{check_minimal_push, get_op, is_push_only};
use crate::script_flags::*;
use crate::script_num::{minimally_encode, ScriptNum};
use crate::signature::{check_pubkey_encoding, check_signature_encoding};
use crate::stack::{LimitedStack, ELEMENT_OVERHEAD};
use smallvec::SmallVec;

/// Verifies one signature against the transaction being spent.
pub trait SignatureChecker {
    /// `sig` carries its hash type byte; `script_code` is the part of the
    /// executing script after the last OP_CODESEPARATOR.
    fn check_sig(&self, sig: &[u8], pubkey: &[u8], script_code: &[u8]) -> bool;
}

/// Checker with no transaction context. Every signature fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseSignatureChecker;

impl SignatureChecker for BaseSignatureChecker {
    fn check_sig(&self, _sig: &[u8], _pubkey: &[u8], _script_code: &[u8]) -> bool {
        false
    }
}

#[cold]
fn fail(code: ScriptErrorCode) -> ConsensusError {
    ConsensusError::script(code)
}

const VCH_TRUE: [u8; 1] = [1];

#[inline]
fn encode_bool(value: bool) -> Vec<u8> {
    if value {
        VCH_TRUE.to_vec()
    } else {
        Vec::new()
    }
}

/// Any non-zero byte makes a value true, except a lone sign bit in the last
/// byte (negative zero).
pub fn cast_to_bool(data: &[u8]) -> bool {
    match data.split_last() {
        None => false,
        Some((&last, rest)) => rest.iter().any(|&b| b != 0) || (last != 0 && last != 0x80),
    }
}

/// Shift a big-endian bit string left by `n` bits, keeping its length.
pub fn lshift(data: &[u8], n: u64) -> Vec<u8> {
    let len = data.len();
    let mut out = vec![0u8; len];
    let byte_shift = (n / 8).min(len as u64) as usize;
    let bit_shift = (n % 8) as u32;
    if byte_shift >= len {
        return out;
    }
    for k in 0..len - byte_shift {
        let src = k + byte_shift;
        let mut value = data[src] << bit_shift;
        if bit_shift > 0 && src + 1 < len {
            value |= data[src + 1] >> (8 - bit_shift);
        }
        out[k] = value;
    }
    out
}

/// Shift a big-endian bit string right by `n` bits, keeping its length.
pub fn rshift(data: &[u8], n: u64) -> Vec<u8> {
    let len = data.len();
    let mut out = vec![0u8; len];
    let byte_shift = (n / 8).min(len as u64) as usize;
    let bit_shift = (n % 8) as u32;
    if byte_shift >= len {
        return out;
    }
    for k in byte_shift..len {
        let src = k - byte_shift;
        let mut value = data[src] >> bit_shift;
        if bit_shift > 0 && src > 0 {
            value |= data[src - 1] << (8 - bit_shift);
        }
        out[k] = value;
    }
    out
}

/// Nesting state of IF/NOTIF/ELSE/ENDIF.
#[derive(Default)]
struct ConditionStack {
    values: SmallVec<[bool; 8]>,
    false_count: usize,
}

impl ConditionStack {
    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn all_true(&self) -> bool {
        self.false_count == 0
    }

    fn push(&mut self, value: bool) {
        if !value {
            self.false_count += 1;
        }
        self.values.push(value);
    }

    fn pop(&mut self) -> Result<()> {
        match self.values.pop() {
            Some(false) => self.false_count -= 1,
            Some(true) => {}
            None => return Err(fail(ScriptErrorCode::UnbalancedConditional)),
        }
        Ok(())
    }

    fn toggle_top(&mut self) -> Result<()> {
        let top = self
            .values
            .last_mut()
            .ok_or_else(|| fail(ScriptErrorCode::UnbalancedConditional))?;
        if *top {
            self.false_count += 1;
        } else {
            self.false_count -= 1;
        }
        *top = !*top;
        Ok(())
    }
}

/// Limits and inputs fixed for the duration of one script.
struct Context<'a> {
    flags: u32,
    require_minimal: bool,
    max_num_len: usize,
    max_ops: u64,
    max_pubkeys: u64,
    checker: &'a dyn SignatureChecker,
}

impl Context<'_> {
    fn has(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    fn pop_num(&self, stack: &mut LimitedStack) -> Result<ScriptNum> {
        let num = ScriptNum::from_bytes(stack.top(0)?, self.require_minimal, self.max_num_len)?;
        stack.pop()?;
        Ok(num)
    }
}

#[inline]
fn require(stack: &LimitedStack, n: usize) -> Result<()> {
    if stack.size() < n {
        return Err(fail(ScriptErrorCode::InvalidStackOperation));
    }
    Ok(())
}

/// A non-negative stack index taken from a number, or `None` when out of range.
fn to_index(num: &ScriptNum, size: usize) -> Option<usize> {
    let n = num.to_i64_saturating();
    (n >= 0 && (n as u64) < size as u64).then_some(n as usize)
}

/// Evaluate `script` on `stack`.
///
/// The alt stack shares `stack`'s memory budget and is discarded at the end.
/// `token` is polled before every instruction.
pub fn eval_script(
    limits: &dyn LimitsView,
    is_consensus: bool,
    token: &CancellationToken,
    stack: &mut LimitedStack,
    script: &[u8],
    flags: u32,
    checker: &dyn SignatureChecker,
) -> Result<()> {
    let max_script_size = limits.max_script_size(is_consensus);
    if script.len() as u64 > max_script_size {
        return Err(ConsensusError::script_with(
            ScriptErrorCode::ScriptSize,
            format!(
                "Script of {} bytes exceeds limit of {max_script_size}",
                script.len()
            ),
        ));
    }

    let ctx = Context {
        flags,
        require_minimal: flags & SCRIPT_VERIFY_MINIMALDATA != 0,
        max_num_len: usize::try_from(limits.max_script_num_length(is_consensus))
            .unwrap_or(usize::MAX),
        max_ops: limits.max_ops_per_script(is_consensus),
        max_pubkeys: limits.max_pubkeys_per_multisig(is_consensus),
        checker,
    };

    let mut alt = stack.make_child();
    let mut exec = ConditionStack::default();
    let mut op_count: u64 = 0;
    let mut code_sep = 0usize;
    let mut pc = 0usize;

    while pc < script.len() {
        if token.is_cancelled() {
            return Err(fail(ScriptErrorCode::Cancelled));
        }

        let ins = get_op(script, &mut pc)?;
        let opcode = ins.opcode;
        let executing = exec.all_true();

        if opcode.to_u8() > OP_16 {
            op_count += 1;
            if op_count > ctx.max_ops {
                return Err(fail(ScriptErrorCode::OpCount));
            }
        }

        if opcode.is_disabled() {
            return Err(fail(ScriptErrorCode::DisabledOpcode));
        }

        if let Opcode::PushEmpty
        | Opcode::PushBytes(_)
        | Opcode::PushData1
        | Opcode::PushData2
        | Opcode::PushData4 = opcode
        {
            if executing {
                if ctx.require_minimal && !check_minimal_push(ins.data, opcode.to_u8()) {
                    return Err(fail(ScriptErrorCode::MinimalData));
                }
                stack.push(ins.data.to_vec())?;
            }
            continue;
        }

        let is_conditional = matches!(
            opcode,
            Opcode::If
                | Opcode::NotIf
                | Opcode::VerIf
                | Opcode::VerNotIf
                | Opcode::Else
                | Opcode::EndIf
        );
        if !executing && !is_conditional {
            continue;
        }

        match opcode {
            Opcode::If | Opcode::NotIf => {
                let mut value = false;
                if executing {
                    let top = stack
                        .top(0)
                        .map_err(|_| fail(ScriptErrorCode::UnbalancedConditional))?;
                    if ctx.has(SCRIPT_VERIFY_MINIMALIF)
                        && (top.len() > 1 || (top.len() == 1 && top[0] != 1))
                    {
                        return Err(fail(ScriptErrorCode::MinimalIf));
                    }
                    value = cast_to_bool(top) ^ (opcode == Opcode::NotIf);
                    stack.pop()?;
                }
                exec.push(value);
            }
            Opcode::Else => exec.toggle_top()?,
            Opcode::EndIf => exec.pop()?,

            // Top level: success once the remainder parses. Inside an IF there
            // is no deferred return state, so the script fails.
            Opcode::Return => {
                if !exec.is_empty() {
                    return Err(fail(ScriptErrorCode::OpReturn));
                }
                // The rest of the script is never executed but must parse.
                while pc < script.len() {
                    get_op(script, &mut pc)?;
                }
                return Ok(());
            }

            Opcode::Push1Negate => stack.push(ScriptNum::from(-1).to_bytes())?,
            Opcode::PushNum(n) => stack.push(vec![n])?,

            Opcode::Nop => {}
            Opcode::UpgradableNop(_) => {
                if ctx.has(SCRIPT_VERIFY_DISCOURAGE_UPGRADABLE_NOPS) {
                    return Err(fail(ScriptErrorCode::DiscourageUpgradableNops));
                }
            }

            Opcode::Verify => {
                let value = cast_to_bool(stack.top(0)?);
                if !value {
                    return Err(fail(ScriptErrorCode::Verify));
                }
                stack.pop()?;
            }

            Opcode::ToAltStack => stack.move_top_to(&mut alt)?,
            Opcode::FromAltStack => {
                if alt.is_empty() {
                    return Err(fail(ScriptErrorCode::InvalidAltstackOperation));
                }
                alt.move_top_to(stack)?;
            }

            Opcode::Drop2
            | Opcode::Dup2
            | Opcode::Dup3
            | Opcode::Over2
            | Opcode::Rot2
            | Opcode::Swap2
            | Opcode::IfDup
            | Opcode::Depth
            | Opcode::Drop
            | Opcode::Dup
            | Opcode::Nip
            | Opcode::Over
            | Opcode::Pick
            | Opcode::Roll
            | Opcode::Rot
            | Opcode::Swap
            | Opcode::Tuck
            | Opcode::Size => stack_op(&ctx, stack, opcode)?,

            Opcode::Cat | Opcode::Split | Opcode::Num2Bin | Opcode::Bin2Num => {
                splice_op(&ctx, stack, opcode)?
            }

            Opcode::Invert
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Equal
            | Opcode::EqualVerify
            | Opcode::LShift
            | Opcode::RShift => bitwise_op(&ctx, stack, opcode)?,

            Opcode::Add1
            | Opcode::Sub1
            | Opcode::Negate
            | Opcode::Abs
            | Opcode::Not
            | Opcode::NotEqual0
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Mod
            | Opcode::BoolAnd
            | Opcode::BoolOr
            | Opcode::NumEqual
            | Opcode::NumEqualVerify
            | Opcode::NumNotEqual
            | Opcode::LessThan
            | Opcode::GreaterThan
            | Opcode::LessThanOrEqual
            | Opcode::GreaterThanOrEqual
            | Opcode::Min
            | Opcode::Max
            | Opcode::Within => arithmetic_op(&ctx, stack, opcode)?,

            Opcode::Ripemd160
            | Opcode::Sha1
            | Opcode::Sha256
            | Opcode::Hash160
            | Opcode::Hash256 => {
                let data = stack.top(0)?;
                let digest = match opcode {
                    Opcode::Ripemd160 => ripemd160(data).to_vec(),
                    Opcode::Sha1 => sha1(data).to_vec(),
                    Opcode::Sha256 => sha256(data).to_vec(),
                    Opcode::Hash160 => hash160(data).to_vec(),
                    _ => hash256(data).to_vec(),
                };
                stack.pop()?;
                stack.push(digest)?;
            }

            Opcode::CodeSeparator => code_sep = pc,

            Opcode::CheckSig | Opcode::CheckSigVerify => {
                check_sig_op(&ctx, stack, &script[code_sep..], opcode)?
            }
            Opcode::CheckMultiSig | Opcode::CheckMultiSigVerify => {
                op_count = check_multisig_op(&ctx, stack, &script[code_sep..], opcode, op_count)?
            }

            Opcode::VerIf
            | Opcode::VerNotIf
            | Opcode::Reserved
            | Opcode::Ver
            | Opcode::Reserved1
            | Opcode::Reserved2
            | Opcode::Invalid(_) => return Err(fail(ScriptErrorCode::BadOpcode)),

            Opcode::Mul2
            | Opcode::Div2
            | Opcode::CheckLockTimeVerify
            | Opcode::CheckSequenceVerify => return Err(fail(ScriptErrorCode::DisabledOpcode)),

            // Pushed before dispatch.
            Opcode::PushEmpty
            | Opcode::PushBytes(_)
            | Opcode::PushData1
            | Opcode::PushData2
            | Opcode::PushData4 => {}
        }
    }

    if !exec.is_empty() {
        return Err(fail(ScriptErrorCode::UnbalancedConditional));
    }
    Ok(())
}

fn stack_op(ctx: &Context<'_>, stack: &mut LimitedStack, opcode: Opcode) -> Result<()> {
    match opcode {
        Opcode::Drop2 => {
            require(stack, 2)?;
            stack.erase(0, 2)?;
        }
        Opcode::Dup2 => {
            require(stack, 2)?;
            stack.push_copy(1)?;
            stack.push_copy(1)?;
        }
        Opcode::Dup3 => {
            require(stack, 3)?;
            stack.push_copy(2)?;
            stack.push_copy(2)?;
            stack.push_copy(2)?;
        }
        Opcode::Over2 => {
            require(stack, 4)?;
            stack.push_copy(3)?;
            stack.push_copy(3)?;
        }
        Opcode::Rot2 => {
            require(stack, 6)?;
            let first = stack.top(5)?.to_vec();
            let second = stack.top(4)?.to_vec();
            stack.erase(4, 6)?;
            stack.push(first)?;
            stack.push(second)?;
        }
        Opcode::Swap2 => {
            require(stack, 4)?;
            stack.swap(3, 1)?;
            stack.swap(2, 0)?;
        }
        Opcode::IfDup => {
            if cast_to_bool(stack.top(0)?) {
                stack.push_copy(0)?;
            }
        }
        Opcode::Depth => {
            let depth = ScriptNum::from(stack.size() as i64);
            stack.push(depth.to_bytes())?;
        }
        Opcode::Drop => {
            stack.pop()?;
        }
        Opcode::Dup => stack.push_copy(0)?,
        Opcode::Nip => {
            require(stack, 2)?;
            stack.remove(1)?;
        }
        Opcode::Over => {
            require(stack, 2)?;
            stack.push_copy(1)?;
        }
        Opcode::Pick | Opcode::Roll => {
            require(stack, 2)?;
            let n = ctx.pop_num(stack)?;
            let depth = to_index(&n, stack.size())
                .ok_or_else(|| fail(ScriptErrorCode::InvalidStackOperation))?;
            if opcode == Opcode::Pick {
                stack.push_copy(depth)?;
            } else {
                let element = stack.remove(depth)?;
                stack.push(element)?;
            }
        }
        Opcode::Rot => {
            require(stack, 3)?;
            stack.swap(2, 1)?;
            stack.swap(1, 0)?;
        }
        Opcode::Swap => {
            require(stack, 2)?;
            stack.swap(1, 0)?;
        }
        Opcode::Tuck => {
            require(stack, 2)?;
            let top = stack.top(0)?.to_vec();
            stack.insert(2, top)?;
        }
        Opcode::Size => {
            let size = ScriptNum::from(stack.top(0)?.len() as i64);
            stack.push(size.to_bytes())?;
        }
        _ => return Err(fail(ScriptErrorCode::BadOpcode)),
    }
    Ok(())
}

fn splice_op(ctx: &Context<'_>, stack: &mut LimitedStack, opcode: Opcode) -> Result<()> {
    match opcode {
        Opcode::Cat => {
            require(stack, 2)?;
            let tail = stack.pop()?;
            let mut head = stack.pop()?;
            head.extend_from_slice(&tail);
            stack.push(head)?;
        }
        Opcode::Split => {
            require(stack, 2)?;
            let n = ctx.pop_num(stack)?;
            let len = stack.top(0)?.len();
            let position = n.to_i64_saturating();
            if position < 0 || position as u64 > len as u64 {
                return Err(fail(ScriptErrorCode::InvalidSplitRange));
            }
            let mut head = stack.pop()?;
            let tail = head.split_off(position as usize);
            stack.push(head)?;
            stack.push(tail)?;
        }
        Opcode::Num2Bin => {
            require(stack, 2)?;
            let size = ctx.pop_num(stack)?;
            if size.is_negative() {
                return Err(fail(ScriptErrorCode::PushSize));
            }
            let size = size.to_i64_saturating() as u64;
            let raw = stack.pop()?;
            // Refuse before allocating what the budget could never hold.
            let available = stack.max_memory().saturating_sub(stack.memory_usage());
            if size.saturating_add(ELEMENT_OVERHEAD) > available {
                return Err(ConsensusError::script_with(
                    ScriptErrorCode::StackSize,
                    format!("NUM2BIN size {size} exceeds remaining stack memory"),
                ));
            }
            let size = size as usize;
            let mut num = minimally_encode(&raw);
            if num.len() > size {
                return Err(fail(ScriptErrorCode::ImpossibleEncoding));
            }
            if num.len() < size {
                let sign = match num.last_mut() {
                    Some(last) => {
                        let sign = *last & 0x80;
                        *last &= 0x7f;
                        sign
                    }
                    None => 0,
                };
                num.resize(size - 1, 0);
                num.push(sign);
            }
            stack.push(num)?;
        }
        Opcode::Bin2Num => {
            let num = minimally_encode(stack.top(0)?);
            if num.len() > ctx.max_num_len {
                return Err(fail(ScriptErrorCode::InvalidNumberRange));
            }
            stack.pop()?;
            stack.push(num)?;
        }
        _ => return Err(fail(ScriptErrorCode::BadOpcode)),
    }
    Ok(())
}

fn bitwise_op(ctx: &Context<'_>, stack: &mut LimitedStack, opcode: Opcode) -> Result<()> {
    match opcode {
        Opcode::Invert => {
            let mut data = stack.pop()?;
            data.iter_mut().for_each(|b| *b = !*b);
            stack.push(data)?;
        }
        Opcode::And | Opcode::Or | Opcode::Xor => {
            require(stack, 2)?;
            if stack.top(0)?.len() != stack.top(1)?.len() {
                return Err(fail(ScriptErrorCode::InvalidOperandSize));
            }
            let rhs = stack.pop()?;
            let mut lhs = stack.pop()?;
            for (a, b) in lhs.iter_mut().zip(rhs.iter()) {
                match opcode {
                    Opcode::And => *a &= b,
                    Opcode::Or => *a |= b,
                    _ => *a ^= b,
                }
            }
            stack.push(lhs)?;
        }
        Opcode::Equal | Opcode::EqualVerify => {
            require(stack, 2)?;
            let equal = stack.top(0)? == stack.top(1)?;
            stack.pop()?;
            stack.pop()?;
            if opcode == Opcode::EqualVerify {
                if !equal {
                    return Err(fail(ScriptErrorCode::EqualVerify));
                }
            } else {
                stack.push(encode_bool(equal))?;
            }
        }
        Opcode::LShift | Opcode::RShift => {
            require(stack, 2)?;
            let n = ctx.pop_num(stack)?;
            if n.is_negative() {
                return Err(fail(ScriptErrorCode::InvalidNumberRange));
            }
            let n = n.to_i64_saturating() as u64;
            let data = stack.pop()?;
            let shifted = if opcode == Opcode::LShift {
                lshift(&data, n)
            } else {
                rshift(&data, n)
            };
            stack.push(shifted)?;
        }
        _ => return Err(fail(ScriptErrorCode::BadOpcode)),
    }
    Ok(())
}

fn arithmetic_op(ctx: &Context<'_>, stack: &mut LimitedStack, opcode: Opcode) -> Result<()> {
    let result = match opcode {
        Opcode::Add1
        | Opcode::Sub1
        | Opcode::Negate
        | Opcode::Abs
        | Opcode::Not
        | Opcode::NotEqual0 => {
            require(stack, 1)?;
            let a = ctx.pop_num(stack)?;
            match opcode {
                Opcode::Add1 => &a + &ScriptNum::from(1),
                Opcode::Sub1 => &a - &ScriptNum::from(1),
                Opcode::Negate => -&a,
                Opcode::Abs => a.abs(),
                Opcode::Not => ScriptNum::from(a.is_zero() as i64),
                _ => ScriptNum::from(!a.is_zero() as i64),
            }
        }
        Opcode::Within => {
            require(stack, 3)?;
            let max = ctx.pop_num(stack)?;
            let min = ctx.pop_num(stack)?;
            let x = ctx.pop_num(stack)?;
            ScriptNum::from((min <= x && x < max) as i64)
        }
        _ => {
            require(stack, 2)?;
            let b = ctx.pop_num(stack)?;
            let a = ctx.pop_num(stack)?;
            match opcode {
                Opcode::Add => &a + &b,
                Opcode::Sub => &a - &b,
                Opcode::Mul => &a * &b,
                Opcode::Div => {
                    if b.is_zero() {
                        return Err(fail(ScriptErrorCode::DivByZero));
                    }
                    a.div(&b)
                }
                Opcode::Mod => {
                    if b.is_zero() {
                        return Err(fail(ScriptErrorCode::ModByZero));
                    }
                    a.rem(&b)
                }
                Opcode::BoolAnd => ScriptNum::from((!a.is_zero() && !b.is_zero()) as i64),
                Opcode::BoolOr => ScriptNum::from((!a.is_zero() || !b.is_zero()) as i64),
                Opcode::NumEqual | Opcode::NumEqualVerify => ScriptNum::from((a == b) as i64),
                Opcode::NumNotEqual => ScriptNum::from((a != b) as i64),
                Opcode::LessThan => ScriptNum::from((a < b) as i64),
                Opcode::GreaterThan => ScriptNum::from((a > b) as i64),
                Opcode::LessThanOrEqual => ScriptNum::from((a <= b) as i64),
                Opcode::GreaterThanOrEqual => ScriptNum::from((a >= b) as i64),
                Opcode::Min => a.min(b),
                Opcode::Max => a.max(b),
                _ => return Err(fail(ScriptErrorCode::BadOpcode)),
            }
        }
    };

    if opcode == Opcode::NumEqualVerify {
        if result.is_zero() {
            return Err(fail(ScriptErrorCode::NumEqualVerify));
        }
        return Ok(());
    }
    stack.push(result.to_bytes())
}

fn check_sig_op(
    ctx: &Context<'_>,
    stack: &mut LimitedStack,
    script_code: &[u8],
    opcode: Opcode,
) -> Result<()> {
    require(stack, 2)?;
    let sig = stack.top(1)?;
    let pubkey = stack.top(0)?;

    check_signature_encoding(sig, ctx.flags)?;
    check_pubkey_encoding(pubkey, ctx.flags)?;
    let success = ctx.checker.check_sig(sig, pubkey, script_code);

    if !success && ctx.has(SCRIPT_VERIFY_NULLFAIL) && !sig.is_empty() {
        return Err(fail(ScriptErrorCode::SigNullFail));
    }

    stack.pop()?;
    stack.pop()?;
    if opcode == Opcode::CheckSigVerify {
        if !success {
            return Err(fail(ScriptErrorCode::CheckSigVerify));
        }
        return Ok(());
    }
    stack.push(encode_bool(success))
}

/// Stack layout, top first: key count, keys, signature count, signatures,
/// and one extra element consumed for historical reasons.
///
/// Returns the updated op count, which grows by the number of keys.
fn check_multisig_op(
    ctx: &Context<'_>,
    stack: &mut LimitedStack,
    script_code: &[u8],
    opcode: Opcode,
    op_count: u64,
) -> Result<u64> {
    let mut i = 1usize;
    require(stack, i)?;

    let keys = ScriptNum::from_bytes(stack.top(i - 1)?, ctx.require_minimal, ctx.max_num_len)?;
    if keys.is_negative() || keys.to_i64_saturating() as u64 > ctx.max_pubkeys {
        return Err(fail(ScriptErrorCode::PubkeyCount));
    }
    let mut n_keys = keys.to_i64_saturating() as usize;
    let op_count = op_count.saturating_add(n_keys as u64);
    if op_count > ctx.max_ops {
        return Err(fail(ScriptErrorCode::OpCount));
    }

    i += 1;
    let mut ikey = i;
    // Position of the first key counted from the cleanup loop, for NULLFAIL.
    let mut ikey2 = n_keys + 2;
    i = i.saturating_add(n_keys);
    require(stack, i)?;

    let sigs = ScriptNum::from_bytes(stack.top(i - 1)?, ctx.require_minimal, ctx.max_num_len)?;
    if sigs.is_negative() || sigs.to_i64_saturating() as u64 > n_keys as u64 {
        return Err(fail(ScriptErrorCode::SigCount));
    }
    let mut n_sigs = sigs.to_i64_saturating() as usize;

    i += 1;
    let mut isig = i;
    i += n_sigs;
    require(stack, i)?;

    let mut success = true;
    while success && n_sigs > 0 {
        let sig = stack.top(isig - 1)?;
        let pubkey = stack.top(ikey - 1)?;

        check_signature_encoding(sig, ctx.flags)?;
        check_pubkey_encoding(pubkey, ctx.flags)?;

        if ctx.checker.check_sig(sig, pubkey, script_code) {
            isig += 1;
            n_sigs -= 1;
        }
        ikey += 1;
        n_keys -= 1;

        // More signatures left than keys means some signature cannot match.
        if n_sigs > n_keys {
            success = false;
        }
    }

    // Pop everything except the extra element.
    while i > 1 {
        i -= 1;
        if !success && ctx.has(SCRIPT_VERIFY_NULLFAIL) && ikey2 == 0 && !stack.top(0)?.is_empty()
        {
            return Err(fail(ScriptErrorCode::SigNullFail));
        }
        ikey2 = ikey2.saturating_sub(1);
        stack.pop()?;
    }

    require(stack, 1)?;
    if ctx.has(SCRIPT_VERIFY_NULLDUMMY) && !stack.top(0)?.is_empty() {
        return Err(fail(ScriptErrorCode::SigNullDummy));
    }
    stack.pop()?;

    if opcode == Opcode::CheckMultiSigVerify {
        if !success {
            return Err(fail(ScriptErrorCode::CheckMultisigVerify));
        }
    } else {
        stack.push(encode_bool(success))?;
    }
    Ok(op_count)
}

/// Run `script_sig` then `script_pubkey` on a fresh stack and require a true
/// result.
///
/// `OP_HASH160 <20 bytes> OP_EQUAL` outputs are ordinary hash locks: the
/// preimage pushed by `script_sig` is compared, never executed.
pub fn verify_script(
    limits: &dyn LimitsView,
    is_consensus: bool,
    token: &CancellationToken,
    script_sig: &[u8],
    script_pubkey: &[u8],
    flags: u32,
    checker: &dyn SignatureChecker,
) -> Result<()> {
    if flags & SCRIPT_VERIFY_SIGPUSHONLY != 0 && !is_push_only(script_sig) {
        return Err(fail(ScriptErrorCode::SigPushOnly));
    }

    let mut stack = LimitedStack::new(limits.max_stack_memory_usage(is_consensus));
    eval_script(limits, is_consensus, token, &mut stack, script_sig, flags, checker)?;
    eval_script(limits, is_consensus, token, &mut stack, script_pubkey, flags, checker)?;

    match stack.top(0) {
        Ok(top) if cast_to_bool(top) => {}
        _ => return Err(fail(ScriptErrorCode::EvalFalse)),
    }

    if flags & SCRIPT_VERIFY_CLEANSTACK != 0 && stack.size() != 1 {
        return Err(fail(ScriptErrorCode::CleanStack));
    }
    Ok(())
}
