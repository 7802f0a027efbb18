//! Arbitrary precision script numbers
//!
//! Numbers on the stack are little-endian sign-magnitude byte vectors. After
//! the removal of the 4-byte arithmetic limit their length is bounded only by
//! the configured maximum script number length, so values are held as
//! [`BigInt`].
//!
//! Bytes must pass [`ScriptNum::check`] before a number is built from them;
//! the check reports the exact [`ScriptErrorCode`] so the interpreter can
//! surface it without any unwinding.

use crate::error::{ConsensusError, Result, ScriptErrorCode};
use num_bigint::{BigInt, Sign};
use num_traits::{Signed, ToPrimitive, Zero};
use std::cmp::Ordering;

#[cold]
fn make_overflow_error(len: usize, max_len: usize) -> ConsensusError {
    ConsensusError::script_with(
        ScriptErrorCode::ScriptNumOverflow,
        format!("Script number of {len} bytes exceeds limit of {max_len}"),
    )
}

#[cold]
fn make_non_minimal_error() -> ConsensusError {
    ConsensusError::script_with(
        ScriptErrorCode::MinimalData,
        "Non-minimally encoded script number",
    )
}

/// A script number. Ordering and arithmetic follow ordinary integer rules.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ScriptNum(BigInt);

impl ScriptNum {
    /// Validate `bytes` as a script number without building one.
    pub fn check(bytes: &[u8], require_minimal: bool, max_len: usize) -> Result<()> {
        if bytes.len() > max_len {
            return Err(make_overflow_error(bytes.len(), max_len));
        }
        if require_minimal && !is_minimally_encoded(bytes, max_len) {
            return Err(make_non_minimal_error());
        }
        Ok(())
    }

    pub fn from_bytes(bytes: &[u8], require_minimal: bool, max_len: usize) -> Result<ScriptNum> {
        Self::check(bytes, require_minimal, max_len)?;
        Ok(Self::decode(bytes))
    }

    /// Decode without length or minimality checks.
    fn decode(bytes: &[u8]) -> ScriptNum {
        let Some((&last, _)) = bytes.split_last() else {
            return ScriptNum(BigInt::zero());
        };
        let negative = last & 0x80 != 0;
        let mut magnitude = bytes.to_vec();
        if let Some(top) = magnitude.last_mut() {
            *top &= 0x7f;
        }
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        ScriptNum(BigInt::from_bytes_le(sign, &magnitude))
    }

    /// Minimal little-endian sign-magnitude encoding. Zero is the empty vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.0.is_zero() {
            return Vec::new();
        }
        let (sign, mut bytes) = self.0.to_bytes_le();
        let negative = sign == Sign::Minus;
        let top = bytes.last().copied().unwrap_or(0);
        if top & 0x80 != 0 {
            bytes.push(if negative { 0x80 } else { 0x00 });
        } else if negative {
            if let Some(last) = bytes.last_mut() {
                *last |= 0x80;
            }
        }
        bytes
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Clamp into `i64`.
    pub fn to_i64_saturating(&self) -> i64 {
        self.0.to_i64().unwrap_or(if self.0.is_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
    }

    /// Clamp into `i32`, as used for stack indices and shift amounts.
    pub fn to_i32_saturating(&self) -> i32 {
        self.0.to_i32().unwrap_or(if self.0.is_negative() {
            i32::MIN
        } else {
            i32::MAX
        })
    }

    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    pub fn abs(&self) -> ScriptNum {
        ScriptNum(self.0.abs())
    }

    /// Truncating division. The caller rejects a zero divisor.
    pub fn div(&self, rhs: &ScriptNum) -> ScriptNum {
        ScriptNum(&self.0 / &rhs.0)
    }

    /// Remainder carrying the sign of the dividend. The caller rejects a zero divisor.
    pub fn rem(&self, rhs: &ScriptNum) -> ScriptNum {
        ScriptNum(&self.0 % &rhs.0)
    }
}

impl From<i64> for ScriptNum {
    fn from(v: i64) -> Self {
        ScriptNum(BigInt::from(v))
    }
}

impl From<BigInt> for ScriptNum {
    fn from(v: BigInt) -> Self {
        ScriptNum(v)
    }
}

impl std::ops::Add for &ScriptNum {
    type Output = ScriptNum;
    fn add(self, rhs: &ScriptNum) -> ScriptNum {
        ScriptNum(&self.0 + &rhs.0)
    }
}

impl std::ops::Sub for &ScriptNum {
    type Output = ScriptNum;
    fn sub(self, rhs: &ScriptNum) -> ScriptNum {
        ScriptNum(&self.0 - &rhs.0)
    }
}

impl std::ops::Mul for &ScriptNum {
    type Output = ScriptNum;
    fn mul(self, rhs: &ScriptNum) -> ScriptNum {
        ScriptNum(&self.0 * &rhs.0)
    }
}

impl std::ops::Neg for &ScriptNum {
    type Output = ScriptNum;
    fn neg(self) -> ScriptNum {
        ScriptNum(-&self.0)
    }
}

impl PartialEq<i64> for ScriptNum {
    fn eq(&self, other: &i64) -> bool {
        self.0 == BigInt::from(*other)
    }
}

impl PartialOrd<i64> for ScriptNum {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        self.0.partial_cmp(&BigInt::from(*other))
    }
}

/// True when `bytes` is no longer than `max_len` and has no redundant
/// trailing zero byte.
pub fn is_minimally_encoded(bytes: &[u8], max_len: usize) -> bool {
    if bytes.len() > max_len {
        return false;
    }
    if let Some((&last, rest)) = bytes.split_last() {
        // A trailing 0x00 or 0x80 is only allowed when it carries the sign
        // bit that the preceding byte would otherwise collide with.
        if last & 0x7f == 0 {
            match rest.last() {
                None => return false,
                Some(prev) if prev & 0x80 == 0 => return false,
                _ => {}
            }
        }
    }
    true
}

/// Strip redundant trailing bytes while keeping the numeric value.
pub fn minimally_encode(bytes: &[u8]) -> Vec<u8> {
    let mut data = bytes.to_vec();
    let Some(&last) = data.last() else {
        return data;
    };
    if last & 0x7f != 0 {
        return data;
    }
    if data.len() == 1 {
        return Vec::new();
    }
    if data[data.len() - 2] & 0x80 != 0 {
        return data;
    }

    let mut i = data.len() - 1;
    while i > 0 {
        if data[i - 1] != 0 {
            if data[i - 1] & 0x80 != 0 {
                data[i] = last;
                data.truncate(i + 1);
            } else {
                data[i - 1] |= last;
                data.truncate(i);
            }
            return data;
        }
        i -= 1;
    }
    Vec::new()
}
