//! Proof of work: compact targets and ASERT difficulty adjustment
//!
//! The next target is always computed from a fixed anchor block rather than
//! from the previous block, so rounding never accumulates. All arithmetic is
//! fixed point; nothing on the consensus path touches floating point.

use std::cmp::Ordering;
use std::fmt;

use tracing::trace;

use crate::chainparams::{AsertAnchor, ConsensusParams};
use crate::constants::ASERT_RADIX_BITS;
use crate::error::{ConsensusError, Result};
use crate::types::Hash;

/// 256-bit unsigned integer for target arithmetic.
///
/// Little-endian 64-bit words, matching the internal byte order of hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct U256([u64; 4]);

impl U256 {
    pub const ZERO: U256 = U256([0; 4]);
    pub const ONE: U256 = U256([1, 0, 0, 0]);
    pub const MAX: U256 = U256([u64::MAX; 4]);

    pub fn from_u64(value: u64) -> Self {
        U256([value, 0, 0, 0])
    }

    /// Least significant 64 bits.
    pub fn low_u64(&self) -> u64 {
        self.0[0]
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    /// Number of significant bits; 0 for zero.
    pub fn bits(&self) -> u32 {
        for (i, &word) in self.0.iter().enumerate().rev() {
            if word != 0 {
                return 64 * i as u32 + (64 - word.leading_zeros());
            }
        }
        0
    }

    /// Interpret 32 little-endian bytes, the internal layout of a hash.
    pub fn from_le_bytes(bytes: &[u8; 32]) -> Self {
        let mut words = [0u64; 4];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            *word = u64::from_le_bytes(buf);
        }
        U256(words)
    }

    pub fn to_le_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (chunk, word) in bytes.chunks_exact_mut(8).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Parse big-endian hex of at most 64 digits, as targets are usually written.
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.is_empty() || s.len() > 64 {
            return Err(ConsensusError::Serialization(
                format!("invalid 256-bit hex length {}", s.len()).into(),
            ));
        }
        let padded = format!("{s:0>64}");
        let be = hex::decode(padded)
            .map_err(|e| ConsensusError::Serialization(e.to_string().into()))?;
        let mut le = [0u8; 32];
        for (dst, src) in le.iter_mut().zip(be.iter().rev()) {
            *dst = *src;
        }
        Ok(Self::from_le_bytes(&le))
    }

    /// Big-endian hex, 64 digits.
    pub fn to_hex(&self) -> String {
        let mut be = self.to_le_bytes();
        be.reverse();
        hex::encode(be)
    }

    pub fn shl(&self, shift: u32) -> Self {
        if shift >= 256 {
            return U256::ZERO;
        }
        let mut result = U256::ZERO;
        let word_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;

        for i in 0..4 - word_shift {
            result.0[i + word_shift] |= self.0[i] << bit_shift;
            if bit_shift > 0 && i + word_shift + 1 < 4 {
                result.0[i + word_shift + 1] |= self.0[i] >> (64 - bit_shift);
            }
        }
        result
    }

    pub fn shr(&self, shift: u32) -> Self {
        if shift >= 256 {
            return U256::ZERO;
        }
        let mut result = U256::ZERO;
        let word_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;

        for i in word_shift..4 {
            result.0[i - word_shift] |= self.0[i] >> bit_shift;
            if bit_shift > 0 && i - word_shift >= 1 {
                result.0[i - word_shift - 1] |= self.0[i] << (64 - bit_shift);
            }
        }
        result
    }

    /// Multiply by a 64-bit factor; `None` on overflow.
    pub fn checked_mul_u64(&self, rhs: u64) -> Option<Self> {
        let mut carry = 0u128;
        let mut result = U256::ZERO;
        for i in 0..4 {
            let product = (self.0[i] as u128) * (rhs as u128) + carry;
            result.0[i] = product as u64;
            carry = product >> 64;
        }
        if carry > 0 {
            return None;
        }
        Some(result)
    }

    /// Integer division by a 64-bit divisor; `None` for a zero divisor.
    pub fn div_u64(&self, rhs: u64) -> Option<Self> {
        if rhs == 0 {
            return None;
        }
        let mut remainder = 0u128;
        let mut result = U256::ZERO;
        for i in (0..4).rev() {
            let dividend = (remainder << 64) | (self.0[i] as u128);
            result.0[i] = (dividend / rhs as u128) as u64;
            remainder = dividend % rhs as u128;
        }
        Some(result)
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.iter().rev().cmp(other.0.iter().rev())
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cold]
fn pow_error(msg: impl Into<std::borrow::Cow<'static, str>>) -> ConsensusError {
    ConsensusError::InvalidProofOfWork(msg.into())
}

/// Decode compact `bits` into a target.
///
/// The encoding is a base-256 float: the top byte is the size in bytes, the
/// low 23 bits the mantissa and bit 23 a sign. Negative, overflowing and zero
/// targets are rejected, so an `Ok` target is always in `[1, 2^256)`.
pub fn expand_target(bits: u32) -> Result<U256> {
    let size = bits >> 24;
    let word = bits & 0x007f_ffff;

    if word != 0 && bits & 0x0080_0000 != 0 {
        return Err(pow_error(format!("negative target {bits:#010x}")));
    }
    if word != 0 && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32)) {
        return Err(pow_error(format!("target overflow {bits:#010x}")));
    }

    let target = if size <= 3 {
        U256::from_u64((word >> (8 * (3 - size))) as u64)
    } else {
        U256::from_u64(word as u64).shl(8 * (size - 3))
    };
    if target.is_zero() {
        return Err(pow_error(format!("zero target {bits:#010x}")));
    }
    Ok(target)
}

/// Encode `target` in the shortest compact form.
///
/// Lossy: only the top 23 significant bits survive. Zero encodes as 0.
pub fn compress_target(target: &U256) -> u32 {
    let mut size = target.bits().div_ceil(8);
    let mut compact = if size <= 3 {
        (target.low_u64() << (8 * (3 - size))) as u32
    } else {
        target.shr(8 * (size - 3)).low_u64() as u32
    };
    // A set bit 23 would read back as a sign.
    if compact & 0x0080_0000 != 0 {
        compact >>= 8;
        size += 1;
    }
    compact | (size << 24)
}

/// Whether `hash` satisfies `bits` on a network with `params`.
pub fn check_proof_of_work(hash: &Hash, bits: u32, params: &ConsensusParams) -> bool {
    let target = match expand_target(bits) {
        Ok(target) => target,
        Err(_) => return false,
    };
    if target > params.pow_limit {
        return false;
    }
    U256::from_le_bytes(hash) <= target
}

/// Polynomial coefficients of 2^x - 1 on [0, 1) in 48-bit fixed point.
const POLY_C1: u64 = 195_766_423_245_049;
const POLY_C2: u64 = 971_821_376;
const POLY_C3: u64 = 5_127;
const POLY_ROUNDING: u64 = 1 << 47;

/// Target for a block `height_diff + 1` blocks after the reference block,
/// whose parent was mined `time_diff` seconds before the candidate's parent.
///
/// `target = ref * 2^((time_diff - spacing * (height_diff + 1)) / half_life)`,
/// with the exponent in 16-bit fixed point and the fractional power taken
/// from a cubic approximation. The result is clamped to `[1, pow_limit]`.
///
/// `pow_limit` must leave its top 32 bits clear so the 17-bit multiply
/// factor cannot overflow.
pub fn calculate_asert(
    ref_target: &U256,
    spacing: i64,
    time_diff: i64,
    height_diff: i64,
    pow_limit: &U256,
    half_life: i64,
) -> Result<U256> {
    if ref_target.is_zero() || ref_target > pow_limit {
        return Err(pow_error("reference target outside (0, pow_limit]"));
    }
    if pow_limit.bits() > 224 {
        return Err(pow_error("pow_limit leaves no headroom for ASERT"));
    }
    if height_diff < 0 {
        return Err(pow_error("negative height difference"));
    }
    if spacing <= 0 || half_life <= 0 {
        return Err(pow_error("spacing and half life must be positive"));
    }

    let lag = time_diff as i128 - spacing as i128 * (height_diff as i128 + 1);
    // Division truncates toward zero; the shift below floors.
    let exponent = (lag << ASERT_RADIX_BITS) / half_life as i128;
    let mut shifts = exponent >> ASERT_RADIX_BITS;
    let frac = (exponent & 0xffff) as u64;

    let factor = 65_536
        + ((POLY_C1 * frac + POLY_C2 * frac * frac + POLY_C3 * frac * frac * frac + POLY_ROUNDING)
            >> 48);
    // Headroom checked above.
    let mut next = ref_target
        .checked_mul_u64(factor)
        .ok_or_else(|| pow_error("ASERT factor overflow"))?;

    shifts -= ASERT_RADIX_BITS as i128;
    if shifts <= 0 {
        next = next.shr(u32::try_from(-shifts).unwrap_or(u32::MAX));
    } else {
        let left = u32::try_from(shifts).unwrap_or(u32::MAX);
        let shifted = next.shl(left);
        next = if shifted.shr(left) != next {
            *pow_limit
        } else {
            shifted
        };
    }

    if next.is_zero() {
        next = U256::ONE;
    } else if next > *pow_limit {
        next = *pow_limit;
    }
    Ok(next)
}

/// The fields of a chain entry that difficulty adjustment reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockIndexView {
    pub height: u32,
    pub time: i64,
    pub bits: u32,
}

/// Compact target for the child of `prev` under the ASERT rule.
pub fn get_next_asert_work_required(
    prev: &BlockIndexView,
    candidate_time: i64,
    params: &ConsensusParams,
    anchor: &AsertAnchor,
) -> Result<u32> {
    // Testnet escape hatch: a slow block may be mined at minimum difficulty.
    if params.allow_min_difficulty_blocks
        && candidate_time > prev.time + 2 * params.target_spacing
    {
        return Ok(compress_target(&params.pow_limit));
    }

    let ref_target = expand_target(anchor.bits)?;
    let time_diff = prev.time - anchor.prev_block_time;
    let height_diff = prev.height as i64 - anchor.height as i64;

    let half_life = if prev.height as i64 + 1 >= params.steady_asert_height as i64 {
        params.steady_asert_half_life
    } else {
        params.unsteady_asert_half_life
    };

    let next = calculate_asert(
        &ref_target,
        params.target_spacing,
        time_diff,
        height_diff,
        &params.pow_limit,
        half_life,
    )?;
    let bits = compress_target(&next);
    trace!(
        height = prev.height + 1,
        time_diff,
        height_diff,
        half_life,
        bits,
        "asert target"
    );
    Ok(bits)
}

/// Compact target for the block after `prev`, or for genesis when `prev` is `None`.
pub fn get_next_work_required(
    prev: Option<&BlockIndexView>,
    candidate_time: i64,
    params: &ConsensusParams,
) -> Result<u32> {
    let Some(prev) = prev else {
        return Ok(compress_target(&params.pow_limit));
    };
    if params.no_retargeting {
        return Ok(prev.bits);
    }
    let anchor = params
        .asert_anchor
        .as_ref()
        .ok_or_else(|| pow_error("network has no ASERT anchor"))?;
    get_next_asert_work_required(prev, candidate_time, params, anchor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chainparams::{ChainParams, Network};
    use crate::constants::POW_TARGET_SPACING;
    use proptest::prelude::*;

    const HALF_LIFE: i64 = 3600;
    // Reference blocks are assumed to follow their parent on schedule.
    const PARENT_TIME_DIFF: i64 = 150;

    fn main_limit() -> U256 {
        ChainParams::for_network(Network::Main).consensus.pow_limit
    }

    fn asert(ref_target: &U256, time_diff: i64, height_diff: i64) -> U256 {
        calculate_asert(
            ref_target,
            POW_TARGET_SPACING,
            PARENT_TIME_DIFF + time_diff,
            height_diff,
            &main_limit(),
            HALF_LIFE,
        )
        .unwrap()
    }

    #[test]
    fn test_u256_shifts_and_bits() {
        let one = U256::ONE;
        assert_eq!(one.shl(255).bits(), 256);
        assert_eq!(one.shl(255).shr(255), one);
        assert_eq!(one.shl(256), U256::ZERO);
        assert_eq!(U256::from_u64(0xff).shl(60).shr(60), U256::from_u64(0xff));
        assert_eq!(U256::ZERO.bits(), 0);
        assert_eq!(U256::MAX.checked_mul_u64(2), None);
        assert_eq!(
            U256::from_u64(10).div_u64(3),
            Some(U256::from_u64(3))
        );
        assert_eq!(U256::ONE.div_u64(0), None);
        assert!(U256::ONE.shl(64) > U256::from_u64(u64::MAX));
    }

    #[test]
    fn test_u256_hex() {
        let limit = main_limit();
        assert_eq!(
            limit.to_hex(),
            "00000000ffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
        );
        assert_eq!(U256::from_hex(&limit.to_hex()).unwrap(), limit);
        assert_eq!(U256::from_hex("1").unwrap(), U256::ONE);
        assert!(U256::from_hex("").is_err());
        assert!(U256::from_hex("zz").is_err());
    }

    #[test]
    fn test_expand_target_known_values() {
        assert_eq!(
            expand_target(0x1d00ffff).unwrap(),
            U256::from_u64(0xffff).shl(208)
        );
        assert_eq!(expand_target(0x01010000).unwrap(), U256::ONE);
        assert_eq!(expand_target(0x01123456).unwrap(), U256::from_u64(0x12));
        assert_eq!(expand_target(0x04123456).unwrap(), U256::from_u64(0x1234_5600));
        assert_eq!(
            expand_target(0x207fffff).unwrap(),
            U256::from_u64(0x7fffff).shl(232)
        );
    }

    #[test]
    fn test_expand_target_rejects_invalid() {
        // Negative.
        assert!(expand_target(0x04923456).is_err());
        assert!(expand_target(0x01fedcba).is_err());
        // Zero.
        assert!(expand_target(0).is_err());
        assert!(expand_target(0x01003456).is_err());
        assert!(expand_target(0x1d000000).is_err());
        // Overflow.
        assert!(expand_target(0xff123456).is_err());
        assert!(expand_target(0x21010000).is_err());
        assert!(expand_target(0x22000100).is_err());
    }

    #[test]
    fn test_compress_target_known_values() {
        assert_eq!(compress_target(&U256::ZERO), 0);
        assert_eq!(compress_target(&U256::ONE), 0x01010000);
        assert_eq!(compress_target(&U256::from_u64(0x80)), 0x02008000);
        assert_eq!(compress_target(&main_limit()), 0x1d00ffff);
        assert_eq!(compress_target(&main_limit().shr(1)), 0x1c7fffff);
        assert_eq!(compress_target(&U256::from_u64(0x1234_5600)), 0x04123456);
    }

    #[test]
    fn test_check_proof_of_work() {
        let params = ChainParams::for_network(Network::Main).consensus;
        let mut hash = [0u8; 32];
        assert!(check_proof_of_work(&hash, 0x1d00ffff, &params));
        hash[28] = 1;
        assert!(!check_proof_of_work(&hash, 0x1d00ffff, &params));
        // Easier than the network allows.
        assert!(!check_proof_of_work(&[0u8; 32], 0x1e00ffff, &params));
        assert!(!check_proof_of_work(&[0u8; 32], 0x1d80ffff, &params));
    }

    #[test]
    fn test_asert_schedule() {
        let limit = main_limit();
        let initial = limit.shr(4);

        assert_eq!(asert(&initial, 150, 1), initial);
        let fast = asert(&initial, 150 + 75, 2);
        assert!(fast < initial);
        let caught_up = asert(&initial, 450, 3);
        assert!(caught_up > fast);
        assert_eq!(caught_up, initial);

        // An hour ahead doubles, an hour behind halves.
        let doubled = asert(&initial, 24 * 150 * 2, 24);
        assert_eq!(doubled, initial.shl(1));
        assert_eq!(asert(&doubled, 0, 24), initial);

        let mut target = initial;
        for _ in 0..4 {
            let next = asert(&target, 24 * 150 * 2, 24);
            assert_eq!(next, target.shl(1));
            target = next;
        }
        assert_eq!(compress_target(&target), compress_target(&limit));

        // Cannot be pushed past the limit, even by a shift that overflows.
        let far = asert(&target, 512 * 576 * 150, 0);
        assert_eq!(compress_target(&far), compress_target(&limit));

        // Nor below 1.
        let floor = calculate_asert(&limit, 150, 0, (256 - 33) * 24, &limit, HALF_LIFE).unwrap();
        assert_eq!(compress_target(&floor), 0x01010000);
    }

    #[test]
    fn test_asert_vectors() {
        let limit = main_limit();
        let single_75 =
            U256::from_hex("00000000fc56ffffffffffffffffffffffffffffffffffffffffffffffffffff")
                .unwrap();
        let funny_ref =
            U256::from_hex("000000008000000000000000000fffffffffffffffffffffffffffffffffffff")
                .unwrap();
        let limit_bits = compress_target(&limit);

        let cases: Vec<(U256, i64, i64, U256, u32)> = vec![
            (limit, 0, 24, limit.shr(1), 0x1c7fffff),
            (limit, 0, 2 * 24, limit.shr(2), 0x1c3fffff),
            (limit.shr(1), 0, 24, limit.shr(2), 0x1c3fffff),
            (limit.shr(2), 0, 24, limit.shr(3), 0x1c1fffff),
            (limit.shr(3), 0, 24, limit.shr(4), 0x1c0fffff),
            (limit, 0, (256 - 34) * 24, U256::from_u64(3), 0x01030000),
            (limit, 0, (256 - 34) * 24 + 9, U256::from_u64(3), 0x01030000),
            (limit, 0, (256 - 34) * 24 + 10, U256::from_u64(2), 0x01020000),
            (limit, 0, (256 - 33) * 24 - 1, U256::from_u64(2), 0x01020000),
            (limit, 0, (256 - 33) * 24, U256::ONE, 0x01010000),
            (limit, 0, (256 - 32) * 24, U256::ONE, 0x01010000),
            (U256::ONE, 0, (256 - 32) * 24, U256::ONE, 0x01010000),
            (limit, (512 - 32) * 24, 0, limit, limit_bits),
            (U256::ONE, (256 - 32) * 24 * 600, 0, limit, limit_bits),
            (limit, 75, 1, single_75, 0x1d00fc56),
            (funny_ref, 150 * 33 * 24, 0, limit, limit_bits),
            (U256::ONE, 150 * 256 * 24, 0, limit, limit_bits),
            (
                U256::ONE,
                150 * 224 * 24 - 1,
                0,
                U256::from_u64(0xfff3).shl(208),
                0x1d00fff3,
            ),
        ];

        for (ref_target, time_diff, height_diff, expected, expected_bits) in cases {
            let next = asert(&ref_target, time_diff, height_diff);
            assert_eq!(
                next, expected,
                "ref={ref_target} time_diff={time_diff} height_diff={height_diff}"
            );
            assert_eq!(compress_target(&next), expected_bits);
        }
    }

    #[test]
    fn test_asert_preconditions() {
        let limit = main_limit();
        let too_wide = U256::MAX.shr(1);
        assert!(calculate_asert(&U256::ZERO, 150, 0, 0, &limit, HALF_LIFE).is_err());
        assert!(calculate_asert(&limit.shl(1), 150, 0, 0, &limit, HALF_LIFE).is_err());
        assert!(calculate_asert(&limit, 150, 0, -1, &limit, HALF_LIFE).is_err());
        assert!(calculate_asert(&limit, 0, 0, 0, &limit, HALF_LIFE).is_err());
        assert!(calculate_asert(&limit, 150, 0, 0, &limit, 0).is_err());
        assert!(calculate_asert(&U256::ONE, 150, 0, 0, &too_wide, HALF_LIFE).is_err());
    }

    fn chain_params(anchor_bits: u32, anchor_prev_time: i64) -> ConsensusParams {
        let mut params = ChainParams::for_network(Network::Main).consensus;
        params.steady_asert_height = u32::MAX;
        params.asert_anchor = Some(AsertAnchor {
            height: 1,
            bits: anchor_bits,
            prev_block_time: anchor_prev_time,
        });
        params
    }

    #[test]
    fn test_asert_difficulty_follows_schedule() {
        let initial_bits = compress_target(&main_limit().shr(3));
        let anchor_time = 1_269_211_443 + 150 / 4;
        let params = chain_params(initial_bits, anchor_time);
        let anchor = params.asert_anchor.unwrap();

        let mut tip = BlockIndexView {
            height: 1,
            time: anchor_time,
            bits: initial_bits,
        };
        let next = |tip: &BlockIndexView| {
            get_next_asert_work_required(tip, tip.time + 150, &params, &anchor).unwrap()
        };

        let bits = next(&tip);
        assert_ne!(bits, initial_bits);

        tip = BlockIndexView {
            height: 2,
            time: tip.time + 300,
            bits,
        };
        let bits = next(&tip);
        assert_eq!(bits, initial_bits);

        // An hour in the past halves the target.
        tip = BlockIndexView {
            height: 3,
            time: tip.time + 150 - 3600,
            bits,
        };
        let bits = next(&tip);
        let halved = expand_target(bits).unwrap();
        assert!(halved <= expand_target(initial_bits).unwrap().shr(1));
        assert!(halved >= expand_target(initial_bits - 1).unwrap().shr(1));

        // And an hour forward restores it.
        tip = BlockIndexView {
            height: 4,
            time: tip.time + 150 + 3600,
            bits,
        };
        let mut bits = next(&tip);
        assert_eq!(bits, initial_bits);

        for _ in 0..150 {
            tip = BlockIndexView {
                height: tip.height + 1,
                time: tip.time + 150,
                bits,
            };
            bits = next(&tip);
            assert_eq!(bits, initial_bits);
        }
    }

    #[test]
    fn test_half_life_switches_at_steady_height() {
        let initial_bits = 0x1c0fffff;
        let mut params = chain_params(initial_bits, 0);
        params.steady_asert_height = 10;
        let anchor = params.asert_anchor.unwrap();

        // Ten blocks an hour ahead of schedule.
        let before = BlockIndexView {
            height: 8,
            time: 150 * 8 + 3600,
            bits: initial_bits,
        };
        let at = BlockIndexView {
            height: 9,
            time: 150 * 9 + 3600,
            bits: initial_bits,
        };
        let unsteady = get_next_asert_work_required(&before, 0, &params, &anchor).unwrap();
        let steady = get_next_asert_work_required(&at, 0, &params, &anchor).unwrap();
        assert_eq!(unsteady, compress_target(&expand_target(initial_bits).unwrap().shl(1)));
        assert!(expand_target(steady).unwrap() < expand_target(unsteady).unwrap());
    }

    #[test]
    fn test_min_difficulty_blocks() {
        let mut params = chain_params(0x1c0fffff, 0);
        params.allow_min_difficulty_blocks = true;
        let anchor = params.asert_anchor.unwrap();
        let prev = BlockIndexView {
            height: 5,
            time: 900,
            bits: 0x1c0fffff,
        };
        let limit_bits = compress_target(&params.pow_limit);
        assert_eq!(
            get_next_asert_work_required(&prev, 900 + 301, &params, &anchor).unwrap(),
            limit_bits
        );
        assert_ne!(
            get_next_asert_work_required(&prev, 900 + 300, &params, &anchor).unwrap(),
            limit_bits
        );
    }

    #[test]
    fn test_get_next_work_required_dispatch() {
        let regtest = ChainParams::for_network(Network::Regtest).consensus;
        assert_eq!(get_next_work_required(None, 0, &regtest).unwrap(), 0x207fffff);
        let prev = BlockIndexView {
            height: 7,
            time: 0,
            bits: 0x207ffff0,
        };
        assert_eq!(
            get_next_work_required(Some(&prev), 1_000_000, &regtest).unwrap(),
            0x207ffff0
        );

        let mut params = chain_params(0x1c0fffff, 0);
        params.asert_anchor = None;
        assert!(get_next_work_required(Some(&prev), 0, &params).is_err());
    }

    proptest! {
        #[test]
        fn prop_compact_round_trip_truncates(mantissa in 1u64..=u64::MAX, shift in 0u32..=160) {
            let limit = main_limit();
            let target = U256::from_u64(mantissa).shl(shift);
            prop_assume!(target <= limit);
            let decoded = expand_target(compress_target(&target)).unwrap();
            prop_assert!(decoded <= target);
            prop_assert_eq!(decoded.bits(), target.bits());
            prop_assert_eq!(compress_target(&decoded), compress_target(&target));
        }

        #[test]
        fn prop_asert_monotonic_in_time(t1 in -1_000_000i64..1_000_000, delta in 1i64..100_000, height in 0i64..10_000) {
            let limit = main_limit();
            let reference = limit.shr(10);
            let a = calculate_asert(&reference, 150, t1, height, &limit, HALF_LIFE).unwrap();
            let b = calculate_asert(&reference, 150, t1 + delta, height, &limit, HALF_LIFE).unwrap();
            prop_assert!(a <= b);
        }
    }
}
