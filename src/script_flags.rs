//! Script verification flags
//!
//! Flags are independent bits combined with `|` and tested with `&`. Positions
//! are part of the wire and consensus surface: a retired flag keeps its bit
//! reserved and new flags only ever take fresh positions.

pub const SCRIPT_VERIFY_NONE: u32 = 0;

/// Non-strict DER signatures, undefined hash types and malformed public keys
/// fail any checksig operation.
pub const SCRIPT_VERIFY_STRICTENC: u32 = 1 << 1;

/// Non-strict DER signatures fail any checksig operation.
pub const SCRIPT_VERIFY_DERSIG: u32 = 1 << 2;

/// Signatures with S above half the curve order fail.
pub const SCRIPT_VERIFY_LOW_S: u32 = 1 << 3;

/// The extra element consumed by CHECKMULTISIG must be empty.
pub const SCRIPT_VERIFY_NULLDUMMY: u32 = 1 << 4;

/// scriptSig may only contain pushes.
pub const SCRIPT_VERIFY_SIGPUSHONLY: u32 = 1 << 5;

/// Pushes and script numbers must use their shortest encoding.
pub const SCRIPT_VERIFY_MINIMALDATA: u32 = 1 << 6;

/// Executed NOP1 and NOP4..NOP10 fail. Never mandatory in blocks.
pub const SCRIPT_VERIFY_DISCOURAGE_UPGRADABLE_NOPS: u32 = 1 << 7;

/// Exactly one element must remain after evaluation.
pub const SCRIPT_VERIFY_CLEANSTACK: u32 = 1 << 8;

// Bits 9 through 12 belonged to the lock-time verification rules and stay
// reserved.

/// The argument of OP_IF/OP_NOTIF must be empty or exactly `0x01`.
pub const SCRIPT_VERIFY_MINIMALIF: u32 = 1 << 13;

/// A failed CHECK(MULTI)SIG requires every signature to be empty.
pub const SCRIPT_VERIFY_NULLFAIL: u32 = 1 << 14;

/// Public keys must be 33-byte compressed keys.
pub const SCRIPT_VERIFY_COMPRESSED_PUBKEYTYPE: u32 = 1 << 15;

/// One past the highest defined flag.
pub const SCRIPT_FLAG_LAST: u32 = 1 << 16;

/// Bits that no flag may ever occupy again.
pub const RETIRED_SCRIPT_VERIFY_BITS: u32 = (1 << 9) | (1 << 10) | (1 << 11) | (1 << 12);

/// Flags every block must satisfy.
pub const MANDATORY_SCRIPT_VERIFY_FLAGS: u32 =
    SCRIPT_VERIFY_STRICTENC | SCRIPT_VERIFY_LOW_S | SCRIPT_VERIFY_NULLFAIL;

/// Flags standard transactions comply with. Blocks may still contain scripts
/// that violate the non-mandatory part.
pub const STANDARD_SCRIPT_VERIFY_FLAGS: u32 = MANDATORY_SCRIPT_VERIFY_FLAGS
    | SCRIPT_VERIFY_DERSIG
    | SCRIPT_VERIFY_MINIMALDATA
    | SCRIPT_VERIFY_NULLDUMMY
    | SCRIPT_VERIFY_DISCOURAGE_UPGRADABLE_NOPS
    | SCRIPT_VERIFY_CLEANSTACK;

pub const STANDARD_NOT_MANDATORY_VERIFY_FLAGS: u32 =
    STANDARD_SCRIPT_VERIFY_FLAGS & !MANDATORY_SCRIPT_VERIFY_FLAGS;

/// Flags used when verifying a transaction for relay.
#[inline]
pub fn standard_script_verify_flags() -> u32 {
    STANDARD_SCRIPT_VERIFY_FLAGS | SCRIPT_VERIFY_SIGPUSHONLY
}
