//! Novo Script Opcode Constants
//!
//! Raw byte constants for building and inspecting scripts, plus the closed
//! [`Opcode`] enumeration the interpreter dispatches on. Every byte value maps
//! to exactly one variant, so the interpreter's `match` is checked for
//! exhaustiveness by the compiler.

// ============================================================================
// PUSH DATA OPCODES (0x00 - 0x4e)
// ============================================================================

/// OP_0 / OP_FALSE - Push empty array
pub const OP_0: u8 = 0x00;
pub const OP_FALSE: u8 = 0x00;

/// OP_PUSHDATA1 - Next byte is the data length
pub const OP_PUSHDATA1: u8 = 0x4c;

/// OP_PUSHDATA2 - Next 2 bytes (little-endian) are the data length
pub const OP_PUSHDATA2: u8 = 0x4d;

/// OP_PUSHDATA4 - Next 4 bytes (little-endian) are the data length
pub const OP_PUSHDATA4: u8 = 0x4e;

// ============================================================================
// PUSH VALUE OPCODES (0x4f - 0x60)
// ============================================================================

pub const OP_1NEGATE: u8 = 0x4f;

/// OP_RESERVED - Fails when executed
pub const OP_RESERVED: u8 = 0x50;

pub const OP_1: u8 = 0x51;
pub const OP_TRUE: u8 = 0x51;
pub const OP_2: u8 = 0x52;
pub const OP_3: u8 = 0x53;
pub const OP_4: u8 = 0x54;
pub const OP_5: u8 = 0x55;
pub const OP_6: u8 = 0x56;
pub const OP_7: u8 = 0x57;
pub const OP_8: u8 = 0x58;
pub const OP_9: u8 = 0x59;
pub const OP_10: u8 = 0x5a;
pub const OP_11: u8 = 0x5b;
pub const OP_12: u8 = 0x5c;
pub const OP_13: u8 = 0x5d;
pub const OP_14: u8 = 0x5e;
pub const OP_15: u8 = 0x5f;
pub const OP_16: u8 = 0x60;

// ============================================================================
// FLOW CONTROL (0x61 - 0x6a)
// ============================================================================

pub const OP_NOP: u8 = 0x61;

/// OP_VER - Fails when executed
pub const OP_VER: u8 = 0x62;
pub const OP_IF: u8 = 0x63;
pub const OP_NOTIF: u8 = 0x64;

/// OP_VERIF - Fails even inside an unexecuted branch
pub const OP_VERIF: u8 = 0x65;

/// OP_VERNOTIF - Fails even inside an unexecuted branch
pub const OP_VERNOTIF: u8 = 0x66;
pub const OP_ELSE: u8 = 0x67;
pub const OP_ENDIF: u8 = 0x68;
pub const OP_VERIFY: u8 = 0x69;

/// OP_RETURN - Ends execution; marks data outputs as unspendable
pub const OP_RETURN: u8 = 0x6a;

// ============================================================================
// STACK OPERATIONS (0x6b - 0x7d)
// ============================================================================

pub const OP_TOALTSTACK: u8 = 0x6b;
pub const OP_FROMALTSTACK: u8 = 0x6c;
pub const OP_2DROP: u8 = 0x6d;
pub const OP_2DUP: u8 = 0x6e;
pub const OP_3DUP: u8 = 0x6f;
pub const OP_2OVER: u8 = 0x70;
pub const OP_2ROT: u8 = 0x71;
pub const OP_2SWAP: u8 = 0x72;
pub const OP_IFDUP: u8 = 0x73;
pub const OP_DEPTH: u8 = 0x74;
pub const OP_DROP: u8 = 0x75;
pub const OP_DUP: u8 = 0x76;
pub const OP_NIP: u8 = 0x77;
pub const OP_OVER: u8 = 0x78;
pub const OP_PICK: u8 = 0x79;
pub const OP_ROLL: u8 = 0x7a;
pub const OP_ROT: u8 = 0x7b;
pub const OP_SWAP: u8 = 0x7c;
pub const OP_TUCK: u8 = 0x7d;

// ============================================================================
// SPLICE OPERATIONS (0x7e - 0x82)
// ============================================================================

/// OP_CAT - Concatenate two byte vectors
pub const OP_CAT: u8 = 0x7e;

/// OP_SPLIT - Split a byte vector at a position
pub const OP_SPLIT: u8 = 0x7f;

/// OP_NUM2BIN - Convert a number to a byte vector of a given size
pub const OP_NUM2BIN: u8 = 0x80;

/// OP_BIN2NUM - Convert a byte vector to its minimal numeric encoding
pub const OP_BIN2NUM: u8 = 0x81;
pub const OP_SIZE: u8 = 0x82;

// ============================================================================
// BITWISE LOGIC (0x83 - 0x8a)
// ============================================================================

pub const OP_INVERT: u8 = 0x83;
pub const OP_AND: u8 = 0x84;
pub const OP_OR: u8 = 0x85;
pub const OP_XOR: u8 = 0x86;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_RESERVED1: u8 = 0x89;
pub const OP_RESERVED2: u8 = 0x8a;

// ============================================================================
// ARITHMETIC (0x8b - 0xa5)
// ============================================================================

pub const OP_1ADD: u8 = 0x8b;
pub const OP_1SUB: u8 = 0x8c;

/// OP_2MUL - Disabled
pub const OP_2MUL: u8 = 0x8d;

/// OP_2DIV - Disabled
pub const OP_2DIV: u8 = 0x8e;
pub const OP_NEGATE: u8 = 0x8f;
pub const OP_ABS: u8 = 0x90;
pub const OP_NOT: u8 = 0x91;
pub const OP_0NOTEQUAL: u8 = 0x92;
pub const OP_ADD: u8 = 0x93;
pub const OP_SUB: u8 = 0x94;
pub const OP_MUL: u8 = 0x95;
pub const OP_DIV: u8 = 0x96;
pub const OP_MOD: u8 = 0x97;

/// OP_LSHIFT - Logical left shift of a byte vector, length preserved
pub const OP_LSHIFT: u8 = 0x98;

/// OP_RSHIFT - Logical right shift of a byte vector, length preserved
pub const OP_RSHIFT: u8 = 0x99;
pub const OP_BOOLAND: u8 = 0x9a;
pub const OP_BOOLOR: u8 = 0x9b;
pub const OP_NUMEQUAL: u8 = 0x9c;
pub const OP_NUMEQUALVERIFY: u8 = 0x9d;
pub const OP_NUMNOTEQUAL: u8 = 0x9e;
pub const OP_LESSTHAN: u8 = 0x9f;
pub const OP_GREATERTHAN: u8 = 0xa0;
pub const OP_LESSTHANOREQUAL: u8 = 0xa1;
pub const OP_GREATERTHANOREQUAL: u8 = 0xa2;
pub const OP_MIN: u8 = 0xa3;
pub const OP_MAX: u8 = 0xa4;
pub const OP_WITHIN: u8 = 0xa5;

// ============================================================================
// CRYPTO (0xa6 - 0xaf)
// ============================================================================

pub const OP_RIPEMD160: u8 = 0xa6;
pub const OP_SHA1: u8 = 0xa7;
pub const OP_SHA256: u8 = 0xa8;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_HASH256: u8 = 0xaa;
pub const OP_CODESEPARATOR: u8 = 0xab;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
pub const OP_CHECKMULTISIG: u8 = 0xae;
pub const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;

// ============================================================================
// EXPANSION (0xb0 - 0xb9)
// ============================================================================

pub const OP_NOP1: u8 = 0xb0;

/// Removed lock-time verifier; rejected as a disabled opcode
pub const OP_CHECKLOCKTIMEVERIFY: u8 = 0xb1;

/// Removed relative lock-time verifier; rejected as a disabled opcode
pub const OP_CHECKSEQUENCEVERIFY: u8 = 0xb2;
pub const OP_NOP4: u8 = 0xb3;
pub const OP_NOP5: u8 = 0xb4;
pub const OP_NOP6: u8 = 0xb5;
pub const OP_NOP7: u8 = 0xb6;
pub const OP_NOP8: u8 = 0xb7;
pub const OP_NOP9: u8 = 0xb8;
pub const OP_NOP10: u8 = 0xb9;

/// First byte value with no assigned opcode
pub const FIRST_UNDEFINED_OP_VALUE: u8 = 0xba;

pub const OP_INVALIDOPCODE: u8 = 0xff;

/// Base value for OP_1 through OP_16 (OP_1 = 0x50 + 1)
pub const OP_N_BASE: u8 = 0x50;

/// Decode OP_0 / OP_1..OP_16 into the small integer they push.
pub fn decode_op_n(opcode: u8) -> Option<u8> {
    match opcode {
        OP_0 => Some(0),
        OP_1..=OP_16 => Some(opcode - OP_N_BASE),
        _ => None,
    }
}

/// OP_0 or OP_1..OP_16.
#[inline]
pub fn is_small_int(opcode: u8) -> bool {
    opcode == OP_0 || (OP_1..=OP_16).contains(&opcode)
}

/// Encode 0..=16 as OP_0 / OP_1..OP_16.
pub fn encode_op_n(n: u8) -> Option<u8> {
    match n {
        0 => Some(OP_0),
        1..=16 => Some(OP_N_BASE + n),
        _ => None,
    }
}

/// Opcodes that fail whenever they appear, executed or not.
pub fn is_disabled(opcode: u8) -> bool {
    matches!(
        opcode,
        OP_2MUL | OP_2DIV | OP_CHECKLOCKTIMEVERIFY | OP_CHECKSEQUENCEVERIFY
    )
}

/// Closed enumeration of every byte value an instruction can start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// OP_0: push an empty vector
    PushEmpty,
    /// 0x01..=0x4b: push the next `n` bytes
    PushBytes(u8),
    PushData1,
    PushData2,
    PushData4,
    Push1Negate,
    Reserved,
    /// OP_1..=OP_16
    PushNum(u8),

    Nop,
    Ver,
    If,
    NotIf,
    VerIf,
    VerNotIf,
    Else,
    EndIf,
    Verify,
    Return,

    ToAltStack,
    FromAltStack,
    Drop2,
    Dup2,
    Dup3,
    Over2,
    Rot2,
    Swap2,
    IfDup,
    Depth,
    Drop,
    Dup,
    Nip,
    Over,
    Pick,
    Roll,
    Rot,
    Swap,
    Tuck,

    Cat,
    Split,
    Num2Bin,
    Bin2Num,
    Size,

    Invert,
    And,
    Or,
    Xor,
    Equal,
    EqualVerify,
    Reserved1,
    Reserved2,

    Add1,
    Sub1,
    Mul2,
    Div2,
    Negate,
    Abs,
    Not,
    NotEqual0,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    LShift,
    RShift,
    BoolAnd,
    BoolOr,
    NumEqual,
    NumEqualVerify,
    NumNotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Min,
    Max,
    Within,

    Ripemd160,
    Sha1,
    Sha256,
    Hash160,
    Hash256,
    CodeSeparator,
    CheckSig,
    CheckSigVerify,
    CheckMultiSig,
    CheckMultiSigVerify,

    /// NOP1 and NOP4..=NOP10, held back for future upgrades
    UpgradableNop(u8),
    CheckLockTimeVerify,
    CheckSequenceVerify,

    /// 0xba..=0xff
    Invalid(u8),
}

impl Opcode {
    pub fn from_u8(byte: u8) -> Opcode {
        use Opcode::*;
        match byte {
            OP_0 => PushEmpty,
            0x01..=0x4b => PushBytes(byte),
            OP_PUSHDATA1 => PushData1,
            OP_PUSHDATA2 => PushData2,
            OP_PUSHDATA4 => PushData4,
            OP_1NEGATE => Push1Negate,
            OP_RESERVED => Reserved,
            OP_1..=OP_16 => PushNum(byte - OP_N_BASE),
            OP_NOP => Nop,
            OP_VER => Ver,
            OP_IF => If,
            OP_NOTIF => NotIf,
            OP_VERIF => VerIf,
            OP_VERNOTIF => VerNotIf,
            OP_ELSE => Else,
            OP_ENDIF => EndIf,
            OP_VERIFY => Verify,
            OP_RETURN => Return,
            OP_TOALTSTACK => ToAltStack,
            OP_FROMALTSTACK => FromAltStack,
            OP_2DROP => Drop2,
            OP_2DUP => Dup2,
            OP_3DUP => Dup3,
            OP_2OVER => Over2,
            OP_2ROT => Rot2,
            OP_2SWAP => Swap2,
            OP_IFDUP => IfDup,
            OP_DEPTH => Depth,
            OP_DROP => Drop,
            OP_DUP => Dup,
            OP_NIP => Nip,
            OP_OVER => Over,
            OP_PICK => Pick,
            OP_ROLL => Roll,
            OP_ROT => Rot,
            OP_SWAP => Swap,
            OP_TUCK => Tuck,
            OP_CAT => Cat,
            OP_SPLIT => Split,
            OP_NUM2BIN => Num2Bin,
            OP_BIN2NUM => Bin2Num,
            OP_SIZE => Size,
            OP_INVERT => Invert,
            OP_AND => And,
            OP_OR => Or,
            OP_XOR => Xor,
            OP_EQUAL => Equal,
            OP_EQUALVERIFY => EqualVerify,
            OP_RESERVED1 => Reserved1,
            OP_RESERVED2 => Reserved2,
            OP_1ADD => Add1,
            OP_1SUB => Sub1,
            OP_2MUL => Mul2,
            OP_2DIV => Div2,
            OP_NEGATE => Negate,
            OP_ABS => Abs,
            OP_NOT => Not,
            OP_0NOTEQUAL => NotEqual0,
            OP_ADD => Add,
            OP_SUB => Sub,
            OP_MUL => Mul,
            OP_DIV => Div,
            OP_MOD => Mod,
            OP_LSHIFT => LShift,
            OP_RSHIFT => RShift,
            OP_BOOLAND => BoolAnd,
            OP_BOOLOR => BoolOr,
            OP_NUMEQUAL => NumEqual,
            OP_NUMEQUALVERIFY => NumEqualVerify,
            OP_NUMNOTEQUAL => NumNotEqual,
            OP_LESSTHAN => LessThan,
            OP_GREATERTHAN => GreaterThan,
            OP_LESSTHANOREQUAL => LessThanOrEqual,
            OP_GREATERTHANOREQUAL => GreaterThanOrEqual,
            OP_MIN => Min,
            OP_MAX => Max,
            OP_WITHIN => Within,
            OP_RIPEMD160 => Ripemd160,
            OP_SHA1 => Sha1,
            OP_SHA256 => Sha256,
            OP_HASH160 => Hash160,
            OP_HASH256 => Hash256,
            OP_CODESEPARATOR => CodeSeparator,
            OP_CHECKSIG => CheckSig,
            OP_CHECKSIGVERIFY => CheckSigVerify,
            OP_CHECKMULTISIG => CheckMultiSig,
            OP_CHECKMULTISIGVERIFY => CheckMultiSigVerify,
            OP_NOP1 => UpgradableNop(1),
            OP_CHECKLOCKTIMEVERIFY => CheckLockTimeVerify,
            OP_CHECKSEQUENCEVERIFY => CheckSequenceVerify,
            OP_NOP4..=OP_NOP10 => UpgradableNop(byte - OP_NOP4 + 4),
            FIRST_UNDEFINED_OP_VALUE..=0xff => Invalid(byte),
        }
    }

    pub fn to_u8(self) -> u8 {
        use Opcode::*;
        match self {
            PushEmpty => OP_0,
            PushBytes(n) => n,
            PushData1 => OP_PUSHDATA1,
            PushData2 => OP_PUSHDATA2,
            PushData4 => OP_PUSHDATA4,
            Push1Negate => OP_1NEGATE,
            Reserved => OP_RESERVED,
            PushNum(n) => OP_N_BASE + n,
            Nop => OP_NOP,
            Ver => OP_VER,
            If => OP_IF,
            NotIf => OP_NOTIF,
            VerIf => OP_VERIF,
            VerNotIf => OP_VERNOTIF,
            Else => OP_ELSE,
            EndIf => OP_ENDIF,
            Verify => OP_VERIFY,
            Return => OP_RETURN,
            ToAltStack => OP_TOALTSTACK,
            FromAltStack => OP_FROMALTSTACK,
            Drop2 => OP_2DROP,
            Dup2 => OP_2DUP,
            Dup3 => OP_3DUP,
            Over2 => OP_2OVER,
            Rot2 => OP_2ROT,
            Swap2 => OP_2SWAP,
            IfDup => OP_IFDUP,
            Depth => OP_DEPTH,
            Drop => OP_DROP,
            Dup => OP_DUP,
            Nip => OP_NIP,
            Over => OP_OVER,
            Pick => OP_PICK,
            Roll => OP_ROLL,
            Rot => OP_ROT,
            Swap => OP_SWAP,
            Tuck => OP_TUCK,
            Cat => OP_CAT,
            Split => OP_SPLIT,
            Num2Bin => OP_NUM2BIN,
            Bin2Num => OP_BIN2NUM,
            Size => OP_SIZE,
            Invert => OP_INVERT,
            And => OP_AND,
            Or => OP_OR,
            Xor => OP_XOR,
            Equal => OP_EQUAL,
            EqualVerify => OP_EQUALVERIFY,
            Reserved1 => OP_RESERVED1,
            Reserved2 => OP_RESERVED2,
            Add1 => OP_1ADD,
            Sub1 => OP_1SUB,
            Mul2 => OP_2MUL,
            Div2 => OP_2DIV,
            Negate => OP_NEGATE,
            Abs => OP_ABS,
            Not => OP_NOT,
            NotEqual0 => OP_0NOTEQUAL,
            Add => OP_ADD,
            Sub => OP_SUB,
            Mul => OP_MUL,
            Div => OP_DIV,
            Mod => OP_MOD,
            LShift => OP_LSHIFT,
            RShift => OP_RSHIFT,
            BoolAnd => OP_BOOLAND,
            BoolOr => OP_BOOLOR,
            NumEqual => OP_NUMEQUAL,
            NumEqualVerify => OP_NUMEQUALVERIFY,
            NumNotEqual => OP_NUMNOTEQUAL,
            LessThan => OP_LESSTHAN,
            GreaterThan => OP_GREATERTHAN,
            LessThanOrEqual => OP_LESSTHANOREQUAL,
            GreaterThanOrEqual => OP_GREATERTHANOREQUAL,
            Min => OP_MIN,
            Max => OP_MAX,
            Within => OP_WITHIN,
            Ripemd160 => OP_RIPEMD160,
            Sha1 => OP_SHA1,
            Sha256 => OP_SHA256,
            Hash160 => OP_HASH160,
            Hash256 => OP_HASH256,
            CodeSeparator => OP_CODESEPARATOR,
            CheckSig => OP_CHECKSIG,
            CheckSigVerify => OP_CHECKSIGVERIFY,
            CheckMultiSig => OP_CHECKMULTISIG,
            CheckMultiSigVerify => OP_CHECKMULTISIGVERIFY,
            UpgradableNop(1) => OP_NOP1,
            UpgradableNop(n) => OP_NOP4 + n.saturating_sub(4),
            CheckLockTimeVerify => OP_CHECKLOCKTIMEVERIFY,
            CheckSequenceVerify => OP_CHECKSEQUENCEVERIFY,
            Invalid(b) => b,
        }
    }

    /// Push opcodes (OP_0 through OP_16) do not count toward the op limit.
    pub fn is_push(self) -> bool {
        self.to_u8() <= OP_16
    }

    pub fn is_disabled(self) -> bool {
        is_disabled(self.to_u8())
    }

    pub fn name(self) -> &'static str {
        use Opcode::*;
        const NUM_NAMES: [&str; 16] = [
            "OP_1", "OP_2", "OP_3", "OP_4", "OP_5", "OP_6", "OP_7", "OP_8", "OP_9", "OP_10",
            "OP_11", "OP_12", "OP_13", "OP_14", "OP_15", "OP_16",
        ];
        const NOP_NAMES: [&str; 10] = [
            "OP_NOP1", "OP_NOP2", "OP_NOP3", "OP_NOP4", "OP_NOP5", "OP_NOP6", "OP_NOP7",
            "OP_NOP8", "OP_NOP9", "OP_NOP10",
        ];
        match self {
            PushEmpty => "0",
            PushBytes(_) => "OP_PUSHBYTES",
            PushData1 => "OP_PUSHDATA1",
            PushData2 => "OP_PUSHDATA2",
            PushData4 => "OP_PUSHDATA4",
            Push1Negate => "-1",
            Reserved => "OP_RESERVED",
            PushNum(n) => NUM_NAMES[(n.clamp(1, 16) - 1) as usize],
            Nop => "OP_NOP",
            Ver => "OP_VER",
            If => "OP_IF",
            NotIf => "OP_NOTIF",
            VerIf => "OP_VERIF",
            VerNotIf => "OP_VERNOTIF",
            Else => "OP_ELSE",
            EndIf => "OP_ENDIF",
            Verify => "OP_VERIFY",
            Return => "OP_RETURN",
            ToAltStack => "OP_TOALTSTACK",
            FromAltStack => "OP_FROMALTSTACK",
            Drop2 => "OP_2DROP",
            Dup2 => "OP_2DUP",
            Dup3 => "OP_3DUP",
            Over2 => "OP_2OVER",
            Rot2 => "OP_2ROT",
            Swap2 => "OP_2SWAP",
            IfDup => "OP_IFDUP",
            Depth => "OP_DEPTH",
            Drop => "OP_DROP",
            Dup => "OP_DUP",
            Nip => "OP_NIP",
            Over => "OP_OVER",
            Pick => "OP_PICK",
            Roll => "OP_ROLL",
            Rot => "OP_ROT",
            Swap => "OP_SWAP",
            Tuck => "OP_TUCK",
            Cat => "OP_CAT",
            Split => "OP_SPLIT",
            Num2Bin => "OP_NUM2BIN",
            Bin2Num => "OP_BIN2NUM",
            Size => "OP_SIZE",
            Invert => "OP_INVERT",
            And => "OP_AND",
            Or => "OP_OR",
            Xor => "OP_XOR",
            Equal => "OP_EQUAL",
            EqualVerify => "OP_EQUALVERIFY",
            Reserved1 => "OP_RESERVED1",
            Reserved2 => "OP_RESERVED2",
            Add1 => "OP_1ADD",
            Sub1 => "OP_1SUB",
            Mul2 => "OP_2MUL",
            Div2 => "OP_2DIV",
            Negate => "OP_NEGATE",
            Abs => "OP_ABS",
            Not => "OP_NOT",
            NotEqual0 => "OP_0NOTEQUAL",
            Add => "OP_ADD",
            Sub => "OP_SUB",
            Mul => "OP_MUL",
            Div => "OP_DIV",
            Mod => "OP_MOD",
            LShift => "OP_LSHIFT",
            RShift => "OP_RSHIFT",
            BoolAnd => "OP_BOOLAND",
            BoolOr => "OP_BOOLOR",
            NumEqual => "OP_NUMEQUAL",
            NumEqualVerify => "OP_NUMEQUALVERIFY",
            NumNotEqual => "OP_NUMNOTEQUAL",
            LessThan => "OP_LESSTHAN",
            GreaterThan => "OP_GREATERTHAN",
            LessThanOrEqual => "OP_LESSTHANOREQUAL",
            GreaterThanOrEqual => "OP_GREATERTHANOREQUAL",
            Min => "OP_MIN",
            Max => "OP_MAX",
            Within => "OP_WITHIN",
            Ripemd160 => "OP_RIPEMD160",
            Sha1 => "OP_SHA1",
            Sha256 => "OP_SHA256",
            Hash160 => "OP_HASH160",
            Hash256 => "OP_HASH256",
            CodeSeparator => "OP_CODESEPARATOR",
            CheckSig => "OP_CHECKSIG",
            CheckSigVerify => "OP_CHECKSIGVERIFY",
            CheckMultiSig => "OP_CHECKMULTISIG",
            CheckMultiSigVerify => "OP_CHECKMULTISIGVERIFY",
            UpgradableNop(n) => NOP_NAMES[(n.clamp(1, 10) - 1) as usize],
            CheckLockTimeVerify => "OP_CHECKLOCKTIMEVERIFY",
            CheckSequenceVerify => "OP_CHECKSEQUENCEVERIFY",
            Invalid(_) => "OP_INVALIDOPCODE",
        }
    }
}

impl From<u8> for Opcode {
    fn from(byte: u8) -> Self {
        Opcode::from_u8(byte)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
