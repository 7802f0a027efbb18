//! Error types for consensus and policy validation

use std::borrow::Cow;
use thiserror::Error;

/// Specific reason a script failed to evaluate.
///
/// Every failure path in the interpreter maps onto exactly one code so that the
/// validation layer can decide whether a failure is consensus-fatal or only
/// policy-fatal without inspecting message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptErrorCode {
    Ok,
    UnknownError,
    EvalFalse,
    OpReturn,
    Cancelled,

    // Resource limits
    ScriptSize,
    PushSize,
    OpCount,
    StackSize,
    SigCount,
    PubkeyCount,
    ScriptNumOverflow,

    // Failed verify operations
    Verify,
    EqualVerify,
    CheckMultisigVerify,
    CheckSigVerify,
    NumEqualVerify,

    // Logical and parse errors
    BadOpcode,
    DisabledOpcode,
    InvalidStackOperation,
    InvalidAltstackOperation,
    UnbalancedConditional,

    // Splice and arithmetic
    InvalidOperandSize,
    InvalidNumberRange,
    ImpossibleEncoding,
    InvalidSplitRange,
    DivByZero,
    ModByZero,

    // Encoding and flag-driven checks
    SigHashType,
    SigDer,
    MinimalData,
    SigPushOnly,
    SigHighS,
    SigNullDummy,
    PubkeyType,
    CleanStack,
    MinimalIf,
    SigNullFail,
    DiscourageUpgradableNops,
    IllegalForkId,
}

impl ScriptErrorCode {
    /// Short machine-readable name, matching the reject strings peers expect.
    pub fn as_str(self) -> &'static str {
        match self {
            ScriptErrorCode::Ok => "No error",
            ScriptErrorCode::UnknownError => "unknown error",
            ScriptErrorCode::EvalFalse => "Script evaluated without error but finished with a false/empty top stack element",
            ScriptErrorCode::OpReturn => "OP_RETURN was encountered",
            ScriptErrorCode::Cancelled => "Script evaluation was cancelled",
            ScriptErrorCode::ScriptSize => "Script is too big",
            ScriptErrorCode::PushSize => "Push value size limit exceeded",
            ScriptErrorCode::OpCount => "Operation limit exceeded",
            ScriptErrorCode::StackSize => "Stack size limit exceeded",
            ScriptErrorCode::SigCount => "Signature count negative or greater than pubkey count",
            ScriptErrorCode::PubkeyCount => "Pubkey count negative or limit exceeded",
            ScriptErrorCode::ScriptNumOverflow => "Script number overflow",
            ScriptErrorCode::Verify => "Script failed an OP_VERIFY operation",
            ScriptErrorCode::EqualVerify => "Script failed an OP_EQUALVERIFY operation",
            ScriptErrorCode::CheckMultisigVerify => "Script failed an OP_CHECKMULTISIGVERIFY operation",
            ScriptErrorCode::CheckSigVerify => "Script failed an OP_CHECKSIGVERIFY operation",
            ScriptErrorCode::NumEqualVerify => "Script failed an OP_NUMEQUALVERIFY operation",
            ScriptErrorCode::BadOpcode => "Opcode missing or not understood",
            ScriptErrorCode::DisabledOpcode => "Attempted to use a disabled opcode",
            ScriptErrorCode::InvalidStackOperation => "Operation not valid with the current stack size",
            ScriptErrorCode::InvalidAltstackOperation => "Operation not valid with the current altstack size",
            ScriptErrorCode::UnbalancedConditional => "Invalid OP_IF construction",
            ScriptErrorCode::InvalidOperandSize => "Invalid operand size",
            ScriptErrorCode::InvalidNumberRange => "Given operand is not a number within the valid range",
            ScriptErrorCode::ImpossibleEncoding => "The requested encoding is impossible to satisfy",
            ScriptErrorCode::InvalidSplitRange => "Invalid OP_SPLIT range",
            ScriptErrorCode::DivByZero => "Division by zero error",
            ScriptErrorCode::ModByZero => "Modulo by zero error",
            ScriptErrorCode::SigHashType => "Signature hash type missing or not understood",
            ScriptErrorCode::SigDer => "Non-canonical DER signature",
            ScriptErrorCode::MinimalData => "Data push larger than necessary",
            ScriptErrorCode::SigPushOnly => "Only push operators allowed in signatures",
            ScriptErrorCode::SigHighS => "Non-canonical signature: S value is unnecessarily high",
            ScriptErrorCode::SigNullDummy => "Dummy CHECKMULTISIG argument must be zero",
            ScriptErrorCode::PubkeyType => "Public key is neither compressed or uncompressed",
            ScriptErrorCode::CleanStack => "Script did not clean its stack",
            ScriptErrorCode::MinimalIf => "OP_IF/NOTIF argument must be minimal",
            ScriptErrorCode::SigNullFail => "Signature must be zero for failed CHECK(MULTI)SIG operation",
            ScriptErrorCode::DiscourageUpgradableNops => "NOPx reserved for soft-fork upgrades",
            ScriptErrorCode::IllegalForkId => "Illegal use of SIGHASH_FORKID",
        }
    }
}

impl std::fmt::Display for ScriptErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Clone)]
pub enum ConsensusError {
    #[error("Transaction validation failed: {0}")]
    TransactionValidation(Cow<'static, str>),

    #[error("Block validation failed: {0}")]
    BlockValidation(Cow<'static, str>),

    #[error("Script execution failed ({code:?}): {message}")]
    ScriptErrorWithCode {
        code: ScriptErrorCode,
        message: Cow<'static, str>,
    },

    #[error("Invalid signature: {0}")]
    InvalidSignature(Cow<'static, str>),

    #[error("Invalid proof of work: {0}")]
    InvalidProofOfWork(Cow<'static, str>),

    #[error("Serialization error: {0}")]
    Serialization(Cow<'static, str>),

    #[error("Configuration error: {0}")]
    Config(Cow<'static, str>),

    #[error("Invalid sighash type: {0}")]
    InvalidSighashType(u32),

    #[error("Invalid input index: {0}")]
    InvalidInputIndex(usize),
}

impl ConsensusError {
    /// Build a script error from a code, using the code's canonical message.
    pub fn script(code: ScriptErrorCode) -> Self {
        ConsensusError::ScriptErrorWithCode {
            code,
            message: code.as_str().into(),
        }
    }

    /// Build a script error with a context-specific message.
    pub fn script_with(code: ScriptErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        ConsensusError::ScriptErrorWithCode {
            code,
            message: message.into(),
        }
    }

    /// The script error code carried by this error, if any.
    pub fn script_code(&self) -> Option<ScriptErrorCode> {
        match self {
            ConsensusError::ScriptErrorWithCode { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsensusError>;
