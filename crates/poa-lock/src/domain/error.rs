//! Error types for the PoA lock
//!
//! Every check short-circuits with one of these. The host only observes
//! success or failure (plus [`PoaError::exit_code`]); the variants exist so
//! that logs and tests can tell rejections apart.

use crate::ports::{Source, SysError};

/// Exit code for transaction-structure violations.
pub const ERROR_TRANSACTION: i8 = -1;

/// Exit code for encoding and validation failures.
pub const ERROR_ENCODING: i8 = -2;

/// Broad classification of a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Structural,
    Decode,
    Reference,
    TimeLock,
    Transition,
    Syscall,
}

/// PoA lock rejection reasons.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoaError {
    // === Structural ===
    #[error("Transaction has more than one input cell using the PoA lock")]
    MultipleGroupInputs,

    #[error("Transaction has more than one output cell using the PoA lock")]
    MultipleGroupOutputs,

    #[error("Own script is not a valid molecule Script")]
    MalformedScript,

    #[error("Script args must be 64 bytes long, got {actual}")]
    InvalidArgsLength { actual: usize },

    #[error("Duplicate PoA cell in {side}")]
    DuplicateCell { side: Source },

    // === Decode ===
    #[error("Buffer too large: {actual} bytes > capacity {capacity}")]
    LengthExceeded { actual: usize, capacity: usize },

    #[error("PoA setup too short: {actual} bytes")]
    SetupTooShort { actual: usize },

    #[error("Invalid identity size: {size} > {max}")]
    IdentitySizeTooLarge { size: u8, max: u8 },

    #[error("Invalid aggregator change threshold: {threshold} > {aggregators}")]
    ThresholdTooLarge { threshold: u8, aggregators: u8 },

    #[error("PoA setup length mismatch: expected {expected}, got {actual}")]
    SetupLengthMismatch { expected: usize, actual: usize },

    #[error("Invalid round state length: {actual}")]
    RoundStateLength { actual: usize },

    // === Reference ===
    #[error("PoA cell not found in {side}")]
    CellNotFound { side: Source },

    #[error("Invalid aggregator index: {index} >= {aggregators}")]
    AggregatorIndexOutOfRange { index: u16, aggregators: u8 },

    // === Time lock ===
    #[error("Since flags {actual:#04x} do not match required {expected:#04x}")]
    SinceModeMismatch { expected: u8, actual: u8 },

    #[error("Since {since} does not match subblock time {subblock_time}")]
    SinceTimeMismatch { since: u64, subblock_time: u64 },

    #[error("Since value {0} exceeds 56 bits")]
    SinceOverflow(u64),

    // === Transition ===
    #[error("Invalid round initial time: expected {expected}, got {actual}")]
    RoundInitialTimeMismatch { expected: u64, actual: u64 },

    #[error("Subblock time went backwards: {current} < {previous}")]
    SubblockTimeRegressed { previous: u64, current: u64 },

    #[error("Aggregator changed inside a round: {previous} -> {current}")]
    AggregatorChanged { previous: u16, current: u16 },

    #[error("Invalid subblock index: {actual}")]
    InvalidSubblockIndex { actual: u32 },

    #[error("Rotation too early: since {since} < required {required}")]
    RotationTooEarly { since: u64, required: u64 },

    #[error("No matching identity found")]
    SignerNotFound,

    #[error("Not enough matching identities: {found} < {required}")]
    ThresholdNotMet { found: u8, required: u8 },

    // === Host ===
    #[error("Syscall error: {0}")]
    Syscall(#[from] SysError),
}

impl PoaError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MultipleGroupInputs
            | Self::MultipleGroupOutputs
            | Self::MalformedScript
            | Self::InvalidArgsLength { .. }
            | Self::DuplicateCell { .. } => ErrorCategory::Structural,
            Self::LengthExceeded { .. }
            | Self::SetupTooShort { .. }
            | Self::IdentitySizeTooLarge { .. }
            | Self::ThresholdTooLarge { .. }
            | Self::SetupLengthMismatch { .. }
            | Self::RoundStateLength { .. } => ErrorCategory::Decode,
            Self::CellNotFound { .. } | Self::AggregatorIndexOutOfRange { .. } => {
                ErrorCategory::Reference
            }
            Self::SinceModeMismatch { .. }
            | Self::SinceTimeMismatch { .. }
            | Self::SinceOverflow(_) => ErrorCategory::TimeLock,
            Self::RoundInitialTimeMismatch { .. }
            | Self::SubblockTimeRegressed { .. }
            | Self::AggregatorChanged { .. }
            | Self::InvalidSubblockIndex { .. }
            | Self::RotationTooEarly { .. }
            | Self::SignerNotFound
            | Self::ThresholdNotMet { .. } => ErrorCategory::Transition,
            Self::Syscall(_) => ErrorCategory::Syscall,
        }
    }

    /// Exit code reported to the host.
    pub fn exit_code(&self) -> i8 {
        match self {
            Self::MultipleGroupInputs | Self::MultipleGroupOutputs => ERROR_TRANSACTION,
            Self::CellNotFound { .. } => SysError::IndexOutOfBound.code(),
            Self::Syscall(err) => err.code(),
            _ => ERROR_ENCODING,
        }
    }

    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MultipleGroupInputs => "multiple_group_inputs",
            Self::MultipleGroupOutputs => "multiple_group_outputs",
            Self::MalformedScript => "malformed_script",
            Self::InvalidArgsLength { .. } => "invalid_args_length",
            Self::DuplicateCell { .. } => "duplicate_cell",
            Self::LengthExceeded { .. } => "length_exceeded",
            Self::SetupTooShort { .. } => "setup_too_short",
            Self::IdentitySizeTooLarge { .. } => "identity_size_too_large",
            Self::ThresholdTooLarge { .. } => "threshold_too_large",
            Self::SetupLengthMismatch { .. } => "setup_length_mismatch",
            Self::RoundStateLength { .. } => "round_state_length",
            Self::CellNotFound { .. } => "cell_not_found",
            Self::AggregatorIndexOutOfRange { .. } => "aggregator_index_out_of_range",
            Self::SinceModeMismatch { .. } => "since_mode_mismatch",
            Self::SinceTimeMismatch { .. } => "since_time_mismatch",
            Self::SinceOverflow(_) => "since_overflow",
            Self::RoundInitialTimeMismatch { .. } => "round_initial_time_mismatch",
            Self::SubblockTimeRegressed { .. } => "subblock_time_regressed",
            Self::AggregatorChanged { .. } => "aggregator_changed",
            Self::InvalidSubblockIndex { .. } => "invalid_subblock_index",
            Self::RotationTooEarly { .. } => "rotation_too_early",
            Self::SignerNotFound => "signer_not_found",
            Self::ThresholdNotMet { .. } => "threshold_not_met",
            Self::Syscall(_) => "syscall",
        }
    }
}

/// Result type for PoA lock operations
pub type PoaResult<T> = Result<T, PoaError>;
