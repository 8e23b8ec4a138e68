use hashmint_codec::CodecError;
use hashmint_tree::TreeError;
use hashmint_types::{Address, TreeHash};
use thiserror::Error;

/// Numeric abort codes reported to the caller of a rejected operation.
pub mod exit_code {
    /// Mine rejected: expired, wrong seed, or proof of work not met.
    pub const MINE_REJECTED: u32 = 24;
    /// Rescale attempted before the idle cooldown elapsed.
    pub const RESCALE_COOLDOWN: u32 = 30;
    pub const UNAUTHORIZED: u32 = 401;
    pub const RANGE_CHECK: u32 = 5;
    pub const CELL_OVERFLOW: u32 = 8;
    pub const CELL_UNDERFLOW: u32 = 9;
    pub const UNKNOWN_OPERATION: u32 = 0xffff;
}

/// Reasons the protocol refuses an otherwise well-formed operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("request expired: expire={expire}, reference time={reference}")]
    Expired { expire: u32, reference: u32 },

    #[error("seed mismatch: expected {expected:#x}, got {provided:#x}")]
    SeedMismatch { expected: u128, provided: u128 },

    #[error("proof of work not satisfied: body hash {hash} is not below the threshold")]
    ProofOfWorkNotSatisfied { hash: TreeHash },

    #[error("rescale cooldown active: {remaining}s remaining")]
    RescaleCooldownActive { remaining: u64 },

    #[error("unauthorized sender: {sender}")]
    Unauthorized { sender: Address },

    #[error("operation {0} cannot be sent to a collection")]
    UnsupportedOperation(&'static str),

    #[error("item index space exhausted")]
    IndexExhausted,
}

impl ProtocolError {
    pub fn exit_code(&self) -> u32 {
        match self {
            Self::Expired { .. } | Self::SeedMismatch { .. } | Self::ProofOfWorkNotSatisfied { .. } => {
                exit_code::MINE_REJECTED
            }
            Self::RescaleCooldownActive { .. } => exit_code::RESCALE_COOLDOWN,
            Self::Unauthorized { .. } => exit_code::UNAUTHORIZED,
            Self::UnsupportedOperation(_) => exit_code::UNKNOWN_OPERATION,
            Self::IndexExhausted => exit_code::RANGE_CHECK,
        }
    }
}

/// Any failure while processing one operation. The state is untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl From<TreeError> for ExecutionError {
    fn from(err: TreeError) -> Self {
        Self::Codec(CodecError::Tree(err))
    }
}

impl ExecutionError {
    pub fn exit_code(&self) -> u32 {
        match self {
            Self::Protocol(err) => err.exit_code(),
            Self::Codec(CodecError::UnknownOperation(_)) => exit_code::UNKNOWN_OPERATION,
            Self::Codec(CodecError::Tree(err)) => match err {
                TreeError::CapacityExceeded { .. } | TreeError::TooManyChildren { .. } => {
                    exit_code::CELL_OVERFLOW
                }
                TreeError::ValueOutOfRange { .. } => exit_code::RANGE_CHECK,
                TreeError::Underflow { .. }
                | TreeError::MissingChild { .. }
                | TreeError::TrailingData { .. } => exit_code::CELL_UNDERFLOW,
            },
            Self::Codec(CodecError::UnknownContentTag(_) | CodecError::InvalidContent(_)) => {
                exit_code::CELL_UNDERFLOW
            }
        }
    }
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Errors from [`CollectionInstance`](crate::CollectionInstance).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InstanceError {
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("time went backwards: last operation at {previous}, now {now}")]
    TimeWentBackwards { previous: u32, now: u32 },
}

impl InstanceError {
    /// Abort code of a rejected operation. `None` when the operation was
    /// never attempted.
    pub fn exit_code(&self) -> Option<u32> {
        match self {
            Self::Execution(err) => Some(err.exit_code()),
            Self::TimeWentBackwards { .. } => None,
        }
    }
}

pub type InstanceResult<T> = Result<T, InstanceError>;
