use hashmint_tree::TreeError;
use thiserror::Error;

/// Errors from encoding or decoding collection values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("unknown operation: {0:#010x}")]
    UnknownOperation(u32),

    #[error("unknown content tag: {0:#04x}")]
    UnknownContentTag(u8),

    #[error("invalid content: {0}")]
    InvalidContent(String),
}

pub type CodecResult<T> = Result<T, CodecError>;
