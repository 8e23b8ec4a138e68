use thiserror::Error;

/// Errors from building or reading bit trees.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    /// Appending would push the node past its bit capacity.
    #[error("capacity exceeded: {requested} bits requested, {available} available")]
    CapacityExceeded { requested: usize, available: usize },

    /// The value needs more bits than the field width allows.
    #[error("value out of range: needs {required} bits, field is {width} bits wide")]
    ValueOutOfRange { width: usize, required: u64 },

    /// The node already holds the maximum number of children.
    #[error("too many children: a node holds at most {max}")]
    TooManyChildren { max: usize },

    /// A read asked for more bits than remain in the node.
    #[error("underflow: {requested} bits requested, {remaining} remaining")]
    Underflow { requested: usize, remaining: usize },

    /// A read asked for a child the node does not have.
    #[error("missing child at position {index}")]
    MissingChild { index: usize },

    /// A decoder finished while unread bits or children remain.
    #[error("trailing data: {bits} bits and {children} children left unread")]
    TrailingData { bits: usize, children: usize },
}

pub type TreeResult<T> = Result<T, TreeError>;
