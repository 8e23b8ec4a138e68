//! Bit tree encoding for hashmint.
//!
//! A [`BitTree`] is an immutable node holding up to [`MAX_BITS`] bits and up
//! to [`MAX_CHILDREN`] child trees. It is the unit of serialization for both
//! persisted collection state and message bodies.
//!
//! # Architecture
//!
//! - [`TreeBuilder`]: appends typed values into a bit buffer and child slots,
//!   then seals into a [`BitTree`]
//! - [`BitTree`]: arena of sealed nodes in post-order, root last; child
//!   indices always point to earlier nodes, so cycles cannot be expressed
//! - [`TreeReader`]: sequential cursor over one node's bits and children
//! - [`TreeHasher`]: domain-separated BLAKE3, hashing children first

pub mod bits;
pub mod builder;
pub mod error;
pub mod hasher;
pub mod reader;
pub mod tree;

pub use bits::BitString;
pub use builder::TreeBuilder;
pub use error::{TreeError, TreeResult};
pub use hasher::TreeHasher;
pub use reader::TreeReader;
pub use tree::{BitTree, TreeRef};

/// Maximum number of bits a single node can hold.
pub const MAX_BITS: usize = 1023;

/// Maximum number of children a single node can reference.
pub const MAX_CHILDREN: usize = 4;
