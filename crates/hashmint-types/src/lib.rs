//! Foundation types for hashmint.
//!
//! Every other hashmint crate depends on `hashmint-types`.
//!
//! # Key Types
//!
//! - [`Address`]: account address (chain id + 256-bit account id), or none
//! - [`TreeHash`]: content address of a sealed bit tree (BLAKE3 digest)

pub mod address;
pub mod error;
pub mod hash;

pub use address::Address;
pub use error::TypeError;
pub use hash::TreeHash;
