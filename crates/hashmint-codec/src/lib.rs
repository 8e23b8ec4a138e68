//! Storage and message codecs for hashmint collections.
//!
//! Everything here maps typed values to and from sealed [`BitTree`]s with a
//! fixed, bit-exact layout. Deployment identity and proof-of-work hashes are
//! computed over these trees, so field order never changes.
//!
//! - [`content`]: off-chain content strings and untagged snake strings
//! - [`royalty`]: royalty parameters
//! - [`storage`]: persisted collection state
//! - [`message`]: operation bodies, each tagged by a 32-bit opcode
//!
//! [`BitTree`]: hashmint_tree::BitTree

pub mod content;
pub mod error;
pub mod message;
pub mod royalty;
pub mod serde_decimal;
pub mod storage;

pub use content::ContentSet;
pub use error::{CodecError, CodecResult};
pub use message::{op, CollectionMessage, MineRequest};
pub use royalty::RoyaltyParams;
pub use storage::{CollectionConfig, MiningState};
