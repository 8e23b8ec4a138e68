//! Mint and rescale protocol for hashmint collections.
//!
//! A collection is an immutable [`CollectionHandle`] plus a persisted
//! [`CollectionConfig`](hashmint_codec::CollectionConfig). Operations arrive
//! as encoded bodies and run through [`process`], which either returns a
//! complete new state with any outbound messages, or an [`ExecutionError`]
//! carrying the abort code. Nothing is mutated in place.
//!
//! # Architecture
//!
//! - **process**: decodes a body and dispatches to the operation
//! - **mining**: proof-of-work acceptance, seed rotation, idle-gated rescaling
//! - **admin**: owner-gated ChangeOwner / EditContent, royalty replies
//! - **queries**: read-only views answered from persisted state
//! - **instance**: in-memory executor that commits only successful operations
//! - **solver**: client-side search for a body under the threshold

mod admin;
pub mod error;
pub mod handle;
pub mod instance;
pub mod mining;
pub mod process;
pub mod queries;
pub mod solver;

pub use error::{
    exit_code, ExecutionError, ExecutionResult, InstanceError, InstanceResult, ProtocolError,
};
pub use handle::{CollectionHandle, Context};
pub use instance::CollectionInstance;
pub use mining::{expected_attempts, threshold_for_exponent};
pub use process::{process, Effect, OutboundMessage, Transition};
pub use solver::{Solution, Solver};
