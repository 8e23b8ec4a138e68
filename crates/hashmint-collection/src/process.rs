//! Operation dispatch.
//!
//! [`process`] decodes one inbound body and runs the matching operation
//! against a borrowed state. It never mutates its input: success yields a
//! complete new state in a [`Transition`], failure yields only the error.

use hashmint_codec::{CollectionConfig, CollectionMessage};
use hashmint_tree::BitTree;
use hashmint_types::Address;
use num_bigint::BigUint;

use crate::admin;
use crate::error::{ExecutionResult, ProtocolError};
use crate::handle::{CollectionHandle, Context};
use crate::mining;

/// A message the collection sends as a result of an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Deploy a freshly minted item.
    DeployItem {
        index: u64,
        address: Address,
        owner: Address,
        state_init: BitTree,
    },
    /// Answer a query.
    Reply { to: Address, body: BitTree },
}

/// What an accepted operation did, for callers and logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Minted {
        index: u64,
        item: Address,
        owner: Address,
    },
    Rescaled {
        previous: BigUint,
        threshold: BigUint,
    },
    OwnerChanged {
        previous: Address,
        owner: Address,
    },
    ContentEdited,
    RoyaltyReported {
        to: Address,
    },
}

/// Result of an accepted operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// The full state after the operation.
    pub state: CollectionConfig,
    pub outbound: Vec<OutboundMessage>,
    pub effect: Effect,
}

impl Transition {
    pub(crate) fn new(state: CollectionConfig, effect: Effect) -> Self {
        Self {
            state,
            outbound: Vec::new(),
            effect,
        }
    }

    pub(crate) fn with_outbound(mut self, message: OutboundMessage) -> Self {
        self.outbound.push(message);
        self
    }
}

/// Decode `body` and apply it to `state`.
pub fn process(
    handle: &CollectionHandle,
    state: &CollectionConfig,
    ctx: &Context,
    body: &BitTree,
) -> ExecutionResult<Transition> {
    let message = CollectionMessage::decode(body).map_err(|err| {
        tracing::warn!(error = %err, "rejected undecodable body");
        err
    })?;
    let op = message.type_name();

    let result = match message {
        CollectionMessage::Mine(request) => {
            mining::mine(handle, state, ctx, &request, &body.hash())
        }
        CollectionMessage::RescaleComplexity { expire, .. } => mining::rescale(state, ctx, expire),
        CollectionMessage::ChangeOwner { new_owner, .. } => {
            admin::change_owner(state, ctx, new_owner)
        }
        CollectionMessage::EditContent {
            content, royalty, ..
        } => admin::edit_content(state, ctx, content, royalty),
        CollectionMessage::GetRoyaltyParams { query_id } => {
            admin::get_royalty_params(state, ctx, query_id)
        }
        CollectionMessage::RoyaltyParamsResponse { .. } => {
            Err(ProtocolError::UnsupportedOperation(op).into())
        }
    };

    if let Err(err) = &result {
        tracing::warn!(op, code = err.exit_code(), error = %err, "operation rejected");
    }
    result
}
