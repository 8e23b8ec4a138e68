//! Owner-gated administration and the royalty query.

use hashmint_codec::{CollectionConfig, CollectionMessage, ContentSet, RoyaltyParams};
use hashmint_types::Address;

use crate::error::{ExecutionResult, ProtocolError};
use crate::handle::Context;
use crate::process::{Effect, OutboundMessage, Transition};

fn require_owner(state: &CollectionConfig, ctx: &Context) -> Result<(), ProtocolError> {
    if ctx.sender != state.owner {
        return Err(ProtocolError::Unauthorized { sender: ctx.sender });
    }
    Ok(())
}

pub(crate) fn change_owner(
    state: &CollectionConfig,
    ctx: &Context,
    new_owner: Address,
) -> ExecutionResult<Transition> {
    require_owner(state, ctx)?;
    let mut next = state.clone();
    next.owner = new_owner;
    tracing::info!(
        previous = %state.owner.short_id(),
        owner = %new_owner.short_id(),
        "changed collection owner"
    );
    Ok(Transition::new(
        next,
        Effect::OwnerChanged {
            previous: state.owner,
            owner: new_owner,
        },
    ))
}

pub(crate) fn edit_content(
    state: &CollectionConfig,
    ctx: &Context,
    content: ContentSet,
    royalty: RoyaltyParams,
) -> ExecutionResult<Transition> {
    require_owner(state, ctx)?;
    let mut next = state.clone();
    next.content = content;
    next.royalty = royalty;
    tracing::info!(
        factor = next.royalty.factor,
        base = next.royalty.base,
        "edited collection content"
    );
    Ok(Transition::new(next, Effect::ContentEdited))
}

pub(crate) fn get_royalty_params(
    state: &CollectionConfig,
    ctx: &Context,
    query_id: u64,
) -> ExecutionResult<Transition> {
    let body = CollectionMessage::RoyaltyParamsResponse {
        query_id,
        royalty: state.royalty.clone(),
    }
    .encode()?;
    tracing::debug!(query_id, to = %ctx.sender.short_id(), "reporting royalty params");
    Ok(
        Transition::new(state.clone(), Effect::RoyaltyReported { to: ctx.sender })
            .with_outbound(OutboundMessage::Reply {
                to: ctx.sender,
                body,
            }),
    )
}
