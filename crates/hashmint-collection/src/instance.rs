use hashmint_codec::{CodecResult, CollectionConfig, CollectionMessage};
use hashmint_tree::BitTree;

use crate::error::{InstanceError, InstanceResult};
use crate::handle::{CollectionHandle, Context};
use crate::process::{process, Effect, OutboundMessage};

/// In-memory executor for one collection.
///
/// Owns its state exclusively and applies operations one at a time. A
/// rejected operation leaves the state exactly as it was.
#[derive(Debug)]
pub struct CollectionInstance {
    handle: CollectionHandle,
    state: CollectionConfig,
    last_now: Option<u32>,
    outbox: Vec<OutboundMessage>,
}

impl CollectionInstance {
    pub fn new(handle: CollectionHandle, state: CollectionConfig) -> Self {
        Self {
            handle,
            state,
            last_now: None,
            outbox: Vec::new(),
        }
    }

    /// Deploy `initial` at its content address on `chain_id`.
    pub fn deploy(chain_id: i8, initial: CollectionConfig) -> CodecResult<Self> {
        let handle = CollectionHandle::for_deployment(chain_id, &initial)?;
        tracing::info!(address = %handle.address(), "deployed collection");
        Ok(Self::new(handle, initial))
    }

    pub fn handle(&self) -> &CollectionHandle {
        &self.handle
    }

    pub fn state(&self) -> &CollectionConfig {
        &self.state
    }

    /// Encoded current state.
    pub fn state_tree(&self) -> CodecResult<BitTree> {
        self.state.encode()
    }

    /// Every message sent so far, oldest first.
    pub fn outbox(&self) -> &[OutboundMessage] {
        &self.outbox
    }

    pub fn drain_outbox(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// Apply one encoded body. The state changes only on success.
    pub fn apply(&mut self, ctx: &Context, body: &BitTree) -> InstanceResult<Effect> {
        if let Some(previous) = self.last_now {
            if ctx.now < previous {
                return Err(InstanceError::TimeWentBackwards {
                    previous,
                    now: ctx.now,
                });
            }
        }
        let transition = process(&self.handle, &self.state, ctx, body)?;
        self.last_now = Some(ctx.now);
        self.state = transition.state;
        self.outbox.extend(transition.outbound);
        Ok(transition.effect)
    }

    /// Encode `message` and apply it.
    pub fn send(&mut self, ctx: &Context, message: &CollectionMessage) -> InstanceResult<Effect> {
        let body = message
            .encode()
            .map_err(|err| InstanceError::Execution(err.into()))?;
        self.apply(ctx, &body)
    }
}
