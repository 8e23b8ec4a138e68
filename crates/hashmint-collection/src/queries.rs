//! Read-only views over persisted collection state.

use hashmint_codec::content::{decode_snake, encode_offchain};
use hashmint_codec::{CodecResult, CollectionConfig, MiningState, RoyaltyParams};
use hashmint_tree::{BitTree, TreeRef};
use hashmint_types::Address;

use crate::handle::CollectionHandle;

/// Answer to [`collection_data`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionData {
    pub next_item_index: u64,
    pub owner: Address,
    pub collection_content: String,
}

/// Answer to [`nft_content`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemContent {
    /// Common prefix joined with the item's own content.
    pub text: String,
    /// `text` encoded as off-chain content.
    pub tree: BitTree,
}

pub fn collection_data(state: &CollectionConfig) -> CollectionData {
    CollectionData {
        next_item_index: state.next_item_index,
        owner: state.owner,
        collection_content: state.content.collection_content.clone(),
    }
}

pub fn nft_address_by_index(
    handle: &CollectionHandle,
    state: &CollectionConfig,
    index: u64,
) -> CodecResult<Address> {
    handle.item_address(&state.item_template_code, index)
}

pub fn royalty_params(state: &CollectionConfig) -> RoyaltyParams {
    state.royalty.clone()
}

/// Full content of item `index`, given the untagged content the item
/// stores itself.
pub fn nft_content(
    state: &CollectionConfig,
    index: u64,
    item_content: TreeRef<'_>,
) -> CodecResult<ItemContent> {
    let suffix = decode_snake(item_content)?;
    let text = state.content.item_content(&suffix);
    tracing::trace!(index, len = text.len(), "resolved item content");
    let tree = encode_offchain(&text)?;
    Ok(ItemContent { text, tree })
}

pub fn mining_data(state: &CollectionConfig) -> MiningState {
    state.mining.clone()
}
