//! Persisted collection state.
//!
//! Layout of the root node, in order:
//!
//! ```text
//! owner(address) · next_item_index(64) · threshold(256) · last_success(32)
//! · seed(128) · target_interval(32) · min_exponent(8) · max_exponent(8)
//! children: [content] [item template code] [royalty]
//! ```
//!
//! The deployment address is the hash of this tree, so the order is fixed.

use hashmint_tree::{BitTree, TreeBuilder, TreeReader};
use hashmint_types::Address;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::content::ContentSet;
use crate::error::CodecResult;
use crate::royalty::RoyaltyParams;

/// Proof-of-work parameters and progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningState {
    /// A mine is accepted when its body hash, read as an unsigned 256-bit
    /// integer, is strictly below this value.
    #[serde(with = "crate::serde_decimal")]
    pub threshold: BigUint,
    /// Unix time of the last accepted mine or rescale.
    pub last_success: u32,
    /// Value every mine must echo; replaced after each accepted mine.
    #[serde(with = "crate::serde_decimal::u128_string")]
    pub seed: u128,
    /// Desired seconds between successful mines.
    pub target_interval: u32,
    /// Lower bound on the threshold, as a power of two.
    pub min_exponent: u8,
    /// Upper bound on the threshold, as a power of two.
    pub max_exponent: u8,
}

impl MiningState {
    fn store(&self, builder: &mut TreeBuilder) -> CodecResult<()> {
        builder
            .append_uint(self.threshold.clone(), 256)?
            .append_u32(self.last_success)?
            .append_u128(self.seed)?
            .append_u32(self.target_interval)?
            .append_u8(self.min_exponent)?
            .append_u8(self.max_exponent)?;
        Ok(())
    }

    fn load(reader: &mut TreeReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            threshold: reader.read_uint(256)?,
            last_success: reader.read_u32()?,
            seed: reader.read_u128()?,
            target_interval: reader.read_u32()?,
            min_exponent: reader.read_u8()?,
            max_exponent: reader.read_u8()?,
        })
    }
}

/// Everything a collection persists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionConfig {
    pub owner: Address,
    pub next_item_index: u64,
    pub content: ContentSet,
    /// Code every minted item is deployed with.
    pub item_template_code: BitTree,
    pub royalty: RoyaltyParams,
    pub mining: MiningState,
}

impl CollectionConfig {
    /// Encode into the persisted-state tree.
    pub fn encode(&self) -> CodecResult<BitTree> {
        let mut builder = TreeBuilder::new();
        builder
            .append_address(&self.owner)?
            .append_u64(self.next_item_index)?;
        self.mining.store(&mut builder)?;
        builder
            .append_child(self.content.to_tree()?)?
            .append_child(self.item_template_code.clone())?
            .append_child(self.royalty.to_tree()?)?;
        Ok(builder.seal())
    }

    /// Decode the persisted-state tree. Trailing data is rejected.
    pub fn decode(tree: &BitTree) -> CodecResult<Self> {
        let mut reader = tree.reader();
        let owner = reader.read_address()?;
        let next_item_index = reader.read_u64()?;
        let mining = MiningState::load(&mut reader)?;
        let content = ContentSet::from_tree(reader.read_child_ref()?)?;
        let item_template_code = reader.read_child_ref()?.to_owned_tree();
        let royalty = RoyaltyParams::from_tree(reader.read_child_ref()?)?;
        reader.ensure_exhausted()?;
        tracing::trace!(
            owner = %owner.short_id(),
            next_item_index,
            "decoded collection state"
        );
        Ok(Self {
            owner,
            next_item_index,
            content,
            item_template_code,
            royalty,
            mining,
        })
    }
}
