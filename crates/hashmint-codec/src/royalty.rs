use hashmint_tree::{BitTree, TreeBuilder, TreeReader, TreeRef};
use hashmint_types::Address;
use serde::{Deserialize, Serialize};

use crate::error::CodecResult;

/// Royalty terms: `factor / base` of each sale goes to `address`.
///
/// `factor <= base` is expected but not enforced here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoyaltyParams {
    pub factor: u16,
    pub base: u16,
    pub address: Address,
}

impl RoyaltyParams {
    pub fn new(factor: u16, base: u16, address: Address) -> Self {
        Self {
            factor,
            base,
            address,
        }
    }

    /// Append `factor(16) · base(16) · address` to `builder`.
    pub fn store(&self, builder: &mut TreeBuilder) -> CodecResult<()> {
        builder
            .append_u16(self.factor)?
            .append_u16(self.base)?
            .append_address(&self.address)?;
        Ok(())
    }

    /// Read `factor(16) · base(16) · address` from `reader`.
    pub fn load(reader: &mut TreeReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            factor: reader.read_u16()?,
            base: reader.read_u16()?,
            address: reader.read_address()?,
        })
    }

    /// Encode as a standalone node.
    pub fn to_tree(&self) -> CodecResult<BitTree> {
        let mut builder = TreeBuilder::new();
        self.store(&mut builder)?;
        Ok(builder.seal())
    }

    /// Decode a standalone node, rejecting trailing data.
    pub fn from_tree(node: TreeRef<'_>) -> CodecResult<Self> {
        let mut reader = node.reader();
        let params = Self::load(&mut reader)?;
        reader.ensure_exhausted()?;
        Ok(params)
    }

    /// Royalty owed on a sale of `price`, rounded down. `None` when `base`
    /// is zero.
    pub fn royalty_amount(&self, price: u64) -> Option<u64> {
        if self.base == 0 {
            return None;
        }
        let amount = u128::from(price) * u128::from(self.factor) / u128::from(self.base);
        u64::try_from(amount).ok()
    }
}
