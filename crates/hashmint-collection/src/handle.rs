use hashmint_codec::{CodecResult, CollectionConfig};
use hashmint_tree::{BitTree, TreeBuilder};
use hashmint_types::Address;

/// Identity of one deployed collection.
///
/// The handle never changes after deployment; all mutable data lives in the
/// [`CollectionConfig`] passed alongside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionHandle {
    address: Address,
}

impl CollectionHandle {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Handle whose address is the content address of the initial state.
    pub fn for_deployment(chain_id: i8, initial: &CollectionConfig) -> CodecResult<Self> {
        let tree = initial.encode()?;
        Ok(Self::new(Address::std(chain_id, *tree.hash().as_bytes())))
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Deployment tree for the item at `index`: children
    /// `[code] [index(64) · collection address]`.
    pub fn item_state_init(&self, code: &BitTree, index: u64) -> CodecResult<BitTree> {
        let mut data = TreeBuilder::new();
        data.append_u64(index)?.append_address(&self.address)?;

        let mut init = TreeBuilder::new();
        init.append_child(code.clone())?.append_child(data.seal())?;
        Ok(init.seal())
    }

    /// Address the item at `index` is deployed to. Items live on the
    /// collection's chain.
    pub fn item_address(&self, code: &BitTree, index: u64) -> CodecResult<Address> {
        let init = self.item_state_init(code, index)?;
        Ok(self.item_address_for(&init))
    }

    pub(crate) fn item_address_for(&self, state_init: &BitTree) -> Address {
        let chain_id = self.address.chain_id().unwrap_or(0);
        Address::std(chain_id, *state_init.hash().as_bytes())
    }
}

/// Per-operation inputs supplied by the execution environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context {
    /// Current Unix time. Non-decreasing across operations; may repeat.
    pub now: u32,
    pub sender: Address,
}

impl Context {
    pub fn new(now: u32, sender: Address) -> Self {
        Self { now, sender }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> BitTree {
        let mut builder = TreeBuilder::new();
        builder.append_bytes(b"item").unwrap();
        builder.seal()
    }

    #[test]
    fn item_address_is_deterministic_and_index_specific() {
        let handle = CollectionHandle::new(Address::std(-1, [5; 32]));
        let a = handle.item_address(&code(), 0).unwrap();
        assert_eq!(a, handle.item_address(&code(), 0).unwrap());
        assert_ne!(a, handle.item_address(&code(), 1).unwrap());
        assert_eq!(a.chain_id(), Some(-1));
    }

    #[test]
    fn item_address_depends_on_collection() {
        let one = CollectionHandle::new(Address::std(0, [1; 32]));
        let two = CollectionHandle::new(Address::std(0, [2; 32]));
        assert_ne!(
            one.item_address(&code(), 3).unwrap(),
            two.item_address(&code(), 3).unwrap()
        );
    }

    #[test]
    fn state_init_layout() {
        let handle = CollectionHandle::new(Address::std(0, [1; 32]));
        let init = handle.item_state_init(&code(), 9).unwrap();
        assert!(init.bits().is_empty());
        assert_eq!(init.child(0).unwrap().hash(), code().hash());
        let mut data = init.child(1).unwrap().reader();
        assert_eq!(data.read_u64().unwrap(), 9);
        assert_eq!(data.read_address().unwrap(), *handle.address());
        assert!(data.is_exhausted());
    }
}
