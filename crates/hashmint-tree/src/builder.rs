use hashmint_types::Address;
use num_bigint::BigUint;

use crate::bits::BitString;
use crate::error::{TreeError, TreeResult};
use crate::hasher::TreeHasher;
use crate::tree::{BitTree, Node};
use crate::{MAX_BITS, MAX_CHILDREN};

/// Mutable accumulator for one node's bits and children.
///
/// Every append checks capacity before touching any state, so a failed
/// append leaves the builder exactly as it was. [`seal`](Self::seal)
/// consumes the builder.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    bits: BitString,
    /// Arena holding every appended child's nodes, in post-order.
    arena: Vec<Node>,
    /// Arena indices of this node's direct children.
    children: Vec<u32>,
}

impl TreeBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits appended so far.
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// Bits still available in this node.
    pub fn remaining_bits(&self) -> usize {
        MAX_BITS - self.bits.len()
    }

    /// Children appended so far.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    fn reserve(&self, requested: usize) -> TreeResult<()> {
        let available = self.remaining_bits();
        if requested > available {
            return Err(TreeError::CapacityExceeded {
                requested,
                available,
            });
        }
        Ok(())
    }

    /// Append a single bit.
    pub fn append_bit(&mut self, bit: bool) -> TreeResult<&mut Self> {
        self.reserve(1)?;
        self.bits.push(bit);
        Ok(self)
    }

    /// Append `value` as an unsigned integer `width` bits wide.
    ///
    /// Fails with [`TreeError::ValueOutOfRange`] when the value does not fit;
    /// values are never truncated.
    pub fn append_uint(&mut self, value: impl Into<BigUint>, width: usize) -> TreeResult<&mut Self> {
        let value = value.into();
        let required = value.bits();
        if required > width as u64 {
            return Err(TreeError::ValueOutOfRange { width, required });
        }
        self.reserve(width)?;
        for i in (0..width as u64).rev() {
            self.bits.push(value.bit(i));
        }
        Ok(self)
    }

    fn push_u128(&mut self, value: u128, width: usize) -> TreeResult<&mut Self> {
        self.reserve(width)?;
        for i in (0..width).rev() {
            self.bits.push((value >> i) & 1 == 1);
        }
        Ok(self)
    }

    pub fn append_u8(&mut self, value: u8) -> TreeResult<&mut Self> {
        self.push_u128(value.into(), 8)
    }

    pub fn append_i8(&mut self, value: i8) -> TreeResult<&mut Self> {
        self.push_u128((value as u8).into(), 8)
    }

    pub fn append_u16(&mut self, value: u16) -> TreeResult<&mut Self> {
        self.push_u128(value.into(), 16)
    }

    pub fn append_u32(&mut self, value: u32) -> TreeResult<&mut Self> {
        self.push_u128(value.into(), 32)
    }

    pub fn append_u64(&mut self, value: u64) -> TreeResult<&mut Self> {
        self.push_u128(value.into(), 64)
    }

    pub fn append_u128(&mut self, value: u128) -> TreeResult<&mut Self> {
        self.push_u128(value, 128)
    }

    /// Append a 256-bit big-endian value.
    pub fn append_hash256(&mut self, value: &[u8; 32]) -> TreeResult<&mut Self> {
        self.append_bytes(value)
    }

    /// Append raw bytes verbatim (`8 * len` bits).
    pub fn append_bytes(&mut self, bytes: &[u8]) -> TreeResult<&mut Self> {
        self.reserve(bytes.len() * 8)?;
        self.bits.push_bytes(bytes);
        Ok(self)
    }

    /// Append an address: a presence bit, then chain id and account id when
    /// present.
    pub fn append_address(&mut self, address: &Address) -> TreeResult<&mut Self> {
        self.reserve(address.bit_len())?;
        match address {
            Address::None => self.bits.push(false),
            Address::Std {
                chain_id,
                account_id,
            } => {
                self.bits.push(true);
                self.bits.push_bytes(&[*chain_id as u8]);
                self.bits.push_bytes(account_id);
            }
        }
        Ok(self)
    }

    /// Move `tree` in as the next child.
    pub fn append_child(&mut self, tree: BitTree) -> TreeResult<&mut Self> {
        if self.children.len() >= MAX_CHILDREN {
            return Err(TreeError::TooManyChildren { max: MAX_CHILDREN });
        }
        let offset = self.arena.len() as u32;
        let nodes = tree.into_arena();
        let root = offset + nodes.len() as u32 - 1;
        self.arena.extend(nodes.into_iter().map(|mut node| {
            for child in &mut node.children {
                *child += offset;
            }
            node
        }));
        self.children.push(root);
        Ok(self)
    }

    /// Finalize into an immutable tree, hashing this node over its bits and
    /// its children's hashes.
    pub fn seal(self) -> BitTree {
        let Self {
            bits,
            mut arena,
            children,
        } = self;
        let hash = TreeHasher::NODE.hash_node(
            &bits,
            children.iter().map(|&child| &arena[child as usize].hash),
        );
        arena.push(Node {
            bits,
            children,
            hash,
        });
        BitTree::from_arena(arena)
    }
}
