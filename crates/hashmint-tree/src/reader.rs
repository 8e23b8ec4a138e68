use hashmint_types::Address;
use num_bigint::BigUint;

use crate::error::{TreeError, TreeResult};
use crate::tree::TreeRef;

/// Sequential cursor over one node's bits and children.
///
/// Reads only move forward. A failed read leaves the cursor where it was.
/// To look ahead without consuming, clone the reader first.
#[derive(Clone, Debug)]
pub struct TreeReader<'a> {
    node: TreeRef<'a>,
    bit_pos: usize,
    child_pos: usize,
}

impl<'a> TreeReader<'a> {
    /// Create a reader positioned at the start of `node`.
    pub fn new(node: TreeRef<'a>) -> Self {
        Self {
            node,
            bit_pos: 0,
            child_pos: 0,
        }
    }

    /// The node being read.
    pub fn node(&self) -> TreeRef<'a> {
        self.node
    }

    /// Bits not yet read.
    pub fn remaining_bits(&self) -> usize {
        self.node.bits().len() - self.bit_pos
    }

    /// Children not yet read.
    pub fn remaining_children(&self) -> usize {
        self.node.child_count() - self.child_pos
    }

    /// Returns `true` once every bit and child has been read.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_bits() == 0 && self.remaining_children() == 0
    }

    /// Fail with [`TreeError::TrailingData`] unless the node is fully read.
    pub fn ensure_exhausted(&self) -> TreeResult<()> {
        if self.is_exhausted() {
            return Ok(());
        }
        Err(TreeError::TrailingData {
            bits: self.remaining_bits(),
            children: self.remaining_children(),
        })
    }

    fn require(&self, requested: usize) -> TreeResult<()> {
        let remaining = self.remaining_bits();
        if requested > remaining {
            return Err(TreeError::Underflow {
                requested,
                remaining,
            });
        }
        Ok(())
    }

    fn take_bit(&mut self) -> bool {
        let bit = self.node.bits().get(self.bit_pos).unwrap_or(false);
        self.bit_pos += 1;
        bit
    }

    fn take_u128(&mut self, width: usize) -> TreeResult<u128> {
        debug_assert!(width <= 128);
        self.require(width)?;
        let mut value = 0u128;
        for _ in 0..width {
            value = (value << 1) | self.take_bit() as u128;
        }
        Ok(value)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> TreeResult<bool> {
        self.require(1)?;
        Ok(self.take_bit())
    }

    /// Read an unsigned integer `width` bits wide.
    pub fn read_uint(&mut self, width: usize) -> TreeResult<BigUint> {
        self.require(width)?;
        let mut value = BigUint::default();
        for i in (0..width as u64).rev() {
            if self.take_bit() {
                value.set_bit(i, true);
            }
        }
        Ok(value)
    }

    pub fn read_u8(&mut self) -> TreeResult<u8> {
        Ok(self.take_u128(8)? as u8)
    }

    pub fn read_i8(&mut self) -> TreeResult<i8> {
        Ok(self.take_u128(8)? as u8 as i8)
    }

    pub fn read_u16(&mut self) -> TreeResult<u16> {
        Ok(self.take_u128(16)? as u16)
    }

    pub fn read_u32(&mut self) -> TreeResult<u32> {
        Ok(self.take_u128(32)? as u32)
    }

    pub fn read_u64(&mut self) -> TreeResult<u64> {
        Ok(self.take_u128(64)? as u64)
    }

    pub fn read_u128(&mut self) -> TreeResult<u128> {
        self.take_u128(128)
    }

    /// Read `len` whole bytes.
    pub fn read_bytes(&mut self, len: usize) -> TreeResult<Vec<u8>> {
        self.require(len * 8)?;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            let mut byte = 0u8;
            for _ in 0..8 {
                byte = (byte << 1) | self.take_bit() as u8;
            }
            out.push(byte);
        }
        Ok(out)
    }

    /// Read a 256-bit big-endian value.
    pub fn read_hash256(&mut self) -> TreeResult<[u8; 32]> {
        let bytes = self.read_bytes(32)?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    /// Read an address. A "none" tag consumes exactly one bit.
    pub fn read_address(&mut self) -> TreeResult<Address> {
        self.require(1)?;
        let present = self.node.bits().get(self.bit_pos).unwrap_or(false);
        if !present {
            self.bit_pos += 1;
            return Ok(Address::None);
        }
        self.require(Address::STD_BITS)?;
        self.bit_pos += 1;
        let chain_id = self.read_i8()?;
        let account_id = self.read_hash256()?;
        Ok(Address::std(chain_id, account_id))
    }

    /// Borrow the next child without opening a reader on it.
    pub fn read_child_ref(&mut self) -> TreeResult<TreeRef<'a>> {
        let child = self
            .node
            .child(self.child_pos)
            .ok_or(TreeError::MissingChild {
                index: self.child_pos,
            })?;
        self.child_pos += 1;
        Ok(child)
    }

    /// Open a reader on the next child.
    pub fn read_child(&mut self) -> TreeResult<TreeReader<'a>> {
        self.read_child_ref().map(TreeReader::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TreeBuilder;
    use crate::tree::BitTree;
    use proptest::prelude::*;

    fn sample() -> BitTree {
        let mut child = TreeBuilder::new();
        child.append_u16(0xBEEF).unwrap();

        let mut builder = TreeBuilder::new();
        builder
            .append_u8(0x7F)
            .unwrap()
            .append_address(&Address::None)
            .unwrap()
            .append_address(&Address::std(-1, [9; 32]))
            .unwrap()
            .append_uint(5u32, 3)
            .unwrap()
            .append_child(child.seal())
            .unwrap();
        builder.seal()
    }

    #[test]
    fn reads_back_in_order() {
        let tree = sample();
        let mut reader = tree.reader();
        assert_eq!(reader.read_u8().unwrap(), 0x7F);
        assert_eq!(reader.read_address().unwrap(), Address::None);
        assert_eq!(reader.read_address().unwrap(), Address::std(-1, [9; 32]));
        assert_eq!(reader.read_uint(3).unwrap(), BigUint::from(5u32));
        assert_eq!(reader.remaining_bits(), 0);

        let mut child = reader.read_child().unwrap();
        assert_eq!(child.read_u16().unwrap(), 0xBEEF);
        assert!(child.is_exhausted());
        assert!(reader.ensure_exhausted().is_ok());
    }

    #[test]
    fn none_address_consumes_one_bit() {
        let tree = sample();
        let mut reader = tree.reader();
        reader.read_u8().unwrap();
        let before = reader.remaining_bits();
        reader.read_address().unwrap();
        assert_eq!(reader.remaining_bits(), before - 1);
    }

    #[test]
    fn reading_past_end_underflows_without_moving() {
        let mut builder = TreeBuilder::new();
        builder.append_u8(1).unwrap();
        let tree = builder.seal();
        let mut reader = tree.reader();
        let err = reader.read_u16().unwrap_err();
        assert_eq!(
            err,
            TreeError::Underflow {
                requested: 16,
                remaining: 8
            }
        );
        assert_eq!(reader.read_u8().unwrap(), 1);
    }

    #[test]
    fn truncated_address_underflows() {
        let mut builder = TreeBuilder::new();
        builder.append_bit(true).unwrap().append_u8(0).unwrap();
        let tree = builder.seal();
        let mut reader = tree.reader();
        assert!(matches!(
            reader.read_address(),
            Err(TreeError::Underflow { .. })
        ));
        assert_eq!(reader.remaining_bits(), 9);
    }

    #[test]
    fn missing_child() {
        let tree = BitTree::empty();
        let mut reader = tree.reader();
        assert_eq!(
            reader.read_child().unwrap_err(),
            TreeError::MissingChild { index: 0 }
        );
    }

    #[test]
    fn clone_allows_lookahead() {
        let tree = sample();
        let reader = tree.reader();
        let mut peek = reader.clone();
        assert_eq!(peek.read_u8().unwrap(), 0x7F);
        assert_eq!(reader.remaining_bits(), peek.remaining_bits() + 8);
    }

    #[test]
    fn trailing_data_reported() {
        let tree = sample();
        let mut reader = tree.reader();
        reader.read_u8().unwrap();
        assert!(matches!(
            reader.ensure_exhausted(),
            Err(TreeError::TrailingData { children: 1, .. })
        ));
    }

    proptest! {
        #[test]
        fn uint_roundtrip(value in any::<u64>(), extra in 0usize..64) {
            let width = 64 + extra;
            let mut builder = TreeBuilder::new();
            builder.append_uint(value, width).unwrap();
            let tree = builder.seal();
            let mut reader = tree.reader();
            prop_assert_eq!(reader.read_uint(width).unwrap(), BigUint::from(value));
            prop_assert!(reader.is_exhausted());
        }

        #[test]
        fn bytes_survive_unaligned_offsets(prefix in 0usize..8, bytes in proptest::collection::vec(any::<u8>(), 0..100)) {
            let mut builder = TreeBuilder::new();
            for _ in 0..prefix {
                builder.append_bit(true).unwrap();
            }
            builder.append_bytes(&bytes).unwrap();
            let tree = builder.seal();
            let mut reader = tree.reader();
            for _ in 0..prefix {
                prop_assert!(reader.read_bit().unwrap());
            }
            prop_assert_eq!(reader.read_bytes(bytes.len()).unwrap(), bytes);
        }
    }
}
