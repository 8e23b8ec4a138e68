use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Content address of a sealed bit tree.
///
/// The digest covers a node's bits and its children's hashes, so equal
/// trees share a `TreeHash`. Proof of work reads the bytes as a big-endian
/// unsigned 256-bit integer; the derived ordering agrees with that reading.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreeHash([u8; 32]);

impl TreeHash {
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The digest as an unsigned 256-bit integer.
    pub fn to_uint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    /// Whether the integer value is strictly below `bound`.
    pub fn is_below(&self, bound: &BigUint) -> bool {
        self.to_uint() < *bound
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First four bytes as hex, for log lines.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for TreeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeHash({})", self.short_hex())
    }
}

impl fmt::Display for TreeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn low_byte(value: u8) -> TreeHash {
        let mut bytes = [0u8; 32];
        bytes[31] = value;
        TreeHash::from_hash(bytes)
    }

    #[test]
    fn integer_value_is_big_endian() {
        assert_eq!(low_byte(7).to_uint(), BigUint::from(7u8));

        let mut top = [0u8; 32];
        top[0] = 0x80;
        assert_eq!(TreeHash::from_hash(top).to_uint(), BigUint::from(1u8) << 255u32);
        assert_eq!(TreeHash::zero().to_uint(), BigUint::from(0u8));
    }

    #[test]
    fn bound_is_exclusive() {
        assert!(low_byte(9).is_below(&BigUint::from(10u8)));
        assert!(!low_byte(10).is_below(&BigUint::from(10u8)));
        assert!(!TreeHash::zero().is_below(&BigUint::from(0u8)));
    }

    #[test]
    fn ordering_matches_integer_value() {
        let mut high = [0u8; 32];
        high[0] = 0x01;
        let high = TreeHash::from_hash(high);
        assert!(low_byte(0xff) < high);
        assert!(low_byte(0xff).to_uint() < high.to_uint());
    }

    #[test]
    fn display_is_full_hex() {
        let hash = TreeHash::from_hash([0xa5; 32]);
        assert_eq!(hash.to_string(), "a5".repeat(32));
        assert_eq!(format!("{hash:?}"), "TreeHash(a5a5a5a5)");
    }
}
