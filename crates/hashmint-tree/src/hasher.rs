use hashmint_types::TreeHash;

use crate::bits::BitString;

/// Domain-separated BLAKE3 hasher.
///
/// Each hasher carries a domain tag that is prepended to every hash
/// computation, so a tree node and an arbitrary byte string with the same
/// bytes never share a digest.
pub struct TreeHasher {
    domain: &'static str,
}

impl TreeHasher {
    /// Hasher for sealed tree nodes.
    pub const NODE: Self = Self {
        domain: "hashmint-tree-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> TreeHash {
        let mut hasher = self.start();
        hasher.update(data);
        TreeHash::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash one node from its bits and its children's hashes.
    ///
    /// The descriptor (child count, bit length) is mixed in ahead of the data
    /// so that padding bits can never alias real bits.
    pub fn hash_node<'a>(
        &self,
        bits: &BitString,
        child_hashes: impl IntoIterator<Item = &'a TreeHash>,
    ) -> TreeHash {
        let child_hashes: Vec<&TreeHash> = child_hashes.into_iter().collect();
        let mut hasher = self.start();
        hasher.update(&[child_hashes.len() as u8]);
        hasher.update(&(bits.len() as u16).to_be_bytes());
        hasher.update(bits.as_padded_bytes());
        for child in child_hashes {
            hasher.update(child.as_bytes());
        }
        TreeHash::from_hash(*hasher.finalize().as_bytes())
    }

    /// Derive 32 bytes from key material using BLAKE3's key-derivation mode.
    pub fn derive(context: &str, parts: &[&[u8]]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new_derive_key(context);
        for part in parts {
            hasher.update(part);
        }
        *hasher.finalize().as_bytes()
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }

    fn start(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }
}
