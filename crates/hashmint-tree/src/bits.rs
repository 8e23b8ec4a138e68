use std::fmt;

/// An ordered sequence of bits, packed MSB-first into bytes.
///
/// Unused low bits of the final byte are always zero, so two bit strings
/// with the same bits have the same packed bytes.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    data: Vec<u8>,
    len: usize,
}

impl BitString {
    /// Create an empty bit string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bit at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        Some(self.data[index / 8] & (0x80 >> (index % 8)) != 0)
    }

    /// Append one bit.
    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.data.push(0);
        }
        if bit {
            let last = self.data.len() - 1;
            self.data[last] |= 0x80 >> (self.len % 8);
        }
        self.len += 1;
    }

    /// Append whole bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        if self.len % 8 == 0 {
            self.data.extend_from_slice(bytes);
            self.len += bytes.len() * 8;
            return;
        }
        for &byte in bytes {
            for shift in (0..8).rev() {
                self.push((byte >> shift) & 1 == 1);
            }
        }
    }

    /// The packed bytes, zero-padded in the final byte.
    pub fn as_padded_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Hex of the packed bytes, with a trailing `_` when the length is not a
    /// whole number of bytes.
    pub fn to_hex(&self) -> String {
        let mut out = hex::encode(&self.data);
        if self.len % 8 != 0 {
            out.push('_');
        }
        out
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitString({}, {})", self.len, self.to_hex())
    }
}
