use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// An account address, or the distinguished "no address" value.
///
/// Standard addresses pair a signed 8-bit chain id with a 256-bit account
/// id. The account id bytes are big-endian.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Address {
    /// Absent address.
    #[default]
    None,
    /// A standard address on a given chain.
    Std { chain_id: i8, account_id: [u8; 32] },
}

impl Address {
    /// Encoded width of [`Address::None`]: a single tag bit.
    pub const NONE_BITS: usize = 1;
    /// Encoded width of [`Address::Std`]: tag bit, chain id, account id.
    pub const STD_BITS: usize = 1 + 8 + 256;

    /// Create a standard address.
    pub const fn std(chain_id: i8, account_id: [u8; 32]) -> Self {
        Self::Std {
            chain_id,
            account_id,
        }
    }

    /// Create a random standard address for tests and demos.
    pub fn ephemeral(chain_id: i8) -> Self {
        let mut account_id = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut account_id);
        Self::std(chain_id, account_id)
    }

    /// Returns `true` for [`Address::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The chain id, if this is a standard address.
    pub fn chain_id(&self) -> Option<i8> {
        match self {
            Self::None => None,
            Self::Std { chain_id, .. } => Some(*chain_id),
        }
    }

    /// The account id, if this is a standard address.
    pub fn account_id(&self) -> Option<&[u8; 32]> {
        match self {
            Self::None => None,
            Self::Std { account_id, .. } => Some(account_id),
        }
    }

    /// Number of bits this address occupies when encoded.
    pub fn bit_len(&self) -> usize {
        match self {
            Self::None => Self::NONE_BITS,
            Self::Std { .. } => Self::STD_BITS,
        }
    }

    /// Short identifier, e.g. `0:1a2b3c4d`.
    pub fn short_id(&self) -> String {
        match self {
            Self::None => "none".into(),
            Self::Std {
                chain_id,
                account_id,
            } => format!("{chain_id}:{}", hex::encode(&account_id[..4])),
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short_id())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Std {
                chain_id,
                account_id,
            } => write!(f, "{chain_id}:{}", hex::encode(account_id)),
        }
    }
}

impl FromStr for Address {
    type Err = TypeError;

    /// Parse the raw form `chain:hex64`, or `none`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") {
            return Ok(Self::None);
        }
        let (chain, account) = s
            .split_once(':')
            .ok_or_else(|| TypeError::InvalidAddress(format!("missing ':' in {s:?}")))?;
        let chain_id: i8 = chain
            .parse()
            .map_err(|_| TypeError::InvalidAddress(format!("bad chain id {chain:?}")))?;
        let bytes = hex::decode(account).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut account_id = [0u8; 32];
        account_id.copy_from_slice(&bytes);
        Ok(Self::std(chain_id, account_id))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
