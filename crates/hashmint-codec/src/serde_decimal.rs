//! Serde helpers that write big unsigned integers as decimal strings.

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("not an unsigned integer: {raw:?}")))
}

/// Parse a decimal string, a `0x`-prefixed hex string, or `2^N`.
pub fn parse(raw: &str) -> Option<BigUint> {
    let raw = raw.trim().replace('_', "");
    if let Some(hex) = raw.strip_prefix("0x") {
        return BigUint::parse_bytes(hex.as_bytes(), 16);
    }
    if let Some(exponent) = raw.strip_prefix("2^") {
        let exponent: u32 = exponent.parse().ok()?;
        return Some(BigUint::from(1u8) << exponent);
    }
    BigUint::parse_bytes(raw.as_bytes(), 10)
}

/// The same string forms for `u128` fields, which JSON numbers cannot hold.
pub mod u128_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse(&raw)
            .and_then(|value| u128::try_from(&value).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("not a 128-bit unsigned integer: {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_forms() {
        assert_eq!(parse("1000").unwrap(), BigUint::from(1000u32));
        assert_eq!(parse("1_000").unwrap(), BigUint::from(1000u32));
        assert_eq!(parse("0xff").unwrap(), BigUint::from(255u32));
        assert_eq!(parse("2^10").unwrap(), BigUint::from(1024u32));
        assert!(parse("-1").is_none());
        assert!(parse("2^x").is_none());
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Seeded {
        #[serde(with = "u128_string")]
        seed: u128,
    }

    #[test]
    fn u128_fields_survive_json() {
        let value = Seeded { seed: u128::MAX };
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, format!(r#"{{"seed":"{}"}}"#, u128::MAX));
        assert_eq!(serde_json::from_str::<Seeded>(&json).unwrap(), value);

        let hex: Seeded = serde_json::from_str(r#"{"seed":"0xff"}"#).unwrap();
        assert_eq!(hex.seed, 255);
        assert!(serde_json::from_str::<Seeded>(r#"{"seed":"2^128"}"#).is_err());
    }
}
