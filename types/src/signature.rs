//! Transaction authorization signatures.

use crate::error::TypesError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 65-byte `r ‖ s ‖ v` signature, rendered as 0x-prefixed hex on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(pub [u8; 65]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(raw).map_err(|e| TypesError::InvalidSignature(e.to_string()))?;
        let arr: [u8; 65] = bytes.try_into().map_err(|b: Vec<u8>| {
            TypesError::InvalidSignature(format!("expected 65 bytes, got {}", b.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Signature::from_hex(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let sig = Signature([0x5a; 65]);
        let hex = sig.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 2 + 130);
        assert_eq!(Signature::from_hex(&hex).unwrap(), sig);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Signature::from_hex("0xdeadbeef").is_err());
    }

    #[test]
    fn serde_uses_hex_string() {
        let sig = Signature([1; 65]);
        let json = serde_json::to_value(&sig).unwrap();
        assert!(json.as_str().unwrap().starts_with("0x01"));
        let back: Signature = serde_json::from_value(json).unwrap();
        assert_eq!(back, sig);
    }
}
