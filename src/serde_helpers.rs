//! Serde helpers for node responses
//!
//! The node renders 64-bit quantities as decimal strings in some APIs and as
//! JSON numbers in others; EVM quantities arrive as `0x` hex.

use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

/// Serialize u64 as a decimal string, accept a string or a number
pub mod u64_flexible {
    use super::*;

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::Number(n) => Ok(n),
            StringOrNumber::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Same as [`u64_flexible`] for `[u64; 4]` weight vectors
pub mod u64_array4_flexible {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S>(values: &[u64; 4], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(4))?;
        for v in values {
            seq.serialize_element(v)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u64; 4], D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Vec<StringOrNumber> = Vec::deserialize(deserializer)?;
        if raw.len() != 4 {
            return Err(serde::de::Error::custom(format!("expected 4 weights, got {}", raw.len())));
        }
        let mut out = [0u64; 4];
        for (slot, value) in out.iter_mut().zip(raw) {
            *slot = match value {
                StringOrNumber::Number(n) => n,
                StringOrNumber::String(s) => s.trim().parse().map_err(serde::de::Error::custom)?,
            };
        }
        Ok(out)
    }
}

/// Parse an EVM hex quantity (`0x1a`)
pub fn parse_quantity(value: &str) -> Result<u128, String> {
    let body = value
        .trim()
        .strip_prefix("0x")
        .ok_or_else(|| format!("quantity '{}' lacks 0x prefix", value))?;
    if body.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(body, 16).map_err(|e| format!("invalid quantity '{}': {}", value, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sample {
        #[serde(with = "u64_flexible")]
        value: u64,
        #[serde(with = "u64_array4_flexible")]
        weights: [u64; 4],
    }

    #[test]
    fn test_accepts_string_and_number() {
        let a: Sample = serde_json::from_str(r#"{"value":"42","weights":[1,"1000",1000,4]}"#).unwrap();
        let b: Sample = serde_json::from_str(r#"{"value":42,"weights":["1",1000,"1000","4"]}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.weights, [1, 1000, 1000, 4]);
        assert_eq!(serde_json::to_string(&a).unwrap(), r#"{"value":"42","weights":[1,1000,1000,4]}"#);
    }

    #[test]
    fn test_rejects_wrong_weight_count() {
        assert!(serde_json::from_str::<Sample>(r#"{"value":1,"weights":[1,2]}"#).is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x1a").unwrap(), 26);
        assert_eq!(parse_quantity("0x").unwrap(), 0);
        assert!(parse_quantity("26").is_err());
    }
}
