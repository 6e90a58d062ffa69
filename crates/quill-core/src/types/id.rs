//! Remote identifier normalization.
//!
//! The backend services are not consistent about identifier encoding:
//! some emit JSON numbers (`"id": 7`), others strings (`"id": "7"`).
//! The client carries identifiers as strings everywhere, which is also
//! how they are persisted in the local store.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Str(String),
    Int(i64),
    UInt(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Str(s) => s,
            Self::Int(n) => n.to_string(),
            Self::UInt(n) => n.to_string(),
        }
    }
}

/// Deserialize a required identifier that may be a number or a string.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(RawId::into_string)
}

/// Deserialize an optional identifier that may be a number, a string, or null.
pub fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(RawId::into_string))
}
