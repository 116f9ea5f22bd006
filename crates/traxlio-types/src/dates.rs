//! Date decoding for stored documents.
//!
//! Dates are written as plain RFC 3339 strings. Documents produced by older
//! clients wrapped them as `{"__type":"Date","value":"..."}`; both shapes are
//! accepted on read, and the next write stores the plain form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDate {
    Plain(DateTime<Utc>),
    Tagged {
        #[serde(rename = "__type")]
        tag: String,
        value: DateTime<Utc>,
    },
}

impl StoredDate {
    fn into_date<E: serde::de::Error>(self) -> Result<DateTime<Utc>, E> {
        match self {
            Self::Plain(date) => Ok(date),
            Self::Tagged { tag, value } if tag == "Date" => Ok(value),
            Self::Tagged { tag, .. } => Err(E::custom(format!("unexpected date tag `{}`", tag))),
        }
    }
}

/// Deserialize a required date in either stored shape.
pub fn flexible<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    StoredDate::deserialize(deserializer)?.into_date()
}

/// Deserialize an optional date in either stored shape. Use with `#[serde(default)]`.
pub fn flexible_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StoredDate>::deserialize(deserializer)?
        .map(|stored| stored.into_date::<D::Error>())
        .transpose()
}
