//! Wire shapes of the document store and the conversion from its
//! `{id: fields}` collection mapping into records.
//!
//! Fields are read leniently: a value of the wrong type reads as absent
//! instead of failing the whole record.

use chrono::{DateTime, SecondsFormat, Utc};
use entity::prelude::*;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_with::{serde_as, skip_serializing_none, DefaultOnError};
use tracing::warn;

use crate::response::{IntoResponse, Response};

#[serde_as]
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDocument {
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub caption: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub image: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub uid: Option<String>,
    /// Either text or epoch milliseconds on the wire.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<String>,
}

#[serde_as]
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone)]
pub(crate) struct UserDocument {
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub name: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub title: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub image: Option<String>,
}

/// Body of a successful POST: the key the store generated.
#[derive(Deserialize, Debug)]
pub(crate) struct PushResponse {
    pub name: Option<String>,
}

impl PostDocument {
    pub fn into_entity(self, id: String) -> PostEntity {
        PostEntity {
            id,
            caption: self.caption.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            uid: self.uid.unwrap_or_default(),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

impl From<&PostEntity> for PostDocument {
    fn from(value: &PostEntity) -> Self {
        Self {
            caption: Some(value.caption.clone()),
            image: Some(value.image.clone()),
            uid: Some(value.uid.clone()),
            created_at: value.created_at.as_ref().map(format_timestamp),
        }
    }
}

impl UserDocument {
    pub fn into_entity(self, id: String) -> UserEntity {
        UserEntity {
            id,
            name: self.name.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
        }
    }
}

impl From<&UserEntity> for UserDocument {
    fn from(value: &UserEntity) -> Self {
        Self {
            name: Some(value.name.clone()),
            title: Some(value.title.clone()),
            image: Some(value.image.clone()),
        }
    }
}

/// ISO-8601 in UTC with millisecond precision, e.g.
/// `2024-05-01T09:30:00.000Z`.
pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(millis) => millis
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|at| format_timestamp(&at)),
        _ => None,
    })
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// Turns a collection body into `(id, document)` pairs.
///
/// The store answers with an array instead of an object when every key is
/// a small integer; array indexes become ids and `null` slots are holes.
/// A `null`, empty or unparseable body yields no records. Entries that are
/// not objects are skipped. Order follows the store's keys and carries no
/// meaning.
pub(crate) fn parse_collection<T: DeserializeOwned>(
    collection: &str,
    text: &str,
) -> Vec<(String, T)> {
    if text.trim().is_empty() {
        return vec![];
    }

    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(e) => {
            warn!(task = "parse collection", collection, err = e.to_string());
            return vec![];
        }
    };

    let entries: Vec<(String, Value)> = match value {
        Value::Object(entries) => entries.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, fields)| !fields.is_null())
            .map(|(index, fields)| (index.to_string(), fields))
            .collect(),
        Value::Null => return vec![],
        _ => {
            warn!(
                task = "parse collection",
                collection,
                err = "body is not an object"
            );
            return vec![];
        }
    };

    entries
        .into_iter()
        .filter_map(|(id, fields)| {
            if !fields.is_object() {
                warn!(
                    task = "parse collection",
                    collection,
                    id = id.as_str(),
                    err = "not an object"
                );
                return None;
            }

            match serde_json::from_value::<T>(fields) {
                Ok(document) => Some((id, document)),
                Err(e) => {
                    warn!(
                        task = "parse collection",
                        collection,
                        id = id.as_str(),
                        err = e.to_string()
                    );
                    None
                }
            }
        })
        .collect()
}

/// Decodes a single record body; `null` means the id does not exist.
pub(crate) fn parse_record<T: DeserializeOwned>(
    text: &str,
) -> Response<Option<T>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let value = serde_json::from_str::<Value>(text)
        .into_response("failed to parse record")?;

    if value.is_null() {
        return Ok(None);
    }

    serde_json::from_value::<T>(value)
        .map(Some)
        .into_response("failed to decode record")
}

pub(crate) fn parse_push_response(text: &str) -> Option<String> {
    serde_json::from_str::<PushResponse>(text)
        .ok()
        .and_then(|response| response.name)
}
