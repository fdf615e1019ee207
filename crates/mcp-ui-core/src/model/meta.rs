use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::JsonObject;

/// Protocol-level metadata, serialized under the `_meta` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meta(pub JsonObject);

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `other` into `self`; keys already present in `self` are kept.
    pub fn extend_missing(&mut self, other: Meta) {
        for (key, value) in other.0 {
            self.0.entry(key).or_insert(value);
        }
    }

    /// Look up a value by a slash-free path of object keys.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(*first)?;
        for key in rest {
            current = current.as_object()?.get(*key)?;
        }
        Some(current)
    }
}

impl Deref for Meta {
    type Target = JsonObject;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Meta {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<JsonObject> for Meta {
    fn from(value: JsonObject) -> Self {
        Meta(value)
    }
}

impl FromIterator<(String, Value)> for Meta {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Meta(iter.into_iter().collect())
    }
}
