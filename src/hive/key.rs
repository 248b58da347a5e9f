//! Decoded key tree handed over by the hive reader

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One value of a key: the reader supplies both the raw bytes and its
/// rendering of them as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Value name (the record's key token)
    pub name: String,
    /// Value data as decoded text
    pub data: String,
    /// Value data as stored
    #[serde(default)]
    pub raw: Vec<u8>,
}

impl KeyValue {
    /// Create a value from all three parts
    pub fn new(name: impl Into<String>, raw: Vec<u8>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            raw,
        }
    }

    /// Create a text value whose raw bytes are the UTF-8 text
    pub fn text(name: impl Into<String>, data: impl Into<String>) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            raw: data.as_bytes().to_vec(),
            data,
        }
    }
}

/// A key in the decoded tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyNode {
    /// Key name (last path segment)
    pub name: String,
    /// Full key path, segments separated by `\`
    pub path: String,
    /// Last write time recorded for the key, if the reader produced one
    pub last_write_time: Option<DateTime<Utc>>,
    /// Values in stored order
    #[serde(default)]
    pub values: Vec<KeyValue>,
    /// Sub-keys in stored order
    #[serde(default)]
    pub subkeys: Vec<KeyNode>,
}

impl KeyNode {
    /// Create an empty key at `path`; the name is the last path segment.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('\\').next().unwrap_or_default().to_string();
        Self {
            name,
            path,
            last_write_time: None,
            values: Vec::new(),
            subkeys: Vec::new(),
        }
    }

    /// Set the last write time
    pub fn with_last_write(mut self, time: DateTime<Utc>) -> Self {
        self.last_write_time = Some(time);
        self
    }

    /// Append a text value
    pub fn with_value(mut self, name: impl Into<String>, data: impl Into<String>) -> Self {
        self.values.push(KeyValue::text(name, data));
        self
    }

    /// Append a value with explicit raw bytes
    pub fn with_raw_value(
        mut self,
        name: impl Into<String>,
        raw: Vec<u8>,
        data: impl Into<String>,
    ) -> Self {
        self.values.push(KeyValue::new(name, raw, data));
        self
    }

    /// Append a sub-key
    pub fn with_subkey(mut self, key: KeyNode) -> Self {
        self.subkeys.push(key);
        self
    }

    /// Direct sub-key by name, compared case-insensitively
    pub fn subkey(&self, name: &str) -> Option<&KeyNode> {
        self.subkeys
            .iter()
            .find(|key| key.name.eq_ignore_ascii_case(name))
    }
}
