use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Optional request field with the three states the Selling API distinguishes.
///
/// `Absent` fields are skipped on the wire (pair with
/// `#[serde(default, skip_serializing_if = "Nullable::is_absent")]`), `Null` fields
/// are sent as an explicit `null`, and `Value` fields carry data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Nullable<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Nullable<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Nullable::Absent)
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    /// Missing form input becomes an explicit `null`, never an omitted key.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Nullable::Value(v),
            None => Nullable::Null,
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Only reached when the field lacks `skip_serializing_if`.
            Nullable::Absent | Nullable::Null => serializer.serialize_none(),
            Nullable::Value(v) => serializer.serialize_some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A present key maps to Null or Value; a missing key falls back to `#[serde(default)]`.
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}
