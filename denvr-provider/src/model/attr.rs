//! Tri-state attribute values.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One attribute of a declarative record.
///
/// `Unknown` marks a value that will only be known after the control plane
/// answers; it appears in create plans and is persisted as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Attr<T> {
    #[default]
    Null,
    Unknown,
    Value(T),
}

impl<T> Attr<T> {
    /// `None` becomes `Null`.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Attr::Null, Attr::Value)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Attr::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Attr::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Attr::Unknown)
    }

    /// Overwrite with `value` when it is present, otherwise leave as is.
    pub fn merge(&mut self, value: Option<T>) {
        if let Some(v) = value {
            *self = Attr::Value(v);
        }
    }
}

impl<T: Clone> Attr<T> {
    pub fn to_option(&self) -> Option<T> {
        self.value().cloned()
    }
}

impl Attr<String> {
    /// The string value, or `""` when null or unknown.
    pub fn as_str(&self) -> &str {
        self.value().map(String::as_str).unwrap_or("")
    }
}

impl<T> From<T> for Attr<T> {
    fn from(value: T) -> Self {
        Attr::Value(value)
    }
}

impl From<&str> for Attr<String> {
    fn from(value: &str) -> Self {
        Attr::Value(value.to_string())
    }
}

impl<T: Serialize> Serialize for Attr<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Attr::Value(v) => serializer.serialize_some(v),
            Attr::Null | Attr::Unknown => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Attr<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Attr::from_option)
    }
}
