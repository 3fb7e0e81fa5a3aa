use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field that can be missing, explicitly `null`, or carry a value.
///
/// `Option<T>` folds the first two together; payloads from the content API
/// keep them apart, so decoding must too. Use it on struct fields together
/// with `#[serde(default, skip_serializing_if = "Nullable::is_absent")]`:
/// a missing key becomes [`Nullable::Absent`] and is omitted again on output,
/// a literal `null` becomes [`Nullable::Null`] and is written back as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nullable<T> {
    Absent,
    Null,
    Present(T),
}

impl<T> Nullable<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Nullable::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Nullable::Present(_))
    }

    pub fn as_ref(&self) -> Nullable<&T> {
        match self {
            Nullable::Absent => Nullable::Absent,
            Nullable::Null => Nullable::Null,
            Nullable::Present(value) => Nullable::Present(value),
        }
    }

    /// Collapses both empty states into `None`.
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Nullable::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Nullable::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Nullable<U> {
        match self {
            Nullable::Absent => Nullable::Absent,
            Nullable::Null => Nullable::Null,
            Nullable::Present(value) => Nullable::Present(f(value)),
        }
    }
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Nullable::Absent
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    /// `None` maps to an explicit `null`, never to an absent field.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Nullable::Present(value),
            None => Nullable::Null,
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nullable::Present(value) => value.serialize(serializer),
            Nullable::Absent | Nullable::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Only reached when the key is present; a missing key goes through Default.
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(default, skip_serializing_if = "Nullable::is_absent")]
        value: Nullable<u32>,
    }

    #[test]
    fn missing_key_is_absent() {
        let holder: Holder = serde_json::from_value(json!({})).unwrap();
        assert!(holder.value.is_absent());
        assert_eq!(serde_json::to_value(&holder).unwrap(), json!({}));
    }

    #[test]
    fn null_is_kept_as_null() {
        let holder: Holder = serde_json::from_value(json!({ "value": null })).unwrap();
        assert!(holder.value.is_null());
        assert_eq!(serde_json::to_value(&holder).unwrap(), json!({ "value": null }));
    }

    #[test]
    fn value_is_present() {
        let holder: Holder = serde_json::from_value(json!({ "value": 7 })).unwrap();
        assert_eq!(holder.value, Nullable::Present(7));
        assert_eq!(holder.value.as_option(), Some(&7));
    }

    #[test]
    fn from_none_is_null() {
        assert_eq!(Nullable::<u8>::from(None), Nullable::Null);
        assert_eq!(Nullable::from(Some(1)).map(|v| v + 1), Nullable::Present(2));
    }
}
