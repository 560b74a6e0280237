//! Field presence for merge-patch payloads.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One field of a merge-patch document.
///
/// Use with `#[serde(default)]` so a missing key deserializes to `Absent`
/// while an explicit `null` becomes `Null`. Only `Value` ever reaches the
/// stored field; `Null` is kept apart so callers can still see it was sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// Merge into a stored field. `Absent` and `Null` leave it untouched.
    pub fn apply_to(self, target: &mut Option<T>) {
        if let Patch::Value(value) = self {
            *target = Some(value);
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Absent | Patch::Null => serializer.serialize_none(),
            Patch::Value(value) => serializer.serialize_some(value),
        }
    }
}
