//! A tri-state field type for partial updates.

use serde::{Deserialize, Deserializer};

/// One field of a partial update request.
///
/// Declare fields with `#[serde(default)]` so that a key missing from the
/// request body deserializes to [Patch::Missing]:
///
/// - a missing key leaves the stored value unchanged,
/// - an explicit `null` clears the stored value,
/// - any other value replaces the stored value.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// The key was not present in the request.
    Missing,
    /// The key was present with the value `null`.
    Null,
    /// The key was present with a value.
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

impl<T> Patch<T> {
    /// Merge the patch into a nullable stored value.
    pub fn apply_nullable(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Missing => current,
            Patch::Null => None,
            Patch::Value(value) => Some(value),
        }
    }

    /// Get the new value for a field that must not be null.
    ///
    /// Returns `Ok(None)` if the field should be left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [crate::Error::NullField] with `field_name` if the patch is [Patch::Null].
    pub fn required(self, field_name: &'static str) -> Result<Option<T>, crate::Error> {
        match self {
            Patch::Missing => Ok(None),
            Patch::Null => Err(crate::Error::NullField(field_name)),
            Patch::Value(value) => Ok(Some(value)),
        }
    }
}
