//! Record-level sealing of named, nullable text fields.
//!
//! A record such as a vault carries several sensitive fields (`name`,
//! `description`). Sealing encrypts each present field under the record's
//! (owner, context) pair. Opening goes through the fallback resolver, one
//! field at a time, so an unreadable field degrades only itself.

use crate::cipher::FieldCipher;
use crate::error::CryptoResult;
use crate::resolver::Resolved;
use everkeep_types::{ContextId, OwnerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sealed field values keyed by field name. `None` marks a null field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SealedFields {
    fields: BTreeMap<String, Option<String>>,
}

impl SealedFields {
    /// Creates an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a stored value, e.g. when loading a record from storage.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        self.fields.insert(name.into(), value);
    }

    /// Returns the stored value of `name`; `None` if absent or null.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }

    /// Returns true if the field is present, even when null.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterates stored values in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Returns the number of fields, null ones included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the set has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for SealedFields {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Plaintext view of a record after opening its sealed fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OpenedFields {
    values: BTreeMap<String, Option<String>>,
    resealable: Vec<String>,
    unreadable: Vec<String>,
}

impl OpenedFields {
    /// Returns the opened value of `name`; `None` if absent or null.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_deref())
    }

    /// Iterates opened values in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Fields that only opened under the placeholder context.
    pub fn resealable(&self) -> &[String] {
        &self.resealable
    }

    /// Fields returned as stored because no context could open them.
    pub fn unreadable(&self) -> &[String] {
        &self.unreadable
    }

    /// Returns true if any field should be resealed.
    pub fn needs_reseal(&self) -> bool {
        !self.resealable.is_empty()
    }

    /// Consumes the view, returning the plaintext map.
    pub fn into_values(self) -> BTreeMap<String, Option<String>> {
        self.values
    }
}

impl FieldCipher {
    /// Seals every present field for `(owner, context)`. Null fields stay null.
    pub fn seal_fields<I, K, V>(
        &self,
        fields: I,
        owner: &OwnerId,
        context: &ContextId,
    ) -> CryptoResult<SealedFields>
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut sealed = SealedFields::new();
        for (name, value) in fields {
            let value = value
                .map(|v| self.encrypt_text(v.as_ref(), owner, context))
                .transpose()?;
            sealed.insert(name, value);
        }
        Ok(sealed)
    }

    /// Opens every field of a stored record through the fallback resolver.
    pub fn open_fields(
        &self,
        sealed: &SealedFields,
        owner: &OwnerId,
        context: &ContextId,
    ) -> OpenedFields {
        let mut opened = OpenedFields::default();
        for (name, value) in sealed.iter() {
            let resolved = self.resolve_optional(value, owner, context);
            match &resolved {
                Some(Resolved::Placeholder(_)) => opened.resealable.push(name.to_string()),
                Some(Resolved::Unreadable(_)) => opened.unreadable.push(name.to_string()),
                _ => {}
            }
            opened
                .values
                .insert(name.to_string(), resolved.map(Resolved::into_string));
        }
        opened
    }
}
