//! Two-phase sealing for resources whose identity is assigned by storage.
//!
//! 1. [`FieldCipher::provision`] seals the fields under the placeholder
//!    context; the caller persists [`Provisioning::staged`].
//! 2. Once storage returns the real identity, [`Provisioning::finalize`]
//!    reseals the same plaintext under it; the caller writes the result back
//!    in place.
//!
//! The two writes are not atomic. A resource whose second write never lands
//! stays sealed under the placeholder and is still readable through
//! [`FieldCipher::resolve`]; [`FieldCipher::reseal`] heals such a value.

use crate::cipher::FieldCipher;
use crate::error::{CryptoError, CryptoResult};
use crate::fields::SealedFields;
use crate::resolver::Resolved;
use everkeep_types::{ContextId, OwnerId};
use tracing::debug;
use zeroize::Zeroizing;

/// A resource sealed under the placeholder context, awaiting its identity.
pub struct Provisioning {
    cipher: FieldCipher,
    owner: OwnerId,
    plaintext: Vec<(String, Option<Zeroizing<String>>)>,
    staged: SealedFields,
}

impl Provisioning {
    /// Owner the fields are sealed for.
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Fields sealed under the placeholder context, ready for the first write.
    pub fn staged(&self) -> &SealedFields {
        &self.staged
    }

    /// Reseals the held plaintext under the storage-assigned `context`.
    ///
    /// Can be retried if the write-back fails.
    pub fn finalize(&self, context: &ContextId) -> CryptoResult<SealedFields> {
        if context.is_placeholder() {
            return Err(CryptoError::PlaceholderContext);
        }
        let fields = self
            .plaintext
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref().map(String::as_str)));
        let sealed = self.cipher.seal_fields(fields, &self.owner, context)?;
        debug!(owner = %self.owner, context = %context, fields = sealed.len(), "provisioned fields resealed");
        Ok(sealed)
    }
}

impl std::fmt::Debug for Provisioning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.plaintext.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("Provisioning")
            .field("owner", &self.owner)
            .field("fields", &names)
            .finish_non_exhaustive()
    }
}

impl FieldCipher {
    /// Seals `fields` under the placeholder context for a resource that has
    /// no identity yet.
    pub fn provision<I, K, V>(&self, owner: &OwnerId, fields: I) -> CryptoResult<Provisioning>
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let plaintext: Vec<(String, Option<Zeroizing<String>>)> = fields
            .into_iter()
            .map(|(name, value)| (name.into(), value.map(|v| Zeroizing::new(v.into()))))
            .collect();

        let placeholder = ContextId::placeholder();
        let staged = self.seal_fields(
            plaintext
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_deref().map(String::as_str))),
            owner,
            &placeholder,
        )?;

        Ok(Provisioning {
            cipher: self.clone(),
            owner: owner.clone(),
            plaintext,
            staged,
        })
    }

    /// Reseals `value` under `context` if it is currently only readable under
    /// the placeholder context. Returns `None` when no rewrite is needed.
    pub fn reseal(
        &self,
        value: &str,
        owner: &OwnerId,
        context: &ContextId,
    ) -> CryptoResult<Option<String>> {
        match self.resolve(value, owner, context) {
            Resolved::Placeholder(plaintext) => {
                let plaintext = Zeroizing::new(plaintext);
                self.encrypt_text(&plaintext, owner, context).map(Some)
            }
            _ => Ok(None),
        }
    }
}
