//! Password credential: optional plaintext beside a mandatory bcrypt hash.

use thiserror::Error;

/// bcrypt work factor used for stored credentials.
pub const HASH_COST: u32 = 12;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// A user's password.
///
/// `plaintext` is only present when the value was built from user input with
/// [`Password::set`]; a credential loaded from storage via
/// [`Password::from_hash`] has no plaintext. The hash is always present for a
/// credential that will be persisted.
#[derive(Clone, Default)]
pub struct Password {
    plaintext: Option<String>,
    hash: Option<String>,
}

impl Password {
    /// Hash `plaintext` with the default cost and keep both forms.
    pub fn set(plaintext: impl Into<String>) -> Result<Self, PasswordError> {
        Self::set_with_cost(plaintext, HASH_COST)
    }

    /// Like [`Password::set`] with an explicit bcrypt cost (4..=31).
    pub fn set_with_cost(plaintext: impl Into<String>, cost: u32) -> Result<Self, PasswordError> {
        let plaintext = plaintext.into();
        let hash = bcrypt::hash(&plaintext, cost)?;
        Ok(Self {
            plaintext: Some(plaintext),
            hash: Some(hash),
        })
    }

    /// Rebuild a credential from a stored hash.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self {
            plaintext: None,
            hash: Some(hash.into()),
        }
    }

    pub fn plaintext(&self) -> Option<&str> {
        self.plaintext.as_deref()
    }

    pub fn has_hash(&self) -> bool {
        self.hash.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// The stored hash.
    ///
    /// # Panics
    /// If the credential has no hash. Persisting such a value is a bug in the
    /// caller, not a recoverable condition.
    pub fn hash(&self) -> &str {
        match self.hash.as_deref() {
            Some(h) if !h.is_empty() => h,
            _ => panic!("missing password hash"),
        }
    }

    /// Check `candidate` against the stored hash.
    ///
    /// A mismatch is `Ok(false)`; an error means the stored hash is unusable.
    pub fn matches(&self, candidate: &str) -> Result<bool, PasswordError> {
        Ok(bcrypt::verify(candidate, self.hash())?)
    }
}

impl core::fmt::Debug for Password {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Password")
            .field("plaintext", &self.plaintext.as_ref().map(|_| "<redacted>"))
            .field("hash", &self.hash.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
