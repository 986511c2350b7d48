//! In-memory user directory backing the `/v1/users` routes.

use std::sync::{PoisonError, RwLock};

use bedrock_auth::Password;
use bedrock_core::{calculate_metadata, Filters, Metadata};
use serde::Serialize;
use thiserror::Error;

/// Columns `GET /v1/users` may sort by.
pub const SORT_SAFELIST: &[&str] = &["id", "name", "-id", "-name"];

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password: Password,
    pub activated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("a user with this email address already exists")]
pub struct DuplicateEmail;

#[derive(Debug, Default)]
pub struct UserDirectory {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new, not yet activated user and return it with its id.
    ///
    /// Emails are compared case-insensitively.
    ///
    /// # Panics
    /// If `password` has no hash; such a credential must never be stored.
    pub fn insert(
        &self,
        name: String,
        email: String,
        password: Password,
    ) -> Result<User, DuplicateEmail> {
        assert!(password.has_hash(), "missing password hash");

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.users.iter().any(|u| u.email.eq_ignore_ascii_case(&email)) {
            return Err(DuplicateEmail);
        }

        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            name,
            email,
            password,
            activated: false,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    pub fn get(&self, id: i64) -> Option<User> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.users.iter().find(|u| u.id == id).cloned()
    }

    /// One page of users whose name contains `name` (case-insensitive).
    ///
    /// `filters` must already have passed [`Filters::validate`].
    pub fn list(&self, name: &str, filters: &Filters) -> (Vec<User>, Metadata) {
        let needle = name.to_lowercase();
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut matching: Vec<&User> = inner
            .users
            .iter()
            .filter(|u| needle.is_empty() || u.name.to_lowercase().contains(&needle))
            .collect();

        match filters.sort_column() {
            "name" => matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id))),
            _ => matching.sort_by_key(|u| u.id),
        }
        if filters.sort_direction() == "DESC" {
            matching.reverse();
        }

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filters.offset() as usize)
            .take(filters.limit() as usize)
            .cloned()
            .collect();

        (page, calculate_metadata(total, filters.page, filters.page_size))
    }
}
