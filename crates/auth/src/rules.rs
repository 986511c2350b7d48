//! Credential validation rules recorded into a [`Validator`].

use bedrock_core::validator::{matches, Validator, EMAIL_RX};

use crate::password::Password;

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(matches(email, &EMAIL_RX), "email", "must be a valid email address");
}

/// Length rules for a plaintext password. bcrypt ignores bytes past 72.
pub fn validate_password_plaintext(v: &mut Validator, password: &str) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(password.len() >= 8, "password", "must be at least 8 bytes long");
    v.check(
        password.len() <= 72,
        "password",
        "must not be more than 72 bytes long",
    );
}

/// Validate a credential about to be persisted.
///
/// # Panics
/// If the credential has no hash.
pub fn validate_password(v: &mut Validator, password: &Password) {
    if let Some(plaintext) = password.plaintext() {
        validate_password_plaintext(v, plaintext);
    }
    // Accessing the hash enforces that it exists.
    let _ = password.hash();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_rules() {
        let mut v = Validator::new();
        validate_email(&mut v, "");
        assert_eq!(v.errors()["email"], "must be provided");

        let mut v = Validator::new();
        validate_email(&mut v, "bob.example.com");
        assert_eq!(v.errors()["email"], "must be a valid email address");

        let mut v = Validator::new();
        validate_email(&mut v, "bob@example.com");
        assert!(v.valid());
    }

    #[test]
    fn password_length_rules() {
        let mut v = Validator::new();
        validate_password_plaintext(&mut v, "short");
        assert_eq!(v.errors()["password"], "must be at least 8 bytes long");

        let mut v = Validator::new();
        validate_password_plaintext(&mut v, &"x".repeat(73));
        assert_eq!(v.errors()["password"], "must not be more than 72 bytes long");

        let mut v = Validator::new();
        validate_password_plaintext(&mut v, "long enough");
        assert!(v.valid());
    }

    #[test]
    fn email_and_password_errors_accumulate() {
        let mut v = Validator::new();
        validate_email(&mut v, "nope");
        validate_password_plaintext(&mut v, "");
        assert_eq!(v.errors().len(), 2);
    }

    #[test]
    fn stored_credential_skips_plaintext_rules() {
        let stored = Password::set_with_cost("pa55word123", 4).unwrap();
        let loaded = Password::from_hash(stored.hash());

        let mut v = Validator::new();
        validate_password(&mut v, &loaded);
        assert!(v.valid());
    }

    #[test]
    #[should_panic(expected = "missing password hash")]
    fn credential_without_hash_is_a_contract_violation() {
        let mut v = Validator::new();
        validate_password(&mut v, &Password::default());
    }
}
