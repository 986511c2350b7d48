use serde::Deserialize;

use bedrock_core::Validator;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /v1/users`.
///
/// Absent fields decode as empty so validation can report them by name.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterUserRequest {
    pub fn validate(&self, v: &mut Validator) {
        v.check(!self.name.is_empty(), "name", "must be provided");
        v.check(
            self.name.len() <= 500,
            "name",
            "must not be more than 500 bytes long",
        );
        bedrock_auth::validate_email(v, &self.email);
        bedrock_auth::validate_password_plaintext(v, &self.password);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::json::{decode, DecodeError, MAX_BODY_BYTES};

    #[test]
    fn missing_fields_are_reported_by_validation() {
        let req: RegisterUserRequest = decode(b"{}", MAX_BODY_BYTES).unwrap();
        let mut v = Validator::new();
        req.validate(&mut v);

        assert_eq!(v.errors()["name"], "must be provided");
        assert_eq!(v.errors()["email"], "must be provided");
        assert_eq!(v.errors()["password"], "must be provided");
    }

    #[test]
    fn long_names_and_passwords_are_rejected() {
        let req = RegisterUserRequest {
            name: "x".repeat(501),
            email: "ada@example.com".to_string(),
            password: "p".repeat(73),
        };
        let mut v = Validator::new();
        req.validate(&mut v);

        assert_eq!(v.errors()["name"], "must not be more than 500 bytes long");
        assert_eq!(v.errors()["password"], "must not be more than 72 bytes long");
        assert!(!v.errors().contains_key("email"));
    }

    #[test]
    fn extra_keys_are_refused() {
        let err = decode::<RegisterUserRequest>(
            br#"{"name": "Ada", "role": "admin"}"#,
            MAX_BODY_BYTES,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownField {
                field: "role".to_string()
            }
        );
    }
}
