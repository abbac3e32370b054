use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::User;

/// Request body for account creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Returned after registration or login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub error: bool,
    pub message: String,
    pub access_token: String,
    pub user: PublicUser,
}

/// Returned by `/get-users`.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub error: bool,
    pub message: String,
    pub user: PublicUser,
}

/// Public part of a user record; never carries the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_on: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            created_on: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_uses_camel_case_and_hides_nothing_sensitive() {
        let user = User {
            id: Uuid::new_v4(),
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("\"fullName\":\"Ada Lovelace\""));
        assert!(json.contains("\"createdOn\""));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn register_request_defaults_missing_fields_to_empty() {
        let req: RegisterRequest = serde_json::from_str("{\"email\":\"a@x.com\"}").unwrap();
        assert!(req.full_name.is_empty());
        assert_eq!(req.email, "a@x.com");
        assert!(req.password.is_empty());
    }
}
