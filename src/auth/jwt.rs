use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::JwtConfig, error::ApiError, state::AppState};

/// JWT payload binding a request to a user identity. A token is valid for its
/// full lifetime once issued; there is no revocation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// Why verification failed. All kinds collapse to a single 401 at the edge so
/// clients learn nothing about which check tripped.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid signature")]
    Signature,
    #[error("token expired")]
    Expired,
}

/// Signing and verification keys derived once from the process-wide secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig { secret, ttl_hours } = state.config.jwt.clone();
        Self::new(&secret, ttl_hours)
    }
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::from_secs(ttl_hours.max(0) as u64 * 3600),
        }
    }

    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::Signature,
                _ => TokenError::Malformed,
            },
        )?;
        debug!(user_id = %data.claims.user_id, "jwt verified");
        Ok(data.claims)
    }
}

/// Extracts and verifies the bearer token from the `Authorization` header,
/// handing the resolved user id to the handler as an explicit value.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            ApiError::Unauthorized
        })?;

        Ok(AuthUser(claims.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::new("test-secret", 72)
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.user_id, user_id);
        assert!(claims.exp > claims.iat);
        // 72h window
        assert_eq!(claims.exp - claims.iat, 72 * 3600);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        // Expired well past the default leeway.
        let claims = Claims {
            user_id: Uuid::new_v4(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(keys.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn verify_rejects_tampered_signature() {
        let keys = make_keys();
        let token = keys.sign(Uuid::new_v4()).expect("sign");
        let dot = token.rfind('.').unwrap();
        // Flip the first character of the signature segment to another valid
        // base64url character.
        let mut bytes = token.into_bytes();
        bytes[dot + 1] = if bytes[dot + 1] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert!(matches!(
            keys.verify(&tampered),
            Err(TokenError::Signature)
        ));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = JwtKeys::new("other-secret", 72)
            .sign(Uuid::new_v4())
            .expect("sign");
        assert!(matches!(
            make_keys().verify(&token),
            Err(TokenError::Signature)
        ));
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(matches!(
            make_keys().verify("not-a-token"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            make_keys().verify(""),
            Err(TokenError::Malformed)
        ));
    }
}
