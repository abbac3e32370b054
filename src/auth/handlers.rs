use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-account", post(create_account))
        .route("/login", post(login))
        .route("/get-users", get(get_user))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let full_name = payload.full_name.trim();
    let email = payload.email.trim();

    if full_name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("All fields are required.".into()));
    }
    if !is_valid_email(email) {
        warn!("invalid email on registration");
        return Err(ApiError::Validation("Invalid email.".into()));
    }

    let hash = hash_password(&payload.password)?;

    // Uniqueness lives in the store's index, not here; the losing side of a
    // concurrent duplicate registration surfaces as a unique violation.
    let user = match User::create(&state.db, full_name, email, &hash).await {
        Ok(u) => u,
        Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
            warn!("email already registered");
            return Err(ApiError::Conflict("User already exists.".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            error: false,
            message: "Registration successful.".into(),
            access_token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("All fields are required.".into()));
    }

    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| ApiError::InvalidCredentials("User does not exist.".into()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials("Invalid credentials.".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        error: false,
        message: "Login successful.".into(),
        access_token,
        user: user.into(),
    }))
}

/// The token invariant requires the embedded user to still exist; a token for
/// a vanished user answers 401, not 404.
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(UserResponse {
        error: false,
        message: "User found.".into(),
        user: user.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("spaces in@x.com"));
        assert!(!is_valid_email("a@nodot"));
    }
}
