use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::error;
use uuid::Uuid;

use pulse_db::Database;
use pulse_gateway::dispatcher::Dispatcher;
use pulse_types::api::{AuthResponse, SigninRequest, SignupRequest, UserPublic};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub dispatcher: Dispatcher,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let state = state.clone();
    let response = tokio::task::spawn_blocking(move || {
        if state
            .db
            .user_by_email(&req.email)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .is_some()
        {
            return Err(StatusCode::BAD_REQUEST);
        }

        // Display name defaults to the email local part
        let name = match req.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => req.email.split('@').next().unwrap_or_default().to_string(),
        };

        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .to_string();

        let user_id = state
            .db
            .create_user(&req.email, &name, &password_hash)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let token = issue_token(&state.db, user_id)?;

        Ok(AuthResponse {
            token,
            user: UserPublic {
                id: user_id,
                name,
                email: req.email,
            },
        })
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    Ok((StatusCode::OK, Json(response)))
}

pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let state = state.clone();
    let response = tokio::task::spawn_blocking(move || -> Result<AuthResponse, StatusCode> {
        let user = state
            .db
            .user_by_email(&req.email)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        // A fresh token per signin; earlier ones stay valid (multi-device)
        let token = issue_token(&state.db, user.id)?;

        Ok(AuthResponse {
            token,
            user: UserPublic {
                id: user.id,
                name: user.name,
                email: user.email,
            },
        })
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    Ok(Json(response))
}

/// Mint an opaque, non-expiring session token bound to the user.
fn issue_token(db: &Database, user_id: i64) -> Result<String, StatusCode> {
    let token = Uuid::new_v4().to_string();
    db.insert_token(&token, user_id)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(token)
}
