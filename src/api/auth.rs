//! Signup and login handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::AppState;
use crate::auth::{self, Role};
use crate::error::AppError;
use crate::store;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: Option<Role>,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    req.validate()?;
    let role = req.role.unwrap_or(Role::Student);
    let hash = auth::hash_password(&req.password)?;
    let user_id = store::users::create_user(&state.db, &req.email, &hash, role).await?;
    tracing::info!(%user_id, %role, "user created");
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "message": "User created" }))))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = store::users::find_by_email(&state.db, &req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !auth::verify_password(&user.password_hash, &req.password)? {
        return Err(AppError::Unauthorized);
    }
    let role: Role = user
        .role
        .parse()
        .map_err(|_| AppError::Internal(anyhow::anyhow!("stored role '{}' is not a known role", user.role)))?;
    let token = store::users::create_session(&state.db, user.id).await?;
    Ok(Json(LoginResponse { token: token.to_string(), role }))
}
