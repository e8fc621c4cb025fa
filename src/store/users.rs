//! User and session persistence.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{AuthUser, Role};
use crate::error::AppError;

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

pub async fn create_user(pool: &PgPool, email: &str, password_hash: &str, role: Role) -> Result<Uuid, AppError> {
    let id = Uuid::now_v7();
    let result = sqlx::query("INSERT INTO users (id, email, password_hash, role) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .execute(pool)
        .await;
    match result {
        Ok(_) => Ok(id),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(AppError::Validation("Email already registered".into()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, AppError> {
    let row = sqlx::query_as::<_, UserRow>("SELECT id, email, password_hash, role FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Mints an opaque bearer token for the user.
pub async fn create_session(pool: &PgPool, user_id: Uuid) -> Result<Uuid, AppError> {
    let token = Uuid::new_v4();
    sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
        .bind(token)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(token)
}

/// Resolves a bearer token to the identity handlers work with.
pub async fn find_session(pool: &PgPool, token: Uuid) -> Result<Option<AuthUser>, AppError> {
    let row: Option<(Uuid, String)> = sqlx::query_as(
        "SELECT u.id, u.role FROM sessions s JOIN users u ON u.id = s.user_id WHERE s.token = $1",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;
    match row {
        Some((user_id, role)) => {
            let role: Role = role
                .parse()
                .map_err(|_| AppError::Internal(anyhow::anyhow!("stored role '{role}' is not a known role")))?;
            Ok(Some(AuthUser { user_id, role }))
        }
        None => Ok(None),
    }
}
