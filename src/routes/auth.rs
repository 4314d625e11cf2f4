use axum::{extract::State, response::Json};
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set, SqlErr};

use crate::entities::user::{self, Entity as User};
use crate::error::AppError;
use crate::models::account::{AuthToken, LoginRequest, LoginResponse, RegisterRequest, UserProfile};
use crate::models::MessageResponse;

use super::AppState;

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; the token is an unverified placeholder", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse),
        (status = 500, description = "Database failure", body = MessageResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = payload.email.trim();
    tracing::info!(email, "login attempt");

    // Plaintext comparison; passwords are stored as given.
    let user = User::find()
        .filter(user::Column::Email.eq(email))
        .filter(user::Column::Password.eq(&payload.password))
        .one(&state.db)
        .await?;

    match user {
        Some(user) => {
            tracing::info!(user_id = user.id, "login succeeded");
            Ok(Json(LoginResponse {
                user: UserProfile::from(user),
                token: AuthToken::unverified_placeholder(),
            }))
        }
        None => {
            tracing::info!(email, "login failed");
            Err(AppError::Unauthorized("Wrong email or password".to_string()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = MessageResponse),
        (status = 400, description = "Email already registered or a field is empty", body = MessageResponse),
        (status = 500, description = "Database failure", body = MessageResponse)
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let name = payload.name.trim();
    let email = payload.email.trim();

    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Name, email and password are required".to_string(),
        ));
    }

    let existing = User::find()
        .filter(user::Column::Email.eq(email))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        tracing::info!(email, "registration rejected: email taken");
        return Err(AppError::Validation("Email is already registered".to_string()));
    }

    let new_user = user::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password: Set(payload.password),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    let saved = new_user.insert(&state.db).await.map_err(registration_error)?;
    tracing::info!(user_id = saved.id, "user registered");

    Ok(Json(MessageResponse::new("Registration succeeded, please log in.")))
}

// A concurrent registration can claim the email after the lookup above.
fn registration_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Validation("Email is already registered".to_string())
        }
        _ => err.into(),
    }
}
