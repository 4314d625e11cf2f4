use serde::{Deserialize, Serialize};

use crate::entities::user;

/// Placeholder issued on every successful login.
const PLACEHOLDER_TOKEN: &str = "dummy-token-123";

/// Token handed out by `/api/login`.
///
/// The token is **unverified**: the server issues the same placeholder to every user and never
/// checks it on later requests, and it has no expiry. Holding one proves nothing beyond "a login
/// succeeded at some point". Treat it as an opaque value to carry around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn unverified_placeholder() -> Self {
        Self(PLACEHOLDER_TOKEN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Always false; nothing in the system can verify a token.
    pub fn is_verified(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<user::Model> for UserProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub token: AuthToken,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}
