use crate::models::account::{AuthToken, LoginResponse, UserProfile};

/// The logged-in user for the lifetime of one client. Created by a successful login,
/// ended by [`Session::logout`]. Never written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    user: UserProfile,
    token: AuthToken,
}

impl Session {
    pub fn new(user: UserProfile, token: AuthToken) -> Self {
        Self { user, token }
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    /// Id recorded as the owner of uploads made in this session.
    pub fn owner_id(&self) -> i32 {
        self.user.id
    }

    /// Unverified; see [`AuthToken`].
    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    pub fn logout(self) {
        tracing::info!(user_id = self.user.id, "session ended");
    }
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self::new(response.user, response.token)
    }
}
