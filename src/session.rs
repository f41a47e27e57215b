//! Authentication context shared by the navbar and the dashboard.

use thiserror::Error;
use tracing::info;

use crate::api::{ApiError, HttpApiClient, LoginResponse};
use crate::model::Profile;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no credentials: set api.token, TASKBOARD_TOKEN or TASKBOARD_EMAIL/TASKBOARD_PASSWORD")]
    NoCredentials,
    #[error("login failed: {0}")]
    Login(#[from] ApiError),
}

pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Current token and identity. Owned by the app loop and lent to whoever
/// needs it; there is no global instance.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    user: Option<Profile>,
}

impl Session {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user: None,
        }
    }

    /// Uses the token when one is available, otherwise logs in with the
    /// credentials.
    pub async fn authenticate(
        client: &HttpApiClient,
        token: Option<String>,
        credentials: Option<Credentials>,
    ) -> Result<Self, SessionError> {
        if let Some(token) = token {
            return Ok(Self::with_token(token));
        }
        let credentials = credentials.ok_or(SessionError::NoCredentials)?;
        let response = client
            .login(&credentials.email, &credentials.password)
            .await?;
        info!(user = response.user.email.as_str(), "Logged in.");
        Ok(Self::from(response))
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn current_user(&self) -> Option<&Profile> {
        self.user.as_ref()
    }

    pub fn update_user(&mut self, user: Profile) {
        self.user = Some(user);
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.user = None;
    }
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            token: Some(response.token),
            user: Some(response.user),
        }
    }
}
