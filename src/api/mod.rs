//! Backend collaborators.
//!
//! The dashboard only sees the [`AuthApi`] and [`TaskApi`] traits; the HTTP
//! implementation lives in [`client`].

mod client;
mod error;

use async_trait::async_trait;

use crate::model::{Profile, ProfileForm, Task, TaskFilter, TaskForm};

pub use client::{HttpApiClient, LoginResponse};
pub use error::ApiError;

#[async_trait]
pub trait AuthApi: Send + Sync + 'static {
    async fn get_profile(&self) -> Result<Profile, ApiError>;
    async fn update_profile(&self, form: &ProfileForm) -> Result<Profile, ApiError>;
}

#[async_trait]
pub trait TaskApi: Send + Sync + 'static {
    async fn get_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ApiError>;
    async fn create_task(&self, form: &TaskForm) -> Result<Task, ApiError>;
    async fn update_task(&self, id: &str, form: &TaskForm) -> Result<Task, ApiError>;
    async fn delete_task(&self, id: &str) -> Result<(), ApiError>;
}

/// Everything the dashboard talks to.
pub trait Backend: AuthApi + TaskApi {}

impl<T: AuthApi + TaskApi> Backend for T {}
