use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::error::ApiError;
use super::{AuthApi, TaskApi};
use crate::model::{Profile, ProfileForm, Task, TaskFilter, TaskForm};

/// reqwest-backed client for the task/profile REST backend.
#[derive(Clone)]
pub struct HttpApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for HttpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: Profile,
}

#[derive(Deserialize)]
struct TaskEnvelope {
    task: Task,
}

#[derive(Deserialize)]
struct TaskListEnvelope {
    tasks: Vec<Task>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Profile,
}

impl HttpApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed =
            Url::parse(base_url).map_err(|err| ApiError::InvalidBaseUrl(base_url.to_string(), err))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::UnusableBaseUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: parsed,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .request(Method::POST, &["auth", "login"])?
            .json(&body)
            .send()
            .await?;
        parse_json(response).await
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::UnusableBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(%method, url = url.as_str(), "backend request");
        let builder = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await?;
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    Ok(check_status(response).await?.json().await?)
}

#[async_trait]
impl AuthApi for HttpApiClient {
    async fn get_profile(&self) -> Result<Profile, ApiError> {
        let response = self.request(Method::GET, &["auth", "profile"])?.send().await?;
        let envelope: UserEnvelope = parse_json(response).await?;
        Ok(envelope.user)
    }

    async fn update_profile(&self, form: &ProfileForm) -> Result<Profile, ApiError> {
        let response = self
            .request(Method::PUT, &["auth", "profile"])?
            .json(form)
            .send()
            .await?;
        let envelope: UserEnvelope = parse_json(response).await?;
        Ok(envelope.user)
    }
}

#[async_trait]
impl TaskApi for HttpApiClient {
    async fn get_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ApiError> {
        let response = self
            .request(Method::GET, &["tasks"])?
            .query(&filter.query_params()[..])
            .send()
            .await?;
        let envelope: TaskListEnvelope = parse_json(response).await?;
        Ok(envelope.tasks)
    }

    async fn create_task(&self, form: &TaskForm) -> Result<Task, ApiError> {
        let response = self.request(Method::POST, &["tasks"])?.json(form).send().await?;
        let envelope: TaskEnvelope = parse_json(response).await?;
        Ok(envelope.task)
    }

    async fn update_task(&self, id: &str, form: &TaskForm) -> Result<Task, ApiError> {
        let response = self
            .request(Method::PUT, &["tasks", id])?
            .json(form)
            .send()
            .await?;
        let envelope: TaskEnvelope = parse_json(response).await?;
        Ok(envelope.task)
    }

    async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &["tasks", id])?
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::{DELETE, GET, POST, PUT};
    use httpmock::MockServer;
    use serde_json::json;

    use crate::model::{TaskPriority, TaskStatus};

    use super::*;

    fn client(server: &MockServer) -> HttpApiClient {
        HttpApiClient::new(&server.url("/api/"), Duration::from_secs(5))
            .unwrap()
            .with_token("secret")
    }

    #[tokio::test]
    async fn test_get_tasks_sends_full_filter() {
        // GIVEN
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/tasks")
                .header("authorization", "Bearer secret")
                .query_param_exists("search")
                .query_param("status", "pending")
                .query_param_exists("priority");
            then.status(200).json_body(json!({
                "tasks": [
                    { "_id": "1", "title": "Buy milk", "status": "pending", "priority": "low" }
                ]
            }));
        });
        let filter = TaskFilter {
            search: String::new(),
            status: Some(TaskStatus::Pending),
            priority: None,
        };

        // WHEN
        let tasks = client(&server).get_tasks(&filter).await.unwrap();

        // THEN
        mock.assert();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");
        assert_eq!(tasks[0].priority, TaskPriority::Low);
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        // GIVEN
        let server = MockServer::start();
        let created = server.mock(|when, then| {
            when.method(POST).path("/api/tasks").json_body(json!({
                "title": "Buy milk",
                "description": "",
                "status": "pending",
                "priority": "low"
            }));
            then.status(201).json_body(json!({
                "task": { "_id": "7", "title": "Buy milk", "status": "pending", "priority": "low" }
            }));
        });
        let updated = server.mock(|when, then| {
            when.method(PUT).path("/api/tasks/7");
            then.status(200).json_body(json!({
                "task": { "_id": "7", "title": "Buy milk", "status": "completed", "priority": "low" }
            }));
        });
        let deleted = server.mock(|when, then| {
            when.method(DELETE).path("/api/tasks/7");
            then.status(200)
                .json_body(json!({ "message": "Task deleted successfully" }));
        });
        let api = client(&server);
        let mut form = TaskForm {
            title: "Buy milk".into(),
            priority: TaskPriority::Low,
            ..TaskForm::default()
        };

        // WHEN
        let task = api.create_task(&form).await.unwrap();
        form.status = TaskStatus::Completed;
        let task2 = api.update_task(&task.id, &form).await.unwrap();
        api.delete_task(&task.id).await.unwrap();

        // THEN
        created.assert();
        updated.assert();
        deleted.assert();
        assert_eq!(task.id, "7");
        assert_eq!(task2.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_profile_roundtrip() {
        // GIVEN
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/auth/profile");
            then.status(200).json_body(json!({
                "user": { "id": "u1", "name": "Ada", "email": "ada@example.com", "createdAt": "2023-05-17T08:30:00Z" }
            }));
        });
        let update = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/auth/profile")
                .json_body(json!({ "name": "Ada L.", "email": "ada@example.com" }));
            then.status(200).json_body(json!({
                "user": { "id": "u1", "name": "Ada L.", "email": "ada@example.com" }
            }));
        });
        let api = client(&server);

        // WHEN
        let profile = api.get_profile().await.unwrap();
        let updated = api
            .update_profile(&ProfileForm {
                name: "Ada L.".into(),
                email: profile.email.clone(),
            })
            .await
            .unwrap();

        // THEN
        update.assert();
        assert_eq!(profile.name, "Ada");
        assert_eq!(updated.name, "Ada L.");
    }

    #[tokio::test]
    async fn test_error_status_uses_backend_message() {
        // GIVEN
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/auth/profile");
            then.status(401)
                .json_body(json!({ "message": "Token is not valid" }));
        });

        // WHEN
        let err = client(&server).get_profile().await.unwrap_err();

        // THEN
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "backend responded 401: Token is not valid");
    }

    #[tokio::test]
    async fn test_login() {
        // GIVEN
        let server = MockServer::start();
        let login = server.mock(|when, then| {
            when.method(POST)
                .path("/api/auth/login")
                .json_body(json!({ "email": "ada@example.com", "password": "pw" }));
            then.status(200).json_body(json!({
                "token": "jwt",
                "user": { "id": "u1", "name": "Ada", "email": "ada@example.com" }
            }));
        });
        let api = HttpApiClient::new(&server.url("/api"), Duration::from_secs(5)).unwrap();

        // WHEN
        let response = api.login("ada@example.com", "pw").await.unwrap();

        // THEN
        login.assert();
        assert_eq!(response.token, "jwt");
        assert_eq!(response.user.name, "Ada");
    }

    #[tokio::test]
    async fn test_task_id_is_a_single_path_segment() {
        // GIVEN
        let server = MockServer::start();
        let slash = server.mock(|when, then| {
            when.method(DELETE).path("/api/tasks/a%2Fb");
            then.status(200);
        });
        let query = server.mock(|when, then| {
            when.method(PUT).path("/api/tasks/x%3Fy=1");
            then.status(200).json_body(json!({
                "task": { "_id": "x?y=1", "title": "Odd", "status": "pending", "priority": "low" }
            }));
        });
        let api = client(&server);

        // WHEN
        api.delete_task("a/b").await.unwrap();
        let task = api
            .update_task("x?y=1", &TaskForm { title: "Odd".into(), ..TaskForm::default() })
            .await
            .unwrap();

        // THEN
        slash.assert();
        query.assert();
        assert_eq!(task.id, "x?y=1");
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = HttpApiClient::new("http://localhost:5000/api/", Duration::from_secs(1)).unwrap();
        let url = api.endpoint(&["tasks", "a#b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/tasks/a%23b");

        let api = HttpApiClient::new("http://localhost:5000", Duration::from_secs(1)).unwrap();
        let url = api.endpoint(&["tasks"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/tasks");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpApiClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl(_, _)));

        let err = HttpApiClient::new("mailto:ada@example.com", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ApiError::UnusableBaseUrl(_)));
    }
}
