//! In-memory backend that records every call, for driving the dashboard in
//! tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{ApiError, AuthApi, TaskApi};
use crate::model::{
    Profile, ProfileForm, Task, TaskFilter, TaskForm, TaskId, TaskPriority, TaskStatus,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetProfile,
    UpdateProfile(ProfileForm),
    GetTasks(TaskFilter),
    Create(TaskForm),
    Update(TaskId, TaskForm),
    Delete(TaskId),
}

pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    tasks: Mutex<Vec<Task>>,
    profile: Mutex<Profile>,
    delays: Mutex<HashMap<TaskStatus, Duration>>,
    next_id: AtomicU64,
    fail_profile: AtomicBool,
    fail_tasks: AtomicBool,
    fail_writes: AtomicBool,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::with_tasks(vec![])
    }
}

fn unavailable() -> ApiError {
    ApiError::Status {
        status: 500,
        message: "Server error".to_string(),
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: "Task not found".to_string(),
    }
}

impl FakeBackend {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            calls: Mutex::new(vec![]),
            tasks: Mutex::new(tasks),
            profile: Mutex::new(Profile {
                id: "u1".to_string(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                created_at: None,
            }),
            delays: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(100),
            fail_profile: AtomicBool::new(false),
            fail_tasks: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn task(id: &str, title: &str, status: TaskStatus, priority: TaskPriority) -> Task {
        let mut task = Task::new(id, title);
        task.status = status;
        task.priority = priority;
        task
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, f: impl Fn(&Call) -> bool) -> Vec<Call> {
        self.calls().into_iter().filter(|c| f(c)).collect()
    }

    pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls_matching(f).len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail_profile(&self, fail: bool) {
        self.fail_profile.store(fail, Ordering::SeqCst);
    }

    pub fn fail_tasks(&self, fail: bool) {
        self.fail_tasks.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Task list requests filtered on `status` take `delay` to answer.
    pub fn delay_status(&self, status: TaskStatus, delay: Duration) {
        self.delays.lock().unwrap().insert(status, delay);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn writes_fail(&self) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
    }
}

fn matches_filter(task: &Task, filter: &TaskFilter) -> bool {
    let search = filter.search.to_lowercase();
    let text_match = search.is_empty()
        || task.title.to_lowercase().contains(&search)
        || task
            .description
            .as_deref()
            .map(|d| d.to_lowercase().contains(&search))
            .unwrap_or(false);
    text_match
        && filter.status.map_or(true, |s| task.status == s)
        && filter.priority.map_or(true, |p| task.priority == p)
}

#[async_trait]
impl AuthApi for FakeBackend {
    async fn get_profile(&self) -> Result<Profile, ApiError> {
        self.record(Call::GetProfile);
        if self.fail_profile.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn update_profile(&self, form: &ProfileForm) -> Result<Profile, ApiError> {
        self.record(Call::UpdateProfile(form.clone()));
        if self.writes_fail() {
            return Err(unavailable());
        }
        let mut profile = self.profile.lock().unwrap();
        profile.name = form.name.clone();
        profile.email = form.email.clone();
        Ok(profile.clone())
    }
}

#[async_trait]
impl TaskApi for FakeBackend {
    async fn get_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ApiError> {
        self.record(Call::GetTasks(filter.clone()));
        let delay = filter
            .status
            .and_then(|status| self.delays.lock().unwrap().get(&status).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_tasks.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|task| matches_filter(task, filter))
            .cloned()
            .collect())
    }

    async fn create_task(&self, form: &TaskForm) -> Result<Task, ApiError> {
        self.record(Call::Create(form.clone()));
        if self.writes_fail() {
            return Err(unavailable());
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let mut task = Self::task(&id, &form.title, form.status, form.priority);
        if !form.description.is_empty() {
            task.description = Some(form.description.clone());
        }
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &str, form: &TaskForm) -> Result<Task, ApiError> {
        self.record(Call::Update(id.to_string(), form.clone()));
        if self.writes_fail() {
            return Err(unavailable());
        }
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks.iter_mut().find(|t| t.id == id).ok_or_else(not_found)?;
        task.title = form.title.clone();
        task.description = Some(form.description.clone());
        task.status = form.status;
        task.priority = form.priority;
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        self.record(Call::Delete(id.to_string()));
        if self.writes_fail() {
            return Err(unavailable());
        }
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}
