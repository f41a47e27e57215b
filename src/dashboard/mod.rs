//! Dashboard state machine.
//!
//! Operations mutate [`DashboardState`] synchronously and spawn the backend
//! call. Each call reports back with an [`Outcome`] on the channel returned by
//! [`Dashboard::new`]; the app loop hands it to [`Dashboard::apply`] on its own
//! turn, so the state is only ever touched from one place.
//!
//! Task list fetches carry a generation. Any filter change or refetch bumps it,
//! a scheduled fetch that is no longer current when its debounce elapses is
//! dropped, and a response for an old generation is discarded.

mod error;
#[cfg(test)]
pub(crate) mod fake;
mod state;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, Backend};
use crate::model::filter::cycle_option;
use crate::model::{
    Profile, ProfileForm, Task, TaskFilter, TaskForm, TaskId, TaskPriority, TaskStatus,
};
use crate::session::Session;

pub use error::DashboardError;
pub use state::{DashboardState, Phase, ProfileModal, TaskModal};

const CHANNEL_SIZE: usize = 32;

/// Result of a backend call, delivered back to the dashboard.
#[derive(Debug)]
pub enum Outcome {
    ProfileLoaded(Result<Profile, ApiError>),
    TasksLoaded {
        generation: u64,
        result: Result<Vec<Task>, ApiError>,
    },
    TaskSaved(Result<Task, ApiError>),
    TaskDeleted {
        id: TaskId,
        result: Result<(), ApiError>,
    },
    ProfileUpdated(Result<Profile, ApiError>),
}

pub struct Dashboard<B: Backend> {
    backend: Arc<B>,
    state: DashboardState,
    generation: Arc<AtomicU64>,
    search_debounce: Duration,
    tx_outcome: Sender<Outcome>,
}

impl<B: Backend> Dashboard<B> {
    pub fn new(backend: Arc<B>, search_debounce: Duration) -> (Self, Receiver<Outcome>) {
        let (tx_outcome, rx_outcome) = mpsc::channel(CHANNEL_SIZE);
        let dashboard = Self {
            backend,
            state: DashboardState::default(),
            generation: Arc::new(AtomicU64::new(0)),
            search_debounce,
            tx_outcome,
        };
        (dashboard, rx_outcome)
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Loads the profile and the task list concurrently.
    pub fn mount(&mut self) {
        info!("Mounting dashboard.");
        let backend = self.backend.clone();
        let tx = self.tx_outcome.clone();
        tokio::spawn(async move {
            let result = backend.get_profile().await;
            send(&tx, Outcome::ProfileLoaded(result)).await;
        });
        self.schedule_fetch(Duration::ZERO);
    }

    /// Retry affordance: clears the surfaced error and refetches.
    pub fn refresh(&mut self) {
        self.state.error = None;
        self.schedule_fetch(Duration::ZERO);
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if self.state.filter.search == search {
            return;
        }
        self.state.filter.search = search;
        self.schedule_fetch(self.search_debounce);
    }

    pub fn push_search_char(&mut self, c: char) {
        let mut search = self.state.filter.search.clone();
        search.push(c);
        self.set_search(search);
    }

    pub fn pop_search_char(&mut self) {
        let mut search = self.state.filter.search.clone();
        if search.pop().is_some() {
            self.set_search(search);
        }
    }

    pub fn set_status_filter(&mut self, status: Option<TaskStatus>) {
        if self.state.filter.status == status {
            return;
        }
        self.state.filter.status = status;
        self.schedule_fetch(Duration::ZERO);
    }

    pub fn set_priority_filter(&mut self, priority: Option<TaskPriority>) {
        if self.state.filter.priority == priority {
            return;
        }
        self.state.filter.priority = priority;
        self.schedule_fetch(Duration::ZERO);
    }

    pub fn cycle_status_filter(&mut self) {
        let next = cycle_option(&TaskStatus::ALL, self.state.filter.status);
        self.set_status_filter(next);
    }

    pub fn cycle_priority_filter(&mut self) {
        let next = cycle_option(&TaskPriority::ALL, self.state.filter.priority);
        self.set_priority_filter(next);
    }

    pub fn open_create(&mut self) {
        self.state.task_form = TaskForm::default();
        self.state.task_modal = TaskModal::Creating;
    }

    pub fn open_edit(&mut self, id: &str) -> Result<(), DashboardError> {
        let (form, id) = self
            .state
            .find_task(id)
            .map(|task| (TaskForm::from(task), task.id.clone()))
            .ok_or_else(|| DashboardError::UnknownTask(id.to_string()))?;
        self.state.task_form = form;
        self.state.task_modal = TaskModal::Editing(id);
        Ok(())
    }

    pub fn close_task_modal(&mut self) {
        self.state.task_modal = TaskModal::Closed;
        self.state.task_form = TaskForm::default();
    }

    pub fn task_form_mut(&mut self) -> Option<&mut TaskForm> {
        if self.state.task_modal.is_open() {
            Some(&mut self.state.task_form)
        } else {
            None
        }
    }

    /// Creates or updates depending on the modal. The list is refetched once
    /// the call succeeds.
    pub fn submit_task(&mut self) -> Result<(), DashboardError> {
        let target = match &self.state.task_modal {
            TaskModal::Closed => return Err(DashboardError::NoOpenForm),
            TaskModal::Creating => None,
            TaskModal::Editing(id) => Some(id.clone()),
        };
        if let Err(err) = self.state.task_form.validate() {
            self.state.error = Some(err.to_string());
            return Err(err.into());
        }

        let form = self.state.task_form.clone();
        let backend = self.backend.clone();
        let tx = self.tx_outcome.clone();
        tokio::spawn(async move {
            let result = match target {
                Some(id) => backend.update_task(&id, &form).await,
                None => backend.create_task(&form).await,
            };
            send(&tx, Outcome::TaskSaved(result)).await;
        });
        Ok(())
    }

    /// First step of a delete; nothing is sent until [`Self::confirm_delete`].
    pub fn request_delete(&mut self, id: &str) -> Result<(), DashboardError> {
        if self.state.find_task(id).is_none() {
            return Err(DashboardError::UnknownTask(id.to_string()));
        }
        self.state.pending_delete = Some(id.to_string());
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.state.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) -> Result<(), DashboardError> {
        let id = self
            .state
            .pending_delete
            .take()
            .ok_or(DashboardError::NothingToConfirm)?;
        let backend = self.backend.clone();
        let tx = self.tx_outcome.clone();
        tokio::spawn(async move {
            let result = backend.delete_task(&id).await;
            send(&tx, Outcome::TaskDeleted { id, result }).await;
        });
        Ok(())
    }

    pub fn open_profile(&mut self) {
        self.state.reset_profile_form();
        self.state.profile_modal = ProfileModal::Open;
    }

    pub fn close_profile(&mut self) {
        self.state.profile_modal = ProfileModal::Closed;
        self.state.reset_profile_form();
    }

    pub fn profile_form_mut(&mut self) -> Option<&mut ProfileForm> {
        match self.state.profile_modal {
            ProfileModal::Open => Some(&mut self.state.profile_form),
            ProfileModal::Closed => None,
        }
    }

    pub fn submit_profile(&mut self) -> Result<(), DashboardError> {
        if self.state.profile_modal == ProfileModal::Closed {
            return Err(DashboardError::NoOpenForm);
        }
        if let Err(err) = self.state.profile_form.validate() {
            self.state.error = Some(err.to_string());
            return Err(err.into());
        }

        let form = self.state.profile_form.clone();
        let backend = self.backend.clone();
        let tx = self.tx_outcome.clone();
        tokio::spawn(async move {
            let result = backend.update_profile(&form).await;
            send(&tx, Outcome::ProfileUpdated(result)).await;
        });
        Ok(())
    }

    /// Merges a backend result into the view state.
    pub fn apply(&mut self, session: &mut Session, outcome: Outcome) {
        match outcome {
            Outcome::ProfileLoaded(Ok(profile)) => {
                if session.current_user().is_none() {
                    session.update_user(profile.clone());
                }
                self.state.profile = Some(profile);
                self.state.reset_profile_form();
            }
            Outcome::ProfileLoaded(Err(err)) => self.fail("Error fetching profile", err),
            Outcome::TasksLoaded { generation, result } => {
                let current = self.generation.load(Ordering::Acquire);
                if generation != current {
                    debug!(generation, current, "Discarding stale task list.");
                    return;
                }
                self.state.phase = Phase::Ready;
                match result {
                    Ok(tasks) => {
                        debug!(generation, count = tasks.len(), "Task list loaded.");
                        self.state.tasks = tasks;
                    }
                    Err(err) => self.fail("Error fetching tasks", err),
                }
            }
            Outcome::TaskSaved(Ok(task)) => {
                info!(id = task.id.as_str(), "Task saved.");
                self.state.error = None;
                self.close_task_modal();
                self.schedule_fetch(Duration::ZERO);
            }
            Outcome::TaskSaved(Err(err)) => self.fail("Error saving task", err),
            Outcome::TaskDeleted { id, result } => match result {
                Ok(()) => {
                    info!(id = id.as_str(), "Task deleted.");
                    self.state.error = None;
                    self.schedule_fetch(Duration::ZERO);
                }
                Err(err) => self.fail("Error deleting task", err),
            },
            Outcome::ProfileUpdated(Ok(profile)) => {
                info!("Profile updated.");
                session.update_user(profile.clone());
                self.state.profile = Some(profile);
                self.state.error = None;
                self.close_profile();
            }
            Outcome::ProfileUpdated(Err(err)) => self.fail("Error updating profile", err),
        }
    }

    fn fail(&mut self, context: &str, err: ApiError) {
        error!(reason = %err, "{}", context);
        if err.is_unauthorized() {
            warn!("Backend rejected the session token.");
        }
        self.state.error = Some(format!("{}: {}", context, err));
    }

    fn schedule_fetch(&mut self, delay: Duration) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.state.phase = Phase::Loading;

        let filter: TaskFilter = self.state.filter.clone();
        let current = self.generation.clone();
        let backend = self.backend.clone();
        let tx = self.tx_outcome.clone();
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if current.load(Ordering::Acquire) != generation {
                debug!(generation, "Fetch superseded before it was sent.");
                return;
            }
            let result = backend.get_tasks(&filter).await;
            send(&tx, Outcome::TasksLoaded { generation, result }).await;
        });
    }
}

async fn send(tx: &Sender<Outcome>, outcome: Outcome) {
    if let Err(err) = tx.send(outcome).await {
        debug!(outcome = ?err.0, "Dashboard is gone, dropping outcome.");
    }
}
