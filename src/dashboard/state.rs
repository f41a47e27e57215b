use crate::model::{Profile, ProfileForm, Task, TaskFilter, TaskForm, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// A task fetch for the current filter is in flight.
    #[default]
    Loading,
    /// The task list matches the current filter.
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskModal {
    #[default]
    Closed,
    Creating,
    Editing(TaskId),
}

impl TaskModal {
    pub fn is_open(&self) -> bool {
        *self != TaskModal::Closed
    }

    pub fn title(&self) -> &'static str {
        match self {
            TaskModal::Editing(_) => "Edit Task",
            _ => "Create New Task",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            TaskModal::Editing(_) => "Update Task",
            _ => "Create Task",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileModal {
    #[default]
    Closed,
    Open,
}

/// Everything the dashboard renders. Only [`super::Dashboard`] mutates it.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub phase: Phase,
    pub profile: Option<Profile>,
    pub tasks: Vec<Task>,
    pub filter: TaskFilter,
    pub task_modal: TaskModal,
    pub task_form: TaskForm,
    pub profile_modal: ProfileModal,
    pub profile_form: ProfileForm,
    pub pending_delete: Option<TaskId>,
    pub error: Option<String>,
}

impl DashboardState {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub(super) fn reset_profile_form(&mut self) {
        self.profile_form = self
            .profile
            .as_ref()
            .map(ProfileForm::from)
            .unwrap_or_default();
    }
}
