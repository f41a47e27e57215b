use super::task::{TaskPriority, TaskStatus};

/// The (search, status, priority) triple sent with every task fetch.
///
/// Fields combine with AND semantics on the backend. An empty search or a
/// `None` select means "any".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskFilter {
    pub search: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    /// Query parameters for the task list request. All three keys are always
    /// present so the backend sees the full triple.
    pub fn query_params(&self) -> [(&'static str, String); 3] {
        [
            ("search", self.search.clone()),
            (
                "status",
                self.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
            ),
            (
                "priority",
                self.priority
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default(),
            ),
        ]
    }

    pub fn status_label(&self) -> &'static str {
        self.status.map(|s| s.label()).unwrap_or("All Status")
    }

    pub fn priority_label(&self) -> &'static str {
        self.priority.map(|p| p.label()).unwrap_or("All Priority")
    }
}

/// Steps through `None -> first -> ... -> last -> None`, the order of a select
/// with an "All" option on top.
pub fn cycle_option<T: Copy + PartialEq>(all: &[T], current: Option<T>) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => all
            .iter()
            .position(|x| *x == value)
            .and_then(|idx| all.get(idx + 1))
            .copied(),
    }
}
