//! Terminal front end: rendering, input mapping and the event loop.

pub mod app;
mod input;
mod navbar;
mod view;

/// Which part of the dashboard receives typed characters when no modal is
/// open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    List,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskField {
    #[default]
    Title,
    Description,
    Status,
    Priority,
}

impl TaskField {
    const ORDER: [TaskField; 4] = [
        TaskField::Title,
        TaskField::Description,
        TaskField::Status,
        TaskField::Priority,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileField {
    #[default]
    Name,
    Email,
}

impl ProfileField {
    pub fn toggle(self) -> Self {
        match self {
            ProfileField::Name => ProfileField::Email,
            ProfileField::Email => ProfileField::Name,
        }
    }
}

/// View-only state that never reaches the backend.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub selected: usize,
    pub focus: Focus,
    pub task_field: TaskField,
    pub profile_field: ProfileField,
}

impl UiState {
    pub fn clamp_selection(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_field_cycle() {
        assert_eq!(TaskField::Title.next(), TaskField::Description);
        assert_eq!(TaskField::Priority.next(), TaskField::Title);
        assert_eq!(TaskField::Title.prev(), TaskField::Priority);
    }

    #[test]
    fn test_clamp_selection() {
        let mut ui = UiState {
            selected: 5,
            ..UiState::default()
        };
        ui.clamp_selection(3);
        assert_eq!(ui.selected, 2);
        ui.clamp_selection(0);
        assert_eq!(ui.selected, 0);
    }
}
