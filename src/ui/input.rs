use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use tracing::debug;

use super::{view, Focus, ProfileField, TaskField, UiState};
use crate::api::Backend;
use crate::dashboard::{Dashboard, DashboardError, ProfileModal};
use crate::model::{ProfileForm, TaskForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
    Logout,
}

fn ignore(result: Result<(), DashboardError>) {
    if let Err(err) = result {
        debug!(reason = %err, "Input had no effect.");
    }
}

pub fn handle_key<B: Backend>(
    ui: &mut UiState,
    dashboard: &mut Dashboard<B>,
    key: KeyEvent,
) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if dashboard.state().pending_delete.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => ignore(dashboard.confirm_delete()),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => dashboard.cancel_delete(),
            _ => {}
        }
        return Action::Continue;
    }
    if dashboard.state().task_modal.is_open() {
        handle_task_modal(ui, dashboard, key.code);
        return Action::Continue;
    }
    if dashboard.state().profile_modal == ProfileModal::Open {
        handle_profile_modal(ui, dashboard, key.code);
        return Action::Continue;
    }
    if ui.focus == Focus::Search {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => ui.focus = Focus::List,
            KeyCode::Backspace => dashboard.pop_search_char(),
            KeyCode::Char(c) => dashboard.push_search_char(c),
            _ => {}
        }
        return Action::Continue;
    }

    let selected = dashboard
        .state()
        .tasks
        .get(ui.selected)
        .map(|task| task.id.clone());
    match key.code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('L') => return Action::Logout,
        KeyCode::Char('/') => ui.focus = Focus::Search,
        KeyCode::Char('s') => dashboard.cycle_status_filter(),
        KeyCode::Char('p') => dashboard.cycle_priority_filter(),
        KeyCode::Char('r') => dashboard.refresh(),
        KeyCode::Char('n') => {
            ui.task_field = TaskField::default();
            dashboard.open_create();
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(id) = selected {
                ui.task_field = TaskField::default();
                ignore(dashboard.open_edit(&id));
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = selected {
                ignore(dashboard.request_delete(&id));
            }
        }
        KeyCode::Char('P') => {
            ui.profile_field = ProfileField::default();
            dashboard.open_profile();
        }
        KeyCode::Up | KeyCode::Char('k') => ui.selected = ui.selected.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => {
            ui.selected += 1;
            ui.clamp_selection(dashboard.state().tasks.len());
        }
        _ => {}
    }
    Action::Continue
}

fn handle_task_modal<B: Backend>(ui: &mut UiState, dashboard: &mut Dashboard<B>, code: KeyCode) {
    match code {
        KeyCode::Esc => dashboard.close_task_modal(),
        KeyCode::Tab | KeyCode::Down => ui.task_field = ui.task_field.next(),
        KeyCode::BackTab | KeyCode::Up => ui.task_field = ui.task_field.prev(),
        KeyCode::Enter => ignore(dashboard.submit_task()),
        code => {
            if let Some(form) = dashboard.task_form_mut() {
                edit_task_field(form, ui.task_field, code);
            }
        }
    }
}

fn edit_task_field(form: &mut TaskForm, field: TaskField, code: KeyCode) {
    match (field, code) {
        (TaskField::Title, KeyCode::Char(c)) => form.title.push(c),
        (TaskField::Title, KeyCode::Backspace) => {
            form.title.pop();
        }
        (TaskField::Description, KeyCode::Char(c)) => form.description.push(c),
        (TaskField::Description, KeyCode::Backspace) => {
            form.description.pop();
        }
        (TaskField::Status, KeyCode::Right | KeyCode::Char(' ')) => form.status = form.status.next(),
        (TaskField::Status, KeyCode::Left) => form.status = form.status.prev(),
        (TaskField::Priority, KeyCode::Right | KeyCode::Char(' ')) => {
            form.priority = form.priority.next()
        }
        (TaskField::Priority, KeyCode::Left) => form.priority = form.priority.prev(),
        _ => {}
    }
}

fn handle_profile_modal<B: Backend>(
    ui: &mut UiState,
    dashboard: &mut Dashboard<B>,
    code: KeyCode,
) {
    match code {
        KeyCode::Esc => dashboard.close_profile(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            ui.profile_field = ui.profile_field.toggle()
        }
        KeyCode::Enter => ignore(dashboard.submit_profile()),
        code => {
            if let Some(form) = dashboard.profile_form_mut() {
                edit_profile_field(form, ui.profile_field, code);
            }
        }
    }
}

fn edit_profile_field(form: &mut ProfileForm, field: ProfileField, code: KeyCode) {
    let text = match field {
        ProfileField::Name => &mut form.name,
        ProfileField::Email => &mut form.email,
    };
    match code {
        KeyCode::Char(c) => text.push(c),
        KeyCode::Backspace => {
            text.pop();
        }
        _ => {}
    }
}

/// A left click on the overlay closes the open modal; clicks inside the modal
/// body are left alone.
pub fn handle_mouse<B: Backend>(dashboard: &mut Dashboard<B>, mouse: MouseEvent, screen: Rect) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    if dashboard.state().pending_delete.is_some() {
        return;
    }
    let on_overlay = !view::modal_area(screen).contains(Position::new(mouse.column, mouse.row));
    if !on_overlay {
        return;
    }
    if dashboard.state().task_modal.is_open() {
        dashboard.close_task_modal();
    } else if dashboard.state().profile_modal == ProfileModal::Open {
        dashboard.close_profile();
    }
}
