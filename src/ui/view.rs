use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::{navbar, Focus, ProfileField, TaskField, UiState};
use crate::dashboard::{DashboardState, ProfileModal};
use crate::model::{Task, TaskPriority, TaskStatus};
use crate::session::Session;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this task? (y/n)";

/// Area covered by the task and profile modals. Clicks outside it land on the
/// overlay.
pub fn modal_area(screen: Rect) -> Rect {
    centered_rect(60, 50, screen)
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn render(frame: &mut Frame, ui: &UiState, state: &DashboardState, session: &Session) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    navbar::render(frame, chunks[0], session);
    render_profile(frame, chunks[1], state);
    render_filters(frame, chunks[2], ui, state);
    render_tasks(frame, chunks[3], ui, state);
    render_status_line(frame, chunks[4], state);

    if state.task_modal.is_open() {
        render_task_modal(frame, modal_area(area), ui, state);
    } else if state.profile_modal == ProfileModal::Open {
        render_profile_modal(frame, modal_area(area), ui, state);
    }
    if state.pending_delete.is_some() {
        render_confirm(frame, centered_rect(50, 20, area));
    }
}

fn label(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

fn render_profile(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let lines = match &state.profile {
        Some(profile) => vec![
            Line::from(vec![label("Name: "), Span::raw(profile.name.as_str())]),
            Line::from(vec![label("Email: "), Span::raw(profile.email.as_str())]),
            Line::from(vec![label("Member Since: "), Span::raw(profile.member_since())]),
        ],
        None => vec![],
    };
    let block = Block::default()
        .title("Profile  [P] Edit Profile")
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_filters(frame: &mut Frame, area: Rect, ui: &UiState, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(50),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let searching = ui.focus == Focus::Search;
    let search_text = if searching {
        format!("{}_", state.filter.search)
    } else if state.filter.search.is_empty() {
        "Search tasks...".to_string()
    } else {
        state.filter.search.clone()
    };
    let search = Paragraph::new(search_text).block(
        Block::default()
            .title("[/] Search")
            .borders(Borders::ALL)
            .border_style(if searching {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            }),
    );
    frame.render_widget(search, chunks[0]);

    let status = Paragraph::new(state.filter.status_label())
        .block(Block::default().title("[s] Status").borders(Borders::ALL));
    frame.render_widget(status, chunks[1]);

    let priority = Paragraph::new(state.filter.priority_label())
        .block(Block::default().title("[p] Priority").borders(Borders::ALL));
    frame.render_widget(priority, chunks[2]);
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Pending => Color::Yellow,
        TaskStatus::InProgress => Color::Blue,
        TaskStatus::Completed => Color::Green,
    }
}

fn priority_color(priority: TaskPriority) -> Color {
    match priority {
        TaskPriority::Low => Color::Gray,
        TaskPriority::Medium => Color::Yellow,
        TaskPriority::High => Color::Red,
    }
}

fn task_item(task: &Task) -> ListItem<'_> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            task.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", task.status),
            Style::default().fg(status_color(task.status)),
        ),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", task.priority),
            Style::default().fg(priority_color(task.priority)),
        ),
    ])];
    if let Some(description) = task.visible_description() {
        lines.push(Line::from(Span::styled(
            format!("  {}", description),
            Style::default().fg(Color::Gray),
        )));
    }
    ListItem::new(lines)
}

fn render_tasks(frame: &mut Frame, area: Rect, ui: &UiState, state: &DashboardState) {
    let block = Block::default()
        .title(format!("My Tasks ({})  [n] New Task", state.tasks.len()))
        .borders(Borders::ALL);

    if state.is_loading() {
        let loading = Paragraph::new("Loading tasks...")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(loading, area);
        return;
    }
    if state.tasks.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(Span::styled(
                "No tasks found",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from("Create your first task to get started!"),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state.tasks.iter().map(task_item).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(ui.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_status_line(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let line = match &state.error {
        Some(error) => Line::from(vec![
            Span::styled(format!("Error: {}", error), Style::default().fg(Color::Red)),
            Span::raw("  "),
            label("[r] Retry"),
        ]),
        None => Line::from(label(
            "[e] Edit  [d] Delete  [r] Refresh  [q] Quit",
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn field_line<'a>(name: &'a str, value: String, focused: bool) -> Line<'a> {
    let marker = if focused { "> " } else { "  " };
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(marker, style),
        Span::styled(format!("{:<12}", name), style),
        Span::raw(value),
    ])
}

fn render_task_modal(frame: &mut Frame, area: Rect, ui: &UiState, state: &DashboardState) {
    let form = &state.task_form;
    let lines = vec![
        field_line("Title", form.title.clone(), ui.task_field == TaskField::Title),
        field_line(
            "Description",
            form.description.clone(),
            ui.task_field == TaskField::Description,
        ),
        field_line(
            "Status",
            format!("< {} >", form.status.label()),
            ui.task_field == TaskField::Status,
        ),
        field_line(
            "Priority",
            format!("< {} >", form.priority.label()),
            ui.task_field == TaskField::Priority,
        ),
        Line::from(""),
        Line::from(label_owned(format!(
            "[Enter] {}  [Esc] Close",
            state.task_modal.submit_label()
        ))),
    ];
    let block = Block::default()
        .title(state.task_modal.title())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_profile_modal(frame: &mut Frame, area: Rect, ui: &UiState, state: &DashboardState) {
    let form = &state.profile_form;
    let lines = vec![
        field_line("Name", form.name.clone(), ui.profile_field == ProfileField::Name),
        field_line(
            "Email",
            form.email.clone(),
            ui.profile_field == ProfileField::Email,
        ),
        Line::from(""),
        Line::from(label("[Enter] Update Profile  [Esc] Close")),
    ];
    let block = Block::default()
        .title("Edit Profile")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn label_owned(text: String) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

fn render_confirm(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title("Delete")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(DELETE_PROMPT)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}
