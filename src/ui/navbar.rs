use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::session::Session;

pub const BRAND: &str = "TaskManager";

pub fn render(frame: &mut Frame, area: Rect, session: &Session) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(inner);

    let brand = Line::from(vec![
        Span::styled(
            BRAND,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" v{}", env!("SIMPLE_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(brand), chunks[0]);

    if let Some(user) = session.current_user() {
        let links = Line::from(vec![
            Span::raw(format!("Welcome, {}", user.name)),
            Span::raw("  "),
            Span::styled("[L] Logout", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(links).alignment(Alignment::Right), chunks[1]);
    }
}
