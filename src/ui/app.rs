use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::{error, info};

use super::input::{self, Action};
use super::{view, UiState};
use crate::api::Backend;
use crate::dashboard::{Dashboard, Outcome};
use crate::session::Session;

const INPUT_POLL: Duration = Duration::from_millis(250);

/// How the event loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    LoggedOut,
}

/// Takes over the terminal, runs the dashboard until quit or logout and
/// restores the terminal whatever the outcome.
pub async fn run<B: Backend>(
    backend: Arc<B>,
    mut session: Session,
    search_debounce: Duration,
) -> anyhow::Result<Exit> {
    enable_raw_mode()?;
    let mut terminal = match enter() {
        Ok(terminal) => terminal,
        Err(err) => {
            if let Err(restore_err) = leave(&mut io::stdout()) {
                error!(reason = %restore_err, "Unable to restore the terminal.");
            }
            return Err(err.into());
        }
    };

    let (dashboard, rx_outcome) = Dashboard::new(backend, search_debounce);
    let result = event_loop(&mut terminal, dashboard, rx_outcome, &mut session).await;

    leave(terminal.backend_mut())?;
    terminal.show_cursor()?;
    result
}

fn enter() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Undoes raw mode, the alternate screen and mouse capture. Safe to call when
/// only part of the setup went through.
fn leave<W: Write>(out: &mut W) -> io::Result<()> {
    let raw = disable_raw_mode();
    execute!(out, LeaveAlternateScreen, DisableMouseCapture)?;
    raw
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut dashboard: Dashboard<B>,
    mut rx_outcome: Receiver<Outcome>,
    session: &mut Session,
) -> anyhow::Result<Exit> {
    let (tx_input, mut rx_input) = mpsc::channel::<Event>(32);
    let _input_reader = spawn_input_reader(tx_input)?;
    let mut ui = UiState::default();
    let mut screen = Rect::default();

    dashboard.mount();
    loop {
        terminal.draw(|frame| {
            screen = frame.area();
            view::render(frame, &ui, dashboard.state(), &*session);
        })?;

        tokio::select! {
            Some(outcome) = rx_outcome.recv() => dashboard.apply(session, outcome),
            event = rx_input.recv() => match event {
                Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    match input::handle_key(&mut ui, &mut dashboard, key) {
                        Action::Continue => {}
                        Action::Quit => return Ok(Exit::Quit),
                        Action::Logout => {
                            session.logout();
                            info!("Logged out.");
                            return Ok(Exit::LoggedOut);
                        }
                    }
                }
                Some(Event::Mouse(mouse)) => input::handle_mouse(&mut dashboard, mouse, screen),
                Some(_) => {}
                None => return Ok(Exit::Quit),
            },
        }
        ui.clamp_selection(dashboard.state().tasks.len());
    }
}

/// crossterm reads block, so input is pumped from its own thread.
fn spawn_input_reader(tx_input: Sender<Event>) -> io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("input".to_string())
        .spawn(move || {
            while !tx_input.is_closed() {
                match event::poll(INPUT_POLL) {
                    Ok(false) => continue,
                    Ok(true) => {}
                    Err(err) => {
                        error!(reason = %err, "Unable to poll terminal input.");
                        return;
                    }
                }
                match event::read() {
                    Ok(event) => {
                        if tx_input.blocking_send(event).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        error!(reason = %err, "Unable to read terminal input.");
                        return;
                    }
                }
            }
        })
}
