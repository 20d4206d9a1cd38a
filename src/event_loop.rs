use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::watch::error::RecvError;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::app::{App, Focus, ModalState};
use crate::capture::FrameReceiver;
use crate::handlers::keyboard::handle_key_event;
use crate::handlers::mouse::handle_mouse_event;
use crate::ui::layout::{create_fullscreen_layout, create_layout_with_help};
use crate::ui::modal::{ConfirmModal, CopyViewModal, TextInputModal};
use crate::ui::sidebar::Sidebar;
use crate::ui::terminal_pane::TerminalPane;
use crate::ui::{HelpMenuWidget, ToastWidget};

/// Redraw cadence when nothing else happens, so toasts expire on time.
const TICK_RATE: Duration = Duration::from_millis(250);

/// Action returned from key handling
pub(crate) enum KeyAction {
    Continue,
    Quit,
}

pub async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut events = EventStream::new();
    // The first tick fires immediately, loading the list on startup
    let mut refresh = interval(app.config.refresh_interval());
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick = interval(TICK_RATE);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut sized: Option<(String, u16, u16)> = None;

    loop {
        app.terminal.sync_frame();
        app.toast_manager.update();
        terminal.draw(|f| draw_ui(f, app))?;

        // Keep the attached session the size of the pane showing it
        if let (Some(name), Some(area)) = (app.terminal.attached(), app.terminal_inner_area) {
            let wanted = (name.to_string(), area.width, area.height);
            if sized.as_ref() != Some(&wanted) {
                app.resize_attached(area.width, area.height).await;
                sized = Some(wanted);
            }
        }

        let mut frames = app.terminal.frames();
        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => {
                    if let KeyAction::Quit = handle_event(app, event).await {
                        break;
                    }
                }
                Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                None => break,
            },
            _ = refresh.tick() => {
                debug!("periodic session refresh");
                app.refresh_sessions().await;
            }
            Ok(()) = frame_changed(&mut frames) => {}
            _ = tick.tick() => {}
        }

        if app.should_quit {
            break;
        }
    }

    info!("shutting down");
    app.terminal.detach().await;
    Ok(())
}

/// Resolves when the capture task publishes a new frame. Pending forever
/// while nothing is attached.
async fn frame_changed(frames: &mut Option<FrameReceiver>) -> Result<(), RecvError> {
    match frames {
        Some(frames) => frames.changed().await,
        None => std::future::pending().await,
    }
}

async fn handle_event(app: &mut App, event: Event) -> KeyAction {
    match event {
        // Release and repeat events arrive on some platforms
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            return handle_key_event(app, key).await;
        }
        Event::Mouse(mouse) => handle_mouse_event(app, mouse).await,
        Event::Paste(text) if app.focus == Focus::Terminal && !app.modal_state.is_open() => {
            app.terminal.paste(&text).await;
        }
        // Layout is recomputed on the next draw
        _ => {}
    }
    KeyAction::Continue
}

fn draw_ui(f: &mut Frame, app: &mut App) {
    let (sidebar_area, terminal_area, help_area) = if app.fullscreen {
        let (terminal_area, help_area) = create_fullscreen_layout(f.area());
        (None, terminal_area, help_area)
    } else {
        let (sidebar_area, terminal_area, help_area) =
            create_layout_with_help(f.area(), app.config.layout.sidebar_width_pct);
        (Some(sidebar_area), terminal_area, help_area)
    };
    app.sidebar_area = sidebar_area;

    if let Some(sidebar_area) = sidebar_area {
        let sidebar = Sidebar::new(
            &app.directory,
            app.terminal.attached(),
            app.focus == Focus::Sidebar,
        );
        f.render_stateful_widget(sidebar, sidebar_area, &mut app.list_state);
    }

    // Cache terminal inner area for mouse hit testing and resizing
    let terminal_inner = Rect {
        x: terminal_area.x + 1,
        y: terminal_area.y + 1,
        width: terminal_area.width.saturating_sub(2),
        height: terminal_area.height.saturating_sub(2),
    };
    app.set_terminal_area(terminal_inner);

    let pane = TerminalPane::new(
        app.terminal.attached(),
        app.terminal.viewport(),
        app.focus == Focus::Terminal,
    );
    f.render_widget(pane, terminal_area);

    draw_help_bar(f, help_area, app);

    let toasts: Vec<_> = app.toast_manager.visible_toasts();
    if !toasts.is_empty() {
        ToastWidget::new(&toasts).render(f, f.area());
    }

    // Modals last (highest z-index)
    draw_modal(f, app);
}

fn draw_modal(f: &mut Frame, app: &App) {
    match &app.modal_state {
        ModalState::None => {}
        ModalState::NewSession(state) | ModalState::Rename { state, .. } => {
            let area = TextInputModal::calculate_area(f.area());
            f.render_widget(TextInputModal::new(state), area);
        }
        ModalState::ConfirmDelete { state, .. } => {
            let area = ConfirmModal::calculate_area(f.area());
            f.render_widget(ConfirmModal::new(state), area);
        }
        ModalState::CopyView(state) => {
            let area = CopyViewModal::calculate_area(f.area());
            f.render_widget(CopyViewModal::new(state), area);
        }
        ModalState::Help => {
            let area = HelpMenuWidget::calculate_area(f.area());
            f.render_widget(HelpMenuWidget::new(), area);
        }
    }
}

fn draw_help_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Cyan));

    let mut spans = match app.focus {
        Focus::Sidebar => vec![
            Span::styled(
                " SESSIONS ",
                Style::default().fg(Color::Black).bg(Color::Blue),
            ),
            key(" j/k "),
            Span::raw("nav "),
            key(" Enter "),
            Span::raw("terminal "),
            key(" f "),
            Span::raw("fullscreen "),
            key(" n "),
            Span::raw("new "),
            key(" r "),
            Span::raw("rename "),
            key(" d "),
            Span::raw("kill "),
            key(" p "),
            Span::raw("pin "),
            key(" ? "),
            Span::raw("help "),
            key(" q "),
            Span::raw("quit"),
        ],
        Focus::Terminal => vec![
            Span::styled(
                " TERMINAL ",
                Style::default().fg(Color::Black).bg(Color::Green),
            ),
            key(" Esc "),
            Span::raw("sidebar "),
            key(" S-PgUp/PgDn "),
            Span::raw("scroll "),
            key(" M-y "),
            Span::raw("copy "),
            key(" C-M-c "),
            Span::raw("force interrupt"),
        ],
    };

    if app.terminal.attached().is_some() && !app.terminal.is_following() {
        spans.push(Span::styled(
            " SCROLLED ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }
    if let Some(version) = &app.tmux_version {
        spans.push(Span::styled(
            format!("  tmux {version}"),
            Style::default().fg(Color::Gray),
        ));
    }

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    f.render_widget(help, area);
}
