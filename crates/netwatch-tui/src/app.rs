//! Application core — event loop, screen management, action dispatch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use netwatch_core::{DashboardController, Notification};

use crate::action::{Action, ScreenId};
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventReader};
use crate::screens::{DashboardScreen, ServicesScreen};
use crate::theme;
use crate::tui::Tui;

/// How long a toast stays on screen.
const TOAST_TTL: Duration = Duration::from_secs(5);
const MAX_TOASTS: usize = 4;

struct ActiveToast {
    notification: Arc<Notification>,
    shown_at: Instant,
}

/// Top-level application state and event loop.
pub struct App {
    controller: DashboardController,
    active_screen: ScreenId,
    dashboard: DashboardScreen,
    services: ServicesScreen,
    running: bool,
    help_visible: bool,
    toasts: Vec<ActiveToast>,
    /// Action sender — command tasks and screens dispatch through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver — main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
    cancel: CancellationToken,
}

impl App {
    pub fn new(controller: DashboardController) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let dashboard = DashboardScreen::new(controller.store().clone());

        Self {
            controller,
            active_screen: ScreenId::Dashboard,
            dashboard,
            services: ServicesScreen::new(),
            running: true,
            help_visible: false,
            toasts: Vec::new(),
            action_tx,
            action_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop. This is the heart of the TUI.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        // Data bridge: starts the pollers and forwards store updates.
        let bridge = tokio::spawn(spawn_data_bridge(
            self.controller.clone(),
            self.action_tx.clone(),
            self.cancel.clone(),
        ));

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(50),  // 20 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            // 1. Wait for the next event
            let Some(event) = events.next().await else {
                break;
            };

            // 2. Map event → action
            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key) {
                        let _ = self.action_tx.send(action);
                    }
                }
                Event::Resize(w, h) => {
                    let _ = self.action_tx.send(Action::Resize(w, h));
                }
                Event::Tick => {
                    let _ = self.action_tx.send(Action::Tick);
                }
                Event::Render => {
                    let _ = self.action_tx.send(Action::Render);
                }
            }

            // 3. Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action);

                if matches!(action, Action::Render) {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        self.cancel.cancel();
        let _ = bridge.await;

        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    Some(Action::ToggleHelp)
                }
                _ => None,
            };
        }

        // The service form captures all typing while open.
        if self.active_screen == ScreenId::Services && self.services.form_open() {
            return self.services.handle_key(key);
        }

        // Global keybindings
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::NONE, KeyCode::Char('q')) => return Some(Action::Quit),

            (KeyModifiers::NONE, KeyCode::Char('?')) => return Some(Action::ToggleHelp),

            (KeyModifiers::NONE, KeyCode::Char('1')) => {
                return Some(Action::SwitchScreen(ScreenId::Dashboard));
            }
            (KeyModifiers::NONE, KeyCode::Char('2')) => {
                return Some(Action::SwitchScreen(ScreenId::Services));
            }
            _ => {}
        }

        match self.active_screen {
            ScreenId::Dashboard => self.dashboard.handle_key(key),
            ScreenId::Services => self.services.handle_key(key),
        }
    }

    fn process_action(&mut self, action: &Action) {
        match action {
            Action::Quit => self.running = false,
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::SwitchScreen(screen) => self.active_screen = *screen,
            Action::Tick => {
                self.toasts
                    .retain(|toast| toast.shown_at.elapsed() < TOAST_TTL);
            }
            Action::Toast(notification) => {
                debug!(id = notification.id, "toast surfaced");
                self.toasts.push(ActiveToast {
                    notification: notification.clone(),
                    shown_at: Instant::now(),
                });
                if self.toasts.len() > MAX_TOASTS {
                    self.toasts.remove(0);
                }
            }
            Action::CycleInterface => {
                if let Some(next) = self.dashboard.next_interface() {
                    self.controller.select_interface(&next);
                }
            }
            Action::MarkAllRead => {
                let controller = self.controller.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = controller.mark_all_read().await {
                        let _ = tx.send(Action::CommandFailed(e.to_string()));
                    }
                });
            }
            Action::SubmitService {
                id,
                name,
                url,
                kind,
            } => {
                let controller = self.controller.clone();
                let tx = self.action_tx.clone();
                let (id, name, url, kind) = (*id, name.clone(), url.clone(), *kind);
                tokio::spawn(async move {
                    match controller.save_service(id, &name, &url, kind).await {
                        Ok(()) => {
                            let _ = tx.send(Action::ServiceSaved);
                        }
                        Err(e) => {
                            let _ = tx.send(Action::CommandFailed(e.to_string()));
                        }
                    }
                });
            }
            Action::DeleteService(id) => {
                let controller = self.controller.clone();
                let tx = self.action_tx.clone();
                let id = *id;
                tokio::spawn(async move {
                    if let Err(e) = controller.delete_service(id).await {
                        let _ = tx.send(Action::CommandFailed(e.to_string()));
                    }
                });
            }
            Action::StartScan => {
                let controller = self.controller.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match controller.scan_network().await {
                        Ok(devices) => {
                            let _ = tx.send(Action::ScanFinished(devices));
                        }
                        Err(e) => {
                            let _ = tx.send(Action::CommandFailed(e.to_string()));
                        }
                    }
                });
            }
            _ => {}
        }

        // Screens keep their own copies of whatever they care about.
        self.dashboard.update(action);
        self.services.update(action);
    }

    // ── Render ───────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(frame.area());

        self.render_header(frame, layout[0]);

        match self.active_screen {
            ScreenId::Dashboard => self.dashboard.render(frame, layout[1]),
            ScreenId::Services => self.services.render(frame, layout[1]),
        }

        self.render_footer(frame, layout[2]);
        self.render_toasts(frame, frame.area());

        if self.help_visible {
            render_help(frame, frame.area());
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                " netwatch ",
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("│ ", theme::dim()),
        ];
        for screen in [ScreenId::Dashboard, ScreenId::Services] {
            let style = if screen == self.active_screen {
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                theme::dim()
            };
            let number = match screen {
                ScreenId::Dashboard => 1,
                ScreenId::Services => 2,
            };
            spans.push(Span::styled(format!(" {number} {} ", screen.title()), style));
        }

        let age = match self.controller.store().data_age() {
            Some(age) if age.num_seconds() < 5 => "live".to_owned(),
            Some(age) => format!("updated {}s ago", age.num_seconds()),
            None => "waiting for data".to_owned(),
        };
        let unread = self.controller.store().notification_state().unread;
        let right = if unread > 0 {
            format!("{age} · {unread} unread ")
        } else {
            format!("{age} ")
        };

        let columns =
            Layout::horizontal([Constraint::Min(20), Constraint::Length(30)]).split(area);
        frame.render_widget(Paragraph::new(Line::from(spans)), columns[0]);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(right, theme::dim())))
                .right_aligned(),
            columns[1],
        );
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let hints = match self.active_screen {
            ScreenId::Dashboard => " q quit · ? help · i interface · m mask IPs · n panel · r mark read ",
            ScreenId::Services => " q quit · ? help · ↑↓ select · a add · e edit · d delete · s scan ",
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(hints, theme::dim()))),
            area,
        );
    }

    fn render_toasts(&self, frame: &mut Frame, area: Rect) {
        const WIDTH: u16 = 42;
        const HEIGHT: u16 = 4;

        for (i, toast) in self.toasts.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
            let y = 1 + (i as u16) * HEIGHT;
            if y + HEIGHT > area.height {
                break;
            }
            let rect = Rect::new(
                area.width.saturating_sub(WIDTH + 1),
                y,
                WIDTH.min(area.width),
                HEIGHT,
            );

            let color = theme::severity_color(toast.notification.severity);
            let block = Block::default()
                .title(Span::styled(
                    format!(" {} ", toast.notification.title),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color));
            let inner = block.inner(rect);

            frame.render_widget(Clear, rect);
            frame.render_widget(block, rect);
            frame.render_widget(
                Paragraph::new(toast.notification.message.clone())
                    .wrap(ratatui::widgets::Wrap { trim: true }),
                inner,
            );
        }
    }
}

fn render_help(frame: &mut Frame, area: Rect) {
    let width = 46.min(area.width);
    let height = 14.min(area.height);
    let rect = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let block = Block::default()
        .title(Span::styled(" Help ", theme::title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ACCENT));
    let inner = block.inner(rect);

    let key = |k: &str, desc: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("  {k:<8}"), Style::default().fg(theme::ACCENT)),
            Span::raw(desc.to_owned()),
        ])
    };

    let lines = vec![
        key("1 / 2", "switch screen"),
        key("i", "cycle network interface"),
        key("m", "mask displayed IPs"),
        key("n", "toggle notification panel"),
        key("r", "mark all notifications read"),
        key("a / e", "add / edit monitored service"),
        key("d", "delete monitored service"),
        key("s", "scan the local network"),
        key("↑ / ↓", "move selection"),
        key("?", "toggle this help"),
        key("q", "quit"),
    ];

    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);
    frame.render_widget(Paragraph::new(lines), inner);
}
