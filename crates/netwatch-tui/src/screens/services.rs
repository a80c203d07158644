//! Services screen — monitored-service table, add/edit form, and the
//! network-scan panel.

use std::sync::Arc;

use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState,
};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use netwatch_core::{ScanDevice, ServiceEntry, ServiceKind, ServiceStatus};

use crate::action::Action;
use crate::theme;

/// Which form field has input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Name,
    Url,
    Kind,
}

/// Add/edit form state. `id: None` creates, `id: Some` updates.
struct ServiceForm {
    id: Option<i64>,
    name: Input,
    url: Input,
    kind: ServiceKind,
    focus: FormField,
    error: Option<String>,
}

impl ServiceForm {
    fn blank() -> Self {
        Self {
            id: None,
            name: Input::default(),
            url: Input::default(),
            kind: ServiceKind::Http,
            focus: FormField::Name,
            error: None,
        }
    }

    fn editing(service: &ServiceEntry) -> Self {
        Self {
            id: Some(service.id),
            name: Input::from(service.name.clone()),
            url: Input::from(service.url.clone()),
            kind: service.kind,
            focus: FormField::Name,
            error: None,
        }
    }

    fn prefilled(device: &ScanDevice) -> Self {
        Self {
            id: None,
            name: Input::from(format!("Device {}", device.ip)),
            url: Input::from(device.ip.clone()),
            kind: ServiceKind::Ping,
            focus: FormField::Name,
            error: None,
        }
    }

    fn next_field(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::Url,
            FormField::Url => FormField::Kind,
            FormField::Kind => FormField::Name,
        };
    }

    fn toggle_kind(&mut self) {
        self.kind = match self.kind {
            ServiceKind::Http => ServiceKind::Ping,
            ServiceKind::Ping => ServiceKind::Http,
        };
    }

    /// Local validation; the backend is never asked about blank fields.
    fn submit(&mut self) -> Option<Action> {
        let name = self.name.value().trim();
        let url = self.url.value().trim();
        if name.is_empty() || url.is_empty() {
            self.error = Some("name and url are required".into());
            return None;
        }
        Some(Action::SubmitService {
            id: self.id,
            name: name.to_owned(),
            url: url.to_owned(),
            kind: self.kind,
        })
    }
}

/// Network scan panel state.
enum ScanState {
    Idle,
    Running,
    Done(Vec<ScanDevice>),
}

pub struct ServicesScreen {
    services: Arc<Vec<ServiceEntry>>,
    table_state: TableState,
    form: Option<ServiceForm>,
    scan: ScanState,
    scan_selected: usize,
    focus_scan: bool,
    status: Option<String>,
}

impl ServicesScreen {
    pub fn new() -> Self {
        Self {
            services: Arc::new(Vec::new()),
            table_state: TableState::default(),
            form: None,
            scan: ScanState::Idle,
            scan_selected: 0,
            focus_scan: false,
            status: None,
        }
    }

    /// Whether the add/edit form is capturing input.
    pub fn form_open(&self) -> bool {
        self.form.is_some()
    }

    fn selected_service(&self) -> Option<&ServiceEntry> {
        self.services.get(self.table_state.selected()?)
    }

    fn move_selection(&mut self, delta: isize) {
        if self.focus_scan {
            if let ScanState::Done(ref devices) = self.scan {
                if !devices.is_empty() {
                    let len = devices.len();
                    self.scan_selected =
                        (self.scan_selected + len).saturating_add_signed(delta) % len;
                }
            }
            return;
        }

        if self.services.is_empty() {
            self.table_state.select(None);
            return;
        }
        let len = self.services.len();
        let current = self.table_state.selected().unwrap_or(0);
        let next = (current + len).saturating_add_signed(delta) % len;
        self.table_state.select(Some(next));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        // Form input swallows everything while open.
        if let Some(ref mut form) = self.form {
            let mut close = false;
            match key.code {
                KeyCode::Esc => close = true,
                KeyCode::Enter => {
                    if let Some(action) = form.submit() {
                        return Some(action);
                    }
                }
                KeyCode::Tab | KeyCode::Down => form.next_field(),
                KeyCode::BackTab | KeyCode::Up => {
                    form.next_field();
                    form.next_field();
                }
                KeyCode::Left | KeyCode::Right if form.focus == FormField::Kind => {
                    form.toggle_kind();
                }
                _ => {
                    let event = CrosstermEvent::Key(key);
                    match form.focus {
                        FormField::Name => {
                            form.name.handle_event(&event);
                        }
                        FormField::Url => {
                            form.url.handle_event(&event);
                        }
                        FormField::Kind => {}
                    }
                }
            }
            if close {
                self.form = None;
            }
            return None;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Char('a') => self.form = Some(ServiceForm::blank()),
            KeyCode::Char('e') => {
                if let Some(service) = self.selected_service() {
                    self.form = Some(ServiceForm::editing(service));
                }
            }
            KeyCode::Char('d') => {
                if let Some(service) = self.selected_service() {
                    return Some(Action::DeleteService(service.id));
                }
            }
            KeyCode::Char('s') => return Some(Action::StartScan),
            KeyCode::Tab => {
                if matches!(self.scan, ScanState::Done(_)) {
                    self.focus_scan = !self.focus_scan;
                }
            }
            KeyCode::Enter => {
                if self.focus_scan {
                    if let ScanState::Done(ref devices) = self.scan {
                        if let Some(device) = devices.get(self.scan_selected) {
                            self.form = Some(ServiceForm::prefilled(device));
                            self.focus_scan = false;
                        }
                    }
                } else if let Some(service) = self.selected_service() {
                    self.form = Some(ServiceForm::editing(service));
                }
            }
            _ => {}
        }
        None
    }

    pub fn update(&mut self, action: &Action) {
        match action {
            Action::ServicesUpdated(services) => {
                self.services = services.clone();
                // Keep the cursor on a valid row across refreshes.
                if self.services.is_empty() {
                    self.table_state.select(None);
                } else if self.table_state.selected().is_none() {
                    self.table_state.select(Some(0));
                } else if let Some(selected) = self.table_state.selected() {
                    if selected >= self.services.len() {
                        self.table_state.select(Some(self.services.len() - 1));
                    }
                }
            }
            Action::ServiceSaved => {
                self.form = None;
                self.status = Some("service saved".into());
            }
            Action::StartScan => {
                self.scan = ScanState::Running;
                self.focus_scan = false;
            }
            Action::ScanFinished(devices) => {
                self.scan_selected = 0;
                self.scan = ScanState::Done(devices.clone());
            }
            Action::CommandFailed(message) => {
                if let Some(ref mut form) = self.form {
                    form.error = Some(message.clone());
                } else {
                    self.status = Some(message.clone());
                    if matches!(self.scan, ScanState::Running) {
                        self.scan = ScanState::Idle;
                    }
                }
            }
            _ => {}
        }
    }

    // ── Render ───────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if matches!(self.scan, ScanState::Idle) {
            self.render_table(frame, area);
        } else {
            let columns =
                Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
                    .split(area);
            self.render_table(frame, columns[0]);
            self.render_scan(frame, columns[1]);
        }

        if let Some(ref form) = self.form {
            render_form(frame, area, form);
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let hints = if self.focus_scan {
            " Tab back to services ".to_owned()
        } else {
            " a add · e edit · d delete · s scan ".to_owned()
        };
        let bottom = self
            .status
            .as_ref()
            .map_or(hints, |status| format!(" {status} "));

        let block = Block::default()
            .title(Line::from(Span::styled(
                " Monitored Services ",
                theme::title_style(),
            )))
            .title_bottom(Line::from(Span::styled(bottom, theme::dim())))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focus_scan {
                theme::dim()
            } else {
                Style::default().fg(theme::ACCENT)
            });

        if self.services.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("  No monitored services — press a to add one").style(theme::dim()),
                inner,
            );
            return;
        }

        let header = Row::new([
            Cell::from("Name"),
            Cell::from("URL"),
            Cell::from("Type"),
            Cell::from("Status"),
            Cell::from("Resp"),
        ])
        .style(Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .services
            .iter()
            .map(|service| {
                let (status_text, status_color) = match service.status {
                    ServiceStatus::Up => ("Online", theme::OK),
                    ServiceStatus::Down => ("Offline", theme::DANGER),
                };
                let kind = match service.kind {
                    ServiceKind::Http => "http",
                    ServiceKind::Ping => "ping",
                };
                Row::new([
                    Cell::from(Span::styled(
                        service.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Cell::from(Span::styled(service.url.clone(), theme::dim())),
                    Cell::from(kind),
                    Cell::from(Span::styled(status_text, Style::default().fg(status_color))),
                    Cell::from(format!("{:.0} ms", service.response_time)),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(16),
            Constraint::Min(24),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(9),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().bg(theme::BORDER_GRAY));

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_scan(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Line::from(Span::styled(
                " Network Scan ",
                theme::title_style(),
            )))
            .title_bottom(Line::from(Span::styled(
                " Tab focus · Enter monitor ",
                theme::dim(),
            )))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focus_scan {
                Style::default().fg(theme::ACCENT)
            } else {
                theme::dim()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match self.scan {
            ScanState::Idle => {}
            ScanState::Running => {
                frame.render_widget(
                    Paragraph::new("  Scanning local network…")
                        .style(Style::default().fg(theme::ACCENT)),
                    inner,
                );
            }
            ScanState::Done(ref devices) => {
                if devices.is_empty() {
                    frame.render_widget(
                        Paragraph::new("  No devices found").style(theme::dim()),
                        inner,
                    );
                    return;
                }
                let lines: Vec<Line> = devices
                    .iter()
                    .enumerate()
                    .map(|(i, device)| {
                        let style = if self.focus_scan && i == self.scan_selected {
                            Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD)
                        } else {
                            Style::default()
                        };
                        Line::from(vec![
                            Span::styled(format!("{:<16}", device.ip), style),
                            Span::styled(device.mac.clone(), theme::dim()),
                        ])
                    })
                    .collect();
                frame.render_widget(Paragraph::new(lines), inner);
            }
        }
    }
}

/// Centered modal with the add/edit form.
fn render_form(frame: &mut Frame, area: Rect, form: &ServiceForm) {
    let popup = centered_rect(area, 46, 10);
    frame.render_widget(Clear, popup);

    let title = if form.id.is_some() {
        " Edit Monitor "
    } else {
        " Add Monitor "
    };
    let block = Block::default()
        .title(Span::styled(title, theme::title_style()))
        .title_bottom(Line::from(Span::styled(
            " Enter save · Esc cancel ",
            theme::dim(),
        )))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ACCENT));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let field = |label: &str, value: String, focused: bool| -> Line<'static> {
        let cursor = if focused { "█" } else { "" };
        let style = if focused {
            Style::default().fg(theme::ACCENT)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("{label:<6}"), theme::dim()),
            Span::styled(format!("{value}{cursor}"), style),
        ])
    };

    let kind = match form.kind {
        ServiceKind::Http => "◄ http ►",
        ServiceKind::Ping => "◄ ping ►",
    };

    let mut lines = vec![
        Line::from(""),
        field(
            "Name",
            form.name.value().to_owned(),
            form.focus == FormField::Name,
        ),
        field(
            "URL",
            form.url.value().to_owned(),
            form.focus == FormField::Url,
        ),
        field("Type", kind.to_owned(), form.focus == FormField::Kind),
    ];
    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {error}"),
            Style::default().fg(theme::DANGER),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// A `width` × `height` rect centered in `area`, clamped to fit.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}
