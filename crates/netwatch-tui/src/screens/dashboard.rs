//! Dashboard screen — numeric readouts, traffic/latency charts, the active
//! connections table, and the notification panel.
//!
//! Chart data is read straight from the core store's sliding windows on
//! every render; snapshots arrive through the action channel.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, BorderType, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table,
};

use netwatch_core::{
    DashboardStore, NotificationState, PingSnapshot, SystemSnapshot, TOTAL_INTERFACE,
};

use crate::action::Action;
use crate::theme;
use crate::widgets::bytes_fmt;

const MASKED_IP: &str = "•••.•••.•••.•••";

pub struct DashboardScreen {
    store: Arc<DashboardStore>,
    system: Option<SystemSnapshot>,
    ping: Option<PingSnapshot>,
    notifications: NotificationState,
    public_ip: Option<String>,
    selected_interface: String,
    /// Blur displayed addresses (screen-share mode).
    mask_ips: bool,
    show_notifications: bool,
}

impl DashboardScreen {
    pub fn new(store: Arc<DashboardStore>) -> Self {
        Self {
            store,
            system: None,
            ping: None,
            notifications: NotificationState::default(),
            public_ip: None,
            selected_interface: TOTAL_INTERFACE.to_owned(),
            mask_ips: false,
            show_notifications: true,
        }
    }

    pub fn handle_key(&self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('i') => Some(Action::CycleInterface),
            KeyCode::Char('m') => Some(Action::ToggleIpMask),
            KeyCode::Char('n') => Some(Action::ToggleNotifications),
            KeyCode::Char('r') => Some(Action::MarkAllRead),
            _ => None,
        }
    }

    pub fn update(&mut self, action: &Action) {
        match action {
            Action::SystemUpdated(snapshot) => self.system = Some(snapshot.clone()),
            Action::PingUpdated(snapshot) => self.ping = Some(*snapshot),
            Action::NotificationsUpdated(state) => self.notifications = state.clone(),
            Action::PublicIpResolved(ip) => self.public_ip = Some(ip.clone()),
            Action::InterfaceChanged(interface) => {
                self.selected_interface.clone_from(interface);
            }
            Action::ToggleIpMask => self.mask_ips = !self.mask_ips,
            Action::ToggleNotifications => self.show_notifications = !self.show_notifications,
            _ => {}
        }
    }

    /// The interface after the currently selected one, cycling through
    /// `total` plus every discovered interface.
    pub fn next_interface(&self) -> Option<String> {
        let system = self.system.as_ref()?;
        let mut order = vec![TOTAL_INTERFACE.to_owned()];
        order.extend(system.interfaces.iter().cloned());

        let pos = order
            .iter()
            .position(|i| *i == self.selected_interface)
            .unwrap_or(0);
        order.get((pos + 1) % order.len()).cloned()
    }

    fn masked<'a>(&self, ip: &'a str) -> &'a str {
        if self.mask_ips { MASKED_IP } else { ip }
    }

    // ── Render ───────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Length(4),
            Constraint::Percentage(45),
            Constraint::Min(7),
        ])
        .split(area);

        self.render_readouts(frame, rows[0]);

        let charts =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(rows[1]);
        self.render_traffic_chart(frame, charts[0]);
        self.render_latency_chart(frame, charts[1]);

        if self.show_notifications {
            let bottom =
                Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(rows[2]);
            self.render_connections(frame, bottom[0]);
            self.render_notifications(frame, bottom[1]);
        } else {
            self.render_connections(frame, rows[2]);
        }
    }

    fn render_readouts(&self, frame: &mut Frame, area: Rect) {
        let tiles = Layout::horizontal([
            Constraint::Ratio(1, 6),
            Constraint::Ratio(1, 6),
            Constraint::Ratio(1, 6),
            Constraint::Ratio(1, 6),
            Constraint::Ratio(1, 6),
            Constraint::Ratio(1, 6),
        ])
        .split(area);

        let bar_width = tiles[0].width.saturating_sub(4);

        self.render_pct_tile(
            frame,
            tiles[0],
            " CPU ",
            self.system.as_ref().map(|s| s.cpu_pct),
            bar_width,
        );
        self.render_pct_tile(
            frame,
            tiles[1],
            " RAM ",
            self.system.as_ref().map(|s| s.memory_pct),
            bar_width,
        );

        let (up, down) = match self.system.as_ref().and_then(|s| s.rate) {
            Some(rate) => (
                bytes_fmt::fmt_rate(rate.sent_bps),
                bytes_fmt::fmt_rate(rate.recv_bps),
            ),
            None => ("--".to_owned(), "--".to_owned()),
        };
        let (total_sent, total_recv) = self
            .system
            .as_ref()
            .map_or(("--".to_owned(), "--".to_owned()), |s| {
                (
                    bytes_fmt::fmt_bytes(s.bytes_sent),
                    bytes_fmt::fmt_bytes(s.bytes_recv),
                )
            });
        render_tile(
            frame,
            tiles[2],
            " Upload ",
            Line::from(vec![
                Span::styled("↑ ", Style::default().fg(theme::UPLOAD)),
                Span::styled(up, Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(Span::styled(format!("Σ {total_sent}"), theme::dim())),
        );
        render_tile(
            frame,
            tiles[3],
            " Download ",
            Line::from(vec![
                Span::styled("↓ ", Style::default().fg(theme::DOWNLOAD)),
                Span::styled(down, Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(Span::styled(format!("Σ {total_recv}"), theme::dim())),
        );

        let ping_line = match self.ping {
            Some(PingSnapshot {
                latency_ms: Some(latency),
                ..
            }) => Line::from(Span::styled(
                format!("{latency:.0} ms"),
                Style::default()
                    .fg(theme::latency_color(latency))
                    .add_modifier(Modifier::BOLD),
            )),
            Some(PingSnapshot {
                latency_ms: None, ..
            }) => Line::from(Span::styled(
                "Err",
                Style::default()
                    .fg(theme::DANGER)
                    .add_modifier(Modifier::BOLD),
            )),
            None => Line::from(Span::styled("--", theme::dim())),
        };
        render_tile(
            frame,
            tiles[4],
            " Ping ",
            ping_line,
            Line::from(Span::styled("gateway", theme::dim())),
        );

        let iface_ip = match self.system.as_ref() {
            Some(s) => match (self.selected_interface.as_str(), s.interface_ip.as_deref()) {
                (TOTAL_INTERFACE, _) => "aggregate".to_owned(),
                (_, Some(ip)) => self.masked(ip).to_owned(),
                (_, None) => "--".to_owned(),
            },
            None => "--".to_owned(),
        };
        let public = self
            .public_ip
            .as_deref()
            .map_or_else(|| "--".to_owned(), |ip| self.masked(ip).to_owned());
        render_tile(
            frame,
            tiles[5],
            &format!(" IP · {} ", self.selected_interface),
            Line::from(Span::styled(
                iface_ip,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(format!("pub {public}"), theme::dim())),
        );
    }

    fn render_pct_tile(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        pct: Option<f64>,
        bar_width: u16,
    ) {
        let (value, bar) = match pct {
            Some(pct) => {
                let (filled, empty) = bytes_fmt::fmt_pct_bar(pct, bar_width);
                (
                    Line::from(Span::styled(
                        format!("{pct:.1}%"),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(vec![
                        Span::styled(filled, Style::default().fg(theme::ACCENT)),
                        Span::styled(empty, theme::dim()),
                    ]),
                )
            }
            None => (
                Line::from(Span::styled("--", theme::dim())),
                Line::from(""),
            ),
        };
        render_tile(frame, area, title, value, bar);
    }

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn render_traffic_chart(&self, frame: &mut Frame, area: Rect) {
        let (sent, recv, capacity, max_value) = self.store.with_network_chart(|chart| {
            let sent: Vec<(f64, f64)> = chart
                .series(0)
                .enumerate()
                .map(|(i, v)| (i as f64, v))
                .collect();
            let recv: Vec<(f64, f64)> = chart
                .series(1)
                .enumerate()
                .map(|(i, v)| (i as f64, v))
                .collect();
            (sent, recv, chart.capacity(), chart.max_value())
        });

        let title = Line::from(vec![
            Span::styled(" Traffic ", theme::title_style()),
            Span::styled("── ", theme::dim()),
            Span::styled(
                format!("↑ {} ", bytes_fmt::fmt_rate(sent.last().map_or(0.0, |p| p.1))),
                Style::default().fg(theme::UPLOAD),
            ),
            Span::styled(
                format!("↓ {} ", bytes_fmt::fmt_rate(recv.last().map_or(0.0, |p| p.1))),
                Style::default().fg(theme::DOWNLOAD),
            ),
        ]);
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::dim());

        if sent.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("  Collecting samples…").style(theme::dim()),
                inner,
            );
            return;
        }

        // Fixed x bounds over the window capacity so the trace fills from
        // the left and scrolls once full.
        let x_max = (capacity.saturating_sub(1)).max(1) as f64;
        let y_max = (max_value * 1.2).max(1024.0);

        let up_line = Dataset::default()
            .name("Up")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::UPLOAD))
            .data(&sent);
        let down_line = Dataset::default()
            .name("Down")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::DOWNLOAD))
            .data(&recv);

        let y_labels = vec![
            Span::styled("0", theme::dim()),
            Span::styled(bytes_fmt::fmt_rate_axis(y_max / 2.0), theme::dim()),
            Span::styled(bytes_fmt::fmt_rate_axis(y_max), theme::dim()),
        ];

        let chart = Chart::new(vec![up_line, down_line])
            .block(block)
            .x_axis(Axis::default().bounds([0.0, x_max]).style(theme::dim()))
            .y_axis(
                Axis::default()
                    .bounds([0.0, y_max])
                    .labels(y_labels)
                    .style(theme::dim()),
            );

        frame.render_widget(chart, area);
    }

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn render_latency_chart(&self, frame: &mut Frame, area: Rect) {
        let (latency, capacity, max_value) = self.store.with_ping_chart(|chart| {
            let latency: Vec<(f64, f64)> = chart
                .series(0)
                .enumerate()
                .map(|(i, v)| (i as f64, v))
                .collect();
            (latency, chart.capacity(), chart.max_value())
        });

        let block = Block::default()
            .title(Line::from(Span::styled(" Latency ", theme::title_style())))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::dim());

        if latency.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("  Collecting samples…").style(theme::dim()),
                inner,
            );
            return;
        }

        let x_max = (capacity.saturating_sub(1)).max(1) as f64;
        // Keep at least 100ms of headroom so healthy latency stays low in
        // the frame.
        let y_max = (max_value * 1.2).max(100.0);

        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::LATENCY))
            .data(&latency);

        let y_labels = vec![
            Span::styled("0", theme::dim()),
            Span::styled(format!("{:.0}", y_max / 2.0), theme::dim()),
            Span::styled(format!("{y_max:.0}ms"), theme::dim()),
        ];

        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(Axis::default().bounds([0.0, x_max]).style(theme::dim()))
            .y_axis(
                Axis::default()
                    .bounds([0.0, y_max])
                    .labels(y_labels)
                    .style(theme::dim()),
            );

        frame.render_widget(chart, area);
    }

    fn render_connections(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Line::from(Span::styled(
                " Active Connections ",
                theme::title_style(),
            )))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::dim());

        let connections = self
            .system
            .as_ref()
            .map(|s| s.connections.clone())
            .unwrap_or_default();

        if connections.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("  No active connections reported").style(theme::dim()),
                inner,
            );
            return;
        }

        let header = Row::new([
            Cell::from("Process"),
            Cell::from("PID"),
            Cell::from("Local"),
            Cell::from("Remote"),
            Cell::from("State"),
        ])
        .style(Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = connections
            .iter()
            .map(|conn| {
                Row::new([
                    Cell::from(conn.process.clone()),
                    Cell::from(conn.pid.to_string()),
                    Cell::from(self.masked(&conn.laddr).to_owned()),
                    Cell::from(self.masked(&conn.raddr).to_owned()),
                    Cell::from(Span::styled(
                        conn.status.clone(),
                        Style::default().fg(theme::OK),
                    )),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(14),
            Constraint::Length(7),
            Constraint::Min(20),
            Constraint::Min(20),
            Constraint::Length(12),
        ];
        let table = Table::new(rows, widths).header(header).block(block);

        frame.render_widget(table, area);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        let title = Line::from(vec![
            Span::styled(" Notifications ", theme::title_style()),
            Span::styled(
                format!("({} unread) ", self.notifications.unread),
                theme::dim(),
            ),
        ]);
        let block = Block::default()
            .title(title)
            .title_bottom(Line::from(Span::styled(" r mark read ", theme::dim())))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::dim());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.notifications.list.is_empty() {
            frame.render_widget(
                Paragraph::new("  No notifications").style(theme::dim()),
                inner,
            );
            return;
        }

        let mut lines = Vec::new();
        for notification in self.notifications.list.iter() {
            let color = theme::severity_color(notification.severity);
            let title_style = if notification.read {
                Style::default().fg(theme::DIM_WHITE)
            } else {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(vec![
                Span::styled("● ", Style::default().fg(color)),
                Span::styled(notification.title.clone(), title_style),
                Span::styled(format!("  {}", notification.time), theme::dim()),
            ]));
            lines.push(Line::from(Span::styled(
                format!("  {}", notification.message),
                theme::dim(),
            )));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// A bordered readout tile with a value line and a sub-label line.
fn render_tile(frame: &mut Frame, area: Rect, title: &str, value: Line, sub: Line) {
    let block = Block::default()
        .title(Span::styled(title, theme::title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::dim());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(vec![value, sub]), inner);
}
