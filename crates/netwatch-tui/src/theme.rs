//! Color palette and shared styles.

use ratatui::style::{Color, Modifier, Style};

use netwatch_core::Severity;

pub const ACCENT: Color = Color::Cyan;
pub const BORDER_GRAY: Color = Color::DarkGray;
pub const DIM_WHITE: Color = Color::Gray;

/// Upload trace (matches the web dashboard's red upload series).
pub const UPLOAD: Color = Color::Red;
/// Download trace.
pub const DOWNLOAD: Color = Color::Green;
/// Ping latency trace.
pub const LATENCY: Color = Color::Yellow;

pub const OK: Color = Color::Green;
pub const WARN: Color = Color::Yellow;
pub const DANGER: Color = Color::Red;

pub fn title_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn dim() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Latency readout color: green under 100ms, yellow under 200ms, red above.
pub fn latency_color(latency_ms: f64) -> Color {
    if latency_ms < 100.0 {
        OK
    } else if latency_ms < 200.0 {
        WARN
    } else {
        DANGER
    }
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Danger => DANGER,
        Severity::Warning => WARN,
        Severity::Info => ACCENT,
    }
}
