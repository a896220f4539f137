//! Status dots and severity badges.

use parkwatch_core::models::{AlertSeverity, DeviceStatus};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use crate::theme;

pub fn status_span(status: DeviceStatus) -> Span<'static> {
    let symbol = match status {
        DeviceStatus::Ok => "●",
        DeviceStatus::Warning => "◐",
        DeviceStatus::Critical => "○",
        DeviceStatus::Unknown => "?",
    };
    Span::styled(
        format!("{symbol} {status}"),
        Style::default().fg(theme::status_color(status)),
    )
}

pub fn severity_span(severity: AlertSeverity) -> Span<'static> {
    let style = Style::default().fg(theme::severity_color(severity));
    let style = if severity == AlertSeverity::Critical {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    };
    Span::styled(severity.to_string(), style)
}

/// `●`/`○` for occupied/vacant, `·` before the first reading.
pub fn occupancy_span(occupied: Option<bool>) -> Span<'static> {
    match occupied {
        Some(true) => Span::styled("● occupied", Style::default().fg(theme::CORAL)),
        Some(false) => Span::styled("○ vacant", Style::default().fg(theme::SUCCESS_GREEN)),
        None => Span::styled("·", theme::key_hint()),
    }
}
