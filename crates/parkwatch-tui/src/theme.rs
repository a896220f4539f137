//! Palette and semantic styles.

use parkwatch_core::HealthTier;
use parkwatch_core::models::{AlertSeverity, DeviceStatus};
use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29

// ── Domain colours ────────────────────────────────────────────────────

pub fn tier_color(tier: HealthTier) -> Color {
    match tier {
        HealthTier::Healthy => SUCCESS_GREEN,
        HealthTier::Warning => ELECTRIC_YELLOW,
        HealthTier::Critical => ERROR_RED,
    }
}

pub fn status_color(status: DeviceStatus) -> Color {
    match status {
        DeviceStatus::Ok => SUCCESS_GREEN,
        DeviceStatus::Warning => ELECTRIC_YELLOW,
        DeviceStatus::Critical => ERROR_RED,
        DeviceStatus::Unknown => DIM_WHITE,
    }
}

pub fn severity_color(severity: AlertSeverity) -> Color {
    match severity {
        AlertSeverity::Critical => ERROR_RED,
        AlertSeverity::Warning => ELECTRIC_YELLOW,
        AlertSeverity::Info => NEON_CYAN,
        AlertSeverity::Unknown => DIM_WHITE,
    }
}

// ── Semantic Styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(NEON_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

/// Big number on a summary card.
pub fn card_value() -> Style {
    Style::default().fg(CORAL).add_modifier(Modifier::BOLD)
}
