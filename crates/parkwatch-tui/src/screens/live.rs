//! Live screen: per-device status from the live poller.

use std::time::Duration;

use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use parkwatch_core::health::format_elapsed;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::action::{Action, LiveStatus, LiveView};
use crate::component::Component;
use crate::theme;
use crate::widgets::{health_bar, status_indicator};

const HEALTH_BAR_WIDTH: u16 = 10;

/// "12s ago" style age of the last successful poll.
fn age(last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = last_updated else {
        return "never".into();
    };
    let secs = (now - at).to_std().map_or(0, |d| d.as_secs());
    format!("{} ago", humantime::format_duration(Duration::from_secs(secs)))
}

pub struct LiveScreen {
    focused: bool,
    view: LiveView,
    status: LiveStatus,
    table_state: TableState,
}

impl LiveScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            view: LiveView::default(),
            status: LiveStatus {
                loading: true,
                ..LiveStatus::default()
            },
            table_state: TableState::default().with_selected(Some(0)),
        }
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.view.devices.len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(len - 1)
        } else {
            current.saturating_sub(1)
        };
        self.table_state.select(Some(next));
    }

    fn header_line(&self) -> Line<'static> {
        let tally = self.view.tally;
        let mut spans = vec![
            Span::styled(format!(" {} devices  ", tally.total()), theme::title_style()),
            Span::styled(format!("● {} ok  ", tally.ok), Style::default().fg(theme::SUCCESS_GREEN)),
            Span::styled(format!("◐ {} warning  ", tally.warning), Style::default().fg(theme::ELECTRIC_YELLOW)),
            Span::styled(format!("○ {} critical", tally.critical), Style::default().fg(theme::ERROR_RED)),
        ];
        if tally.unknown > 0 {
            spans.push(Span::styled(format!("  ? {} unknown", tally.unknown), theme::key_hint()));
        }
        spans.push(Span::styled(
            format!("   updated {}", age(self.status.last_updated, Utc::now())),
            theme::key_hint(),
        ));
        Line::from(spans)
    }

    /// Paused, loading and error states, most important first.
    fn banner(&self) -> Option<Line<'static>> {
        if let Some(error) = &self.status.error {
            return Some(Line::from(Span::styled(
                format!(" ✗ {error}"),
                Style::default().fg(theme::ERROR_RED),
            )));
        }
        if self.status.paused {
            return Some(Line::from(Span::styled(
                " ⏸ live updates paused (p to resume)",
                Style::default().fg(theme::ELECTRIC_YELLOW),
            )));
        }
        if self.status.loading && self.view.devices.is_empty() {
            return Some(Line::from(Span::styled(" loading…", theme::key_hint())));
        }
        None
    }
}

impl Component for LiveScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(true),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(false),
            KeyCode::Char('g') => self.table_state.select(Some(0)),
            KeyCode::Char('G') => {
                self.table_state
                    .select(Some(self.view.devices.len().saturating_sub(1)));
            }
            KeyCode::Char('p') => return Ok(Some(Action::ToggleLivePaused)),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LiveUpdated(view) => {
                self.view = view.clone();
                let len = self.view.devices.len();
                if self.table_state.selected().is_some_and(|i| i >= len) {
                    self.table_state.select(Some(len.saturating_sub(1)));
                }
            }
            Action::LiveStatusChanged(status) => self.status = status.clone(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Live Status ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let banner = self.banner();
        let [header_area, banner_area, table_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(u16::from(banner.is_some())),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        frame.render_widget(Paragraph::new(self.header_line()), header_area);
        if let Some(line) = banner {
            frame.render_widget(Paragraph::new(line), banner_area);
        }

        let header = Row::new(
            ["Status", "Device", "Facility", "Zone", "Health", "Parking", "Last seen", "Alerts"]
                .map(|h| Cell::from(h).style(theme::table_header())),
        );
        let rows: Vec<Row> = self
            .view
            .devices
            .iter()
            .map(|d| {
                Row::new(vec![
                    Cell::from(status_indicator::status_span(d.status)),
                    Cell::from(d.code.clone()),
                    Cell::from(d.facility.name.clone()),
                    Cell::from(d.zone.name.clone()),
                    Cell::from(health_bar::health_span(d.health_score, HEALTH_BAR_WIDTH)),
                    Cell::from(status_indicator::occupancy_span(
                        d.parking.as_ref().map(|p| p.is_occupied),
                    )),
                    Cell::from(format_elapsed(d.time_since_seen)),
                    Cell::from(d.alerts_count.to_string()),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Length(12),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(HEALTH_BAR_WIDTH + 4),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(6),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());
        let mut state = self.table_state;
        frame.render_stateful_widget(table, table_area, &mut state);

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("p ", theme::key_hint_key()),
            Span::styled(if self.status.paused { "resume" } else { "pause" }, theme::key_hint()),
            Span::styled("  r ", theme::key_hint_key()),
            Span::styled("refresh", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), hints_area);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use crossterm::event::KeyModifiers;
    use parkwatch_core::StatusTally;
    use parkwatch_core::models::{DeviceStatus, FacilityRef, LiveDevice, ZoneRef};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::screens::render_text;

    fn device(code: &str, status: DeviceStatus, score: u32) -> Arc<LiveDevice> {
        Arc::new(LiveDevice {
            id: 1,
            code: code.into(),
            zone: ZoneRef { id: 2, name: "Level B".into() },
            facility: FacilityRef { id: 1, name: "Downtown".into() },
            status,
            health_score: score,
            last_seen: None,
            time_since_seen: Some(75),
            telemetry: None,
            parking: None,
            alerts: Vec::new(),
            alerts_count: 0,
        })
    }

    #[test]
    fn age_is_human_readable() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).single().unwrap_or_default();
        let then = Utc.with_ymd_and_hms(2024, 3, 9, 11, 58, 30).single().unwrap_or_default();
        assert_eq!(age(Some(then), now), "1m 30s ago");
        assert_eq!(age(None, now), "never");
    }

    #[test]
    fn p_requests_pause_toggle() -> Result<()> {
        let mut screen = LiveScreen::new();
        let action = screen.handle_key_event(KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE))?;
        assert!(matches!(action, Some(Action::ToggleLivePaused)));
        Ok(())
    }

    #[test]
    fn renders_devices_and_paused_banner() -> Result<()> {
        let mut screen = LiveScreen::new();
        let devices = vec![device("PK-004", DeviceStatus::Critical, 45)];
        screen.update(&Action::LiveUpdated(LiveView {
            tally: StatusTally::from_statuses([DeviceStatus::Critical]),
            devices: Arc::new(devices),
            ..LiveView::default()
        }))?;
        screen.update(&Action::LiveStatusChanged(LiveStatus {
            paused: true,
            ..LiveStatus::default()
        }))?;

        let text = render_text(&screen, 120, 10);
        assert!(text.contains("PK-004"));
        assert!(text.contains("1 critical"));
        assert!(text.contains("paused"));
        assert!(text.contains("1m ago"));
        Ok(())
    }
}
