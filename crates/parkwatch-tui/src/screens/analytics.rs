//! Analytics screen: hourly occupancy chart and the device health report.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use parkwatch_core::models::{DeviceHealthReport, HourlyUsage};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::health_bar;

/// Occupancy percentage as a whole bar value.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
fn bar_value(rate: f64) -> u64 {
    rate.round().clamp(0.0, 100.0) as u64
}

pub struct AnalyticsScreen {
    focused: bool,
    hourly: Option<Arc<HourlyUsage>>,
    health: Option<Arc<DeviceHealthReport>>,
    table_state: TableState,
}

impl AnalyticsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            hourly: None,
            health: None,
            table_state: TableState::default().with_selected(Some(0)),
        }
    }

    fn device_count(&self) -> usize {
        self.health.as_ref().map_or(0, |h| h.devices.len())
    }

    fn block(&self, title: String) -> Block<'static> {
        Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            })
    }

    fn render_hourly(&self, frame: &mut Frame, area: Rect) {
        let Some(hourly) = self.hourly.as_deref() else {
            frame.render_widget(
                Paragraph::new(Span::styled(" loading…", theme::key_hint())).block(self.block(" Hourly occupancy ".into())),
                area,
            );
            return;
        };

        let title = format!(
            " Hourly occupancy  {} events, avg {:.1}% ",
            hourly.summary.total_events, hourly.summary.avg_occupancy_rate
        );
        let bars: Vec<Bar> = hourly
            .hourly_data
            .iter()
            .map(|b| {
                let label = if b.hour_label.is_empty() { &b.hour } else { &b.hour_label };
                let value = bar_value(b.occupancy_rate);
                let color = if value >= 80 {
                    theme::CORAL
                } else if value >= 50 {
                    theme::ELECTRIC_YELLOW
                } else {
                    theme::NEON_CYAN
                };
                Bar::default()
                    .value(value)
                    .label(Line::from(label.clone()))
                    .style(Style::default().fg(color))
            })
            .collect();

        let chart = BarChart::default()
            .block(self.block(title))
            .data(BarGroup::default().bars(&bars))
            .bar_width(5)
            .bar_gap(1)
            .max(100)
            .value_style(Style::default().fg(theme::BG_DARK).bg(theme::NEON_CYAN));
        frame.render_widget(chart, area);
    }

    fn render_health(&self, frame: &mut Frame, area: Rect) {
        let Some(report) = self.health.as_deref() else {
            frame.render_widget(
                Paragraph::new(Span::styled(" loading…", theme::key_hint())).block(self.block(" Device health ".into())),
                area,
            );
            return;
        };

        let block = self.block(" Device health ".into());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [stats_area, table_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(inner);

        let cats = &report.device_categories;
        let metrics = &report.metrics;
        let stats = Line::from(vec![
            Span::styled(format!(" {} devices  ", metrics.total_devices), theme::title_style()),
            Span::styled(format!("avg {:.1}  ", metrics.average_health), theme::card_value()),
            Span::styled(format!("{:.1}% healthy   ", metrics.healthy_percentage), theme::key_hint()),
            Span::styled(format!("{} healthy  ", cats.healthy), Style::default().fg(theme::SUCCESS_GREEN)),
            Span::styled(format!("{} warning  ", cats.warning), Style::default().fg(theme::ELECTRIC_YELLOW)),
            Span::styled(format!("{} critical  ", cats.critical), Style::default().fg(theme::ERROR_RED)),
            Span::styled(format!("{} offline", cats.offline), theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(stats), stats_area);

        let header = Row::new(
            ["Device", "Facility", "Zone", "Health", "Status"].map(|h| Cell::from(h).style(theme::table_header())),
        );
        let rows: Vec<Row> = report
            .devices
            .iter()
            .map(|d| {
                Row::new(vec![
                    Cell::from(d.device_code.clone()),
                    Cell::from(d.facility.clone()),
                    Cell::from(d.zone.clone()),
                    Cell::from(health_bar::health_span(d.health_score, 10)),
                    Cell::from(d.status.clone()),
                ])
                .style(theme::table_row())
            })
            .collect();
        let widths = [
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(14),
            Constraint::Length(9),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());
        let mut state = self.table_state;
        frame.render_stateful_widget(table, table_area, &mut state);
    }
}

impl Component for AnalyticsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let len = self.device_count();
        let current = self.table_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down if len > 0 => {
                self.table_state.select(Some((current + 1).min(len - 1)));
            }
            KeyCode::Char('k') | KeyCode::Up => self.table_state.select(Some(current.saturating_sub(1))),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::HourlyUpdated(hourly) => self.hourly = Some(Arc::clone(hourly)),
            Action::HealthUpdated(health) => {
                self.health = Some(Arc::clone(health));
                let len = health.devices.len();
                if self.table_state.selected().is_some_and(|i| i >= len) {
                    self.table_state.select(Some(len.saturating_sub(1)));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [chart_area, health_area] =
            Layout::vertical([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);
        self.render_hourly(frame, chart_area);
        self.render_health(frame, health_area);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
mod tests {
    use parkwatch_core::models::{DeviceHealthEntry, HealthCategories, HealthMetrics};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::screens::render_text;

    #[test]
    fn bar_values_are_clamped_percentages() {
        assert_eq!(bar_value(57.6), 58);
        assert_eq!(bar_value(-3.0), 0);
        assert_eq!(bar_value(140.0), 100);
    }

    #[test]
    fn health_report_renders_categories_and_devices() -> Result<()> {
        let mut screen = AnalyticsScreen::new();
        screen.update(&Action::HealthUpdated(Arc::new(DeviceHealthReport {
            device_categories: HealthCategories {
                healthy: 3,
                warning: 1,
                critical: 1,
                offline: 0,
            },
            metrics: HealthMetrics {
                total_devices: 5,
                average_health: 77.4,
                healthy_percentage: 60.0,
            },
            devices: vec![DeviceHealthEntry {
                device_code: "PK-009".into(),
                facility: "North Lot".into(),
                zone: "Level 2".into(),
                health_score: 45,
                status: "critical".into(),
                last_seen: None,
            }],
        })))?;

        let text = render_text(&screen, 110, 24);
        assert!(text.contains("5 devices"));
        assert!(text.contains("avg 77.4"));
        assert!(text.contains("PK-009"));
        assert!(text.contains("loading"));
        Ok(())
    }
}
