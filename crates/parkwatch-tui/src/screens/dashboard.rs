//! Dashboard screen: today's summary cards and per-zone performance.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use parkwatch_core::OccupancyCounts;
use parkwatch_core::models::{DashboardSummary, ZonePerformance};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub struct DashboardScreen {
    focused: bool,
    summary: Option<Arc<DashboardSummary>>,
    zones: Arc<Vec<ZonePerformance>>,
    occupancy: OccupancyCounts,
    table_state: TableState,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            focused: true,
            summary: None,
            zones: Arc::new(Vec::new()),
            occupancy: OccupancyCounts::default(),
            table_state: TableState::default().with_selected(Some(0)),
        }
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.zones.len();
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

    fn render_card(frame: &mut Frame, area: Rect, label: &str, value: Option<u64>) {
        let block = Block::default()
            .title(format!(" {label} "))
            .title_style(theme::key_hint())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text = value.map_or_else(|| "-".to_owned(), |v| v.to_string());
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(text, theme::card_value()))).centered(),
            inner,
        );
    }

    fn render_zones(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Zones ({}) ", self.zones.len()))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let header = Row::new(
            ["Zone", "Facility", "Devices", "Occupied", "Capacity", "Util %", "Alerts"]
                .map(|h| Cell::from(h).style(theme::table_header())),
        );

        let rows: Vec<Row> = self
            .zones
            .iter()
            .map(|z| {
                let alerts_style = if z.active_alerts > 0 {
                    Style::default().fg(theme::ERROR_RED)
                } else {
                    theme::table_row()
                };
                Row::new(vec![
                    Cell::from(z.name.clone()),
                    Cell::from(z.facility.clone()),
                    Cell::from(z.total_devices.to_string()),
                    Cell::from(z.occupied_slots.to_string()),
                    Cell::from(z.daily_capacity.map_or_else(|| "-".into(), |c| c.to_string())),
                    Cell::from(
                        z.utilization_percentage
                            .map_or_else(|| "-".into(), |u| format!("{u:.1}")),
                    ),
                    Cell::from(z.active_alerts.to_string()).style(alerts_style),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(7),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(true),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(false),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::SummaryUpdated(summary) => self.summary = Some(Arc::clone(summary)),
            Action::ZonesUpdated(zones) => {
                self.zones = Arc::clone(zones);
                if self.table_state.selected().is_some_and(|i| i >= zones.len()) {
                    self.table_state.select(Some(zones.len().saturating_sub(1)));
                }
            }
            Action::LiveUpdated(view) => self.occupancy = view.occupancy,
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [cards_area, occupancy_area, zones_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .areas(area);

        let cards = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(cards_area);
        let summary = self.summary.as_deref();
        let values = [
            ("Events today", summary.map(|s| s.total_events)),
            ("Occupied now", summary.map(|s| s.current_occupancy)),
            ("Active devices", summary.map(|s| s.active_devices)),
            ("Open alerts", summary.map(|s| s.alerts_count)),
        ];
        for (card, (label, value)) in cards.iter().zip(values) {
            Self::render_card(frame, *card, label, value);
        }

        let live = Line::from(vec![
            Span::styled(" Live  ", theme::key_hint()),
            Span::styled(format!("{} occupied", self.occupancy.occupied), Style::default().fg(theme::CORAL)),
            Span::styled("  ", theme::key_hint()),
            Span::styled(format!("{} vacant", self.occupancy.vacant), Style::default().fg(theme::SUCCESS_GREEN)),
            Span::styled(format!("  {} no reading", self.occupancy.unknown), theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(live), occupancy_area);

        self.render_zones(frame, zones_area);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
