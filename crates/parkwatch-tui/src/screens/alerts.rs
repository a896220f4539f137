//! Alerts screen: alert table with multi-select and acknowledgement.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use parkwatch_core::health::format_last_seen;
use parkwatch_core::models::Alert;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::action::{Action, AlertsView, ConfirmAction, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::status_indicator;

pub struct AlertsScreen {
    focused: bool,
    view: AlertsView,
    table_state: TableState,
}

impl AlertsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            view: AlertsView::default(),
            table_state: TableState::default().with_selected(Some(0)),
        }
    }

    fn alerts(&self) -> &[Alert] {
        &self.view.list.alerts
    }

    fn highlighted(&self) -> Option<&Alert> {
        self.table_state.selected().and_then(|i| self.alerts().get(i))
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.alerts().len();
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

    fn checkbox(&self, alert: &Alert) -> &'static str {
        if alert.acknowledged {
            "   "
        } else if self.view.selection.contains(alert.id) {
            "[x]"
        } else {
            "[ ]"
        }
    }

    fn summary_line(&self) -> Line<'static> {
        let list = &self.view.list;
        let counts = &list.severity_counts;
        let mut spans = vec![
            Span::styled(format!(" {} alerts  ", list.total), theme::title_style()),
            Span::styled(format!("{} open  ", list.unacknowledged), Style::default().fg(theme::CORAL)),
            Span::styled(format!("{} critical  ", counts.critical), Style::default().fg(theme::ERROR_RED)),
            Span::styled(format!("{} warning  ", counts.warning), Style::default().fg(theme::ELECTRIC_YELLOW)),
            Span::styled(format!("{} info", counts.info), Style::default().fg(theme::NEON_CYAN)),
        ];
        if !self.view.selection.is_empty() {
            spans.push(Span::styled(
                format!("   {} selected", self.view.selection.len()),
                theme::tab_active(),
            ));
        }
        Line::from(spans)
    }
}

impl Component for AlertsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(true);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(false);
                None
            }
            KeyCode::Char(' ') => self.highlighted().map(|a| Action::ToggleAlert(a.id)),
            KeyCode::Char('a') => Some(Action::SelectAllAlerts),
            KeyCode::Char('x') => Some(Action::ClearAlertSelection),
            KeyCode::Char('A') => {
                let count = self.view.selection.len();
                if count == 0 {
                    Some(Action::AcknowledgeSelected)
                } else {
                    Some(Action::ShowConfirm(ConfirmAction::BulkAcknowledge { count }))
                }
            }
            KeyCode::Enter => self.highlighted().map(|a| {
                if a.acknowledged {
                    Action::Notify(Notification::info(format!("Alert {} is already acknowledged", a.id)))
                } else {
                    Action::AcknowledgeAlert(a.id)
                }
            }),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::AlertsUpdated(view) = action {
            self.view = view.clone();
            let len = self.alerts().len();
            if self.table_state.selected().is_some_and(|i| i >= len) {
                self.table_state.select(Some(len.saturating_sub(1)));
            }
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Alerts ")
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

        let [summary_area, error_area, table_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(u16::from(self.view.error.is_some())),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        frame.render_widget(Paragraph::new(self.summary_line()), summary_area);
        if let Some(error) = &self.view.error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" ✗ {error}"), Style::default().fg(theme::ERROR_RED))),
                error_area,
            );
        }

        let header = Row::new(
            ["", "ID", "Severity", "Device", "Facility", "Zone", "Message", "Created"]
                .map(|h| Cell::from(h).style(theme::table_header())),
        );
        let rows: Vec<Row> = self
            .alerts()
            .iter()
            .map(|a| {
                let style = if a.acknowledged {
                    theme::key_hint()
                } else {
                    theme::table_row()
                };
                Row::new(vec![
                    Cell::from(self.checkbox(a)),
                    Cell::from(a.id.to_string()),
                    Cell::from(status_indicator::severity_span(a.severity)),
                    Cell::from(a.device_code.clone()),
                    Cell::from(a.facility_name.clone()),
                    Cell::from(a.zone_name.clone()),
                    Cell::from(a.message.clone()),
                    Cell::from(format_last_seen(a.created_at)),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(3),
            Constraint::Length(19),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());
        let mut state = self.table_state;
        frame.render_stateful_widget(table, table_area, &mut state);

        let hints = Line::from(vec![
            Span::styled("  space ", theme::key_hint_key()),
            Span::styled("select  ", theme::key_hint()),
            Span::styled("a ", theme::key_hint_key()),
            Span::styled("all  ", theme::key_hint()),
            Span::styled("x ", theme::key_hint_key()),
            Span::styled("clear  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("acknowledge  ", theme::key_hint()),
            Span::styled("A ", theme::key_hint_key()),
            Span::styled("acknowledge selected", theme::key_hint()),
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

    use crossterm::event::KeyModifiers;
    use parkwatch_core::models::{AlertListResponse, AlertSeverity};

    use super::*;
    use crate::screens::render_text;

    fn alert(id: u64, acknowledged: bool) -> Alert {
        Alert {
            id,
            device_code: "PK-001".into(),
            facility_name: "North Lot".into(),
            zone_name: "Level 1".into(),
            message: "Device offline".into(),
            severity: AlertSeverity::Critical,
            acknowledged,
            is_active: true,
            created_at: None,
        }
    }

    fn press(screen: &mut AlertsScreen, code: KeyCode) -> Result<Option<Action>> {
        screen.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn screen_with(alerts: Vec<Alert>, selected: &[u64]) -> Result<AlertsScreen> {
        let list = AlertListResponse {
            total: u64::try_from(alerts.len()).unwrap_or_default(),
            alerts,
            ..AlertListResponse::default()
        };
        let mut screen = AlertsScreen::new();
        screen.update(&Action::AlertsUpdated(AlertsView {
            list: Arc::new(list),
            selection: selected.iter().copied().collect(),
            error: None,
        }))?;
        Ok(screen)
    }

    #[test]
    fn checkboxes_only_on_unacknowledged_rows() -> Result<()> {
        let screen = screen_with(vec![alert(5, false), alert(6, true), alert(7, false)], &[7])?;
        let text = render_text(&screen, 120, 10);
        let rows: Vec<&str> = text.lines().collect();
        let row = |id: &str| rows.iter().find(|l| l.contains(&format!(" {id} "))).copied().unwrap_or("");
        assert!(row("5").contains("[ ]"));
        assert!(row("7").contains("[x]"));
        assert!(!row("6").contains('['));
        assert!(text.contains("1 selected"));
        Ok(())
    }

    #[test]
    fn bulk_acknowledge_asks_for_confirmation_when_selected() -> Result<()> {
        let mut screen = screen_with(vec![alert(5, false)], &[5])?;
        let action = press(&mut screen, KeyCode::Char('A'))?;
        assert!(matches!(
            action,
            Some(Action::ShowConfirm(ConfirmAction::BulkAcknowledge { count: 1 }))
        ));
        Ok(())
    }

    #[test]
    fn bulk_acknowledge_with_empty_selection_goes_straight_to_bridge() -> Result<()> {
        let mut screen = screen_with(vec![alert(5, false)], &[])?;
        let action = press(&mut screen, KeyCode::Char('A'))?;
        assert!(matches!(action, Some(Action::AcknowledgeSelected)));
        Ok(())
    }

    #[test]
    fn enter_on_acknowledged_alert_only_informs() -> Result<()> {
        let mut screen = screen_with(vec![alert(6, true)], &[])?;
        let action = press(&mut screen, KeyCode::Enter)?;
        assert!(matches!(action, Some(Action::Notify(_))));

        let mut screen = screen_with(vec![alert(5, false)], &[])?;
        let action = press(&mut screen, KeyCode::Char(' '))?;
        assert!(matches!(action, Some(Action::ToggleAlert(5))));
        Ok(())
    }
}
