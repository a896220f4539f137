//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use parkwatch_core::Monitor;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::action::{Action, ConfirmAction, FilterView, LiveStatus, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::filter_bar;

const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    filter: FilterView,
    live_status: LiveStatus,
    /// Blocks other input while open.
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Requests for the data bridge.
    request_tx: mpsc::UnboundedSender<Action>,
    request_rx: Option<mpsc::UnboundedReceiver<Action>>,
    monitor: Monitor,
    data_cancel: CancellationToken,
}

impl App {
    pub fn new(monitor: Monitor) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (request_tx, request_rx) = mpsc::unbounded_channel();

        let mut screens: HashMap<ScreenId, Box<dyn Component>> = create_screens().into_iter().collect();
        let active_screen = ScreenId::default();
        for (id, screen) in &mut screens {
            screen.set_focused(*id == active_screen);
        }

        Self {
            active_screen,
            screens,
            running: true,
            help_visible: false,
            filter: FilterView::default(),
            live_status: LiveStatus {
                loading: true,
                ..LiveStatus::default()
            },
            pending_confirm: None,
            notification: None,
            action_tx,
            action_rx,
            request_tx,
            request_rx: Some(request_rx),
            monitor,
            data_cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop until quit.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        if let Some(requests) = self.request_rx.take() {
            let monitor = self.monitor.clone();
            let tx = self.action_tx.clone();
            let cancel = self.data_cancel.clone();
            tokio::spawn(async move {
                crate::data_bridge::run_data_bridge(monitor, tx, requests, cancel).await;
            });
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );
        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;
                if matches!(action, Action::Render) {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key to an action. Global keys first, then the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='4')) => {
                let n = c as u8 - b'0';
                return Ok(ScreenId::from_number(n).map(Action::SwitchScreen));
            }
            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (_, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => return Ok(Some(Action::Refresh)),
            (KeyModifiers::NONE, KeyCode::Char('f')) => return Ok(Some(Action::CycleFacility)),
            (KeyModifiers::NONE, KeyCode::Char('z')) => return Ok(Some(Action::CycleZone)),
            (KeyModifiers::NONE, KeyCode::Char('s')) => return Ok(Some(Action::CycleStatus)),
            (KeyModifiers::NONE, KeyCode::Char('c')) => return Ok(Some(Action::ClearFilters)),
            (KeyModifiers::NONE, KeyCode::Esc) if self.notification.is_some() => {
                return Ok(Some(Action::DismissNotification));
            }
            _ => {}
        }

        match self.screens.get_mut(&self.active_screen) {
            Some(screen) => screen.handle_key_event(key),
            None => Ok(None),
        }
    }

    fn switch_to(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        self.active_screen = target;
        if let Some(screen) = self.screens.get_mut(&target) {
            screen.set_focused(true);
        }
    }

    /// Update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        if action.is_request() {
            if self.request_tx.send(action.clone()).is_err() {
                warn!(?action, "data bridge is gone");
                self.notification = Some((Notification::error("Data connection stopped"), Instant::now()));
            }
            return Ok(());
        }

        match action {
            Action::Quit => self.running = false,
            Action::Resize(..) | Action::Render => {}
            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
            }
            Action::SwitchScreen(target) => self.switch_to(*target),
            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::FilterChanged(view) => self.filter = view.clone(),

            // Data updates go to ALL screens so inactive ones stay current
            Action::LiveStatusChanged(_)
            | Action::SummaryUpdated(_)
            | Action::ZonesUpdated(_)
            | Action::LiveUpdated(_)
            | Action::AlertsUpdated(_)
            | Action::HourlyUpdated(_)
            | Action::HealthUpdated(_) => {
                if let Action::LiveStatusChanged(status) = action {
                    self.live_status = status.clone();
                }
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm.clone()),
            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.action_tx.send(confirm.into_action())?;
                }
            }
            Action::ConfirmNo => self.pending_confirm = None,

            Action::Notify(n) => self.notification = Some((n.clone(), Instant::now())),
            Action::DismissNotification => self.notification = None,

            other => {
                if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                    if let Some(follow_up) = screen.update(other)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }
        }
        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let [filter_area, content_area, tab_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(Paragraph::new(filter_bar::filter_line(&self.filter)), filter_area);
        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, content_area);
        }
        self.render_tab_bar(frame, tab_area);
        self.render_status_bar(frame, status_area);

        if let Some((notif, _)) = &self.notification {
            render_notification(frame, area, notif);
        }
        if let Some(confirm) = &self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(format!(" {} {} ", id.number(), id.label()), style))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(ScreenId::ALL.iter().position(|&s| s == self.active_screen).unwrap_or(0));
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status = &self.live_status;
        let indicator = if status.error.is_some() {
            Span::styled("✗ backend error", Style::default().fg(theme::ERROR_RED))
        } else if status.paused {
            Span::styled("⏸ paused", Style::default().fg(theme::ELECTRIC_YELLOW))
        } else if status.loading {
            Span::styled("◐ loading", Style::default().fg(theme::ELECTRIC_YELLOW))
        } else {
            Span::styled("● live", Style::default().fg(theme::SUCCESS_GREEN))
        };

        let hints = Span::styled(
            " │ r refresh  f/z/s filter  c clear  ? help  q quit",
            theme::key_hint(),
        );
        frame.render_widget(Paragraph::new(Line::from(vec![Span::raw(" "), indicator, hints])), area);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(area.x + x, area.y + y, width, height)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(area, 56, 20);
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(what, theme::key_hint()),
        ])
    };
    let section = |title: &'static str| Line::from(Span::styled(format!("  {title}"), Style::default().fg(theme::NEON_CYAN)));

    let lines = vec![
        section("Navigation"),
        entry("1-4", "Jump to screen"),
        entry("Tab", "Next screen"),
        entry("j/k ↑/↓", "Move up/down"),
        Line::from(""),
        section("Data"),
        entry("r", "Refresh everything"),
        entry("f / z", "Cycle facility / zone"),
        entry("s", "Cycle device status"),
        entry("c", "Reset filters"),
        entry("p", "Pause live updates (Live)"),
        Line::from(""),
        section("Alerts"),
        entry("space", "Select alert"),
        entry("a / x", "Select all / clear"),
        entry("Enter", "Acknowledge alert"),
        entry("A", "Acknowledge selected"),
        Line::from(""),
        Line::from(Span::styled("                  Esc or ? to close", theme::key_hint())),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let dialog_area = centered(area, 44, 5);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ELECTRIC_YELLOW))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let text = vec![
        Line::from(Span::styled(format!("  {confirm}"), Style::default().fg(theme::DIM_WHITE))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
    let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 70).min(area.width);
    let height = 3u16;
    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height.min(area.height));

    let (color, icon) = match notif.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Warning => (theme::ELECTRIC_YELLOW, "!"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(notif.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

#[cfg(test)]
mod tests {
    use parkwatch_core::MonitorConfig;
    use pretty_assertions::assert_eq;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn app() -> Result<App> {
        Ok(App::new(Monitor::new(MonitorConfig::default())?))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn global_keys_map_to_actions() -> Result<()> {
        let mut app = app()?;
        assert!(matches!(app.handle_key_event(key(KeyCode::Char('q')))?, Some(Action::Quit)));
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('3')))?,
            Some(Action::SwitchScreen(ScreenId::Alerts))
        ));
        assert!(matches!(app.handle_key_event(key(KeyCode::Char('f')))?, Some(Action::CycleFacility)));
        assert!(matches!(app.handle_key_event(key(KeyCode::Char('c')))?, Some(Action::ClearFilters)));
        assert!(matches!(app.handle_key_event(key(KeyCode::Char('9')))?, None));
        Ok(())
    }

    #[test]
    fn confirm_dialog_captures_input_and_dispatches_on_yes() -> Result<()> {
        let mut app = app()?;
        app.process_action(&Action::ShowConfirm(ConfirmAction::BulkAcknowledge { count: 2 }))?;

        assert!(matches!(app.handle_key_event(key(KeyCode::Char('q')))?, None));
        assert!(matches!(app.handle_key_event(key(KeyCode::Char('y')))?, Some(Action::ConfirmYes)));

        app.process_action(&Action::ConfirmYes)?;
        assert!(app.pending_confirm.is_none());
        assert!(matches!(app.action_rx.try_recv(), Ok(Action::AcknowledgeSelected)));
        Ok(())
    }

    #[test]
    fn requests_are_forwarded_to_the_bridge() -> Result<()> {
        let mut app = app()?;
        let mut requests = app.request_rx.take().ok_or_else(|| color_eyre::eyre::eyre!("taken"))?;

        app.process_action(&Action::CycleStatus)?;
        app.process_action(&Action::ToggleAlert(7))?;

        assert!(matches!(requests.try_recv(), Ok(Action::CycleStatus)));
        assert!(matches!(requests.try_recv(), Ok(Action::ToggleAlert(7))));
        Ok(())
    }

    #[test]
    fn tab_cycles_screens_and_moves_focus() -> Result<()> {
        let mut app = app()?;
        let next = app.handle_key_event(key(KeyCode::Tab))?;
        if let Some(action) = next {
            app.process_action(&action)?;
        }
        assert_eq!(app.active_screen, ScreenId::Live);
        Ok(())
    }

    #[test]
    fn frame_shows_filter_bar_tabs_and_toast() -> Result<()> {
        let mut app = app()?;
        app.process_action(&Action::Notify(Notification::success("Acknowledged 2 alert(s)")))?;

        let mut terminal = Terminal::new(TestBackend::new(100, 30))?;
        terminal.draw(|frame| app.render(frame))?;
        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(ratatui::buffer::Cell::symbol).collect();

        assert!(text.contains("f facility all"));
        assert!(text.contains("1 Dashboard"));
        assert!(text.contains("4 Analytics"));
        assert!(text.contains("Acknowledged 2 alert(s)"));
        Ok(())
    }
}
