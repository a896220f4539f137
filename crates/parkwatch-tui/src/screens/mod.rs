//! Screen implementations. Each screen is a top-level Component.

pub mod alerts;
pub mod analytics;
pub mod dashboard;
pub mod live;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create screen components in tab-bar order.
pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Dashboard, Box::new(dashboard::DashboardScreen::new())),
        (ScreenId::Live, Box::new(live::LiveScreen::new())),
        (ScreenId::Alerts, Box::new(alerts::AlertsScreen::new())),
        (ScreenId::Analytics, Box::new(analytics::AnalyticsScreen::new())),
    ]
}

/// Render a component into a test terminal and return its text, row by row.
#[cfg(test)]
pub(crate) fn render_text(component: &dyn Component, width: u16, height: u16) -> String {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    let Ok(mut terminal) = Terminal::new(TestBackend::new(width, height)) else {
        return String::new();
    };
    if terminal.draw(|frame| component.render(frame, frame.area())).is_err() {
        return String::new();
    }
    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}
