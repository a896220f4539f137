//! One-line filter summary shown above every screen.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::action::FilterView;
use crate::theme;

fn field<'a>(label: &'a str, value: Option<String>) -> [Span<'a>; 2] {
    let value_span = match value {
        Some(v) => Span::styled(v, Style::default().fg(theme::NEON_CYAN)),
        None => Span::styled("all", theme::key_hint()),
    };
    [Span::styled(format!(" {label} "), theme::key_hint_key()), value_span]
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

pub fn filter_line(view: &FilterView) -> Line<'static> {
    let mut spans = Vec::with_capacity(10);
    spans.extend(field("f facility", view.facility_name.clone()));
    spans.push(Span::raw("  "));
    spans.extend(field("z zone", view.zone_name.clone()));
    spans.push(Span::raw("  "));
    spans.extend(field("s status", non_empty(&view.state.status)));

    if view.active_count > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(" {} active ", view.active_count),
            Style::default()
                .fg(theme::BG_DARK)
                .bg(theme::ELECTRIC_PURPLE)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled("  c clear", theme::key_hint()));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use parkwatch_core::FilterState;
    use pretty_assertions::assert_eq;

    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn unset_filters_read_all_without_badge() {
        let line = filter_line(&FilterView::default());
        assert_eq!(text(&line), " f facility all   z zone all   s status all");
    }

    #[test]
    fn active_filters_show_names_and_count() {
        let view = FilterView {
            state: FilterState {
                facility: "1".into(),
                status: "CRITICAL".into(),
                ..FilterState::default()
            },
            active_count: 2,
            facility_name: Some("North Lot".into()),
            zone_name: None,
        };
        let rendered = text(&filter_line(&view));
        assert!(rendered.contains("North Lot"));
        assert!(rendered.contains("CRITICAL"));
        assert!(rendered.contains(" 2 active "));
    }
}
