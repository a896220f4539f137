//! Health score bar, `████░░░░ 45` coloured by tier.

use parkwatch_core::HealthTier;
use ratatui::style::Style;
use ratatui::text::Span;

use crate::theme;

/// Filled/empty cells for a 0-100 score. Scores above 100 fill the bar.
pub fn bar_text(score: u32, width: u16) -> String {
    let width = u32::from(width);
    let filled = (score.min(100) * width + 50) / 100;
    (0..width).map(|i| if i < filled { '█' } else { '░' }).collect()
}

pub fn health_span(score: u32, width: u16) -> Span<'static> {
    let color = theme::tier_color(HealthTier::from_score(score));
    Span::styled(
        format!("{} {score:>3}", bar_text(score, width)),
        Style::default().fg(color),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn bar_rounds_to_nearest_cell() {
        assert_eq!(bar_text(45, 10), "█████░░░░░");
        assert_eq!(bar_text(0, 4), "░░░░");
        assert_eq!(bar_text(100, 4), "████");
    }

    #[test]
    fn over_range_score_is_clamped() {
        assert_eq!(bar_text(250, 3), "███");
    }

    #[test]
    fn span_carries_tier_colour() {
        let span = health_span(45, 4);
        assert_eq!(span.style.fg, Some(theme::ERROR_RED));
        assert_eq!(span.content, "██░░  45");
    }
}
