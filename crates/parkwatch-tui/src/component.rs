//! Component trait, implemented by every screen.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::action::Action;

/// Lifecycle: (`handle_key_event` | `update` | `render`)*
pub trait Component: Send {
    /// Keys reach only the active screen. Return an action to dispatch.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Data actions reach every screen, so inactive ones stay current.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    fn set_focused(&mut self, _focused: bool) {}
}
