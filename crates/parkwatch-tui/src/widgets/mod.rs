//! Small rendering helpers shared by screens.

pub mod filter_bar;
pub mod health_bar;
pub mod status_indicator;
