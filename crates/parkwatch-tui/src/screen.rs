//! Screen identifiers, navigable by number keys 1-4.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Dashboard,
    Live,
    Alerts,
    Analytics,
}

impl ScreenId {
    /// Tab-bar order.
    pub const ALL: [ScreenId; 4] = [Self::Dashboard, Self::Live, Self::Alerts, Self::Analytics];

    pub fn number(self) -> u8 {
        match self {
            Self::Dashboard => 1,
            Self::Live => 2,
            Self::Alerts => 3,
            Self::Analytics => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|&s| s == self).unwrap_or(0)
    }

    /// Wraps around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Wraps around.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Live => "Live",
            Self::Alerts => "Alerts",
            Self::Analytics => "Analytics",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
