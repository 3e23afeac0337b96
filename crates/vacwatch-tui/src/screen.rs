//! Screen identifiers, in tab-bar order.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Overview, // 1
    Vacancies, // 2
    Detail,    // 3
    Watch,     // 4
}

impl ScreenId {
    pub const ALL: [ScreenId; 4] = [Self::Overview, Self::Vacancies, Self::Detail, Self::Watch];

    /// Number key for this screen.
    pub fn number(self) -> u8 {
        match self {
            Self::Overview => 1,
            Self::Vacancies => 2,
            Self::Detail => 3,
            Self::Watch => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous screen in tab order (wraps around).
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Vacancies => "Vacancies",
            Self::Detail => "Detail",
            Self::Watch => "Watch",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_round_trip() {
        for id in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(id.number()), Some(id));
        }
        assert_eq!(ScreenId::from_number(0), None);
        assert_eq!(ScreenId::from_number(5), None);
    }

    #[test]
    fn cycling_wraps() {
        assert_eq!(ScreenId::Watch.next(), ScreenId::Overview);
        assert_eq!(ScreenId::Overview.prev(), ScreenId::Watch);
    }
}
