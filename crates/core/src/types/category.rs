//! Place categories.

use serde::{Deserialize, Serialize};

/// Color-coded cuisine category of a place.
///
/// Serialized as the upper-case color name (`"RED"`, `"YELLOW"`, ...), which is
/// the shape stored by every client version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Korean.
    #[default]
    Red,
    /// Western.
    Yellow,
    /// Chinese.
    Green,
    /// Japanese.
    Blue,
    /// Everything else.
    Purple,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 5] = [
        Self::Red,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Purple,
    ];

    /// The stored color code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
            Self::Blue => "BLUE",
            Self::Purple => "PURPLE",
        }
    }

    /// Human-readable cuisine label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "Korean",
            Self::Yellow => "Western",
            Self::Green => "Chinese",
            Self::Blue => "Japanese",
            Self::Purple => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RED" => Ok(Self::Red),
            "YELLOW" => Ok(Self::Yellow),
            "GREEN" => Ok(Self::Green),
            "BLUE" => Ok(Self::Blue),
            "PURPLE" => Ok(Self::Purple),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}
