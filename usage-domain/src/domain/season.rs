use std::fmt;

/// Calendar season derived from a month number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// {12, 1, 2} winter, {3, 4, 5} spring, {6, 7, 8} summer, everything else autumn.
    pub fn of_month(month: u8) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    /// Label as it appears in the usage table and the season label encoder.
    pub fn as_str(self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }

    /// Season used to filter historical rows for statistical estimates.
    ///
    /// The dataset has no spring label, so spring rows are looked up as autumn.
    /// Model inference keeps the unmapped season.
    pub fn for_history_lookup(self) -> Self {
        match self {
            Season::Spring => Season::Autumn,
            other => other,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
