use serde::{Serialize, Serializer};

/// Usage alert shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Normal,
    Moderate,
    High,
}

impl AlertLevel {
    /// Workflow alert, from the average predicted monthly total (kWh) across appliances.
    pub fn for_predicted_monthly(avg_total: f64) -> Self {
        if avg_total > 500.0 {
            AlertLevel::High
        } else if avg_total > 300.0 {
            AlertLevel::Moderate
        } else {
            AlertLevel::Normal
        }
    }

    /// Single-slice alert, from the mean of the hourly chart values.
    pub fn for_hourly_mean(avg_hourly: f64) -> Self {
        if avg_hourly > 0.5 {
            AlertLevel::High
        } else if avg_hourly > 0.3 {
            AlertLevel::Moderate
        } else {
            AlertLevel::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AlertLevel::Normal => "✅ Usage Normal",
            AlertLevel::Moderate => "⚠ Moderate Usage",
            AlertLevel::High => "⚠ High Usage Alert",
        }
    }
}

impl Serialize for AlertLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_thresholds_are_exclusive() {
        assert_eq!(AlertLevel::for_predicted_monthly(500.01), AlertLevel::High);
        assert_eq!(AlertLevel::for_predicted_monthly(500.0), AlertLevel::Moderate);
        assert_eq!(AlertLevel::for_predicted_monthly(300.01), AlertLevel::Moderate);
        assert_eq!(AlertLevel::for_predicted_monthly(300.0), AlertLevel::Normal);
        assert_eq!(AlertLevel::for_predicted_monthly(0.0), AlertLevel::Normal);
    }

    #[test]
    fn hourly_thresholds_are_exclusive() {
        assert_eq!(AlertLevel::for_hourly_mean(0.51), AlertLevel::High);
        assert_eq!(AlertLevel::for_hourly_mean(0.5), AlertLevel::Moderate);
        assert_eq!(AlertLevel::for_hourly_mean(0.31), AlertLevel::Moderate);
        assert_eq!(AlertLevel::for_hourly_mean(0.3), AlertLevel::Normal);
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&AlertLevel::High).unwrap(),
            "\"⚠ High Usage Alert\""
        );
        assert_eq!(
            serde_json::to_string(&AlertLevel::Normal).unwrap(),
            "\"✅ Usage Normal\""
        );
    }
}
