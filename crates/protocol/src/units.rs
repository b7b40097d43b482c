use serde::{Deserialize, Serialize};

/// Unit of the weight values recorded in a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfilingUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    /// Unitless weights (sample counts, ticks). Carries no wall-clock
    /// duration.
    Count,
}

impl ProfilingUnit {
    /// One second expressed in this unit. Used as the placeholder grid
    /// width for zero-duration profiles.
    pub fn one_second(&self) -> f64 {
        match self {
            Self::Nanoseconds => 1e9,
            Self::Microseconds => 1e6,
            Self::Milliseconds => 1e3,
            Self::Count => 1.0,
        }
    }

    /// Multiplier converting a value in this unit to nanoseconds, or
    /// `None` for unitless weights.
    pub fn to_nanoseconds_factor(&self) -> Option<f64> {
        match self {
            Self::Nanoseconds => Some(1.0),
            Self::Microseconds => Some(1e3),
            Self::Milliseconds => Some(1e6),
            Self::Count => None,
        }
    }

    /// Multiplier converting a value in this unit to seconds. Counts pass
    /// through unchanged.
    pub fn to_seconds_factor(&self) -> f64 {
        match self {
            Self::Nanoseconds => 1e-9,
            Self::Microseconds => 1e-6,
            Self::Milliseconds => 1e-3,
            Self::Count => 1.0,
        }
    }

    /// Format a value in this unit for display ("1.20s", "340ms", "12µs").
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Self::Nanoseconds => {
                if value >= 1e9 {
                    format!("{:.2}s", value / 1e9)
                } else if value >= 1e6 {
                    format!("{:.1}ms", value / 1e6)
                } else if value >= 1e3 {
                    format!("{:.0}µs", value / 1e3)
                } else {
                    format!("{value:.0}ns")
                }
            }
            Self::Microseconds => {
                if value >= 1e6 {
                    format!("{:.2}s", value / 1e6)
                } else if value >= 1e3 {
                    format!("{:.1}ms", value / 1e3)
                } else {
                    format!("{value:.0}µs")
                }
            }
            Self::Milliseconds => {
                if value >= 1e3 {
                    format!("{:.2}s", value / 1e3)
                } else {
                    format!("{value:.1}ms")
                }
            }
            Self::Count => format!("{value:.0}"),
        }
    }

    /// Format a position on the time axis as "m:ss.mmm" for timeline
    /// labels. Counts are printed as plain numbers.
    pub fn format_timeline(&self, value: f64) -> String {
        match self {
            Self::Count => format!("{value:.0}"),
            _ => {
                let seconds = value * self.to_seconds_factor();
                let minutes = (seconds / 60.0).floor();
                let rest = seconds - minutes * 60.0;
                format!("{minutes:.0}:{rest:06.3}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_microseconds() {
        assert_eq!(ProfilingUnit::Microseconds.format_value(500.0), "500µs");
        assert_eq!(ProfilingUnit::Microseconds.format_value(1500.0), "1.5ms");
        assert_eq!(
            ProfilingUnit::Microseconds.format_value(2_500_000.0),
            "2.50s"
        );
    }

    #[test]
    fn format_nanoseconds() {
        assert_eq!(ProfilingUnit::Nanoseconds.format_value(340.0), "340ns");
        assert_eq!(ProfilingUnit::Nanoseconds.format_value(340_000_000.0), "340.0ms");
        assert_eq!(ProfilingUnit::Nanoseconds.format_value(1_200_000_000.0), "1.20s");
    }

    #[test]
    fn format_milliseconds() {
        assert_eq!(ProfilingUnit::Milliseconds.format_value(340.0), "340.0ms");
        assert_eq!(ProfilingUnit::Milliseconds.format_value(1200.0), "1.20s");
    }

    #[test]
    fn format_count() {
        assert_eq!(ProfilingUnit::Count.format_value(42.0), "42");
    }

    #[test]
    fn timeline_labels() {
        assert_eq!(ProfilingUnit::Milliseconds.format_timeline(1500.0), "0:01.500");
        assert_eq!(ProfilingUnit::Milliseconds.format_timeline(90_000.0), "1:30.000");
        assert_eq!(ProfilingUnit::Count.format_timeline(7.0), "7");
    }

    #[test]
    fn one_second_per_unit() {
        assert_eq!(ProfilingUnit::Nanoseconds.one_second(), 1e9);
        assert_eq!(ProfilingUnit::Microseconds.one_second(), 1e6);
        assert_eq!(ProfilingUnit::Milliseconds.one_second(), 1e3);
        assert_eq!(ProfilingUnit::Count.one_second(), 1.0);
    }

    #[test]
    fn nanosecond_factors() {
        assert_eq!(ProfilingUnit::Microseconds.to_nanoseconds_factor(), Some(1e3));
        assert_eq!(ProfilingUnit::Count.to_nanoseconds_factor(), None);
    }
}
