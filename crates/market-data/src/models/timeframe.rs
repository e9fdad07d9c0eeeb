use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Spacing between consecutive points of a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hourly,
    Daily,
}

impl Granularity {
    /// Value of the `interval` query parameter of the market chart endpoint.
    pub fn as_interval(&self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
        }
    }

    pub fn step(&self) -> TimeDelta {
        match self {
            Granularity::Hourly => TimeDelta::hours(1),
            Granularity::Daily => TimeDelta::days(1),
        }
    }
}

/// Named chart window.
///
/// `1H` and `1D` intentionally resolve to the same one-day hourly window.
/// A one-hour window was probably intended for `1H`, but dashboards built on
/// this engine already rely on the current behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "1H")]
    OneHour,
    #[default]
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::OneHour,
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneHour => "1H",
            Timeframe::OneDay => "1D",
            Timeframe::OneWeek => "1W",
            Timeframe::OneMonth => "1M",
        }
    }

    /// Length of the requested window in days.
    pub fn window_days(&self) -> u32 {
        match self {
            Timeframe::OneHour | Timeframe::OneDay => 1,
            Timeframe::OneWeek => 7,
            Timeframe::OneMonth => 30,
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            Timeframe::OneHour | Timeframe::OneDay => Granularity::Hourly,
            Timeframe::OneWeek | Timeframe::OneMonth => Granularity::Daily,
        }
    }

    /// Number of points a full series for this window holds.
    pub fn point_count(&self) -> usize {
        let days = self.window_days() as usize;
        match self.granularity() {
            Granularity::Hourly => days * 24,
            Granularity::Daily => days,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1H" => Ok(Timeframe::OneHour),
            "1D" => Ok(Timeframe::OneDay),
            "1W" => Ok(Timeframe::OneWeek),
            "1M" => Ok(Timeframe::OneMonth),
            other => Err(format!("Unsupported timeframe: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_is_seven_daily_points() {
        assert_eq!(Timeframe::OneWeek.window_days(), 7);
        assert_eq!(Timeframe::OneWeek.granularity(), Granularity::Daily);
        assert_eq!(Timeframe::OneWeek.point_count(), 7);
    }

    #[test]
    fn test_month_is_thirty_daily_points() {
        assert_eq!(Timeframe::OneMonth.window_days(), 30);
        assert_eq!(Timeframe::OneMonth.granularity(), Granularity::Daily);
        assert_eq!(Timeframe::OneMonth.point_count(), 30);
    }

    #[test]
    fn test_hour_and_day_share_the_same_window() {
        assert_eq!(
            Timeframe::OneHour.window_days(),
            Timeframe::OneDay.window_days()
        );
        assert_eq!(Timeframe::OneHour.granularity(), Granularity::Hourly);
        assert_eq!(Timeframe::OneDay.point_count(), 24);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("1w".parse::<Timeframe>().unwrap(), Timeframe::OneWeek);
        assert_eq!(" 1M ".parse::<Timeframe>().unwrap(), Timeframe::OneMonth);
        assert!("5Y".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_serde_uses_short_names() {
        let json = serde_json::to_string(&Timeframe::OneWeek).unwrap();
        assert_eq!(json, "\"1W\"");
        let parsed: Timeframe = serde_json::from_str("\"1H\"").unwrap();
        assert_eq!(parsed, Timeframe::OneHour);
    }
}
