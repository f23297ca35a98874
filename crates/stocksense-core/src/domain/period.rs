use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Lookback window accepted by the history provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    OneDay,
    FiveDays,
    SevenDays,
    TenDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    Max,
}

impl Period {
    pub const ALL: [Self; 11] = [
        Self::OneDay,
        Self::FiveDays,
        Self::SevenDays,
        Self::TenDays,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::TwoYears,
        Self::FiveYears,
        Self::Max,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::SevenDays => "7d",
            Self::TenDays => "10d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::Max => "max",
        }
    }

    /// Rough number of trading sessions in the window.
    pub const fn approx_sessions(self) -> usize {
        match self {
            Self::OneDay => 1,
            Self::FiveDays => 5,
            Self::SevenDays => 5,
            Self::TenDays => 7,
            Self::OneMonth => 21,
            Self::ThreeMonths => 63,
            Self::SixMonths => 126,
            Self::OneYear => 250,
            Self::TwoYears => 500,
            Self::FiveYears => 1_250,
            Self::Max => 2_500,
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|period| period.as_str() == normalized)
            .ok_or(ValidationError::InvalidPeriod {
                value: value.to_owned(),
            })
    }
}

impl TryFrom<String> for Period {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.as_str().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_spellings() {
        assert_eq!("7d".parse::<Period>().expect("valid"), Period::SevenDays);
        assert_eq!(" 1MO ".parse::<Period>().expect("valid"), Period::OneMonth);
        assert_eq!("1y".parse::<Period>().expect("valid"), Period::OneYear);
    }

    #[test]
    fn rejects_unknown_period() {
        let err = "2w".parse::<Period>().expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidPeriod { .. }));
    }
}
