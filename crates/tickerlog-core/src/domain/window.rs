use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Trailing historical window for daily series fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookbackWindow {
    OneMonth,
    ThreeMonths,
    #[default]
    SixMonths,
    OneYear,
}

impl LookbackWindow {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
        }
    }
}

impl Display for LookbackWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookbackWindow {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1mo" => Ok(Self::OneMonth),
            "3mo" => Ok(Self::ThreeMonths),
            "6mo" => Ok(Self::SixMonths),
            "1y" => Ok(Self::OneYear),
            _ => Err(ValidationError::InvalidWindow {
                value: value.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_windows() {
        assert_eq!(
            "6mo".parse::<LookbackWindow>().expect("must parse"),
            LookbackWindow::SixMonths
        );
        assert_eq!(
            "1Y".parse::<LookbackWindow>().expect("must parse"),
            LookbackWindow::OneYear
        );
    }

    #[test]
    fn rejects_unknown_window() {
        let err = "2w".parse::<LookbackWindow>().expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidWindow { .. }));
    }

    #[test]
    fn defaults_to_six_months() {
        assert_eq!(LookbackWindow::default(), LookbackWindow::SixMonths);
    }
}
