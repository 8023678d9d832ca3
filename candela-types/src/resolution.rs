use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CandelaError;

/// Bar period of a candle series.
///
/// The set is fixed; UDF clients address it with the tokens returned by
/// [`Resolution::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Resolution {
    /// One minute.
    M1,
    /// Five minutes.
    M5,
    /// Fifteen minutes.
    M15,
    /// One hour.
    H1,
    /// Four hours.
    H4,
    /// One trading day.
    D1,
}

impl Resolution {
    /// Every supported resolution, finest first.
    pub const ALL: [Self; 6] = [Self::M1, Self::M5, Self::M15, Self::H1, Self::H4, Self::D1];

    /// UDF token (`"1"`, `"5"`, `"15"`, `"60"`, `"240"`, `"D"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::M1 => "1",
            Self::M5 => "5",
            Self::M15 => "15",
            Self::H1 => "60",
            Self::H4 => "240",
            Self::D1 => "D",
        }
    }

    /// Length of one bar in seconds.
    #[must_use]
    pub const fn period_secs(self) -> i64 {
        match self {
            Self::M1 => 60,
            Self::M5 => 5 * 60,
            Self::M15 => 15 * 60,
            Self::H1 => 60 * 60,
            Self::H4 => 4 * 60 * 60,
            Self::D1 => 24 * 60 * 60,
        }
    }

    /// OANDA candle granularity code.
    #[must_use]
    pub const fn granularity(self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M5 => "M5",
            Self::M15 => "M15",
            Self::H1 => "H1",
            Self::H4 => "H4",
            Self::D1 => "D",
        }
    }

    /// Returns true for bars shorter than a day.
    #[must_use]
    pub const fn is_intraday(self) -> bool {
        !matches!(self, Self::D1)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = CandelaError;

    /// Parses a UDF token. `"1D"` and a lower-case `"d"` are accepted as daily.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::M1),
            "5" => Ok(Self::M5),
            "15" => Ok(Self::M15),
            "60" => Ok(Self::H1),
            "240" => Ok(Self::H4),
            "D" | "d" | "1D" | "1d" => Ok(Self::D1),
            other => Err(CandelaError::UnsupportedResolution(other.to_string())),
        }
    }
}

impl TryFrom<String> for Resolution {
    type Error = CandelaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for &'static str {
    fn from(r: Resolution) -> Self {
        r.as_str()
    }
}
