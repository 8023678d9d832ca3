use core::fmt;

use serde::{Deserialize, Serialize};

/// Outcome flag carried by every history response (`s` in the UDF payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    /// Candles were found for the requested window.
    #[default]
    Ok,
    /// No candles exist in the requested window.
    NoData,
    /// The request failed; the response carries an error message.
    Error,
}

impl HistoryStatus {
    /// Wire token for logs and payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NoData => "no_data",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
