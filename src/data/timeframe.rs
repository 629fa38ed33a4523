//! Bar timeframe measured in whole minutes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// Timeframe of a bar series. Always at least one minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Timeframe(u32);

impl Timeframe {
    /// The 1-minute base timeframe of stored bars
    pub const MINUTE: Timeframe = Timeframe(1);

    pub fn new(minutes: u32) -> Result<Self, ConfigError> {
        if minutes == 0 {
            return Err(ConfigError::InvalidTimeframe(minutes));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    /// Bucket length in seconds
    pub fn seconds(&self) -> i64 {
        i64::from(self.0) * 60
    }

    /// Start of the bucket containing `time`, saturating at `i64::MIN`
    pub fn bucket_start(&self, time: i64) -> i64 {
        time.saturating_sub(time.rem_euclid(self.seconds()))
    }

    /// Short label such as `5m`
    pub fn label(&self) -> String {
        self.to_string()
    }

    pub fn is_base(&self) -> bool {
        self.0 == 1
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::MINUTE
    }
}

impl TryFrom<u32> for Timeframe {
    type Error = ConfigError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::new(minutes)
    }
}

impl From<Timeframe> for u32 {
    fn from(timeframe: Timeframe) -> u32 {
        timeframe.0
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}
