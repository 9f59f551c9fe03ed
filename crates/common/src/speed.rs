use std::{convert::TryFrom, fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The fixed tick intervals offered to the user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Speed {
    Half,
    Normal,
    Double,
    Quadruple,
}

impl Speed {
    pub const LEVELS: [Speed; 4] = [Speed::Half, Speed::Normal, Speed::Double, Speed::Quadruple];

    pub fn millis(self) -> u64 {
        match self {
            Speed::Half => 2000,
            Speed::Normal => 1000,
            Speed::Double => 500,
            Speed::Quadruple => 250,
        }
    }

    pub fn interval(self) -> Duration {
        Duration::from_millis(self.millis())
    }

    pub fn label(self) -> &'static str {
        match self {
            Speed::Half => "0.5x",
            Speed::Normal => "1x",
            Speed::Double => "2x",
            Speed::Quadruple => "4x",
        }
    }
}

impl Default for Speed {
    fn default() -> Self {
        Speed::Normal
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}ms)", self.label(), self.millis())
    }
}

impl TryFrom<u64> for Speed {
    type Error = Error;

    fn try_from(millis: u64) -> Result<Self, Error> {
        Speed::LEVELS
            .iter()
            .copied()
            .find(|speed| speed.millis() == millis)
            .ok_or_else(|| Error::InvalidSpeed(format!("{}ms", millis)))
    }
}

/// Accepts either a label (`"2x"`) or an interval in milliseconds (`"500"`).
impl FromStr for Speed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        if let Some(speed) = Speed::LEVELS.iter().copied().find(|speed| speed.label() == s) {
            return Ok(speed);
        }
        let millis = s
            .trim_end_matches("ms")
            .parse::<u64>()
            .map_err(|_| Error::InvalidSpeed(s.to_string()))?;
        Speed::try_from(millis)
    }
}
