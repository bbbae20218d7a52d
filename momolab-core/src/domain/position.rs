//! Position sign: the only thing rebalancing looks at.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Signed direction of a holding: short, flat or long.
///
/// Desired positions are always one of these three values; magnitudes come
/// from the sizer, never from the sign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    Short,
    #[default]
    Flat,
    Long,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("position sign must be -1, 0 or 1, got {0}")]
pub struct SignError(pub i64);

impl Sign {
    pub const ALL: [Sign; 3] = [Sign::Short, Sign::Flat, Sign::Long];

    /// Sign of a signed broker quantity.
    pub fn from_quantity(quantity: i64) -> Self {
        match quantity.signum() {
            1 => Sign::Long,
            -1 => Sign::Short,
            _ => Sign::Flat,
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Sign::Short => -1,
            Sign::Flat => 0,
            Sign::Long => 1,
        }
    }

    pub fn is_flat(self) -> bool {
        self == Sign::Flat
    }
}

impl TryFrom<i64> for Sign {
    type Error = SignError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Sign::Short),
            0 => Ok(Sign::Flat),
            1 => Ok(Sign::Long),
            other => Err(SignError(other)),
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}
