//! Hybrid logical clock timestamps

use crate::core::resolved::parser::parse_hlc_timestamp;
use crate::domain::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of digits the logical component occupies on the wire
pub const LOGICAL_WIDTH: usize = 10;

/// A hybrid logical clock timestamp
///
/// Ordering is lexicographic on `(nanos, logical)`, which the derived `Ord`
/// provides through field order.
///
/// # Examples
///
/// ```
/// use cdc_resolved::core::resolved::HlcTimestamp;
///
/// let earlier = HlcTimestamp::new(1586020760120222000, 7);
/// let later = HlcTimestamp::new(1586020760120222000, 8);
/// assert!(earlier < later);
/// assert_eq!(later.to_string(), "1586020760120222000.0000000008");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct HlcTimestamp {
    /// Wall-clock nanoseconds since the Unix epoch
    pub nanos: i64,

    /// Logical counter ordering events that share `nanos`
    pub logical: u64,
}

impl HlcTimestamp {
    /// The "not yet advanced" timestamp
    pub const ZERO: HlcTimestamp = HlcTimestamp {
        nanos: 0,
        logical: 0,
    };

    pub fn new(nanos: i64, logical: u64) -> Self {
        Self { nanos, logical }
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }
}

impl fmt::Display for HlcTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:0width$}", self.nanos, self.logical, width = LOGICAL_WIDTH)
    }
}

impl FromStr for HlcTimestamp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hlc_timestamp(s)
    }
}
