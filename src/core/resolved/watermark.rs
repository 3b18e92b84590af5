//! Resolved watermark model
//!
//! A `ResolvedWatermark` is the persisted progress marker of one endpoint:
//! every change at or below its timestamp has been fully processed.

use crate::core::resolved::timestamp::HlcTimestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest resolved timestamp for a single endpoint
///
/// The default value (empty endpoint, zero timestamp) stands for "no
/// watermark yet".
///
/// # Examples
///
/// ```
/// use cdc_resolved::core::resolved::ResolvedWatermark;
///
/// let none_yet = ResolvedWatermark::zero("orders");
/// assert!(none_yet.is_zero());
///
/// let advanced = ResolvedWatermark::new("orders", 1586020760120222000, 0);
/// assert!(none_yet.timestamp() < advanced.timestamp());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedWatermark {
    /// Endpoint (change-feed stream) this watermark belongs to
    pub endpoint: String,

    /// Wall-clock component of the resolved timestamp
    pub nanos: i64,

    /// Logical component of the resolved timestamp
    pub logical: u64,
}

impl ResolvedWatermark {
    pub fn new(endpoint: impl Into<String>, nanos: i64, logical: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            nanos,
            logical,
        }
    }

    /// The watermark reported for an endpoint that was never written
    pub fn zero(endpoint: impl Into<String>) -> Self {
        Self::new(endpoint, 0, 0)
    }

    pub fn from_timestamp(endpoint: impl Into<String>, timestamp: HlcTimestamp) -> Self {
        Self::new(endpoint, timestamp.nanos, timestamp.logical)
    }

    pub fn timestamp(&self) -> HlcTimestamp {
        HlcTimestamp::new(self.nanos, self.logical)
    }

    /// Check whether this endpoint has not advanced yet
    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    /// Wall-clock time of the watermark, for display
    ///
    /// Returns `None` for the zero watermark.
    pub fn wall_time(&self) -> Option<DateTime<Utc>> {
        if self.is_zero() {
            None
        } else {
            Some(DateTime::from_timestamp_nanos(self.nanos))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_absent_watermark() {
        let watermark = ResolvedWatermark::default();
        assert!(watermark.endpoint.is_empty());
        assert!(watermark.is_zero());
        assert_eq!(watermark.timestamp(), HlcTimestamp::ZERO);
    }

    #[test]
    fn test_from_timestamp() {
        let watermark = ResolvedWatermark::from_timestamp("one", HlcTimestamp::new(5, 5));
        assert_eq!(watermark, ResolvedWatermark::new("one", 5, 5));
    }

    #[test]
    fn test_wall_time() {
        let watermark = ResolvedWatermark::new("one", 1586020760120222000, 0);
        let wall = watermark.wall_time().unwrap();
        assert_eq!(wall.format("%Y-%m-%d").to_string(), "2020-04-04");

        assert!(ResolvedWatermark::zero("one").wall_time().is_none());
    }

    #[test]
    fn test_watermark_serialization() {
        let watermark = ResolvedWatermark::new("orders", 12, 3);
        let json = serde_json::to_string(&watermark).unwrap();
        assert!(json.contains("\"endpoint\":\"orders\""));

        let deserialized: ResolvedWatermark = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, watermark);
    }
}
