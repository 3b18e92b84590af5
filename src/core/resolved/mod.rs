//! Resolved timestamps: parsing and per-endpoint storage
//!
//! - [`parser`] - decodes `{"resolved": "<nanos>.<logical>"}` payloads
//! - [`timestamp`] - the ordered [`HlcTimestamp`]
//! - [`watermark`] - the persisted [`ResolvedWatermark`]
//! - [`store`] - [`WatermarkStore`], read and upsert inside a caller's transaction
//! - [`table`] - validated [`TableName`] of the backing table

pub mod parser;
pub mod store;
pub mod table;
pub mod timestamp;
pub mod watermark;

pub use parser::{parse_hlc_timestamp, parse_resolved_line, RESOLVED_FIELD};
pub use store::{WatermarkStore, WritePolicy};
pub use table::TableName;
pub use timestamp::HlcTimestamp;
pub use watermark::ResolvedWatermark;
