//! Domain error types for cdc-resolved.
//!
//! All fallible operations return [`Result<T, ResolvedError>`]. Payload
//! decoding failures are reported as [`ParseError`] and convert into
//! [`ResolvedError::Parse`] with the `?` operator:
//!
//! ```rust
//! use cdc_resolved::core::resolved::parse_resolved_line;
//! use cdc_resolved::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let watermark = parse_resolved_line(br#"{"resolved": "5.0000000001"}"#, "orders")?;
//!     assert_eq!(watermark.nanos, 5);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod result;

pub use errors::{ParseError, ResolvedError};
pub use result::Result;
