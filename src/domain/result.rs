//! Result type alias for cdc-resolved

use super::errors::ResolvedError;

/// Result type alias for cdc-resolved operations
///
/// # Examples
///
/// ```
/// use cdc_resolved::domain::result::Result;
/// use cdc_resolved::domain::errors::ResolvedError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ResolvedError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ResolvedError>;
