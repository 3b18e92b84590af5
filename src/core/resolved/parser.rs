//! Resolved payload parser
//!
//! A change-feed emits resolved messages of the form
//!
//! ```json
//! {"resolved": "1586020760120222000.0000000000"}
//! ```
//!
//! where the string is `<decimal nanos>.<zero padded logical>`. This module
//! turns such a payload into a validated [`ResolvedWatermark`].

use crate::core::resolved::timestamp::{HlcTimestamp, LOGICAL_WIDTH};
use crate::core::resolved::watermark::ResolvedWatermark;
use crate::domain::ParseError;
use serde_json::Value;

/// JSON field carrying the resolved timestamp
pub const RESOLVED_FIELD: &str = "resolved";

/// Parse a resolved message for `endpoint`
///
/// # Errors
///
/// - [`ParseError::MalformedTimestamp`] if the payload is not a JSON object,
///   the field is not a string, or the string is not two integer segments
/// - [`ParseError::MissingField`] if the object has no `resolved` field
/// - [`ParseError::ZeroTimestamp`] if the nanos component is zero
///
/// # Examples
///
/// ```
/// use cdc_resolved::core::resolved::parse_resolved_line;
///
/// let watermark =
///     parse_resolved_line(br#"{"resolved": "1586020760120222000.0000000003"}"#, "endpoint.sql")
///         .unwrap();
/// assert_eq!(watermark.endpoint, "endpoint.sql");
/// assert_eq!(watermark.nanos, 1586020760120222000);
/// assert_eq!(watermark.logical, 3);
/// ```
pub fn parse_resolved_line(payload: &[u8], endpoint: &str) -> Result<ResolvedWatermark, ParseError> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| ParseError::MalformedTimestamp(format!("payload is not valid JSON: {e}")))?;

    let object = value.as_object().ok_or_else(|| {
        ParseError::MalformedTimestamp("payload is not a JSON object".to_string())
    })?;

    let raw = match object.get(RESOLVED_FIELD) {
        None | Some(Value::Null) => return Err(ParseError::MissingField),
        Some(Value::String(raw)) => raw,
        Some(other) => {
            return Err(ParseError::MalformedTimestamp(format!(
                "'{RESOLVED_FIELD}' must be a string, got {other}"
            )))
        }
    };

    let timestamp = parse_hlc_timestamp(raw)?;
    Ok(ResolvedWatermark::from_timestamp(endpoint, timestamp))
}

/// Parse the `<nanos>.<logical>` string form of a resolved timestamp
///
/// Both segments must be plain ASCII digits. The logical segment holds at most
/// ten digits; leading zeros are allowed in either segment.
pub fn parse_hlc_timestamp(raw: &str) -> Result<HlcTimestamp, ParseError> {
    let (nanos_str, logical_str) = raw.split_once('.').ok_or_else(|| {
        ParseError::MalformedTimestamp(format!("'{raw}' has no '.' separator"))
    })?;

    if !is_digits(nanos_str) {
        return Err(ParseError::MalformedTimestamp(format!(
            "nanos segment '{nanos_str}' is not a decimal integer"
        )));
    }
    if !is_digits(logical_str) || logical_str.len() > LOGICAL_WIDTH {
        return Err(ParseError::MalformedTimestamp(format!(
            "logical segment '{logical_str}' is not an integer of at most {LOGICAL_WIDTH} digits"
        )));
    }

    let nanos: i64 = nanos_str.parse().map_err(|e| {
        ParseError::MalformedTimestamp(format!("nanos segment '{nanos_str}': {e}"))
    })?;
    let logical: u64 = logical_str.parse().map_err(|e| {
        ParseError::MalformedTimestamp(format!("logical segment '{logical_str}': {e}"))
    })?;

    if nanos == 0 {
        return Err(ParseError::ZeroTimestamp);
    }

    Ok(HlcTimestamp::new(nanos, logical))
}

fn is_digits(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_parse_valid_line() {
        let watermark = parse_resolved_line(
            br#"{"resolved": "1586020760120222000.0000000000"}"#,
            "endpoint.sql",
        )
        .unwrap();

        assert_eq!(watermark.nanos, 1586020760120222000);
        assert_eq!(watermark.logical, 0);
        assert_eq!(watermark.endpoint, "endpoint.sql");
    }

    #[test_case(br#"{}"# => ParseError::MissingField ; "empty object")]
    #[test_case(br#"{"resolved": null}"# => ParseError::MissingField ; "null field")]
    #[test_case(br#"{"other": "1.0000000000"}"# => ParseError::MissingField ; "wrong field")]
    #[test_case(br#"{"resolved": "0.0000000000"}"# => ParseError::ZeroTimestamp ; "zero nanos")]
    #[test_case(br#"{"resolved": "0.0000000042"}"# => ParseError::ZeroTimestamp ; "zero nanos with logical")]
    fn test_parse_rejects(payload: &[u8]) -> ParseError {
        parse_resolved_line(payload, "endpoint.sql").unwrap_err()
    }

    #[test_case(br#""resolved": "1586020760120222000"}"# ; "broken envelope")]
    #[test_case(b"" ; "empty payload")]
    #[test_case(br#"["1.0000000000"]"# ; "array payload")]
    #[test_case(br#"{"resolved": 1586020760120222000}"# ; "numeric field")]
    #[test_case(br#"{"resolved": "1586020760120222000"}"# ; "no separator")]
    #[test_case(br#"{"resolved": "1.2.3"}"# ; "two separators")]
    #[test_case(br#"{"resolved": ".0000000000"}"# ; "empty nanos")]
    #[test_case(br#"{"resolved": "15.x"}"# ; "non numeric logical")]
    #[test_case(br#"{"resolved": "-15.0000000000"}"# ; "negative nanos")]
    #[test_case(br#"{"resolved": "15.00000000001"}"# ; "logical too wide")]
    #[test_case(br#"{"resolved": "99999999999999999999.0000000000"}"# ; "nanos overflow")]
    fn test_parse_malformed(payload: &[u8]) {
        assert!(matches!(
            parse_resolved_line(payload, "endpoint.sql"),
            Err(ParseError::MalformedTimestamp(_))
        ));
    }

    #[test_case("1.0000000000", 1, 0)]
    #[test_case("9223372036854775807.9999999999", i64::MAX, 9_999_999_999)]
    #[test_case("1586020760120222000.0000000017", 1586020760120222000, 17)]
    #[test_case("12.5", 12, 5 ; "unpadded logical")]
    fn test_parse_components(raw: &str, nanos: i64, logical: u64) {
        assert_eq!(
            parse_hlc_timestamp(raw).unwrap(),
            HlcTimestamp::new(nanos, logical)
        );
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let watermark = parse_resolved_line(
            br#"{"resolved": "7.0000000001", "updated": "x"}"#,
            "orders",
        )
        .unwrap();
        assert_eq!(watermark, ResolvedWatermark::new("orders", 7, 1));
    }
}
