//! Backing table naming

use crate::domain::{ResolvedError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Default schema holding the resolved table
pub const DEFAULT_SCHEMA: &str = "_cdc_sink";

/// Default resolved table name
pub const DEFAULT_TABLE: &str = "resolved";

/// PostgreSQL truncates identifiers longer than this
const MAX_IDENTIFIER_LEN: usize = 63;

/// Schema-qualified name of the resolved table
///
/// Both parts are validated as plain SQL identifiers, so the rendered name can
/// be interpolated into DDL and DML without quoting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    schema: String,
    table: String,
}

impl TableName {
    /// Create a validated table name
    ///
    /// # Errors
    ///
    /// Returns a validation error if either part is not a plain identifier.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Result<Self> {
        let schema = schema.into();
        let table = table.into();
        validate_identifier("schema", &schema)?;
        validate_identifier("table", &table)?;
        Ok(Self { schema, table })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// The `schema.table` form used in SQL and by administrative tooling
    pub fn fully_qualified(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

fn validate_identifier(kind: &str, value: &str) -> Result<()> {
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(ResolvedError::Validation(format!(
            "{kind} name '{value}' is longer than {MAX_IDENTIFIER_LEN} bytes"
        )));
    }
    if !identifier_pattern().is_match(value) {
        return Err(ResolvedError::Validation(format!(
            "{kind} name '{value}' must match [A-Za-z_][A-Za-z0-9_]*"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_name() {
        let name = TableName::default();
        assert_eq!(name.fully_qualified(), "_cdc_sink.resolved");
        assert_eq!(name.to_string(), name.fully_qualified());
    }

    #[test]
    fn test_valid_identifiers() {
        let name = TableName::new("public", "Resolved_2").unwrap();
        assert_eq!(name.schema(), "public");
        assert_eq!(name.table(), "Resolved_2");
    }

    #[test]
    fn test_rejects_injection() {
        assert!(TableName::new("public", "resolved; DROP TABLE x").is_err());
        assert!(TableName::new("pub.lic", "resolved").is_err());
        assert!(TableName::new("", "resolved").is_err());
        assert!(TableName::new("public", "1resolved").is_err());
    }

    #[test]
    fn test_rejects_long_identifier() {
        let long = "a".repeat(64);
        assert!(TableName::new("public", long).is_err());
        assert!(TableName::new("public", "a".repeat(63)).is_ok());
    }
}
