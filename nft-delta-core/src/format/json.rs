use crate::delta::TableDelta;

/// Format a computed delta as JSON.
pub fn format_json(tables: &[TableDelta]) -> String {
    serde_json::to_string_pretty(tables).unwrap_or_else(|_| "[]".to_string())
}
