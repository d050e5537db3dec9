//! `SQLite` schema definitions for roastlog.
//!
//! Records are stored as JSON bodies next to the few columns needed for
//! lookup and ordering.

/// SQL statement to create the bean templates table.
pub const CREATE_TEMPLATES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS templates (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the pending session slot. At most one row.
pub const CREATE_PENDING_SESSION_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS pending_session (
    slot INTEGER PRIMARY KEY CHECK (slot = 1),
    body TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the roast logs table.
pub const CREATE_ROAST_LOGS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS roast_logs (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    template_id TEXT NOT NULL,
    fingerprint TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create an index on `fingerprint` for deduplication.
pub const CREATE_FINGERPRINT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_roast_logs_fingerprint ON roast_logs(fingerprint)
";

/// SQL statement to create an index on `template_id` for per-bean listing.
pub const CREATE_TEMPLATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_roast_logs_template ON roast_logs(template_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_TEMPLATES_TABLE,
    CREATE_PENDING_SESSION_TABLE,
    CREATE_ROAST_LOGS_TABLE,
    CREATE_FINGERPRINT_INDEX,
    CREATE_TEMPLATE_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.trim().is_empty());
        }
    }

    #[test]
    fn test_pending_session_is_single_slot() {
        assert!(CREATE_PENDING_SESSION_TABLE.contains("CHECK (slot = 1)"));
    }

    #[test]
    fn test_roast_logs_table_columns() {
        assert!(CREATE_ROAST_LOGS_TABLE.contains("id TEXT NOT NULL UNIQUE"));
        assert!(CREATE_ROAST_LOGS_TABLE.contains("fingerprint TEXT NOT NULL"));
        assert!(CREATE_ROAST_LOGS_TABLE.contains("body TEXT NOT NULL"));
    }
}
