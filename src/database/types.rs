//! SQLite value adapters

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use uuid::Uuid;

/// A UUID stored as lowercase hyphenated text
///
/// Keeps identifiers readable in the SQLite shell and comparable with plain
/// string literals in queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextUuid(pub Uuid);

impl From<Uuid> for TextUuid {
    fn from(value: Uuid) -> Self {
        TextUuid(value)
    }
}

impl From<TextUuid> for Uuid {
    fn from(value: TextUuid) -> Self {
        value.0
    }
}

impl ToSql for TextUuid {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.hyphenated().to_string()))
    }
}

impl FromSql for TextUuid {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Uuid::parse_str(text)
            .map(TextUuid)
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_stored_as_lowercase_text() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE ids (id TEXT NOT NULL)", []).unwrap();
        let id = Uuid::parse_str("6F9619FF-8B86-D011-B42D-00C04FC964FF").unwrap();

        conn.execute("INSERT INTO ids (id) VALUES (?1)", [TextUuid(id)]).unwrap();

        let raw: String = conn
            .query_row("SELECT id FROM ids", [], |row| row.get(0))
            .unwrap();
        assert_eq!(raw, "6f9619ff-8b86-d011-b42d-00c04fc964ff");

        let back: TextUuid = conn
            .query_row("SELECT id FROM ids", [], |row| row.get(0))
            .unwrap();
        assert_eq!(back.0, id);
    }

    #[test]
    fn test_reads_uppercase_text() {
        let conn = Connection::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        let upper = id.hyphenated().to_string().to_uppercase();

        let back: TextUuid = conn
            .query_row("SELECT ?1", [upper], |row| row.get(0))
            .unwrap();
        assert_eq!(Uuid::from(back), id);
    }

    #[test]
    fn test_rejects_non_uuid_text() {
        let conn = Connection::open_in_memory().unwrap();
        let result: rusqlite::Result<TextUuid> =
            conn.query_row("SELECT 'not-a-uuid'", [], |row| row.get(0));
        assert!(result.is_err());
    }
}
