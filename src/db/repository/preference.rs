use rusqlite::{params, Connection};

use crate::db::DatabaseError;

/// Get a user preference by key. Returns None if not set.
pub fn get_user_preference(
    conn: &Connection,
    key: &str,
) -> Result<Option<String>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT value FROM user_preferences WHERE key = ?1")?;
    match stmt.query_row([key], |row| row.get::<_, String>(0)) {
        Ok(val) => Ok(Some(val)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// Set a user preference (upsert).
pub fn set_user_preference(
    conn: &Connection,
    key: &str,
    value: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO user_preferences (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
        params![key, value],
    )?;
    Ok(())
}

/// Boolean preference stored as "true"/"false"; unset or unparsable reads as `default`.
pub fn get_bool_preference(
    conn: &Connection,
    key: &str,
    default: bool,
) -> Result<bool, DatabaseError> {
    Ok(get_user_preference(conn, key)?
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(default))
}

pub fn set_bool_preference(conn: &Connection, key: &str, value: bool) -> Result<(), DatabaseError> {
    set_user_preference(conn, key, if value { "true" } else { "false" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn unset_preference_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_user_preference(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn set_overwrites_previous_value() {
        let conn = open_memory_database().unwrap();
        set_user_preference(&conn, "k", "a").unwrap();
        set_user_preference(&conn, "k", "b").unwrap();
        assert_eq!(get_user_preference(&conn, "k").unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn bool_preference_defaults_when_unset() {
        let conn = open_memory_database().unwrap();
        assert!(get_bool_preference(&conn, "show_intro", true).unwrap());
        set_bool_preference(&conn, "show_intro", false).unwrap();
        assert!(!get_bool_preference(&conn, "show_intro", true).unwrap());
    }
}
