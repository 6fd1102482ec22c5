use std::collections::BTreeSet;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{decode_json, parse_id};
use crate::db::sqlite::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::DailyCheckIn;

const SELECT_COLUMNS: &str = "SELECT id, mood_value, energy_value, selected_emotion, journal_text,
     factors, affirmation, created_at FROM daily_checkins";

/// Appends a check-in for `owner_id`. Returns the generated UUID.
pub fn insert_checkin(
    conn: &Connection,
    owner_id: &str,
    checkin: &DailyCheckIn,
) -> Result<Uuid, DatabaseError> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO daily_checkins (id, owner_id, mood_value, energy_value,
         selected_emotion, journal_text, factors, affirmation, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id.to_string(),
            owner_id,
            checkin.mood_value,
            checkin.energy_value,
            checkin.selected_emotion,
            checkin.journal_text,
            serde_json::to_string(&checkin.factors)?,
            checkin.affirmation,
            format_timestamp(&checkin.created_at),
        ],
    )?;
    Ok(id)
}

/// Most recent check-in for `owner_id` by creation time.
pub fn get_latest_checkin(
    conn: &Connection,
    owner_id: &str,
) -> Result<Option<DailyCheckIn>, DatabaseError> {
    let sql = format!("{SELECT_COLUMNS} WHERE owner_id = ?1 ORDER BY created_at DESC LIMIT 1");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![owner_id], map_row)?;
    Ok(checkin_rows_to_vec(rows)?.into_iter().next())
}

/// Full history for `owner_id`, oldest first.
pub fn list_checkins(conn: &Connection, owner_id: &str) -> Result<Vec<DailyCheckIn>, DatabaseError> {
    let sql = format!("{SELECT_COLUMNS} WHERE owner_id = ?1 ORDER BY created_at ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![owner_id], map_row)?;
    checkin_rows_to_vec(rows)
}

type CheckInRow = (
    String, Option<f64>, Option<f64>, Option<String>,
    Option<String>, String, Option<String>, String,
);

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CheckInRow> {
    Ok((
        row.get::<_, String>(0)?,
        row.get::<_, Option<f64>>(1)?,
        row.get::<_, Option<f64>>(2)?,
        row.get::<_, Option<String>>(3)?,
        row.get::<_, Option<String>>(4)?,
        row.get::<_, String>(5)?,
        row.get::<_, Option<String>>(6)?,
        row.get::<_, String>(7)?,
    ))
}

fn checkin_rows_to_vec(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<CheckInRow>>,
) -> Result<Vec<DailyCheckIn>, DatabaseError> {
    let mut checkins = Vec::new();
    for row in rows {
        let (
            id, mood_value, energy_value, selected_emotion,
            journal_text, factors, affirmation, created_at,
        ) = row?;
        checkins.push(DailyCheckIn {
            id: Some(parse_id(&id)?),
            mood_value,
            energy_value,
            selected_emotion,
            journal_text,
            factors: decode_json::<BTreeSet<String>>(&factors)?,
            affirmation,
            created_at: parse_timestamp(&created_at)?,
        });
    }
    Ok(checkins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use chrono::{Duration, TimeZone, Utc};

    fn test_db() -> Connection {
        open_memory_database().expect("in-memory DB")
    }

    fn make_checkin(emotion: &str, hours_ago: i64) -> DailyCheckIn {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let mut c = DailyCheckIn::new(now - Duration::hours(hours_ago));
        c.mood_value = Some(0.7);
        c.energy_value = Some(0.5);
        c.selected_emotion = Some(emotion.into());
        c
    }

    #[test]
    fn insert_then_fetch_latest() {
        let conn = test_db();
        let mut checkin = make_checkin("Calm", 0);
        checkin.journal_text = Some("In this moment... quiet".into());
        checkin.factors.insert("Meditated".into());
        checkin.affirmation = Some("My Love is my greatest quality as a mother.".into());
        let id = insert_checkin(&conn, "user-1", &checkin).unwrap();

        let latest = get_latest_checkin(&conn, "user-1").unwrap().unwrap();
        assert_eq!(latest.id, Some(id));
        assert_eq!(latest.selected_emotion.as_deref(), Some("Calm"));
        assert_eq!(latest.mood_value, Some(0.7));
        assert!(latest.factors.contains("Meditated"));
        assert_eq!(latest.affirmation, checkin.affirmation);
    }

    #[test]
    fn optional_fields_stay_none() {
        let conn = test_db();
        let bare = DailyCheckIn::new(Utc::now());
        insert_checkin(&conn, "user-1", &bare).unwrap();

        let latest = get_latest_checkin(&conn, "user-1").unwrap().unwrap();
        assert!(latest.selected_emotion.is_none());
        assert!(latest.journal_text.is_none());
        assert!(latest.factors.is_empty());
    }

    #[test]
    fn latest_prefers_newest_timestamp() {
        let conn = test_db();
        insert_checkin(&conn, "user-1", &make_checkin("Sad", 1)).unwrap();
        insert_checkin(&conn, "user-1", &make_checkin("Happy", 30)).unwrap();

        let latest = get_latest_checkin(&conn, "user-1").unwrap().unwrap();
        assert_eq!(latest.selected_emotion.as_deref(), Some("Sad"));
    }

    #[test]
    fn empty_history_has_no_latest() {
        let conn = test_db();
        assert!(get_latest_checkin(&conn, "user-1").unwrap().is_none());
        assert!(list_checkins(&conn, "user-1").unwrap().is_empty());
    }

    #[test]
    fn list_is_oldest_first_and_owner_scoped() {
        let conn = test_db();
        insert_checkin(&conn, "user-1", &make_checkin("Happy", 2)).unwrap();
        insert_checkin(&conn, "user-1", &make_checkin("Sad", 48)).unwrap();
        insert_checkin(&conn, "user-2", &make_checkin("Calm", 1)).unwrap();

        let emotions: Vec<String> = list_checkins(&conn, "user-1")
            .unwrap()
            .into_iter()
            .filter_map(|c| c.selected_emotion)
            .collect();
        assert_eq!(emotions, vec!["Sad", "Happy"]);
        assert_eq!(list_checkins(&conn, "user-2").unwrap().len(), 1);
    }
}
