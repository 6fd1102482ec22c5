use std::collections::BTreeMap;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{decode_json, parse_id};
use crate::db::sqlite::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::EpdsAssessment;

const SELECT_COLUMNS: &str =
    "SELECT id, answers, total_score, additional_experiences, created_at FROM epds_assessments";

/// Appends an assessment for `owner_id`. Always a new row, even for a
/// record that already carries an id.
pub fn insert_assessment(
    conn: &Connection,
    owner_id: &str,
    assessment: &EpdsAssessment,
) -> Result<Uuid, DatabaseError> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO epds_assessments (id, owner_id, answers, total_score,
         additional_experiences, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id.to_string(),
            owner_id,
            serde_json::to_string(&assessment.answers)?,
            assessment.total_score,
            serde_json::to_string(&assessment.additional_experiences)?,
            format_timestamp(&assessment.created_at),
        ],
    )?;
    Ok(id)
}

/// Most recent assessment for `owner_id` by creation time.
pub fn get_latest_assessment(
    conn: &Connection,
    owner_id: &str,
) -> Result<Option<EpdsAssessment>, DatabaseError> {
    let sql = format!("{SELECT_COLUMNS} WHERE owner_id = ?1 ORDER BY created_at DESC LIMIT 1");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![owner_id], map_row)?;
    Ok(assessment_rows_to_vec(rows)?.into_iter().next())
}

/// Full history for `owner_id`, oldest first.
pub fn list_assessments(
    conn: &Connection,
    owner_id: &str,
) -> Result<Vec<EpdsAssessment>, DatabaseError> {
    let sql = format!("{SELECT_COLUMNS} WHERE owner_id = ?1 ORDER BY created_at ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![owner_id], map_row)?;
    assessment_rows_to_vec(rows)
}

type AssessmentRow = (String, String, u32, String, String);

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssessmentRow> {
    Ok((
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, u32>(2)?,
        row.get::<_, String>(3)?,
        row.get::<_, String>(4)?,
    ))
}

fn assessment_rows_to_vec(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<AssessmentRow>>,
) -> Result<Vec<EpdsAssessment>, DatabaseError> {
    let mut assessments = Vec::new();
    for row in rows {
        let (id, answers, total_score, experiences, created_at) = row?;
        assessments.push(EpdsAssessment {
            id: Some(parse_id(&id)?),
            answers: decode_json::<BTreeMap<String, u8>>(&answers)?,
            total_score,
            additional_experiences: decode_json(&experiences)?,
            created_at: parse_timestamp(&created_at)?,
        });
    }
    Ok(assessments)
}
