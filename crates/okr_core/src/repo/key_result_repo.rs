//! Key result persistence.
//!
//! # Responsibility
//! - CRUD over `key_results` rows.
//! - Keep the "top key result" flag unique per department.
//!
//! # Invariants
//! - Write paths call `KeyResult::validate()` before SQL mutations.
//! - At most one row per department has `is_top = 1`.

use crate::model::key_result::{Direction, KeyResult, KeyResultId, UnitType};
use crate::model::org::{DepartmentId, ObjectiveId};
use crate::repo::common::{
    bool_from_db, ensure_repo_connection_ready, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const KEY_RESULT_SELECT_SQL: &str = "SELECT
    kr.uuid,
    kr.objective_uuid,
    kr.title,
    kr.current_value,
    kr.target_value,
    kr.baseline_value,
    kr.direction,
    kr.unit_type,
    kr.value_label,
    kr.is_top
FROM key_results kr";

pub trait KeyResultRepository {
    fn create_key_result(&self, key_result: &KeyResult) -> RepoResult<KeyResultId>;
    /// Replaces every editable column; `is_top` is left untouched.
    fn update_key_result(&self, key_result: &KeyResult) -> RepoResult<()>;
    fn get_key_result(&self, id: KeyResultId) -> RepoResult<Option<KeyResult>>;
    fn list_by_objective(&self, objective_uuid: ObjectiveId) -> RepoResult<Vec<KeyResult>>;
    fn list_by_department(&self, department_uuid: DepartmentId) -> RepoResult<Vec<KeyResult>>;
    /// Flags one key result as its department's top KR, clearing any other.
    fn set_top(&self, id: KeyResultId) -> RepoResult<DepartmentId>;
    fn top_for_department(&self, department_uuid: DepartmentId) -> RepoResult<Option<KeyResult>>;
}

pub struct SqliteKeyResultRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyResultRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_repo_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_many(&self, sql: &str, key: String) -> RepoResult<Vec<KeyResult>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([key])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_key_result_row(row)?);
        }
        Ok(items)
    }
}

impl KeyResultRepository for SqliteKeyResultRepository<'_> {
    fn create_key_result(&self, key_result: &KeyResult) -> RepoResult<KeyResultId> {
        key_result.validate()?;

        let objective_exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM objectives WHERE uuid = ?1);",
            [key_result.objective_uuid.to_string()],
            |row| row.get(0),
        )?;
        if objective_exists == 0 {
            return Err(RepoError::NotFound {
                entity: "objective",
                id: key_result.objective_uuid,
            });
        }

        self.conn.execute(
            "INSERT INTO key_results (
                uuid,
                objective_uuid,
                title,
                current_value,
                target_value,
                baseline_value,
                direction,
                unit_type,
                value_label,
                is_top
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0);",
            params![
                key_result.uuid.to_string(),
                key_result.objective_uuid.to_string(),
                key_result.title.trim(),
                key_result.current_value,
                key_result.target_value,
                key_result.baseline_value,
                key_result.direction.as_str(),
                key_result.unit_type.as_str(),
                key_result.value_label.as_deref(),
            ],
        )?;
        Ok(key_result.uuid)
    }

    fn update_key_result(&self, key_result: &KeyResult) -> RepoResult<()> {
        key_result.validate()?;

        let changed = self.conn.execute(
            "UPDATE key_results
             SET title = ?2,
                 current_value = ?3,
                 target_value = ?4,
                 baseline_value = ?5,
                 direction = ?6,
                 unit_type = ?7,
                 value_label = ?8,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                key_result.uuid.to_string(),
                key_result.title.trim(),
                key_result.current_value,
                key_result.target_value,
                key_result.baseline_value,
                key_result.direction.as_str(),
                key_result.unit_type.as_str(),
                key_result.value_label.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "key result",
                id: key_result.uuid,
            });
        }
        Ok(())
    }

    fn get_key_result(&self, id: KeyResultId) -> RepoResult<Option<KeyResult>> {
        let sql = format!("{KEY_RESULT_SELECT_SQL} WHERE kr.uuid = ?1;");
        let mut stmt = self.conn.prepare(&sql)?;
        let found = stmt
            .query_row([id.to_string()], |row| Ok(parse_key_result_row(row)))
            .optional()?;
        found.transpose()
    }

    fn list_by_objective(&self, objective_uuid: ObjectiveId) -> RepoResult<Vec<KeyResult>> {
        let sql = format!(
            "{KEY_RESULT_SELECT_SQL}
             WHERE kr.objective_uuid = ?1
             ORDER BY kr.created_at ASC, kr.rowid ASC;"
        );
        self.query_many(&sql, objective_uuid.to_string())
    }

    fn list_by_department(&self, department_uuid: DepartmentId) -> RepoResult<Vec<KeyResult>> {
        let sql = format!(
            "{KEY_RESULT_SELECT_SQL}
             INNER JOIN objectives o ON o.uuid = kr.objective_uuid
             WHERE o.department_uuid = ?1
             ORDER BY o.created_at ASC, o.rowid ASC, kr.created_at ASC, kr.rowid ASC;"
        );
        self.query_many(&sql, department_uuid.to_string())
    }

    fn set_top(&self, id: KeyResultId) -> RepoResult<DepartmentId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let department_text: Option<String> = tx
            .query_row(
                "SELECT o.department_uuid
                 FROM key_results kr
                 INNER JOIN objectives o ON o.uuid = kr.objective_uuid
                 WHERE kr.uuid = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let department_text = department_text.ok_or(RepoError::NotFound {
            entity: "key result",
            id,
        })?;

        tx.execute(
            "UPDATE key_results
             SET is_top = 0,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE is_top = 1
               AND uuid != ?2
               AND objective_uuid IN (
                 SELECT uuid FROM objectives WHERE department_uuid = ?1
               );",
            params![department_text, id.to_string()],
        )?;
        tx.execute(
            "UPDATE key_results
             SET is_top = 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        tx.commit()?;

        parse_uuid(&department_text, "objectives.department_uuid").map_err(RepoError::InvalidData)
    }

    fn top_for_department(&self, department_uuid: DepartmentId) -> RepoResult<Option<KeyResult>> {
        let sql = format!(
            "{KEY_RESULT_SELECT_SQL}
             INNER JOIN objectives o ON o.uuid = kr.objective_uuid
             WHERE o.department_uuid = ?1
               AND kr.is_top = 1
             LIMIT 1;"
        );
        Ok(self
            .query_many(&sql, department_uuid.to_string())?
            .into_iter()
            .next())
    }
}

fn parse_key_result_row(row: &Row<'_>) -> RepoResult<KeyResult> {
    let uuid_text: String = row.get(0)?;
    let objective_text: String = row.get(1)?;
    let direction_text: String = row.get(6)?;
    let unit_text: String = row.get(7)?;

    let direction = Direction::parse(&direction_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid direction `{direction_text}` in key_results.direction"
        ))
    })?;
    let unit_type = UnitType::parse(&unit_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid unit type `{unit_text}` in key_results.unit_type"
        ))
    })?;

    Ok(KeyResult {
        uuid: parse_uuid(&uuid_text, "key_results.uuid").map_err(RepoError::InvalidData)?,
        objective_uuid: parse_uuid(&objective_text, "key_results.objective_uuid")
            .map_err(RepoError::InvalidData)?,
        title: row.get(2)?,
        current_value: row.get(3)?,
        target_value: row.get(4)?,
        baseline_value: row.get(5)?,
        direction,
        unit_type,
        value_label: row.get(8)?,
        is_top: bool_from_db(row.get(9)?, "key_results.is_top").map_err(RepoError::InvalidData)?,
    })
}
