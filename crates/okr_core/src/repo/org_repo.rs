//! Department and objective persistence.

use crate::model::org::{Department, DepartmentId, Objective, ObjectiveId};
use crate::repo::common::{ensure_repo_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

pub trait OrgRepository {
    fn create_department(&self, name: &str) -> RepoResult<Department>;
    fn list_departments(&self) -> RepoResult<Vec<Department>>;
    fn create_objective(&self, department_uuid: DepartmentId, title: &str)
        -> RepoResult<Objective>;
    fn get_objective(&self, objective_uuid: ObjectiveId) -> RepoResult<Option<Objective>>;
    fn list_objectives(&self, department_uuid: DepartmentId) -> RepoResult<Vec<Objective>>;
}

pub struct SqliteOrgRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrgRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_repo_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn department_exists(&self, department_uuid: DepartmentId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM departments WHERE uuid = ?1);",
            [department_uuid.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl OrgRepository for SqliteOrgRepository<'_> {
    fn create_department(&self, name: &str) -> RepoResult<Department> {
        let department = Department {
            uuid: Uuid::new_v4(),
            name: normalize_name(name, "department name")?,
        };
        self.conn.execute(
            "INSERT INTO departments (uuid, name) VALUES (?1, ?2);",
            params![department.uuid.to_string(), department.name],
        )?;
        Ok(department)
    }

    fn list_departments(&self) -> RepoResult<Vec<Department>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name
             FROM departments
             ORDER BY name ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            items.push(Department {
                uuid: parse_uuid(&uuid_text, "departments.uuid").map_err(RepoError::InvalidData)?,
                name: row.get(1)?,
            });
        }
        Ok(items)
    }

    fn create_objective(
        &self,
        department_uuid: DepartmentId,
        title: &str,
    ) -> RepoResult<Objective> {
        let title = normalize_name(title, "objective title")?;
        if !self.department_exists(department_uuid)? {
            return Err(RepoError::NotFound {
                entity: "department",
                id: department_uuid,
            });
        }
        let objective = Objective {
            uuid: Uuid::new_v4(),
            department_uuid,
            title,
        };
        self.conn.execute(
            "INSERT INTO objectives (uuid, department_uuid, title) VALUES (?1, ?2, ?3);",
            params![
                objective.uuid.to_string(),
                department_uuid.to_string(),
                objective.title
            ],
        )?;
        Ok(objective)
    }

    fn get_objective(&self, objective_uuid: ObjectiveId) -> RepoResult<Option<Objective>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, department_uuid, title
             FROM objectives
             WHERE uuid = ?1;",
        )?;
        let found = stmt
            .query_row([objective_uuid.to_string()], |row| Ok(raw_objective(row)))
            .optional()?;
        found.transpose()
    }

    fn list_objectives(&self, department_uuid: DepartmentId) -> RepoResult<Vec<Objective>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, department_uuid, title
             FROM objectives
             WHERE department_uuid = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([department_uuid.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(raw_objective(row)?);
        }
        Ok(items)
    }
}

fn raw_objective(row: &Row<'_>) -> RepoResult<Objective> {
    let uuid_text: String = row.get(0)?;
    let department_text: String = row.get(1)?;
    Ok(Objective {
        uuid: parse_uuid(&uuid_text, "objectives.uuid").map_err(RepoError::InvalidData)?,
        department_uuid: parse_uuid(&department_text, "objectives.department_uuid")
            .map_err(RepoError::InvalidData)?,
        title: row.get(2)?,
    })
}

fn normalize_name(value: &str, field: &'static str) -> RepoResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RepoError::BlankField(field));
    }
    Ok(trimmed.to_string())
}
