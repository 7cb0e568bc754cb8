//! Project and task persistence.
//!
//! # Responsibility
//! - Create projects/tasks at the end of their sibling order.
//! - Read projects and tasks in display order and join them through
//!   [`ProjectWithTasks::assemble`].
//!
//! # Invariants
//! - New records receive `max(display_order) + 1` within their scope.
//! - Listings are ordered `display_order ASC, uuid ASC`.

use crate::model::order::{next_display_order, OrderScope};
use crate::model::org::{DepartmentId, ObjectiveId};
use crate::model::project::{Project, ProjectId, ProjectWithTasks, ScheduleInput, Task};
use crate::repo::common::{
    ensure_repo_connection_ready, parse_optional_uuid, parse_uuid, RepoError, RepoResult,
};
use crate::repo::order_repo::{list_scope_entries, OrderRepoError};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    department_uuid,
    objective_uuid,
    name,
    dri,
    start_date,
    end_date,
    display_order
FROM projects";

const TASK_SELECT_SQL: &str = "SELECT
    t.uuid,
    t.project_uuid,
    t.title,
    t.start_date,
    t.end_date,
    t.display_order
FROM tasks t";

/// Creation input for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProject {
    pub department_uuid: DepartmentId,
    pub objective_uuid: Option<ObjectiveId>,
    pub dri: Option<String>,
    pub schedule: ScheduleInput,
}

pub trait ProjectRepository {
    fn create_project(&self, input: &NewProject) -> RepoResult<Project>;
    fn create_task(&self, project_uuid: ProjectId, input: &ScheduleInput) -> RepoResult<Task>;
    fn get_project(&self, project_uuid: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self, department_uuid: DepartmentId) -> RepoResult<Vec<Project>>;
    fn list_tasks(&self, project_uuid: ProjectId) -> RepoResult<Vec<Task>>;
    /// Projects (all departments when `None`) with their ordered tasks.
    fn list_projects_with_tasks(
        &self,
        department_uuid: Option<DepartmentId>,
    ) -> RepoResult<Vec<ProjectWithTasks>>;
}

pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_repo_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, input: &NewProject) -> RepoResult<Project> {
        let name = input.schedule.validate()?;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        ensure_exists(&tx, "departments", "department", input.department_uuid)?;
        if let Some(objective_uuid) = input.objective_uuid {
            ensure_exists(&tx, "objectives", "objective", objective_uuid)?;
        }

        let project = Project {
            uuid: Uuid::new_v4(),
            department_uuid: input.department_uuid,
            objective_uuid: input.objective_uuid,
            name,
            dri: input
                .dri
                .as_deref()
                .map(str::trim)
                .filter(|dri| !dri.is_empty())
                .map(str::to_string),
            start_date: input.schedule.start_date,
            end_date: input.schedule.end_date,
            display_order: append_order(&tx, OrderScope::Department(input.department_uuid))?,
        };
        tx.execute(
            "INSERT INTO projects (
                uuid,
                department_uuid,
                objective_uuid,
                name,
                dri,
                start_date,
                end_date,
                display_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                project.uuid.to_string(),
                project.department_uuid.to_string(),
                project.objective_uuid.map(|id| id.to_string()),
                project.name,
                project.dri,
                project.start_date,
                project.end_date,
                project.display_order,
            ],
        )?;
        tx.commit()?;
        Ok(project)
    }

    fn create_task(&self, project_uuid: ProjectId, input: &ScheduleInput) -> RepoResult<Task> {
        let title = input.validate()?;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_exists(&tx, "projects", "project", project_uuid)?;

        let task = Task {
            uuid: Uuid::new_v4(),
            project_uuid,
            title,
            start_date: input.start_date,
            end_date: input.end_date,
            display_order: append_order(&tx, OrderScope::Project(project_uuid))?,
        };
        tx.execute(
            "INSERT INTO tasks (
                uuid,
                project_uuid,
                title,
                start_date,
                end_date,
                display_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                task.uuid.to_string(),
                project_uuid.to_string(),
                task.title,
                task.start_date,
                task.end_date,
                task.display_order,
            ],
        )?;
        tx.commit()?;
        Ok(task)
    }

    fn get_project(&self, project_uuid: ProjectId) -> RepoResult<Option<Project>> {
        let sql = format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;");
        let mut stmt = self.conn.prepare(&sql)?;
        let found = stmt
            .query_row([project_uuid.to_string()], |row| Ok(parse_project_row(row)))
            .optional()?;
        found.transpose()
    }

    fn list_projects(&self, department_uuid: DepartmentId) -> RepoResult<Vec<Project>> {
        let sql = format!(
            "{PROJECT_SELECT_SQL}
             WHERE department_uuid = ?1
             ORDER BY display_order ASC, uuid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([department_uuid.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_project_row(row)?);
        }
        Ok(items)
    }

    fn list_tasks(&self, project_uuid: ProjectId) -> RepoResult<Vec<Task>> {
        let sql = format!(
            "{TASK_SELECT_SQL}
             WHERE t.project_uuid = ?1
             ORDER BY t.display_order ASC, t.uuid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([project_uuid.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_task_row(row)?);
        }
        Ok(items)
    }

    fn list_projects_with_tasks(
        &self,
        department_uuid: Option<DepartmentId>,
    ) -> RepoResult<Vec<ProjectWithTasks>> {
        let (projects, tasks) = match department_uuid {
            Some(department_uuid) => {
                let projects = self.list_projects(department_uuid)?;
                let sql = format!(
                    "{TASK_SELECT_SQL}
                     INNER JOIN projects p ON p.uuid = t.project_uuid
                     WHERE p.department_uuid = ?1
                     ORDER BY t.display_order ASC, t.uuid ASC;"
                );
                let tasks = query_tasks(self.conn, &sql, Some(department_uuid))?;
                (projects, tasks)
            }
            None => {
                let sql = format!(
                    "{PROJECT_SELECT_SQL}
                     ORDER BY department_uuid ASC, display_order ASC, uuid ASC;"
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let mut rows = stmt.query([])?;
                let mut projects = Vec::new();
                while let Some(row) = rows.next()? {
                    projects.push(parse_project_row(row)?);
                }
                let sql = format!("{TASK_SELECT_SQL} ORDER BY t.display_order ASC, t.uuid ASC;");
                let tasks = query_tasks(self.conn, &sql, None)?;
                (projects, tasks)
            }
        };
        Ok(ProjectWithTasks::assemble(projects, tasks))
    }
}

fn query_tasks(
    conn: &Connection,
    sql: &str,
    department_uuid: Option<DepartmentId>,
) -> RepoResult<Vec<Task>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = match department_uuid {
        Some(department_uuid) => stmt.query([department_uuid.to_string()])?,
        None => stmt.query([])?,
    };
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_task_row(row)?);
    }
    Ok(items)
}

fn append_order(conn: &Connection, scope: OrderScope) -> RepoResult<i64> {
    let entries = list_scope_entries(conn, scope).map_err(|err| match err {
        OrderRepoError::Db(err) => RepoError::Db(err),
        other => RepoError::InvalidData(other.to_string()),
    })?;
    Ok(next_display_order(
        entries.iter().map(|entry| entry.display_order),
    ))
}

fn ensure_exists(
    conn: &Connection,
    table: &'static str,
    entity: &'static str,
    id: Uuid,
) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE uuid = ?1);"),
        [id.to_string()],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RepoError::NotFound { entity, id });
    }
    Ok(())
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid_text: String = row.get(0)?;
    let department_text: String = row.get(1)?;
    Ok(Project {
        uuid: parse_uuid(&uuid_text, "projects.uuid").map_err(RepoError::InvalidData)?,
        department_uuid: parse_uuid(&department_text, "projects.department_uuid")
            .map_err(RepoError::InvalidData)?,
        objective_uuid: parse_optional_uuid(row.get(2)?, "projects.objective_uuid")
            .map_err(RepoError::InvalidData)?,
        name: row.get(3)?,
        dri: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        display_order: row.get(7)?,
    })
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get(0)?;
    let project_text: String = row.get(1)?;
    Ok(Task {
        uuid: parse_uuid(&uuid_text, "tasks.uuid").map_err(RepoError::InvalidData)?,
        project_uuid: parse_uuid(&project_text, "tasks.project_uuid")
            .map_err(RepoError::InvalidData)?,
        title: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        display_order: row.get(5)?,
    })
}
