//! Shared repository error type and row-mapping helpers.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::key_result::KeyResultValidationError;
use crate::model::project::ScheduleValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for organization, key result and project repositories.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    KeyResultValidation(KeyResultValidationError),
    ScheduleValidation(ScheduleValidationError),
    /// Required text field is blank after trim.
    BlankField(&'static str),
    NotFound {
        entity: &'static str,
        id: Uuid,
    },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::KeyResultValidation(err) => write!(f, "{err}"),
            Self::ScheduleValidation(err) => write!(f, "{err}"),
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::KeyResultValidation(err) => Some(err),
            Self::ScheduleValidation(err) => Some(err),
            Self::BlankField(_)
            | Self::NotFound { .. }
            | Self::UninitializedConnection { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<KeyResultValidationError> for RepoError {
    fn from(value: KeyResultValidationError) -> Self {
        Self::KeyResultValidation(value)
    }
}

impl From<ScheduleValidationError> for RepoError {
    fn from(value: ScheduleValidationError) -> Self {
        Self::ScheduleValidation(value)
    }
}

/// Returns `Some(actual)` when the connection is not at the latest schema.
pub(crate) fn schema_version_mismatch(conn: &Connection) -> rusqlite::Result<Option<u32>> {
    let actual: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok((actual != latest_version()).then_some(actual))
}

pub(crate) fn ensure_repo_connection_ready(conn: &Connection) -> RepoResult<()> {
    match schema_version_mismatch(conn)? {
        None => Ok(()),
        Some(actual_version) => Err(RepoError::UninitializedConnection {
            expected_version: latest_version(),
            actual_version,
        }),
    }
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> Result<Uuid, String> {
    Uuid::parse_str(value).map_err(|_| format!("invalid uuid `{value}` in {column}"))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    column: &'static str,
) -> Result<Option<Uuid>, String> {
    value.map(|value| parse_uuid(&value, column)).transpose()
}

pub(crate) fn bool_from_db(value: i64, column: &'static str) -> Result<bool, String> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(format!("invalid boolean `{other}` in {column}")),
    }
}
