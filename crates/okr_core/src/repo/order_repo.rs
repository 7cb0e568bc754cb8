//! Sibling ordering repository over `display_order` columns.
//!
//! # Responsibility
//! - Read the ordered siblings of one scope (projects of a department, tasks
//!   of a project).
//! - Apply step swaps and batch rewrites atomically.
//!
//! # Invariants
//! - Scope listing is deterministic: `display_order ASC, uuid ASC`.
//! - A step move swaps exactly two rows or none.
//! - A batch rewrite updates every listed row or none.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::order::{next_display_order, MoveDirection, MoveOutcome, OrderEntry, OrderScope};
use crate::repo::common::{parse_uuid, schema_version_mismatch};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type OrderRepoResult<T> = Result<T, OrderRepoError>;

/// Errors from ordering repository operations.
#[derive(Debug)]
pub enum OrderRepoError {
    /// Underlying SQLite error; any open transaction was rolled back.
    Db(DbError),
    /// Record does not exist inside the given scope.
    RecordNotFound { scope: OrderScope, id: Uuid },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for OrderRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::RecordNotFound { scope, id } => {
                write!(f, "record {id} not found in scope {scope}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "order repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid order data: {message}"),
        }
    }
}

impl Error for OrderRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::RecordNotFound { .. } => None,
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for OrderRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for OrderRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for sibling ordering.
pub trait OrderRepository {
    /// Lists `(id, display_order)` of every record in the scope, in order.
    fn list_scope(&self, scope: OrderScope) -> OrderRepoResult<Vec<OrderEntry>>;
    /// Order a newly appended record in this scope would receive.
    fn next_display_order(&self, scope: OrderScope) -> OrderRepoResult<i64>;
    /// Swaps a record with its immediate neighbor in `direction`.
    fn step_move(
        &self,
        scope: OrderScope,
        id: Uuid,
        direction: MoveDirection,
    ) -> OrderRepoResult<MoveOutcome>;
    /// Writes every entry's `display_order` in one transaction.
    fn rewrite_orders(&self, scope: OrderScope, entries: &[OrderEntry]) -> OrderRepoResult<()>;
}

/// SQLite-backed ordering repository.
pub struct SqliteOrderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrderRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> OrderRepoResult<Self> {
        if let Some(actual_version) = schema_version_mismatch(conn)? {
            return Err(OrderRepoError::UninitializedConnection {
                expected_version: latest_version(),
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl OrderRepository for SqliteOrderRepository<'_> {
    fn list_scope(&self, scope: OrderScope) -> OrderRepoResult<Vec<OrderEntry>> {
        list_scope_entries(self.conn, scope)
    }

    fn next_display_order(&self, scope: OrderScope) -> OrderRepoResult<i64> {
        let entries = list_scope_entries(self.conn, scope)?;
        Ok(next_display_order(
            entries.iter().map(|entry| entry.display_order),
        ))
    }

    fn step_move(
        &self,
        scope: OrderScope,
        id: Uuid,
        direction: MoveDirection,
    ) -> OrderRepoResult<MoveOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let current_order = load_order(&tx, scope, id)?
            .ok_or(OrderRepoError::RecordNotFound { scope, id })?;
        let Some(neighbor) = load_neighbor(&tx, scope, current_order, direction)? else {
            // Dropping the transaction rolls back; nothing was written.
            return Ok(MoveOutcome::AtBoundary);
        };

        write_order(&tx, scope, id, neighbor.display_order)?;
        write_order(&tx, scope, neighbor.id, current_order)?;
        tx.commit()?;

        Ok(MoveOutcome::Swapped {
            neighbor: neighbor.id,
        })
    }

    fn rewrite_orders(&self, scope: OrderScope, entries: &[OrderEntry]) -> OrderRepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for entry in entries {
            if write_order(&tx, scope, entry.id, entry.display_order)? == 0 {
                return Err(OrderRepoError::RecordNotFound {
                    scope,
                    id: entry.id,
                });
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// Ordered `(id, display_order)` pairs of one scope.
///
/// Shared with record creation so appends use the same ordering view.
pub(crate) fn list_scope_entries(
    conn: &Connection,
    scope: OrderScope,
) -> OrderRepoResult<Vec<OrderEntry>> {
    let sql = format!(
        "SELECT uuid, display_order
         FROM {table}
         WHERE {parent} = ?1
         ORDER BY display_order ASC, uuid ASC;",
        table = scope.table(),
        parent = scope.parent_column(),
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([scope.parent_uuid().to_string()])?;

    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get(0)?;
        let id = parse_uuid(&id_text, "display_order.uuid").map_err(OrderRepoError::InvalidData)?;
        entries.push(OrderEntry::new(id, row.get(1)?));
    }
    Ok(entries)
}

fn load_order(conn: &Connection, scope: OrderScope, id: Uuid) -> OrderRepoResult<Option<i64>> {
    let sql = format!(
        "SELECT display_order
         FROM {table}
         WHERE uuid = ?1
           AND {parent} = ?2;",
        table = scope.table(),
        parent = scope.parent_column(),
    );
    let order = conn
        .query_row(
            &sql,
            params![id.to_string(), scope.parent_uuid().to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(order)
}

fn load_neighbor(
    conn: &Connection,
    scope: OrderScope,
    current_order: i64,
    direction: MoveDirection,
) -> OrderRepoResult<Option<OrderEntry>> {
    let (comparison, sort) = match direction {
        MoveDirection::Up => ("<", "DESC"),
        MoveDirection::Down => (">", "ASC"),
    };
    let sql = format!(
        "SELECT uuid, display_order
         FROM {table}
         WHERE {parent} = ?1
           AND display_order {comparison} ?2
         ORDER BY display_order {sort}, uuid {sort}
         LIMIT 1;",
        table = scope.table(),
        parent = scope.parent_column(),
    );
    let row: Option<(String, i64)> = conn
        .query_row(
            &sql,
            params![scope.parent_uuid().to_string(), current_order],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    row.map(|(id_text, display_order)| {
        parse_uuid(&id_text, "display_order.uuid")
            .map(|id| OrderEntry::new(id, display_order))
            .map_err(OrderRepoError::InvalidData)
    })
    .transpose()
}

fn write_order(
    conn: &Connection,
    scope: OrderScope,
    id: Uuid,
    display_order: i64,
) -> OrderRepoResult<usize> {
    let sql = format!(
        "UPDATE {table}
         SET display_order = ?3,
             updated_at = (strftime('%s', 'now') * 1000)
         WHERE uuid = ?1
           AND {parent} = ?2;",
        table = scope.table(),
        parent = scope.parent_column(),
    );
    let changed = conn.execute(
        &sql,
        params![id.to_string(), scope.parent_uuid().to_string(), display_order],
    )?;
    Ok(changed)
}
