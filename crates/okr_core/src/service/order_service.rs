//! Ordering use-case service.
//!
//! # Responsibility
//! - Validate reorder requests above the repository layer.
//! - Translate repository outcomes into use-case errors and log every write.
//!
//! # Invariants
//! - Malformed batches are rejected before any write is attempted.
//! - A boundary step move is a success with no state change.
//! - Storage failures are surfaced unchanged and never retried.

use crate::model::order::{
    validate_reorder_batch, MoveDirection, MoveOutcome, OrderEntry, OrderScope,
    ReorderValidationError,
};
use crate::repo::order_repo::{OrderRepoError, OrderRepository};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Errors from ordering use-cases.
#[derive(Debug)]
pub enum OrderServiceError {
    /// Reorder batch is malformed; nothing was written.
    Validation(ReorderValidationError),
    /// Record is not part of the requested scope.
    NotFound { scope: OrderScope, id: Uuid },
    /// Transaction failed to commit; nothing was written.
    Repo(OrderRepoError),
}

impl Display for OrderServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { scope, id } => write!(f, "record {id} not found in scope {scope}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OrderServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<OrderRepoError> for OrderServiceError {
    fn from(value: OrderRepoError) -> Self {
        match value {
            OrderRepoError::RecordNotFound { scope, id } => Self::NotFound { scope, id },
            other => Self::Repo(other),
        }
    }
}

impl From<ReorderValidationError> for OrderServiceError {
    fn from(value: ReorderValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Ordering service facade.
pub struct OrderService<R: OrderRepository> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the scope in display order.
    pub fn list(&self, scope: OrderScope) -> Result<Vec<OrderEntry>, OrderServiceError> {
        self.repo.list_scope(scope).map_err(Into::into)
    }

    /// Order the next record appended to `scope` receives.
    pub fn append_position(&self, scope: OrderScope) -> Result<i64, OrderServiceError> {
        self.repo.next_display_order(scope).map_err(Into::into)
    }

    /// Moves one record a single position up or down.
    pub fn step_move(
        &self,
        scope: OrderScope,
        id: Uuid,
        direction: MoveDirection,
    ) -> Result<MoveOutcome, OrderServiceError> {
        let started_at = Instant::now();
        match self.repo.step_move(scope, id, direction) {
            Ok(MoveOutcome::AtBoundary) => {
                info!(
                    "event=order_step_move module=order status=noop scope={scope} id={id} direction={} duration_ms={}",
                    direction.as_str(),
                    started_at.elapsed().as_millis()
                );
                Ok(MoveOutcome::AtBoundary)
            }
            Ok(outcome) => {
                info!(
                    "event=order_step_move module=order status=ok scope={scope} id={id} direction={} duration_ms={}",
                    direction.as_str(),
                    started_at.elapsed().as_millis()
                );
                Ok(outcome)
            }
            Err(err) => {
                let err = OrderServiceError::from(err);
                error!(
                    "event=order_step_move module=order status=error scope={scope} id={id} direction={} duration_ms={} error={err}",
                    direction.as_str(),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Rewrites the orders of every listed record in one transaction.
    pub fn reorder(
        &self,
        scope: OrderScope,
        entries: &[OrderEntry],
    ) -> Result<(), OrderServiceError> {
        let started_at = Instant::now();

        let current = self.repo.list_scope(scope)?;
        if let Err(err) = validate_reorder_batch(entries, &current) {
            warn!(
                "event=order_reorder module=order status=rejected scope={scope} batch_size={} error={err}",
                entries.len()
            );
            return Err(err.into());
        }

        match self.repo.rewrite_orders(scope, entries) {
            Ok(()) => {
                info!(
                    "event=order_reorder module=order status=ok scope={scope} batch_size={} duration_ms={}",
                    entries.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                let err = match err {
                    // Row vanished after validation; report it like any unknown id.
                    OrderRepoError::RecordNotFound { id, .. } => {
                        OrderServiceError::Validation(ReorderValidationError::UnknownId(id))
                    }
                    other => OrderServiceError::from(other),
                };
                error!(
                    "event=order_reorder module=order status=error scope={scope} batch_size={} duration_ms={} error={err}",
                    entries.len(),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OrderService, OrderServiceError};
    use crate::model::order::{
        MoveDirection, MoveOutcome, OrderEntry, OrderScope, ReorderValidationError,
    };
    use crate::repo::order_repo::{OrderRepoError, OrderRepoResult, OrderRepository};
    use uuid::Uuid;

    /// Lists a fixed scope, but every row is gone by the time it is written.
    struct DeletedBeforeWriteRepo {
        entries: Vec<OrderEntry>,
    }

    impl OrderRepository for DeletedBeforeWriteRepo {
        fn list_scope(&self, _scope: OrderScope) -> OrderRepoResult<Vec<OrderEntry>> {
            Ok(self.entries.clone())
        }

        fn next_display_order(&self, _scope: OrderScope) -> OrderRepoResult<i64> {
            Ok(self.entries.len() as i64)
        }

        fn step_move(
            &self,
            scope: OrderScope,
            id: Uuid,
            _direction: MoveDirection,
        ) -> OrderRepoResult<MoveOutcome> {
            Err(OrderRepoError::RecordNotFound { scope, id })
        }

        fn rewrite_orders(&self, scope: OrderScope, entries: &[OrderEntry]) -> OrderRepoResult<()> {
            Err(OrderRepoError::RecordNotFound {
                scope,
                id: entries[0].id,
            })
        }
    }

    #[test]
    fn reorder_reports_row_deleted_after_validation_as_unknown_id() {
        let id = Uuid::new_v4();
        let service = OrderService::new(DeletedBeforeWriteRepo {
            entries: vec![OrderEntry::new(id, 0)],
        });
        let scope = OrderScope::Department(Uuid::new_v4());

        let err = service.reorder(scope, &[OrderEntry::new(id, 4)]).unwrap_err();
        assert!(matches!(
            err,
            OrderServiceError::Validation(ReorderValidationError::UnknownId(missing))
                if missing == id
        ));
    }

    #[test]
    fn step_move_keeps_not_found_for_missing_record() {
        let id = Uuid::new_v4();
        let service = OrderService::new(DeletedBeforeWriteRepo {
            entries: Vec::new(),
        });
        let scope = OrderScope::Project(Uuid::new_v4());

        let err = service.step_move(scope, id, MoveDirection::Down).unwrap_err();
        assert!(matches!(err, OrderServiceError::NotFound { id: missing, .. } if missing == id));
    }
}
