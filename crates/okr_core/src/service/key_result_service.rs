//! Key result use-case service.
//!
//! # Responsibility
//! - Create and edit key results through the repository contract.
//! - Produce dashboard views with derived progress and display strings.
//!
//! # Invariants
//! - Progress is recomputed on every read and never written back.

use crate::model::key_result::{KeyResult, KeyResultId, KeyResultView};
use crate::model::org::{DepartmentId, ObjectiveId};
use crate::progress::{mean_progress, FormatConfig};
use crate::repo::key_result_repo::KeyResultRepository;
use crate::repo::{RepoError, RepoResult};
use log::{error, info};
use std::time::Instant;

pub struct KeyResultService<R: KeyResultRepository> {
    repo: R,
    format: FormatConfig,
}

impl<R: KeyResultRepository> KeyResultService<R> {
    pub fn new(repo: R, format: FormatConfig) -> Self {
        Self { repo, format }
    }

    pub fn create_key_result(&self, key_result: &KeyResult) -> RepoResult<KeyResultId> {
        let started_at = Instant::now();
        let result = self.repo.create_key_result(key_result);
        log_write("key_result_create", key_result.uuid, started_at, &result);
        result
    }

    /// Replaces the current value of one key result.
    pub fn record_current_value(
        &self,
        id: KeyResultId,
        current_value: f64,
    ) -> RepoResult<KeyResultView> {
        let started_at = Instant::now();
        let result = self.require(id).and_then(|mut key_result| {
            key_result.current_value = current_value;
            self.repo.update_key_result(&key_result)?;
            Ok(key_result)
        });
        log_write("key_result_update", id, started_at, &result);
        result.map(|key_result| key_result.view(&self.format))
    }

    pub fn update_key_result(&self, key_result: &KeyResult) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.repo.update_key_result(key_result);
        log_write("key_result_update", key_result.uuid, started_at, &result);
        result
    }

    pub fn key_result_view(&self, id: KeyResultId) -> RepoResult<KeyResultView> {
        Ok(self.require(id)?.view(&self.format))
    }

    pub fn objective_views(&self, objective_uuid: ObjectiveId) -> RepoResult<Vec<KeyResultView>> {
        Ok(self
            .repo
            .list_by_objective(objective_uuid)?
            .iter()
            .map(|key_result| key_result.view(&self.format))
            .collect())
    }

    pub fn department_views(
        &self,
        department_uuid: DepartmentId,
    ) -> RepoResult<Vec<KeyResultView>> {
        Ok(self
            .repo
            .list_by_department(department_uuid)?
            .iter()
            .map(|key_result| key_result.view(&self.format))
            .collect())
    }

    /// Rounded mean progress of an objective's key results; `0` when it has none.
    pub fn objective_progress(&self, objective_uuid: ObjectiveId) -> RepoResult<u8> {
        let key_results = self.repo.list_by_objective(objective_uuid)?;
        Ok(mean_progress(key_results.iter().map(KeyResult::progress)))
    }

    /// Makes `id` the department's headline key result.
    pub fn set_top_key_result(&self, id: KeyResultId) -> RepoResult<DepartmentId> {
        let started_at = Instant::now();
        let result = self.repo.set_top(id);
        log_write("key_result_set_top", id, started_at, &result);
        result
    }

    pub fn top_key_result(
        &self,
        department_uuid: DepartmentId,
    ) -> RepoResult<Option<KeyResultView>> {
        Ok(self
            .repo
            .top_for_department(department_uuid)?
            .map(|key_result| key_result.view(&self.format)))
    }

    fn require(&self, id: KeyResultId) -> RepoResult<KeyResult> {
        self.repo
            .get_key_result(id)?
            .ok_or(RepoError::NotFound {
                entity: "key result",
                id,
            })
    }
}

fn log_write<T>(event: &str, id: KeyResultId, started_at: Instant, result: &RepoResult<T>) {
    match result {
        Ok(_) => info!(
            "event={event} module=key_result status=ok id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={event} module=key_result status=error id={id} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
}
