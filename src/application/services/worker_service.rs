//! Worker management service.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{NewWorker, Worker};
use crate::domain::listing::ListQuery;
use crate::domain::repositories::{WorkerCounts, WorkerRepository};
use crate::error::AppError;
use crate::utils::code_generator::generate_worker_code;
use serde_json::json;

/// A worker with its related counters, as shown in listings.
#[derive(Debug, Clone)]
pub struct WorkerSummary {
    pub worker: Worker,
    pub qr_codes: i64,
    pub scans: i64,
}

/// Service for creating, listing and deleting workers.
pub struct WorkerService<R: WorkerRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: WorkerRepository + ?Sized> WorkerService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Creates a worker with a freshly generated 6-character code.
    ///
    /// The code is not checked for uniqueness up front; a collision is
    /// reported by the database as a conflict.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the name is blank.
    /// Returns [`AppError::Conflict`] if the generated code already exists.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn create_worker(&self, name: &str) -> Result<Worker, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::bad_request(
                "Worker name must not be empty",
                json!({ "field": "name" }),
            ));
        }

        let new_worker = NewWorker {
            name: name.to_string(),
            code: generate_worker_code(),
        };

        let worker = self.repository.create(new_worker).await?;
        tracing::info!(worker_id = worker.id, code = %worker.code, "Worker created");
        Ok(worker)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no worker has this ID.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get_worker(&self, id: i64) -> Result<Worker, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Worker not found", json!({ "id": id })))
    }

    /// Lists workers with their QR code and scan counts.
    ///
    /// `query.search` matches name or code case-insensitively; results are
    /// sorted by name in `query.sort` direction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_workers(&self, query: &ListQuery) -> Result<Vec<WorkerSummary>, AppError> {
        let workers = self.repository.list().await?;
        let counts: HashMap<i64, WorkerCounts> = self
            .repository
            .counts()
            .await?
            .into_iter()
            .map(|c| (c.worker_id, c))
            .collect();

        let mut summaries: Vec<WorkerSummary> = workers
            .into_iter()
            .filter(|w| query.search_term().is_none_or(|term| w.matches(term)))
            .map(|worker| {
                let c = counts.get(&worker.id).copied().unwrap_or_default();
                WorkerSummary {
                    worker,
                    qr_codes: c.qr_codes,
                    scans: c.scans,
                }
            })
            .collect();

        summaries.sort_by(|a, b| query.sort.compare(&a.worker.name, &b.worker.name));
        Ok(summaries)
    }

    /// Deletes a worker and, through the database cascade, its QR codes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no worker has this ID.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn delete_worker(&self, id: i64) -> Result<(), AppError> {
        if !self.repository.delete(id).await? {
            return Err(AppError::not_found("Worker not found", json!({ "id": id })));
        }
        tracing::info!(worker_id = id, "Worker deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn count_workers(&self) -> Result<i64, AppError> {
        self.repository.count().await
    }
}
