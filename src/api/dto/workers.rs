//! DTOs for worker management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::worker_service::WorkerSummary;
use crate::domain::entities::Worker;

/// Request to create a worker. The code is generated by the server.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkerRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Individual worker information.
#[derive(Debug, Serialize)]
pub struct WorkerItem {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub visits_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_codes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scans: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<Worker> for WorkerItem {
    fn from(w: Worker) -> Self {
        WorkerItem {
            id: w.id,
            name: w.name,
            code: w.code,
            visits_count: w.visits_count,
            qr_codes: None,
            scans: None,
            created_at: w.created_at,
        }
    }
}

impl From<WorkerSummary> for WorkerItem {
    fn from(s: WorkerSummary) -> Self {
        WorkerItem {
            qr_codes: Some(s.qr_codes),
            scans: Some(s.scans),
            ..s.worker.into()
        }
    }
}

/// Response containing list of workers.
#[derive(Debug, Serialize)]
pub struct WorkerListResponse {
    pub items: Vec<WorkerItem>,
}
