//! Worker entity: the sales or marketing agent QR codes are attributed to.

use chrono::{DateTime, Utc};

/// An agent that owns QR codes.
///
/// `visits_count` is maintained by the database: every recorded scan of one of
/// the worker's QR codes increments it.
#[derive(Debug, Clone)]
pub struct Worker {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub visits_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Worker {
    /// Creates a new Worker instance.
    pub fn new(
        id: i64,
        name: String,
        code: String,
        visits_count: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            code,
            visits_count,
            created_at,
        }
    }

    /// Case-insensitive match against the worker's name or code.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.code.to_lowercase().contains(&query)
    }
}

/// Input data for creating a new worker.
#[derive(Debug, Clone)]
pub struct NewWorker {
    pub name: String,
    pub code: String,
}
