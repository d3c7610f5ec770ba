//! Background search tasks.
//!
//! A submitted search runs on its own Tokio task; its state stays queryable
//! by id until the sweeper drops it after the configured TTL.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::earthquakes::models::{DateRange, SearchOutcome};
use crate::earthquakes::service::{EarthquakeService, SearchError};
use crate::observability::metrics;

pub const CITY_NOT_FOUND: &str = "City not found";
pub const UPSTREAM_FAILED: &str = "Failed to retrieve earthquakes";

/// Lifecycle of a background search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Pending,
    Success(SearchOutcome),
    Failure { message: String },
}

impl TaskState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, TaskState::Pending)
    }

    fn from_result(result: Result<SearchOutcome, SearchError>) -> Self {
        match result {
            Ok(outcome) => TaskState::Success(outcome),
            Err(SearchError::CityNotFound(_)) => TaskState::Failure {
                message: CITY_NOT_FOUND.to_string(),
            },
            Err(SearchError::Upstream(_)) => TaskState::Failure {
                message: UPSTREAM_FAILED.to_string(),
            },
        }
    }
}

/// Task id plus state, as returned by the results endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatus {
    pub task_id: Uuid,
    #[serde(flatten)]
    pub state: TaskState,
}

#[derive(Debug)]
struct TaskEntry {
    state: TaskState,
    finished_at: Option<Instant>,
}

/// Registry of submitted searches.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: Arc<DashMap<Uuid, TaskEntry>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a search in the background and return its id immediately.
    pub fn submit(&self, service: EarthquakeService, city_id: u64, range: DateRange) -> Uuid {
        let task_id = Uuid::new_v4();
        self.tasks.insert(
            task_id,
            TaskEntry {
                state: TaskState::Pending,
                finished_at: None,
            },
        );
        metrics::record_task("submitted");
        tracing::info!(%task_id, city_id, "Search task submitted");

        let registry = self.clone();
        tokio::spawn(async move {
            let result = service.search(city_id, range).await;
            if let Err(e) = &result {
                tracing::warn!(%task_id, error = %e, "Search task failed");
            }
            registry.complete(task_id, TaskState::from_result(result));
        });

        task_id
    }

    fn complete(&self, task_id: Uuid, state: TaskState) {
        metrics::record_task(if matches!(state, TaskState::Success(_)) { "succeeded" } else { "failed" });
        if let Some(mut entry) = self.tasks.get_mut(&task_id) {
            entry.state = state;
            entry.finished_at = Some(Instant::now());
        }
    }

    pub fn status(&self, task_id: Uuid) -> Option<TaskStatus> {
        self.tasks.get(&task_id).map(|entry| TaskStatus {
            task_id,
            state: entry.state.clone(),
        })
    }

    /// Drop finished tasks older than `max_age`. Pending tasks are kept.
    pub fn prune_finished(&self, max_age: Duration) -> usize {
        let mut removed = 0;
        self.tasks.retain(|_, entry| {
            let keep = match entry.finished_at {
                Some(at) => at.elapsed() < max_age,
                None => true,
            };
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Periodically prune finished tasks until shutdown.
    pub async fn run_sweeper(
        self,
        interval: Duration,
        max_age: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick completes immediately

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.prune_finished(max_age);
                    if removed > 0 {
                        tracing::debug!(removed, "Pruned finished search tasks");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Task sweeper stopping");
                    break;
                }
            }
        }
    }
}
