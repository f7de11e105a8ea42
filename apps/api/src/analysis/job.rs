//! Job model and the in-memory job table.
//!
//! Jobs move `queued → processing → {done | error}`. Both terminal states
//! keep the job in the table until the TTL sweeper evicts it, so clients
//! always observe the terminal state by polling. The table is shared
//! across the router and every running pipeline; each entry is only ever
//! written by the pipeline that owns it, with whole-entry updates under the
//! map's per-shard lock so readers never see a half-applied transition.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::AnalysisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Processing,
    Done,
    Error,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub job_id: Uuid,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub state: JobState,
    pub progress: u8,
    pub message: String,
    pub error: Option<String>,
    pub result: Option<AnalysisResult>,
    pub report_html: Option<String>,
}

impl Job {
    pub fn new(job_id: Uuid, filename: String) -> Self {
        Self {
            job_id,
            filename,
            created_at: Utc::now(),
            state: JobState::Queued,
            progress: 5,
            message: "Queued".to_string(),
            error: None,
            result: None,
            report_html: None,
        }
    }
}

#[derive(Clone, Default)]
pub struct JobTable {
    jobs: Arc<DashMap<Uuid, Job>>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) {
        self.jobs.insert(job.job_id, job);
    }

    pub fn get(&self, id: &Uuid) -> Option<Job> {
        self.jobs.get(id).map(|entry| entry.clone())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Advances a job's visible status. Progress is monotonic: a stale
    /// lower value never overwrites a higher one.
    pub fn set_status(&self, id: Uuid, state: JobState, progress: u8, message: &str) {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            job.state = state;
            job.progress = job.progress.max(progress);
            job.message = message.to_string();
        }
    }

    pub fn complete(&self, id: Uuid, result: AnalysisResult, report_html: Option<String>) {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            job.state = JobState::Done;
            job.progress = 100;
            job.message = "Done".to_string();
            job.result = Some(result);
            job.report_html = report_html;
        }
    }

    pub fn fail(&self, id: Uuid, error: String) {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            job.state = JobState::Error;
            job.progress = 100;
            job.message = "Failed".to_string();
            job.error = Some(error);
        }
    }

    /// Removes jobs created before `now - ttl`. Returns the eviction count.
    pub fn evict_older_than(&self, ttl: chrono::Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let before = self.jobs.len();
        self.jobs.retain(|_, job| job.created_at > cutoff);
        before - self.jobs.len()
    }
}

/// Background eviction loop. Jobs and their results are demo-scale
/// in-memory state; anything older than the TTL is dropped.
pub async fn run_sweeper(table: JobTable, ttl_minutes: u64) {
    let ttl = chrono::Duration::minutes(ttl_minutes as i64);
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(60));
    loop {
        ticker.tick().await;
        let evicted = table.evict_older_than(ttl);
        if evicted > 0 {
            debug!(evicted, "evicted expired jobs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_job() -> (JobTable, Uuid) {
        let table = JobTable::new();
        let id = Uuid::new_v4();
        table.insert(Job::new(id, "resume.pdf".to_string()));
        (table, id)
    }

    #[test]
    fn test_new_job_is_queued() {
        let (table, id) = table_with_job();
        let job = table.get(&id).unwrap();
        assert_eq!(job.state, JobState::Queued);
        assert_eq!(job.progress, 5);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_unknown_id_is_none() {
        let table = JobTable::new();
        assert!(table.get(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_progress_is_monotonic() {
        let (table, id) = table_with_job();
        table.set_status(id, JobState::Processing, 60, "Scoring resume...");
        table.set_status(id, JobState::Processing, 35, "Analyzing keywords...");
        let job = table.get(&id).unwrap();
        assert_eq!(job.progress, 60);
        assert_eq!(job.message, "Analyzing keywords...");
    }

    #[test]
    fn test_fail_is_terminal_with_message() {
        let (table, id) = table_with_job();
        table.fail(id, "Could not read document".to_string());
        let job = table.get(&id).unwrap();
        assert_eq!(job.state, JobState::Error);
        assert_eq!(job.progress, 100);
        assert_eq!(job.error.as_deref(), Some("Could not read document"));
        assert!(job.result.is_none());
    }

    #[test]
    fn test_evict_respects_ttl() {
        let (table, id) = table_with_job();
        let stale = Uuid::new_v4();
        let mut old_job = Job::new(stale, "old.pdf".to_string());
        old_job.created_at = Utc::now() - chrono::Duration::hours(2);
        table.insert(old_job);

        let evicted = table.evict_older_than(chrono::Duration::minutes(60));
        assert_eq!(evicted, 1);
        assert!(table.get(&stale).is_none());
        assert!(table.get(&id).is_some());
    }

    #[test]
    fn test_job_state_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&JobState::Done).unwrap(), "\"done\"");
        assert_eq!(serde_json::to_string(&JobState::Queued).unwrap(), "\"queued\"");
    }
}
