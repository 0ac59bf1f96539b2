use serde::Serialize;

use crate::{Generation, JobStatus};

/// Read-only projection of a poller, published to observers after every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView<R> {
    pub generation: Generation,
    pub status: JobStatus,
    pub job_id: Option<String>,
    pub progress: u8,
    pub stage: String,
    pub logs: Vec<String>,
    pub result: Option<R>,
    pub error: Option<String>,
    pub attempts: u32,
    pub retries: u32,
}

impl<R> Default for JobView<R> {
    fn default() -> Self {
        Self {
            generation: 0,
            status: JobStatus::Idle,
            job_id: None,
            progress: 0,
            stage: String::new(),
            logs: Vec::new(),
            result: None,
            error: None,
            attempts: 0,
            retries: 0,
        }
    }
}
