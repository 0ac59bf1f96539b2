use serde::{Deserialize, Deserializer, Serialize};

/// Monotonic counter stamped on every job run; messages from older runs are dropped.
pub type Generation = u64;

/// Client-side lifecycle of a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Idle,
    Starting,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Starting | JobStatus::Processing)
    }
}

/// Status as reported by the backend for a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    #[serde(alias = "queued")]
    Pending,
    #[serde(alias = "running", alias = "in_progress")]
    Processing,
    Completed,
    Failed,
}

/// Handle returned by the backend when a job is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTicket {
    pub job_id: String,
    pub poll_url: String,
    pub result_url: String,
}

impl JobTicket {
    /// Ticket with the conventional `/jobs/{id}` endpoints.
    pub fn with_default_urls(job_id: impl Into<String>) -> Self {
        let job_id = job_id.into();
        Self {
            poll_url: format!("/jobs/{job_id}"),
            result_url: format!("/jobs/{job_id}/result"),
            job_id,
        }
    }
}

/// One poll response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: RemoteStatus,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub logs: Vec<String>,
    #[serde(default, alias = "message")]
    pub error: Option<String>,
}

impl StatusSnapshot {
    pub fn new(status: RemoteStatus) -> Self {
        Self {
            status,
            progress: None,
            stage: None,
            logs: Vec::new(),
            error: None,
        }
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn with_logs<I, S>(mut self, logs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.logs = logs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Progress clamped to a whole percentage.
    pub fn percent(&self) -> Option<u8> {
        self.progress
            .filter(|value| value.is_finite())
            .map(|value| value.clamp(0.0, 100.0).round() as u8)
    }
}

/// Treats an explicit `null` list like a missing one.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_decodes_aliases_and_defaults() {
        let snapshot: StatusSnapshot =
            serde_json::from_str(r#"{"status":"running","message":"boom"}"#).unwrap();
        assert_eq!(snapshot.status, RemoteStatus::Processing);
        assert_eq!(snapshot.error.as_deref(), Some("boom"));
        assert!(snapshot.logs.is_empty());
        assert_eq!(snapshot.progress, None);

        let queued: StatusSnapshot = serde_json::from_str(r#"{"status":"queued"}"#).unwrap();
        assert_eq!(queued.status, RemoteStatus::Pending);
    }

    #[test]
    fn null_fields_decode_as_absent() {
        let snapshot: StatusSnapshot = serde_json::from_str(
            r#"{"status":"processing","progress":40,"stage":null,"logs":null,"error":null}"#,
        )
        .unwrap();
        assert_eq!(snapshot.status, RemoteStatus::Processing);
        assert_eq!(snapshot.percent(), Some(40));
        assert_eq!(snapshot.stage, None);
        assert!(snapshot.logs.is_empty());
        assert_eq!(snapshot.error, None);
    }

    #[test]
    fn percent_is_clamped_and_rounded() {
        let base = StatusSnapshot::new(RemoteStatus::Processing);
        assert_eq!(base.clone().with_progress(40.4).percent(), Some(40));
        assert_eq!(base.clone().with_progress(140.0).percent(), Some(100));
        assert_eq!(base.clone().with_progress(-3.0).percent(), Some(0));
        assert_eq!(base.clone().with_progress(f64::NAN).percent(), None);
        assert_eq!(base.percent(), None);
    }

    #[test]
    fn default_ticket_urls() {
        let ticket = JobTicket::with_default_urls("abc");
        assert_eq!(ticket.poll_url, "/jobs/abc");
        assert_eq!(ticket.result_url, "/jobs/abc/result");
    }
}
