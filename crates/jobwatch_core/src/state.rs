use crate::view_model::JobView;
use crate::{Generation, JobStatus, JobTicket, PollPolicy, StatusSnapshot};

/// State of one poller instance. Owns at most one job at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct PollerState<R> {
    policy: PollPolicy,
    generation: Generation,
    status: JobStatus,
    ticket: Option<JobTicket>,
    progress: u8,
    stage: String,
    logs: Vec<String>,
    result: Option<R>,
    error: Option<String>,
    attempts: u32,
    retries: u32,
    awaiting_result: bool,
    dirty: bool,
}

impl<R> Default for PollerState<R> {
    fn default() -> Self {
        Self::new(PollPolicy::default())
    }
}

impl<R> PollerState<R> {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            generation: 0,
            status: JobStatus::Idle,
            ticket: None,
            progress: 0,
            stage: String::new(),
            logs: Vec::new(),
            result: None,
            error: None,
            attempts: 0,
            retries: 0,
            awaiting_result: false,
            dirty: false,
        }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn ticket(&self) -> Option<&JobTicket> {
        self.ticket.as_ref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_awaiting_result(&self) -> bool {
        self.awaiting_result
    }

    /// Returns whether anything changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// True when `generation` belongs to the job that is still running.
    pub(crate) fn accepts(&self, generation: Generation) -> bool {
        generation == self.generation && self.status.is_active()
    }

    /// Abandons the current run and starts a fresh one in `Starting`.
    pub(crate) fn begin(&mut self) {
        self.clear_job();
        self.logs.clear();
        self.generation += 1;
        self.status = JobStatus::Starting;
        self.dirty = true;
    }

    pub(crate) fn accept(&mut self, ticket: JobTicket) {
        self.ticket = Some(ticket);
        self.status = JobStatus::Processing;
        self.attempts = 0;
        self.retries = 0;
        self.dirty = true;
    }

    pub(crate) fn apply_snapshot(&mut self, snapshot: &StatusSnapshot) {
        self.retries = 0;
        if let Some(percent) = snapshot.percent() {
            self.progress = percent;
        }
        if let Some(stage) = &snapshot.stage {
            self.stage.clone_from(stage);
        }
        self.merge_logs(&snapshot.logs);
        self.dirty = true;
    }

    /// Counts one non-terminal response; returns the new total.
    pub(crate) fn record_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Counts one consecutive network failure; returns the new total.
    pub(crate) fn record_retry(&mut self) -> u32 {
        self.retries += 1;
        self.dirty = true;
        self.retries
    }

    pub(crate) fn await_result(&mut self) {
        self.awaiting_result = true;
        self.progress = 100;
        self.dirty = true;
    }

    pub(crate) fn complete(&mut self, result: R) {
        self.status = JobStatus::Completed;
        self.awaiting_result = false;
        self.progress = 100;
        self.result = Some(result);
        self.error = None;
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.awaiting_result = false;
        self.error = Some(message.into());
        self.dirty = true;
    }

    /// Drops the job but keeps its logs, leaving the poller idle.
    pub(crate) fn cancel(&mut self) {
        self.clear_job();
        self.generation += 1;
        self.status = JobStatus::Idle;
        self.dirty = true;
    }

    pub(crate) fn reset(&mut self) {
        self.clear_job();
        self.logs.clear();
        self.generation += 1;
        self.status = JobStatus::Idle;
        self.dirty = true;
    }

    fn clear_job(&mut self) {
        self.ticket = None;
        self.progress = 0;
        self.stage.clear();
        self.result = None;
        self.error = None;
        self.attempts = 0;
        self.retries = 0;
        self.awaiting_result = false;
    }

    fn merge_logs(&mut self, incoming: &[String]) {
        if incoming.starts_with(&self.logs) {
            let known = self.logs.len();
            self.logs.extend_from_slice(&incoming[known..]);
        } else {
            self.logs.extend_from_slice(incoming);
        }
    }
}

impl<R: Clone> PollerState<R> {
    pub fn view(&self) -> JobView<R> {
        JobView {
            generation: self.generation,
            status: self.status,
            job_id: self.ticket.as_ref().map(|ticket| ticket.job_id.clone()),
            progress: self.progress,
            stage: self.stage.clone(),
            logs: self.logs.clone(),
            result: self.result.clone(),
            error: self.error.clone(),
            attempts: self.attempts,
            retries: self.retries,
        }
    }
}
