use crate::{Generation, JobTicket, StatusSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg<R> {
    /// Caller started a new job; any previous run is abandoned.
    StartRequested,
    /// Backend accepted the submission and issued a ticket.
    SubmitAccepted {
        generation: Generation,
        ticket: JobTicket,
    },
    /// Backend answered the submission synchronously with the final payload.
    SubmitCompletedInline { generation: Generation, result: R },
    /// Submission failed before a job existed.
    SubmitFailed {
        generation: Generation,
        message: String,
    },
    /// A poll returned a status snapshot.
    PollResponded {
        generation: Generation,
        snapshot: StatusSnapshot,
    },
    /// A poll did not produce a snapshot.
    PollFailed {
        generation: Generation,
        failure: PollFailure,
    },
    /// The result endpoint answered.
    ResultFetched {
        generation: Generation,
        outcome: ResultOutcome<R>,
    },
    /// The result endpoint could not be read.
    ResultFailed {
        generation: Generation,
        message: String,
    },
    /// Caller abandoned the current job.
    CancelRequested,
    /// Caller cleared everything.
    ResetRequested,
}

/// Why a poll produced no snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollFailure {
    /// Transport-level failure; the same poll is retried.
    Network(String),
    /// Anything else (HTTP status, undecodable body); fails the job.
    Other(String),
}

/// Application-level outcome carried by a result payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultOutcome<R> {
    Delivered(R),
    /// Payload carried `success: false`.
    Rejected(String),
}
