use crate::{Effect, Msg, PollFailure, PollerState, RemoteStatus, ResultOutcome};

pub const TIMEOUT_MESSAGE: &str =
    "The job is taking longer than expected. Please try again later.";
pub const CONNECTION_LOST_MESSAGE: &str =
    "Lost connection to the server while checking job status. Please check your connection and try again.";
pub const JOB_FAILED_MESSAGE: &str = "The job failed on the server.";

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages stamped with a generation other than the running one are ignored,
/// so replies that arrive after a cancel, reset or restart never touch state.
pub fn update<R>(mut state: PollerState<R>, msg: Msg<R>) -> (PollerState<R>, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested => {
            state.begin();
            vec![
                Effect::CancelPending,
                Effect::Submit {
                    generation: state.generation(),
                },
            ]
        }
        Msg::SubmitAccepted { generation, ticket } => {
            if !state.accepts(generation) || state.ticket().is_some() {
                return (state, Vec::new());
            }
            let poll = Effect::SchedulePoll {
                generation,
                url: ticket.poll_url.clone(),
                delay: state.policy().first_poll(),
            };
            state.accept(ticket);
            vec![poll]
        }
        Msg::SubmitCompletedInline { generation, result } => {
            if state.accepts(generation) && state.ticket().is_none() {
                state.complete(result);
            }
            Vec::new()
        }
        Msg::SubmitFailed {
            generation,
            message,
        } => {
            if state.accepts(generation) && state.ticket().is_none() {
                state.fail(message);
            }
            Vec::new()
        }
        Msg::PollResponded {
            generation,
            snapshot,
        } => {
            if !state.accepts(generation) || state.is_awaiting_result() {
                return (state, Vec::new());
            }
            let Some(ticket) = state.ticket().cloned() else {
                return (state, Vec::new());
            };
            state.apply_snapshot(&snapshot);
            match snapshot.status {
                RemoteStatus::Completed => {
                    state.await_result();
                    vec![Effect::FetchResult {
                        generation,
                        url: ticket.result_url,
                    }]
                }
                RemoteStatus::Failed => {
                    state.fail(snapshot.error.unwrap_or_else(|| JOB_FAILED_MESSAGE.to_string()));
                    Vec::new()
                }
                RemoteStatus::Pending | RemoteStatus::Processing => {
                    let attempts = state.record_attempt();
                    if attempts >= state.policy().max_attempts {
                        state.fail(TIMEOUT_MESSAGE);
                        Vec::new()
                    } else {
                        vec![Effect::SchedulePoll {
                            generation,
                            url: ticket.poll_url,
                            delay: state.policy().poll_delay(attempts),
                        }]
                    }
                }
            }
        }
        Msg::PollFailed {
            generation,
            failure,
        } => {
            if !state.accepts(generation) || state.is_awaiting_result() {
                return (state, Vec::new());
            }
            let Some(ticket) = state.ticket().cloned() else {
                return (state, Vec::new());
            };
            match failure {
                PollFailure::Network(_) => {
                    let retries = state.record_retry();
                    if retries > state.policy().max_network_retries {
                        state.fail(CONNECTION_LOST_MESSAGE);
                        Vec::new()
                    } else {
                        vec![Effect::SchedulePoll {
                            generation,
                            url: ticket.poll_url,
                            delay: state.policy().retry_delay(retries),
                        }]
                    }
                }
                PollFailure::Other(message) => {
                    state.fail(message);
                    Vec::new()
                }
            }
        }
        Msg::ResultFetched {
            generation,
            outcome,
        } => {
            if state.accepts(generation) && state.is_awaiting_result() {
                match outcome {
                    ResultOutcome::Delivered(result) => state.complete(result),
                    ResultOutcome::Rejected(message) => state.fail(message),
                }
            }
            Vec::new()
        }
        Msg::ResultFailed {
            generation,
            message,
        } => {
            if state.accepts(generation) && state.is_awaiting_result() {
                state.fail(message);
            }
            Vec::new()
        }
        Msg::CancelRequested => {
            state.cancel();
            vec![Effect::CancelPending]
        }
        Msg::ResetRequested => {
            state.reset();
            vec![Effect::CancelPending]
        }
    };

    (state, effects)
}
