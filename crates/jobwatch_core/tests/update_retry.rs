use jobwatch_core::{
    update, Effect, JobStatus, JobTicket, Msg, PollFailure, PollPolicy, PollerState, RemoteStatus,
    StatusSnapshot, CONNECTION_LOST_MESSAGE, TIMEOUT_MESSAGE,
};

fn processing_state() -> (PollerState<String>, u64) {
    let (state, _) = update(PollerState::default(), Msg::StartRequested);
    let generation = state.generation();
    let (state, _) = update(
        state,
        Msg::SubmitAccepted {
            generation,
            ticket: JobTicket::with_default_urls("job-1"),
        },
    );
    (state, generation)
}

fn network_failure(state: PollerState<String>, generation: u64) -> (PollerState<String>, Vec<Effect>) {
    update(
        state,
        Msg::PollFailed {
            generation,
            failure: PollFailure::Network("connection refused".to_string()),
        },
    )
}

fn processing_poll(state: PollerState<String>, generation: u64) -> (PollerState<String>, Vec<Effect>) {
    update(
        state,
        Msg::PollResponded {
            generation,
            snapshot: StatusSnapshot::new(RemoteStatus::Processing),
        },
    )
}

#[test]
fn network_failures_retry_the_same_poll_with_exponential_backoff() {
    let (mut state, generation) = processing_state();
    let policy = PollPolicy::default();

    for retry in 1..=5 {
        let (next, effects) = network_failure(state, generation);
        assert_eq!(next.status(), JobStatus::Processing);
        assert_eq!(next.retries(), retry);
        assert_eq!(
            effects,
            vec![Effect::SchedulePoll {
                generation,
                url: "/jobs/job-1".to_string(),
                delay: policy.retry_delay(retry),
            }]
        );
        state = next;
    }
}

#[test]
fn recovery_after_network_failures_resets_retry_counter() {
    let (mut state, generation) = processing_state();
    for _ in 0..5 {
        state = network_failure(state, generation).0;
    }
    assert_eq!(state.retries(), 5);

    let (state, effects) = processing_poll(state, generation);
    assert_eq!(state.retries(), 0);
    assert_eq!(state.status(), JobStatus::Processing);
    assert_eq!(effects.len(), 1);

    // A fresh budget of retries is available again.
    let (state, _) = network_failure(state, generation);
    assert_eq!(state.retries(), 1);
    assert_eq!(state.status(), JobStatus::Processing);
}

#[test]
fn sixth_consecutive_network_failure_loses_connection() {
    let (mut state, generation) = processing_state();
    for _ in 0..5 {
        state = network_failure(state, generation).0;
    }
    let (state, effects) = network_failure(state, generation);

    assert!(effects.is_empty());
    assert_eq!(state.status(), JobStatus::Failed);
    assert_eq!(state.error(), Some(CONNECTION_LOST_MESSAGE));
}

#[test]
fn non_network_poll_error_fails_immediately() {
    let (state, generation) = processing_state();
    let (state, effects) = update(
        state,
        Msg::PollFailed {
            generation,
            failure: PollFailure::Other("backend returned HTTP 404: job not found".to_string()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.status(), JobStatus::Failed);
    assert_eq!(state.error(), Some("backend returned HTTP 404: job not found"));
}

#[test]
fn hundredth_non_terminal_response_times_out() {
    let (mut state, generation) = processing_state();
    for attempt in 1..100 {
        let (next, effects) = update(
            state,
            Msg::PollResponded {
                generation,
                snapshot: StatusSnapshot::new(RemoteStatus::Processing).with_progress(99.0),
            },
        );
        assert_eq!(next.attempts(), attempt);
        assert_eq!(effects.len(), 1);
        state = next;
    }

    let (state, effects) = processing_poll(state, generation);
    assert!(effects.is_empty());
    assert_eq!(state.attempts(), 100);
    assert_eq!(state.status(), JobStatus::Failed);
    assert_eq!(state.error(), Some(TIMEOUT_MESSAGE));
}

#[test]
fn retries_do_not_count_as_attempts() {
    let (state, generation) = processing_state();
    let (state, _) = network_failure(state, generation);
    let (state, _) = network_failure(state, generation);
    assert_eq!(state.attempts(), 0);

    let (state, _) = processing_poll(state, generation);
    assert_eq!(state.attempts(), 1);
}

#[test]
fn attempt_ceiling_follows_policy() {
    let policy = PollPolicy {
        max_attempts: 2,
        ..PollPolicy::default()
    };
    let (state, _) = update(PollerState::<String>::new(policy), Msg::StartRequested);
    let generation = state.generation();
    let (state, _) = update(
        state,
        Msg::SubmitAccepted {
            generation,
            ticket: JobTicket::with_default_urls("job-2"),
        },
    );
    let (state, _) = processing_poll(state, generation);
    assert_eq!(state.status(), JobStatus::Processing);
    let (state, _) = processing_poll(state, generation);
    assert_eq!(state.status(), JobStatus::Failed);
    assert_eq!(state.error(), Some(TIMEOUT_MESSAGE));
}
