use std::sync::Arc;
use std::time::Duration;

use jobwatch_core::{
    update, Effect, Generation, JobStatus, JobView, Msg, PollFailure, PollPolicy, PollerState,
};
use jobwatch_logging::{jw_debug, jw_info, jw_warn};
use rand::Rng;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use crate::{JobApi, SubmitReply, Tool};

enum Command<T: Tool> {
    Start {
        request: T::Request,
        ack: oneshot::Sender<Generation>,
    },
    Cancel,
    Reset,
}

/// Drives one job at a time for tool `T` and publishes its state.
///
/// Dropping the handle stops the driver and aborts any in-flight request.
pub struct PollerHandle<T: Tool> {
    cmd_tx: mpsc::UnboundedSender<Command<T>>,
    view_rx: watch::Receiver<JobView<T::Output>>,
}

impl<T: Tool> PollerHandle<T> {
    /// Spawns the driver task; must be called within a tokio runtime.
    pub fn spawn(api: Arc<dyn JobApi<T>>, policy: PollPolicy) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(JobView::default());

        let driver = Driver {
            api,
            state: PollerState::new(policy),
            pending_request: None,
            inflight: CancellationToken::new(),
            event_tx,
            view_tx,
        };
        tokio::spawn(driver.run(cmd_rx, event_rx));

        Self { cmd_tx, view_rx }
    }

    /// Abandons any current job and submits `request`.
    ///
    /// Returns the generation of the new job, or `None` if the driver is gone.
    pub async fn start(&self, request: T::Request) -> Option<Generation> {
        let (ack, ack_rx) = oneshot::channel();
        self.cmd_tx.send(Command::Start { request, ack }).ok()?;
        ack_rx.await.ok()
    }

    /// Client-side abandonment; the backend job is not told to stop.
    pub fn cancel(&self) {
        let _ = self.cmd_tx.send(Command::Cancel);
    }

    pub fn reset(&self) {
        let _ = self.cmd_tx.send(Command::Reset);
    }

    pub fn view(&self) -> JobView<T::Output> {
        self.view_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<JobView<T::Output>> {
        self.view_rx.clone()
    }

    /// Waits until job `generation` is terminal or has been replaced, cancelled or reset.
    pub async fn settled(&self, generation: Generation) -> JobView<T::Output> {
        let mut rx = self.view_rx.clone();
        let waited = rx
            .wait_for(|view| {
                view.generation > generation
                    || (view.generation == generation && view.status.is_terminal())
            })
            .await;
        if let Ok(view) = waited {
            return view.clone();
        }
        self.view()
    }

    /// Starts `request` and waits for its outcome.
    pub async fn run(&self, request: T::Request) -> JobView<T::Output> {
        match self.start(request).await {
            Some(generation) => self.settled(generation).await,
            None => self.view(),
        }
    }
}

struct Driver<T: Tool> {
    api: Arc<dyn JobApi<T>>,
    state: PollerState<T::Output>,
    pending_request: Option<T::Request>,
    /// Cancelled whenever the current generation is abandoned.
    inflight: CancellationToken,
    event_tx: mpsc::UnboundedSender<Msg<T::Output>>,
    view_tx: watch::Sender<JobView<T::Output>>,
}

impl<T: Tool> Driver<T> {
    async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<Command<T>>,
        mut event_rx: mpsc::UnboundedReceiver<Msg<T::Output>>,
    ) {
        loop {
            tokio::select! {
                command = cmd_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(msg) = event_rx.recv() => self.dispatch(msg),
            }
        }
        self.inflight.cancel();
        jw_debug!("{} poller stopped", T::NAME);
    }

    fn handle_command(&mut self, command: Command<T>) {
        match command {
            Command::Start { request, ack } => {
                self.pending_request = Some(request);
                self.dispatch(Msg::StartRequested);
                let _ = ack.send(self.state.generation());
            }
            Command::Cancel => self.dispatch(Msg::CancelRequested),
            Command::Reset => self.dispatch(Msg::ResetRequested),
        }
    }

    fn dispatch(&mut self, msg: Msg<T::Output>) {
        let before = self.state.status();
        let (mut state, effects) = update(std::mem::take(&mut self.state), msg);

        if state.status() != before {
            log_transition::<T>(before, &state);
        }
        if state.consume_dirty() {
            self.view_tx.send_replace(state.view());
        }
        self.state = state;

        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::CancelPending => {
                self.inflight.cancel();
                self.inflight = CancellationToken::new();
            }
            Effect::Submit { generation } => {
                let Some(request) = self.pending_request.take() else {
                    jw_warn!("{} submit requested without a request", T::NAME);
                    return;
                };
                let api = self.api.clone();
                let token = self.inflight.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let reply = tokio::select! {
                        biased;
                        _ = token.cancelled() => return,
                        reply = api.submit(&request) => reply,
                    };
                    let msg = match reply {
                        Ok(SubmitReply::Accepted(ticket)) => {
                            jw_info!("{} job accepted job_id={}", T::NAME, ticket.job_id);
                            Msg::SubmitAccepted { generation, ticket }
                        }
                        Ok(SubmitReply::Inline(result)) => {
                            Msg::SubmitCompletedInline { generation, result }
                        }
                        Err(err) => Msg::SubmitFailed {
                            generation,
                            message: err.to_string(),
                        },
                    };
                    let _ = event_tx.send(msg);
                });
            }
            Effect::SchedulePoll {
                generation,
                url,
                delay,
            } => {
                let wait = delay.resolve(sample_jitter(delay.max_jitter));
                let api = self.api.clone();
                let token = self.inflight.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => return,
                        _ = tokio::time::sleep(wait) => {}
                    }
                    let reply = tokio::select! {
                        biased;
                        _ = token.cancelled() => return,
                        reply = api.poll(&url) => reply,
                    };
                    let msg = match reply {
                        Ok(snapshot) => Msg::PollResponded {
                            generation,
                            snapshot,
                        },
                        Err(err) if err.is_network() => {
                            jw_warn!("{} poll failed, will retry: {}", T::NAME, err);
                            Msg::PollFailed {
                                generation,
                                failure: PollFailure::Network(err.to_string()),
                            }
                        }
                        Err(err) => Msg::PollFailed {
                            generation,
                            failure: PollFailure::Other(err.to_string()),
                        },
                    };
                    let _ = event_tx.send(msg);
                });
            }
            Effect::FetchResult { generation, url } => {
                let api = self.api.clone();
                let token = self.inflight.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let reply = tokio::select! {
                        biased;
                        _ = token.cancelled() => return,
                        reply = api.fetch_result(&url) => reply,
                    };
                    let msg = match reply {
                        Ok(outcome) => Msg::ResultFetched {
                            generation,
                            outcome,
                        },
                        Err(err) => Msg::ResultFailed {
                            generation,
                            message: err.to_string(),
                        },
                    };
                    let _ = event_tx.send(msg);
                });
            }
        }
    }
}

fn log_transition<T: Tool>(before: JobStatus, state: &PollerState<T::Output>) {
    match state.status() {
        JobStatus::Failed => jw_warn!(
            "{} job failed generation={}: {}",
            T::NAME,
            state.generation(),
            state.error().unwrap_or_default()
        ),
        after => jw_info!(
            "{} {:?} -> {:?} generation={}",
            T::NAME,
            before,
            after,
            state.generation()
        ),
    }
}

fn sample_jitter(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    let millis = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
}

#[cfg(test)]
mod tests {
    use super::sample_jitter;
    use std::time::Duration;

    #[test]
    fn jitter_stays_within_bounds() {
        assert_eq!(sample_jitter(Duration::ZERO), Duration::ZERO);
        for _ in 0..100 {
            assert!(sample_jitter(Duration::from_secs(1)) <= Duration::from_secs(1));
        }
    }
}
