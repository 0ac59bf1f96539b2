//! Jobwatch core: pure job-polling state machine and view-model helpers.
mod effect;
mod job;
mod msg;
mod policy;
mod state;
mod update;
mod view_model;

pub use effect::{Delay, Effect};
pub use job::{Generation, JobStatus, JobTicket, RemoteStatus, StatusSnapshot};
pub use msg::{Msg, PollFailure, ResultOutcome};
pub use policy::PollPolicy;
pub use state::PollerState;
pub use update::{update, CONNECTION_LOST_MESSAGE, JOB_FAILED_MESSAGE, TIMEOUT_MESSAGE};
pub use view_model::JobView;
