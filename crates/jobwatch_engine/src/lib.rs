//! Jobwatch engine: HTTP client, effect execution and result persistence.
mod client;
mod engine;
mod envelope;
mod error;
mod store;
mod tool;
mod tools;

pub use client::{ClientSettings, HttpJobApi, JobApi};
pub use engine::PollerHandle;
pub use envelope::{decode_result, decode_snapshot, decode_submit_reply, SubmitReply};
pub use error::ClientError;
pub use store::{ResultStore, StoreError, StoredResult, STORE_SCHEMA_VERSION};
pub use tool::Tool;
pub use tools::{
    DiagramGenerator, DiagramOutput, DiagramRequest, PresentationBuilder, PresentationOutput,
    PresentationRequest, SummaryOutput, SummaryRequest, YoutubeSummarizer,
};

pub use jobwatch_core::{JobStatus, JobTicket, JobView, PollPolicy, ResultOutcome, StatusSnapshot};
