use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;
use jobwatch_core::{JobStatus, JobView};
use jobwatch_engine::{HttpJobApi, PollerHandle, ResultStore, Tool};
use jobwatch_logging::{jw_info, jw_warn};

use crate::config::AppConfig;
use crate::progress::ProgressPrinter;

/// Submits `request`, follows the job to its end and prints the result.
///
/// Ctrl-C abandons the job on the client side.
pub async fn run_tool<T: Tool>(config: &AppConfig, request: T::Request) -> anyhow::Result<()> {
    let api = HttpJobApi::new(&config.backend).context("invalid backend settings")?;
    jw_info!("Using backend {}", api.base_url());
    let handle = PollerHandle::<T>::spawn(Arc::new(api), config.policy.clone());

    let mut views = handle.subscribe();
    let generation = handle
        .start(request)
        .await
        .context("job poller stopped unexpectedly")?;
    let mut printer = ProgressPrinter::default();

    let view = loop {
        let current = views.borrow_and_update().clone();
        for line in printer.lines(&current) {
            println!("{line}");
        }
        if current.generation > generation
            || (current.generation == generation && current.status.is_terminal())
        {
            break current;
        }

        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break handle.view();
                }
            }
            _ = tokio::signal::ctrl_c() => {
                jw_warn!("Interrupted, abandoning {} job", T::NAME);
                handle.cancel();
                break handle.settled(generation).await;
            }
        }
    };

    finish::<T>(config, view)
}

fn finish<T: Tool>(config: &AppConfig, view: JobView<T::Output>) -> anyhow::Result<()> {
    match view.status {
        JobStatus::Completed => {
            let output = view
                .result
                .context("completed job carried no result")?;
            let store = ResultStore::new(&config.store_dir);
            let saved_utc = Utc::now().to_rfc3339();
            match store.save::<T>(view.job_id.as_deref(), &saved_utc, &output) {
                Ok(path) => jw_info!("Saved {} result to {:?}", T::NAME, path),
                Err(err) => jw_warn!("Could not save {} result: {}", T::NAME, err),
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        JobStatus::Failed => {
            let message = view.error.unwrap_or_else(|| "job failed".to_string());
            bail!("{message}")
        }
        JobStatus::Idle | JobStatus::Starting | JobStatus::Processing => {
            bail!("{} job was cancelled", T::NAME)
        }
    }
}

pub fn show_result<T: Tool>(config: &AppConfig) -> anyhow::Result<()> {
    let store = ResultStore::new(&config.store_dir);
    let stored = store
        .load::<T>()
        .with_context(|| format!("couldn't read stored {} result", T::NAME))?;
    match stored {
        Some(stored) => println!("{}", serde_json::to_string_pretty(&stored)?),
        None => println!("No stored {} result.", T::NAME),
    }
    Ok(())
}

pub fn clear_result<T: Tool>(config: &AppConfig) -> anyhow::Result<()> {
    let store = ResultStore::new(&config.store_dir);
    let removed = store
        .clear::<T>()
        .with_context(|| format!("couldn't clear stored {} result", T::NAME))?;
    if removed {
        println!("Cleared stored {} result.", T::NAME);
    } else {
        println!("No stored {} result.", T::NAME);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobwatch_engine::{SummaryOutput, YoutubeSummarizer};
    use serde_json::Value;

    fn config_in(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            store_dir: dir.to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn completed_view_is_saved_to_store() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = config_in(temp.path());
        let view = JobView {
            status: JobStatus::Completed,
            job_id: Some("abc".to_string()),
            result: Some(SummaryOutput {
                summary: "gist".to_string(),
                title: None,
                metadata: Value::Null,
            }),
            ..JobView::default()
        };

        finish::<YoutubeSummarizer>(&config, view).unwrap();

        let stored = ResultStore::new(temp.path())
            .load::<YoutubeSummarizer>()
            .unwrap()
            .expect("stored");
        assert_eq!(stored.job_id.as_deref(), Some("abc"));
        assert_eq!(stored.output.summary, "gist");
    }

    #[test]
    fn failed_view_returns_backend_message() {
        let temp = tempfile::TempDir::new().unwrap();
        let view = JobView::<SummaryOutput> {
            status: JobStatus::Failed,
            error: Some("video unavailable".to_string()),
            ..JobView::default()
        };
        let err = finish::<YoutubeSummarizer>(&config_in(temp.path()), view).unwrap_err();
        assert_eq!(err.to_string(), "video unavailable");
    }

    #[test]
    fn cancelled_view_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = finish::<YoutubeSummarizer>(&config_in(temp.path()), JobView::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "summarize job was cancelled");
    }
}
