use jobwatch_core::{JobStatus, JobView};

/// Turns successive job views into the lines worth printing.
#[derive(Debug, Default)]
pub struct ProgressPrinter {
    status: Option<JobStatus>,
    progress: u8,
    stage: String,
    logs_seen: usize,
    retries: u32,
}

impl ProgressPrinter {
    pub fn lines<R>(&mut self, view: &JobView<R>) -> Vec<String> {
        let mut lines = Vec::new();

        if self.status != Some(view.status) {
            self.status = Some(view.status);
            lines.push(format!("status: {}", status_label(view.status)));
        }
        if view.progress != self.progress || view.stage != self.stage {
            self.progress = view.progress;
            self.stage.clone_from(&view.stage);
            if view.status == JobStatus::Processing {
                lines.push(format!("[{:>3}%] {}", view.progress, view.stage).trim_end().to_string());
            }
        }
        if view.retries > self.retries {
            lines.push(format!("connection problem, retry {}", view.retries));
        }
        self.retries = view.retries;

        if view.logs.len() < self.logs_seen {
            self.logs_seen = 0;
        }
        for line in &view.logs[self.logs_seen..] {
            lines.push(format!("  | {line}"));
        }
        self.logs_seen = view.logs.len();

        lines
    }
}

fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Idle => "idle",
        JobStatus::Starting => "starting",
        JobStatus::Processing => "processing",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(status: JobStatus, progress: u8, stage: &str, logs: &[&str]) -> JobView<()> {
        JobView {
            status,
            progress,
            stage: stage.to_string(),
            logs: logs.iter().map(|l| l.to_string()).collect(),
            ..JobView::default()
        }
    }

    #[test]
    fn prints_only_changes() {
        let mut printer = ProgressPrinter::default();
        assert_eq!(
            printer.lines(&view(JobStatus::Starting, 0, "", &[])),
            vec!["status: starting"]
        );
        assert_eq!(
            printer.lines(&view(JobStatus::Processing, 40, "transcribing", &["a"])),
            vec!["status: processing", "[ 40%] transcribing", "  | a"]
        );
        assert!(printer
            .lines(&view(JobStatus::Processing, 40, "transcribing", &["a"]))
            .is_empty());
        assert_eq!(
            printer.lines(&view(JobStatus::Processing, 40, "transcribing", &["a", "b"])),
            vec!["  | b"]
        );
    }

    #[test]
    fn retries_are_announced() {
        let mut printer = ProgressPrinter::default();
        printer.lines(&view(JobStatus::Processing, 10, "", &[]));
        let retrying = JobView {
            retries: 2,
            ..view(JobStatus::Processing, 10, "", &[])
        };
        assert_eq!(printer.lines(&retrying), vec!["connection problem, retry 2"]);
    }
}
