mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use jobwatch_engine::{
    DiagramGenerator, DiagramRequest, PresentationBuilder, PresentationRequest, SummaryRequest,
    YoutubeSummarizer,
};
use jobwatch_logging::LogDestination;
use log::LevelFilter;

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(name = "jobwatch", version, about = "Submit content jobs and follow them to completion")]
struct Cli {
    /// RON config file (defaults to ./jobwatch.ron when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a YouTube video.
    Summarize {
        url: String,
        #[arg(long, default_value = "en")]
        language: String,
        #[arg(long, default_value = "detailed")]
        mode: String,
    },
    /// Generate a diagram from a prompt.
    Diagram {
        prompt: String,
        #[arg(long)]
        diagram_type: Option<String>,
    },
    /// Build a presentation about a topic.
    Presentation {
        topic: String,
        #[arg(long, default_value_t = 8)]
        slides: u32,
        #[arg(long)]
        theme: Option<String>,
    },
    /// Inspect results kept from earlier runs.
    Results {
        #[command(subcommand)]
        action: ResultsAction,
    },
}

#[derive(Subcommand, Debug)]
enum ResultsAction {
    Show { tool: ToolName },
    Clear { tool: ToolName },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ToolName {
    Summarize,
    Diagram,
    Presentation,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    config.apply(Overrides {
        base_url: cli.base_url,
        store_dir: cli.store_dir,
        log_file: cli.log_file,
        verbose: cli.verbose,
    });

    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    jobwatch_logging::initialize(
        LogDestination::from_optional_file(config.log_file.as_deref()),
        level,
    );

    match cli.command {
        Command::Summarize {
            url,
            language,
            mode,
        } => {
            let request = SummaryRequest {
                url,
                language,
                mode,
            };
            commands::run_tool::<YoutubeSummarizer>(&config, request).await
        }
        Command::Diagram {
            prompt,
            diagram_type,
        } => {
            let request = DiagramRequest {
                prompt,
                diagram_type,
            };
            commands::run_tool::<DiagramGenerator>(&config, request).await
        }
        Command::Presentation {
            topic,
            slides,
            theme,
        } => {
            let request = PresentationRequest {
                topic,
                slide_count: slides,
                theme,
            };
            commands::run_tool::<PresentationBuilder>(&config, request).await
        }
        Command::Results { action } => match action {
            ResultsAction::Show { tool } => match tool {
                ToolName::Summarize => commands::show_result::<YoutubeSummarizer>(&config),
                ToolName::Diagram => commands::show_result::<DiagramGenerator>(&config),
                ToolName::Presentation => commands::show_result::<PresentationBuilder>(&config),
            },
            ResultsAction::Clear { tool } => match tool {
                ToolName::Summarize => commands::clear_result::<YoutubeSummarizer>(&config),
                ToolName::Diagram => commands::clear_result::<DiagramGenerator>(&config),
                ToolName::Presentation => commands::clear_result::<PresentationBuilder>(&config),
            },
        },
    }
}
