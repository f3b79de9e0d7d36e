use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::commands;
use crate::output::Output;

/// genai - drive and observe the workflow orchestration engine locally
#[derive(Parser, Debug)]
#[command(name = "genai")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base directory containing `agents/` and `workflows/` subtrees
    /// (overrides GENAI_BASE_PATH env var).
    #[arg(long, global = true, env = "GENAI_BASE_PATH", default_value = ".")]
    pub base_path: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a workflow run and wait for its terminal result.
    Submit {
        /// Workflow id to run.
        workflow_id: String,
        /// Initial input payload (typically JSON, treated as opaque text).
        input: String,
    },

    /// Poll a job's current status.
    Status {
        /// Job id returned by a prior submit.
        job_id: Uuid,
    },

    /// List registered agents or workflows.
    Discover {
        #[command(subcommand)]
        target: DiscoverTarget,
    },
}

#[derive(Subcommand, Debug)]
pub enum DiscoverTarget {
    Agents,
    Workflows,
}

impl Cli {
    pub async fn execute(self) -> anyhow::Result<()> {
        let output = Output::new();
        output.print_banner();

        match self.command {
            Commands::Submit { workflow_id, input } => {
                commands::submit::execute(&self.base_path, &workflow_id, &input, &output).await
            }
            Commands::Status { job_id } => commands::status::execute(&self.base_path, job_id, &output).await,
            Commands::Discover { target } => match target {
                DiscoverTarget::Agents => commands::discover::agents(&self.base_path, &output).await,
                DiscoverTarget::Workflows => commands::discover::workflows(&self.base_path, &output).await,
            },
        }
    }
}
