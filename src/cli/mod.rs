//! CLI entry point for taskloop.

pub mod banner;
pub mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::TaskLoopConfig;

/// Run benchmark tasks with a tool-calling model.
#[derive(Parser, Debug)]
#[command(name = "taskloop", version, about = "taskloop: bounded tool-calling agent runs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one task from a dataset file
    Run(RunArgs),
    /// Print a task from a dataset file without running it
    Inspect(InspectArgs),
    /// Print pointers for what to do after a run
    NextSteps,
}

/// Arguments for `taskloop run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Dataset file (.jsonl, or .json holding a task or a list of tasks)
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// Position of the task in the dataset
    #[arg(short, long, default_value_t = 0)]
    pub index: usize,

    /// Model name (overrides config and TASKLOOP_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum loop iterations
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Per-call timeout for model and tool calls, in milliseconds
    #[arg(long)]
    pub step_timeout_ms: Option<u64>,

    /// Config file (defaults to the per-user config when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// System prompt used when the task does not set one
    #[arg(short, long)]
    pub system: Option<String>,

    /// Directory the built-in tools run in
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Restrict the tools offered to the model (repeatable)
    #[arg(long = "allowed-tool")]
    pub allowed_tools: Vec<String>,

    /// Skip the next-steps banner
    #[arg(long)]
    pub no_banner: bool,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Apply flag overrides on top of a loaded config.
    pub fn apply(&self, config: &mut TaskLoopConfig) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(timeout) = self.step_timeout_ms {
            config.step_timeout_ms = Some(timeout);
        }
        if let Some(system) = &self.system {
            config.system_prompt = Some(system.clone());
        }
        if let Some(workspace) = &self.workspace {
            config.workspace = Some(workspace.clone());
        }
        if !self.allowed_tools.is_empty() {
            config.allowed_tools = Some(self.allowed_tools.clone());
        }
    }
}

/// Arguments for `taskloop inspect`.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Dataset file
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// Print only this task instead of a listing
    #[arg(short, long)]
    pub index: Option<usize>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
