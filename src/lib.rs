//! taskloop: run benchmark tasks through a bounded agent loop
//!
//! A task carries a setup tool, a prompt and an evaluation tool. The
//! [`agent::TaskAgent`] runs setup, drives the model through
//! [`agent_loop::BoundedLoop`] until it stops requesting tools or the step
//! budget runs out, evaluates the result and always shuts the tool
//! environment down.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskloop::agent::TaskAgent;
//! use taskloop::config::TaskLoopConfig;
//! use taskloop::provider::openai::OpenAiResponder;
//! use taskloop::tools::{builtin, ToolRegistry};
//!
//! # async fn example() -> taskloop::error::Result<()> {
//! let config = TaskLoopConfig::from_env();
//! let registry = Arc::new(ToolRegistry::from_tools(builtin::all_tools(None)));
//! let responder = Arc::new(OpenAiResponder::from_config(&config, registry.definitions())?);
//! let task = taskloop::task::load_task("tasks.jsonl", 0)?;
//!
//! let report = TaskAgent::new(config, responder, registry).run(&task).await?;
//! println!("steps: {}, completed: {}", report.steps, report.completed());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod agent_loop;
pub mod config;
pub mod error;
pub mod provider;
pub mod task;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
