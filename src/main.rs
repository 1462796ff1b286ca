//! taskloop binary entry point.

use taskloop::agent::TaskAgent;
use taskloop::cli::{banner, progress, Cli, Commands, InspectArgs, RunArgs};
use taskloop::config::TaskLoopConfig;
use taskloop::provider::openai::OpenAiResponder;
use taskloop::task;
use taskloop::tools::{builtin, ToolRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse_args();

    let result = match cli.command {
        Commands::Run(args) => handle_run(args).await,
        Commands::Inspect(args) => handle_inspect(args),
        Commands::NextSteps => {
            banner::print_next_steps();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn handle_run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = TaskLoopConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let task = task::load_task(&args.dataset, args.index)?;
    eprintln!("📋 Task {}: {}", task.id(), progress::preview(&task.prompt, 200));
    if let Some(environment) = progress::render_environment(&task) {
        eprintln!("{environment}");
    }

    let registry = ToolRegistry::from_tools(builtin::all_tools(config.workspace.clone()))
        .with_allowed_tools(config.allowed_tools.clone());
    let responder = OpenAiResponder::from_config(&config, registry.definitions())?;
    eprintln!("🤖 Model: {} (max {} steps)", responder.model(), config.max_steps);

    let agent = TaskAgent::new(config, responder, registry)
        .with_event_sink(Some(progress::progress_sink()));
    let report = agent.run(&task).await?;

    println!();
    for line in progress::render_report(&report) {
        println!("{line}");
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    if !args.no_banner {
        banner::print_next_steps();
    }
    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.index {
        Some(index) => {
            let task = task::load_task(&args.dataset, index)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        None => {
            let tasks = task::load_dataset(&args.dataset)?;
            println!("{} tasks in {}", tasks.len(), args.dataset.display());
            for (index, task) in tasks.iter().enumerate() {
                println!(
                    "  [{index}] {} setup={} evaluate={}  {}",
                    task.id(),
                    task.setup_tool.len(),
                    task.evaluate_tool.len(),
                    progress::preview(&task.prompt, 60)
                );
            }
        }
    }
    Ok(())
}
