use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kmf_updater::{
    build_runner, config::Config, server::UpdateServer, task::Scheduler, task::TaskRunner,
};

#[derive(Parser)]
#[command(name = "kmf-updater")]
#[command(about = "Publishes new localization mod releases to the KMF station")]
struct Cli {
    /// Address for the trigger endpoint
    #[arg(long, default_value = "0.0.0.0:8000")]
    listen: SocketAddr,

    /// Only serve the trigger endpoint, without timed runs
    #[arg(long)]
    no_schedule: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every task once in registry order and exit
    RunOnce {
        /// Only run the task with this name
        #[arg(long)]
        task: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.warn_missing();

    let runner = Arc::new(build_runner(&config)?);
    for task in runner.tasks() {
        info!(task = %task.name, schedule = %task.schedule, "Registered task");
    }

    if let Some(Commands::RunOnce { task }) = cli.command {
        match task {
            Some(name) => {
                if runner.run_by_name(&name).await.is_none() {
                    return Err(format!("unknown task `{}`", name).into());
                }
            }
            None => {
                runner.run_all().await;
            }
        }
        return Ok(());
    }

    serve(cli, config, runner).await
}

async fn serve(
    cli: Cli,
    config: Config,
    runner: Arc<TaskRunner>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let schedules = if cli.no_schedule {
        Vec::new()
    } else {
        Scheduler::new(runner.clone()).spawn()
    };

    let server = UpdateServer::new(runner, config.secret);
    let result = tokio::select! {
        result = server.start(cli.listen) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Shutting down");
            Ok(())
        }
    };

    for handle in schedules {
        handle.abort();
    }
    result
}
