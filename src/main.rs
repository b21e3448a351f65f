//! MySQL operator - reconciles MySql resources into Services and a StatefulSet

use clap::{Parser, Subcommand};
use kube::CustomResourceExt;

use mysql_operator::config::ControllerConfig;
use mysql_operator::controller;
use mysql_operator::crd::MySql;
use mysql_operator::kube_utils::create_client;
use mysql_operator::telemetry::init_tracing;

/// MySQL operator - keeps replicated MySQL clusters in existence
#[derive(Parser, Debug)]
#[command(name = "mysql-operator", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    config: ControllerConfig,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as controller (default mode)
    ///
    /// Watches MySql resources plus the Services and StatefulSets they control,
    /// and creates whichever dependents are missing.
    Controller,

    /// Print the MySql CustomResourceDefinition as YAML and exit
    Crd,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Crd) => {
            let crd = serde_yaml::to_string(&MySql::crd())
                .map_err(|e| anyhow::anyhow!("Failed to serialize CRD: {}", e))?;
            println!("{crd}");
            Ok(())
        }
        Some(Commands::Controller) | None => run_controller(cli.config).await,
    }
}

/// Run the reconcile loop until SIGINT/SIGTERM
async fn run_controller(config: ControllerConfig) -> anyhow::Result<()> {
    init_tracing(config.log_format)?;
    config.validate()?;

    let client = create_client(config.kubeconfig.as_deref()).await?;
    controller::run(client, &config).await;
    Ok(())
}
