//! Pushdeck CLI tool.

use clap::{Parser, Subcommand};
use pushdeck_core::Environment;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Client;
use commands::board::Bucket;

#[derive(Parser)]
#[command(name = "pushdeck")]
#[command(about = "Pushdeck deployment dashboard CLI", long_about = None)]
struct Cli {
    /// API server URL
    #[arg(long, env = "PUSHDECK_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Session token sent as a bearer token
    #[arg(long, env = "PUSHDECK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue a staging build of a module
    Create {
        module: String,
        version: String,
        /// Who asks for the build
        #[arg(long, default_value = "pushdeck-cli")]
        requestor: String,
    },
    /// Show the status of a job
    Status { id: String },
    /// Cancel a queued job
    Cancel { id: String },
    /// Promote a tested job to production
    GoLive { id: String },
    /// Redeploy what a live job deployed
    Rollback { id: String },
    /// Report a test run result
    TestResult {
        id: String,
        /// "true" marks the tests as passed, anything else as failed
        success: String,
    },
    /// Show the dashboard board
    Board {
        /// Only one environment (requires --bucket)
        #[arg(long, value_parser = parse_environment, requires = "bucket")]
        env: Option<Environment>,
        #[arg(long, value_enum, requires = "env")]
        bucket: Option<Bucket>,
        /// Only deployed jobs of this module
        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        page_size: Option<i64>,
    },
    /// Show what production is deploying
    Deploying,
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "pushdeck.kdl")]
        path: String,
    },
}

fn parse_environment(raw: &str) -> Result<Environment, String> {
    raw.parse().map_err(|e: pushdeck_core::Error| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => commands::validate(&path),
        command => {
            let client = Client::new(&cli.api_url, cli.token)?;
            run(&client, command).await
        }
    }
}

async fn run(client: &Client, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Create {
            module,
            version,
            requestor,
        } => commands::jobs::create(client, &module, &version, &requestor).await,
        Commands::Status { id } => commands::jobs::status(client, &id).await,
        Commands::Cancel { id } => commands::jobs::cancel(client, &id).await,
        Commands::GoLive { id } => commands::jobs::go_live(client, &id).await,
        Commands::Rollback { id } => commands::jobs::rollback(client, &id).await,
        Commands::TestResult { id, success } => {
            commands::jobs::test_result(client, &id, &success).await
        }
        Commands::Board {
            env,
            bucket,
            repo,
            page_size,
        } => {
            let args = commands::board::BoardArgs {
                env,
                bucket,
                repo,
                page_size,
            };
            commands::board::show(client, &args).await
        }
        Commands::Deploying => commands::board::deploying(client).await,
        Commands::Validate { path } => commands::validate(&path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_board_needs_env_and_bucket_together() {
        let result = Cli::try_parse_from(["pushdeck", "board", "--env", "staging"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "pushdeck", "board", "--env", "production", "--bucket", "deployed",
        ])
        .unwrap();
        let Commands::Board { env, bucket, .. } = cli.command else {
            panic!("expected board command");
        };
        assert_eq!(env, Some(Environment::Production));
        assert_eq!(bucket, Some(Bucket::Deployed));
    }

    #[test]
    fn test_unknown_environment_is_rejected() {
        let result = Cli::try_parse_from([
            "pushdeck", "board", "--env", "qa", "--bucket", "queued",
        ]);
        assert!(result.is_err());
    }
}
