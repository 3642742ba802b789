//! Bedrock Pre-Check entry point
//!
//! Runs as a Lambda function by default. `check` runs the same checks from
//! a workstation using the ambient AWS credentials.

use bedrock_precheck::client::{load_sdk_config, BedrockCatalog, BedrockInvoker};
use bedrock_precheck::config::PrecheckConfig;
use bedrock_precheck::contracts::*;
use bedrock_precheck::engine::PrecheckEngine;
use bedrock_precheck::handler::PrecheckHandler;
use bedrock_precheck::telemetry;
use clap::{Parser, Subcommand};
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "bedrock-precheck")]
#[command(about = "Validate Bedrock access and model availability before deployment")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve CloudFormation custom resource events (default)
    Lambda,

    /// Run the pre-checks once and print the report
    Check {
        /// Model to validate
        #[arg(short, long, env = "PRECHECK_DEFAULT_MODEL_ID", default_value = DEFAULT_MODEL_ID)]
        model_id: String,

        /// Provider to filter the model listing by
        #[arg(short, long)]
        provider: Option<ModelProvider>,

        /// Region override
        #[arg(short, long)]
        region: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PrecheckConfig::from_env();
    let log_level = match &config {
        Ok(config) => config.log_level.clone(),
        Err(_) => PrecheckConfig::log_level_from_env(),
    };
    telemetry::init_tracing(&log_level);

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Lambda) {
        Commands::Lambda => {
            // Configuration errors are reported per event so CloudFormation
            // is never left waiting for a callback.
            let handler = match config {
                Ok(config) => {
                    tracing::info!(
                        default_model_id = %config.default_model_id,
                        "Starting Bedrock pre-check handler"
                    );
                    match PrecheckHandler::from_config(&config).await {
                        Ok(handler) => handler,
                        Err(e) => PrecheckHandler::from_startup_error(e)?,
                    }
                }
                Err(e) => PrecheckHandler::from_startup_error(e)?,
            };
            let handler = Arc::new(handler);

            lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
                let handler = handler.clone();
                async move { handler.handle_lambda(event).await }
            }))
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        }

        Commands::Check {
            model_id,
            provider,
            region,
        } => {
            let config = config?;
            let provider = provider.unwrap_or(config.provider);
            let sdk_config = load_sdk_config(region.as_deref().or(config.region.as_deref())).await;

            let engine = PrecheckEngine::new(
                Arc::new(BedrockCatalog::new(&sdk_config)),
                Arc::new(BedrockInvoker::new(&sdk_config)),
                provider,
            );
            let report = engine.run(&model_id).await;

            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "status": report.status(),
                    "region": sdk_config.region().map(|r| r.to_string()),
                    "provider": provider,
                    "results": report.results,
                    "data": report.callback_data(),
                }))?
            );

            if !report.is_success() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
