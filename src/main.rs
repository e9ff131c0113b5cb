use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use approval_bot::slack::signature::SignatureVerifier;
use approval_bot::slack::SlackClient;
use approval_bot::store::ApprovalStore;
use approval_bot::workflow::ApprovalWorkflow;
use approval_bot::{api, cli, config, slack, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Export spans over OTLP when a collector is configured; otherwise log to stdout only.
    use opentelemetry::KeyValue;

    use opentelemetry_sdk::{trace as sdktrace, Resource};

    let telemetry_layer = if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic())
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", "approval-bot"),
            ])))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .context("failed to install OpenTelemetry tracer")?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "approval_bot=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry_layer)
        .init();

    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Modal) => {
            println!("{}", serde_json::to_string_pretty(&slack::views::request_modal())?);
            Ok(())
        }
        Some(cli::Commands::Serve { port }) => {
            let cfg = config::load()?;
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        None => {
            let cfg = config::load()?;
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        tracing::error!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    let client = SlackClient::new(&cfg.bot_token, &cfg.slack_api_base)?;
    let workflow = ApprovalWorkflow::new(Arc::new(client), ApprovalStore::new(), cfg.command.clone());

    let state = Arc::new(AppState {
        workflow,
        verifier: SignatureVerifier::new(&cfg.signing_secret, cfg.signature_max_age_secs),
    });

    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(command = %cfg.command, "⚡️ Bot is running on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
