use clap::{Arg, Command};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use conjure::assistant::Assistant;
use conjure::backend::LlmBackend;
use conjure::config::Config;
use conjure::error::{AppError, EXIT_CORE_ERROR, EXIT_USAGE};
use conjure::executor::ShellExecutor;
use conjure::http::ReqwestHttpClient;
use conjure::ui::ConsoleUi;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Ctrl-C abandons any in-flight request and leaves with a success status.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nExiting...");
            std::process::exit(0);
        }
    });

    let matches = Command::new("conjure")
        .about("Translate natural language into shell commands you can review, revise and run")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("ask")
                .about("Translate a natural-language request into a shell command")
                .arg(
                    Arg::new("prompt")
                        .help("The request, as free text")
                        .num_args(1..)
                        .required(true),
                ),
        )
        .subcommand(Command::new("config").about("Enter the API key again"))
        .get_matches();

    match matches.subcommand() {
        Some(("config", _)) => {
            if let Err(err) = Config::reconfigure() {
                eprintln!("Error: {err}");
                std::process::exit(EXIT_CORE_ERROR);
            }
        }
        Some(("ask", sub)) => {
            let prompt = sub
                .get_many::<String>("prompt")
                .into_iter()
                .flatten()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let prompt = prompt.trim().to_string();

            // Usage errors are reported before any configuration or API work.
            if prompt.is_empty() {
                eprintln!("Error: please provide a valid prompt.");
                std::process::exit(EXIT_USAGE);
            }

            if let Err(err) = ask(&prompt).await {
                report(&err);
                std::process::exit(err.exit_code());
            }
        }
        _ => unreachable!("subcommand is required"),
    }
}

async fn ask(prompt: &str) -> Result<(), AppError> {
    let config = Config::ensure_configured()?;
    let api_key = config
        .api_key
        .ok_or_else(|| anyhow::anyhow!("no API key configured"))?;

    let backend = LlmBackend::new(Arc::new(ReqwestHttpClient::new()), api_key);
    let assistant = Assistant::new(
        Arc::new(backend),
        Arc::new(ConsoleUi::new()),
        Arc::new(ShellExecutor::new()),
    );

    assistant.run(prompt).await
}

/// Maps every failure kind to its one user-facing message.
fn report(err: &AppError) {
    match err {
        AppError::Backend(backend_err) => {
            eprintln!("Error: {}", backend_err.remediation());
        }
        other => {
            eprintln!("Error: {other}");
        }
    }
}
