use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use leetcoach_cli::{app, Theme};
use leetcoach_core::Settings;

#[derive(Parser)]
#[command(name = "leetcoach")]
#[command(about = "LeetCoach - a Socratic LeetCode tutor in your terminal")]
#[command(version)]
struct Cli {
    /// Send a single message and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Chat service base URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Color theme (light, dark)
    #[arg(long)]
    theme: Option<String>,

    /// Treat problem URLs as plain text
    #[arg(long)]
    no_context: bool,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = match cli.config {
        Some(ref path) => Settings::load_from(path),
        None => Settings::load(),
    };

    if let Some(endpoint) = cli.endpoint {
        settings.client.endpoint = endpoint;
    }
    if cli.no_context {
        settings.client.context_detection = false;
    }
    let theme = Theme::by_name(cli.theme.as_deref().unwrap_or(&settings.client.theme));

    if let Some(prompt) = cli.prompt {
        app::run_single_prompt(&settings, &prompt, theme).await?;
    } else {
        app::run_repl(settings, theme).await?;
    }

    Ok(())
}
