mod app;
mod cli;

#[cfg(feature = "tui")]
mod tui;

use anyhow::Context;
use clap::Parser;
use tripstream::config::{Config, Settings};
use tripstream::{paths, TravelClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries streamed content only; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    let config_path = paths::config_path()?;
    let cfg = Config::load_optional(&config_path)?;
    let settings = Settings::resolve(cfg.as_ref(), args.base_url.clone(), |k| std::env::var(k).ok());
    tracing::debug!(?config_path, base_url = %settings.base_url, "resolved config");

    let http = app::build_http(&settings).context("failed to build HTTP client")?;

    let client = TravelClient::new(http.clone(), &settings.base_url)?
        .with_idle_timeout(settings.idle_timeout);

    match args.cmd {
        cli::Command::Plan(plan) => app::cmd_plan(&client, plan).await,
        cli::Command::Chat { agent, message } => {
            app::cmd_chat(&client, &message.join(" "), agent).await
        }
        cli::Command::Guide {
            attraction,
            style,
            image,
        } => app::cmd_guide(&client, &attraction, &style, image).await,
        cli::Command::Repl => app::cmd_repl(&client).await,
        #[cfg(feature = "tui")]
        cli::Command::Tui => tui::run_tui(client).await,
        #[cfg(feature = "admin")]
        cli::Command::Admin { cmd } => {
            let admin = tripstream::admin::AdminClient::new(http, &settings.base_url)?;
            app::cmd_admin(&admin, cmd, settings.per_page).await
        }
    }
}
