mod cli;
mod commands;
mod config;
mod pages;
mod session;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;

use chanjo_client::ApiClient;
use chanjo_core::config::load_dotenv;
use chanjo_core::Config;

use crate::cli::{CliArgs, Command};
use crate::config::CliConfig;
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let terminal = Terminal::new();

    let cli_config =
        CliConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    let env_config = Config::from_env();
    env_config.log_summary();

    let mut api_config = env_config.api.clone();
    api_config.base_url = cli_config.resolve_api_url(args.api_url.as_deref(), &env_config.api);
    let client = ApiClient::from_config(&api_config).context("failed to build API client")?;

    let result = match args.command {
        Command::Signup { email, password } => {
            commands::signup(&client, &terminal, &email, password).await
        }
        Command::Login { email, password } => {
            commands::login(&client, &terminal, &email, password).await
        }
        Command::ResetPassword { password } => {
            commands::reset_password(&client, &terminal, password).await
        }
        Command::Logout => commands::logout(&terminal),
        Command::Profile => commands::profile(&client, &terminal).await,
        Command::InitProfile {
            full_name,
            phone,
            baby_name,
            date_of_birth,
            gender,
        } => {
            commands::init_profile(
                &client,
                &terminal,
                &full_name,
                &phone,
                &baby_name,
                &date_of_birth,
                &gender,
            )
            .await
        }
        Command::AddBaby {
            name,
            date_of_birth,
            gender,
        } => commands::add_baby(&client, &terminal, &name, &date_of_birth, &gender).await,
        Command::SetBirthDate { baby, date } => {
            commands::set_birth_date(&client, &terminal, &cli_config, baby.as_deref(), &date).await
        }
        Command::Schedule { baby } => {
            commands::schedule(&client, &terminal, &cli_config, &env_config, baby.as_deref()).await
        }
        Command::Administered { baby } => {
            commands::administered(&client, &terminal, &cli_config, baby.as_deref()).await
        }
        Command::Mark { vaccine, baby } => {
            commands::mark(
                &client,
                &terminal,
                &cli_config,
                &env_config,
                baby.as_deref(),
                &vaccine,
            )
            .await
        }
    };

    if let Err(e) = result {
        terminal.print_error(&format!("{e:#}"))?;
        std::process::exit(1);
    }
    Ok(())
}
