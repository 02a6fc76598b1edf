//! One handler per subcommand.

use anyhow::{bail, Context, Result};
use chanjo_client::{AdministeredStore, ApiClient};
use chanjo_core::{Config, Gender, MotherProfile, Profile};
use chanjo_schedule::RuleTable;
use chrono::{Local, NaiveDate};
use tracing::warn;

use crate::config::CliConfig;
use crate::pages::{load_dashboard, Dashboard, DashboardState};
use crate::session::SessionContext;
use crate::terminal::Terminal;

/// Today at midnight, computed once per command invocation.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{raw}' (expected YYYY-MM-DD)"))
}

fn parse_gender(raw: &str) -> Result<Gender> {
    raw.parse::<Gender>().map_err(Into::into)
}

/// Load the active rule table: CLI config file, then environment, then the
/// built-in national schedule.
fn load_rule_table(cli: &CliConfig, env: &Config) -> Result<RuleTable> {
    let path = cli
        .rules_file
        .as_deref()
        .or(env.schedule.rules_file.as_deref());
    match path {
        Some(p) => RuleTable::from_yaml_file(p)
            .with_context(|| format!("failed to load rule table: {}", p.display())),
        None => RuleTable::builtin()
            .validated()
            .context("built-in rule table failed validation"),
    }
}

fn prompt_password(terminal: &Terminal, provided: Option<String>) -> Result<String> {
    match provided {
        Some(p) => Ok(p),
        None => {
            let p = terminal.prompt_line("Password (input is echoed)")?;
            if p.is_empty() {
                bail!("password must not be empty");
            }
            Ok(p)
        }
    }
}

async fn fetch_profile(client: &ApiClient, session: &SessionContext) -> Result<Profile> {
    client
        .profile(&session.token)
        .await
        .context("failed to load profile")
}

// ── Auth ──────────────────────────────────────────────────────

pub async fn signup(
    client: &ApiClient,
    terminal: &Terminal,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = prompt_password(terminal, password)?;
    let token = client
        .signup(email, &password)
        .await
        .context("signup failed")?;
    SessionContext::new(email, &token, false).save()?;
    terminal.print_info(&format!(
        "Account created; you are logged in as {email}. Run `chanjo init-profile` next."
    ))?;
    Ok(())
}

pub async fn login(
    client: &ApiClient,
    terminal: &Terminal,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = prompt_password(terminal, password)?;
    let (token, must_reset) = client
        .login(email, &password)
        .await
        .context("login failed")?;
    SessionContext::new(email, &token, must_reset).save()?;
    if must_reset {
        terminal.print_warning(
            "your password must be reset before anything else (run `chanjo reset-password`)",
        )?;
    } else {
        terminal.print_info(&format!("Logged in as {email}."))?;
    }
    Ok(())
}

pub async fn reset_password(
    client: &ApiClient,
    terminal: &Terminal,
    password: Option<String>,
) -> Result<()> {
    let mut session = SessionContext::require()?;
    let password = prompt_password(terminal, password)?;
    client
        .reset_password(&session.token, &password)
        .await
        .context("password reset failed")?;
    session.must_reset = false;
    session.save()?;
    terminal.print_info("Password updated.")?;
    Ok(())
}

pub fn logout(terminal: &Terminal) -> Result<()> {
    if SessionContext::clear()? {
        terminal.print_info("Logged out.")?;
    } else {
        terminal.print_info("No active session.")?;
    }
    Ok(())
}

// ── Profile & babies ──────────────────────────────────────────

pub async fn profile(client: &ApiClient, terminal: &Terminal) -> Result<()> {
    let session = SessionContext::require_active()?;
    let profile = fetch_profile(client, &session).await?;
    terminal.print_profile(&profile)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn init_profile(
    client: &ApiClient,
    terminal: &Terminal,
    full_name: &str,
    phone: &str,
    baby_name: &str,
    date_of_birth: &str,
    gender: &str,
) -> Result<()> {
    let session = SessionContext::require_active()?;
    let dob = parse_date(date_of_birth)?;
    let gender = parse_gender(gender)?;
    let mother = MotherProfile {
        full_name: full_name.to_string(),
        phone_number: phone.to_string(),
    };

    let baby_id = client
        .submit_profile(&session.token, &mother, baby_name, dob, gender)
        .await
        .context("failed to submit profile")?;
    init_administered_tracking(client, terminal, &session, &baby_id).await?;

    terminal.print_info(&format!(
        "Profile saved; {baby_name} registered ({baby_id})."
    ))?;
    Ok(())
}

pub async fn add_baby(
    client: &ApiClient,
    terminal: &Terminal,
    name: &str,
    date_of_birth: &str,
    gender: &str,
) -> Result<()> {
    let session = SessionContext::require_active()?;
    let dob = parse_date(date_of_birth)?;
    let gender = parse_gender(gender)?;

    let baby_id = client
        .create_baby(&session.token, name, dob, gender)
        .await
        .context("failed to register baby")?;
    init_administered_tracking(client, terminal, &session, &baby_id).await?;

    terminal.print_info(&format!("{name} registered ({baby_id})."))?;
    Ok(())
}

/// Initialize server-side administered tracking for a new baby. A failure
/// here is a warning: the record exists, tracking starts on next reload.
async fn init_administered_tracking(
    client: &ApiClient,
    terminal: &Terminal,
    session: &SessionContext,
    baby_id: &str,
) -> Result<()> {
    if let Err(e) = client.init_administered(&session.token, baby_id).await {
        warn!(baby = %baby_id, error = %e, "failed to initialize administered tracking");
        terminal.print_warning("could not initialize the administered history on the server")?;
    }
    Ok(())
}

pub async fn set_birth_date(
    client: &ApiClient,
    terminal: &Terminal,
    cli_config: &CliConfig,
    baby: Option<&str>,
    date: &str,
) -> Result<()> {
    let session = SessionContext::require_active()?;
    let new_dob = parse_date(date)?;
    let profile = fetch_profile(client, &session).await?;
    let baby = profile.resolve_baby(cli_config.resolve_baby(baby))?;

    client
        .update_birth_date(&session.token, &baby.id, new_dob)
        .await
        .context("failed to update birth date")?;
    terminal.print_info(&format!(
        "Birth date for {} set to {new_dob}; the schedule regenerates from it.",
        baby.name
    ))?;
    Ok(())
}

// ── Schedule pages ────────────────────────────────────────────

pub async fn schedule(
    client: &ApiClient,
    terminal: &Terminal,
    cli_config: &CliConfig,
    env_config: &Config,
    baby: Option<&str>,
) -> Result<()> {
    let session = SessionContext::require_active()?;
    let table = load_rule_table(cli_config, env_config)?;
    terminal.print_banner(client.base_url())?;

    let state = match fetch_profile(client, &session).await {
        Ok(profile) => {
            let baby = profile.resolve_baby(cli_config.resolve_baby(baby))?.clone();
            load_dashboard(client, &table, &session.token, baby, today()).await
        }
        Err(e) => DashboardState::failed(format!("{e:#}")),
    };

    render_dashboard(terminal, &table, state)
}

fn render_dashboard(terminal: &Terminal, table: &RuleTable, state: DashboardState) -> Result<()> {
    match state {
        DashboardState::Loading => terminal.print_info("Loading..."),
        DashboardState::Ready(dashboard) => {
            if let Some(warning) = &dashboard.warning {
                terminal.print_warning(warning)?;
            }
            terminal.print_pending(
                &dashboard.baby,
                &dashboard.reconciliation.pending,
                table,
                dashboard.today,
            )
        }
        DashboardState::Error(message) => bail!(message),
    }
}

pub async fn administered(
    client: &ApiClient,
    terminal: &Terminal,
    cli_config: &CliConfig,
    baby: Option<&str>,
) -> Result<()> {
    let session = SessionContext::require_active()?;
    let profile = fetch_profile(client, &session).await?;
    let baby = profile.resolve_baby(cli_config.resolve_baby(baby))?;

    match AdministeredStore::administered(client, &session.token, &baby.id).await {
        Ok(records) => terminal.print_administered(baby, &records),
        Err(e) => {
            warn!(baby = %baby.id, error = %e, "error fetching administered list");
            terminal.print_warning("failed to load the administered list")
        }
    }
}

pub async fn mark(
    client: &ApiClient,
    terminal: &Terminal,
    cli_config: &CliConfig,
    env_config: &Config,
    baby: Option<&str>,
    vaccine: &str,
) -> Result<()> {
    let session = SessionContext::require_active()?;
    let table = load_rule_table(cli_config, env_config)?;
    let profile = fetch_profile(client, &session).await?;
    let baby = profile.resolve_baby(cli_config.resolve_baby(baby))?.clone();

    let state = load_dashboard(client, &table, &session.token, baby, today()).await;
    let mut dashboard = match state {
        DashboardState::Ready(d) => d,
        DashboardState::Error(message) => bail!(message),
        DashboardState::Loading => bail!("dashboard did not finish loading"),
    };

    let record = dashboard.mark(vaccine)?;

    // The local state is already final: render it before the network call
    // so the caregiver sees the dose move immediately.
    terminal.print_info(&format!(
        "Marked {} as administered for {} ({}).",
        record.vaccine, dashboard.baby.name, record.due_date
    ))?;
    terminal.print_pending(
        &dashboard.baby,
        &dashboard.reconciliation.pending,
        &table,
        dashboard.today,
    )?;

    persist_mark(client, &session, &dashboard, &record).await;
    Ok(())
}

/// Fire-and-forget persistence of a manual mark. The optimistic local
/// state above stands whether or not this succeeds; a failure reconciles
/// on the next full reload.
async fn persist_mark(
    client: &ApiClient,
    session: &SessionContext,
    dashboard: &Dashboard,
    record: &chanjo_core::AdministeredRecord,
) {
    let client = client.clone();
    let token = session.token.clone();
    let baby_id = dashboard.baby.id.clone();
    let vaccine = record.vaccine.clone();
    let date = record.due_date;

    let handle = tokio::spawn(async move {
        if let Err(e) = client
            .mark_administered(&token, &baby_id, &vaccine, date)
            .await
        {
            warn!(
                baby = %baby_id,
                vaccine = %vaccine,
                error = %e,
                "failed to persist administered mark; it will reconcile on next reload"
            );
        }
    });

    // Wait only so the process does not exit before the request goes out;
    // the outcome is ignored.
    let _ = handle.await;
}
