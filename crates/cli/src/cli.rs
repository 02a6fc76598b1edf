use clap::{Parser, Subcommand};

/// Vaccination tracking client.
///
/// Tracks each baby's immunization schedule against the national rule
/// table and the backend's administered-vaccine history.
#[derive(Parser, Debug)]
#[command(name = "chanjo", about = "Vaccination tracking client")]
pub struct CliArgs {
    /// Backend API base URL (overrides config file and environment)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Path to config file (default: ~/.config/chanjo/config.toml)
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and start a session
    Signup {
        email: String,
        /// Password (prompted when omitted)
        #[arg(long, env = "CHANJO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log in and persist the session
    Login {
        email: String,
        /// Password (prompted when omitted)
        #[arg(long, env = "CHANJO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Complete a forced password reset
    ResetPassword {
        /// New password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show the caregiver profile and registered babies
    Profile,

    /// Submit the initial mother/baby profile
    InitProfile {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        baby_name: String,
        /// Baby's date of birth (YYYY-MM-DD)
        #[arg(long)]
        date_of_birth: String,
        /// Male or Female
        #[arg(long)]
        gender: String,
    },

    /// Register a new baby
    AddBaby {
        name: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        date_of_birth: String,
        /// Male or Female
        #[arg(long)]
        gender: String,
    },

    /// Update a baby's birth date (the schedule regenerates from it)
    SetBirthDate {
        /// Baby name, name prefix, or ID (defaults to the first baby)
        #[arg(long)]
        baby: Option<String>,
        /// New date of birth (YYYY-MM-DD)
        date: String,
    },

    /// Show the pending vaccination schedule
    Schedule {
        /// Baby name, name prefix, or ID (defaults to the first baby)
        #[arg(long)]
        baby: Option<String>,
    },

    /// Show the administered history
    Administered {
        /// Baby name, name prefix, or ID (defaults to the first baby)
        #[arg(long)]
        baby: Option<String>,
    },

    /// Mark a pending dose as administered (doses due today or earlier only)
    Mark {
        /// Vaccine name as shown in the schedule
        vaccine: String,
        /// Baby name, name prefix, or ID (defaults to the first baby)
        #[arg(long)]
        baby: Option<String>,
    },
}
