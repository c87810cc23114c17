//!
//! alumnae command-line front end
//! ------------------------------
//! Stands in for the app's screens: every invocation restores the stored session first,
//! runs one operation, and prints the result as a table (record lists) or pretty JSON.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::forms::{EventForm, LoginForm, RegisterForm};
use crate::http::ApiClient;
use crate::models::{AlumniUpdate, Audience, GroupedAlumni};
use crate::session::{SessionController, LOGIN_FAILED, REGISTRATION_FAILED};
use crate::storage::FileStore;

pub mod table;

pub use table::render_records;

/// Client for the SSA alumnae network backend.
#[derive(Debug, Parser)]
#[command(name = "alumnae", author, version, about, long_about = None)]
pub struct Cli {
    /// Backend root URL including any prefix (default: $ALUMNAE_API_BASE_URL or http://localhost:5000/api)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// File holding the persisted session token
    #[arg(long, global = true, env = "ALUMNAE_STORE")]
    pub store: Option<PathBuf>,

    /// Always print JSON, never tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with a username or email
    Login {
        identifier: String,
        /// Read from stdin when omitted
        #[arg(long, env = "ALUMNAE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        username: String,
        email: String,
        #[arg(long, env = "ALUMNAE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Defaults to --password
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Sign out locally and on the backend
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List alumni
    Alumni {
        /// Group by graduation year
        #[arg(long)]
        grouped: bool,
        /// Filter the grouped listing by name
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one alumni profile
    Alumnus { id: String },
    /// Change one field of an alumni profile
    UpdateAlumnus { id: String, field: String, value: String },
    /// List events
    Events,
    /// Show one event
    Event { id: String },
    /// Create an event
    CreateEvent(CreateEventArgs),
    /// List graduation-year batches
    BatchYears,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AudienceKind {
    Alumnae,
    Batch,
    Group,
}

#[derive(Debug, Args)]
pub struct CreateEventArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// YYYY-MM-DD, defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// HH:MM, defaults to now
    #[arg(long)]
    pub time: Option<NaiveTime>,
    #[arg(long)]
    pub location: String,
    #[arg(long)]
    pub organizer_name: String,
    #[arg(long)]
    pub organizer_email: String,
    #[arg(long, value_enum, default_value = "alumnae")]
    pub audience: AudienceKind,
    #[arg(long, required_if_eq("audience", "batch"))]
    pub batch_year: Option<String>,
    #[arg(long)]
    pub group_name: Option<String>,
}

impl CreateEventArgs {
    fn into_form(self) -> EventForm {
        let now = Local::now();
        let audience = match self.audience {
            AudienceKind::Alumnae => Audience::Alumnae,
            AudienceKind::Batch => Audience::Batch(self.batch_year.unwrap_or_default()),
            AudienceKind::Group => Audience::Group(self.group_name.unwrap_or_default()),
        };
        EventForm {
            title: self.title,
            description: self.description,
            date: self.date.unwrap_or_else(|| now.date_naive()),
            time: self.time.unwrap_or_else(|| now.time()),
            location: self.location,
            organizer_name: self.organizer_name,
            organizer_email: self.organizer_email,
            audience,
        }
    }
}

/// Default token file under the platform data directory.
pub fn default_store_path() -> PathBuf {
    directories::ProjectDirs::from("org", "ssa", "alumnae")
        .map(|d| d.data_dir().join("storage.json"))
        .unwrap_or_else(|| PathBuf::from(".alumnae-storage.json"))
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        let mut cfg = ClientConfig::from_env();
        if let Some(url) = &self.base_url {
            cfg.base_url = url.clone();
        }
        if let Some(ms) = self.timeout_ms.filter(|ms| *ms > 0) {
            cfg.timeout = Duration::from_millis(ms);
        }
        cfg
    }
}

fn read_secret(prompt: &str) -> Result<String> {
    eprint!("{}: ", prompt);
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn emit(value: &Value, json_only: bool) -> Result<()> {
    if !json_only {
        if let Some(table) = render_records(value) {
            println!("{}", table);
            return Ok(());
        }
    }
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn emit_grouped(groups: &GroupedAlumni, json_only: bool) -> Result<()> {
    if json_only {
        println!("{}", serde_json::to_string_pretty(groups)?);
        return Ok(());
    }
    if groups.is_empty() {
        println!("no alumni found");
    }
    for (year, alumni) in groups {
        println!("{} Graduates", year);
        emit(&Value::Array(alumni.clone()), false)?;
        println!();
    }
    Ok(())
}

/// Execute one command. Session restore always runs first.
pub async fn run(cli: Cli) -> Result<()> {
    let cfg = cli.client_config();
    let store_path = cli.store.clone().unwrap_or_else(default_store_path);
    debug!(path = %store_path.display(), base_url = %cfg.base_url, "starting");
    let store = FileStore::open_or_reset(&store_path)
        .with_context(|| format!("failed to open token store at {}", store_path.display()))?;
    let client = ApiClient::new(&cfg, Arc::new(store))?;
    let session = SessionController::new(client);
    let phase = session.restore_session().await;
    debug!(?phase, "session restored");

    let json_only = cli.json;
    match cli.command {
        Command::Login { identifier, password } => {
            let secret = match password { Some(p) => p, None => read_secret("Password")? };
            let creds = LoginForm { identifier, secret }.validate()?;
            let payload = session
                .login(&creds.login, &creds.password)
                .await
                .map_err(|e| anyhow!(e.user_message(LOGIN_FAILED)))?;
            println!("Signed in as {}", payload.data.display_name());
        }
        Command::Register { username, email, password, confirm } => {
            let secret = match password { Some(p) => p, None => read_secret("Password")? };
            let confirm_secret = confirm.unwrap_or_else(|| secret.clone());
            let reg = RegisterForm { username, email, secret, confirm_secret }.validate()?;
            let payload = session
                .register(&reg.username, &reg.email, &reg.password)
                .await
                .map_err(|e| anyhow!(e.user_message(REGISTRATION_FAILED)))?;
            println!("Account created, signed in as {}", payload.data.display_name());
        }
        Command::Logout => {
            session.logout().await;
            println!("Signed out");
        }
        Command::Whoami => match session.user() {
            Some(user) => emit(&serde_json::to_value(user)?, true)?,
            None => println!("Not signed in"),
        },
        Command::Alumni { grouped, search } => {
            let client = session.client();
            match (grouped, search) {
                (_, Some(q)) => emit_grouped(&client.search_alumni_grouped(&q).await?, json_only)?,
                (true, None) => emit_grouped(&client.alumni_grouped().await?, json_only)?,
                (false, None) => emit(&Value::Array(client.alumni().await?), json_only)?,
            }
        }
        Command::Alumnus { id } => emit(&session.client().alumnus(&id).await?, true)?,
        Command::UpdateAlumnus { id, field, value } => {
            let updated = session.client().update_alumnus(&id, &AlumniUpdate::new(field, value)).await?;
            println!("Information updated successfully");
            emit(&updated, true)?;
        }
        Command::Events => emit(&Value::Array(session.client().events().await?), json_only)?,
        Command::Event { id } => emit(&session.client().event(&id).await?, true)?,
        Command::CreateEvent(args) => {
            let event = args.into_form().validate()?;
            let created = session.client().create_event(&event).await?;
            println!("Event created successfully");
            emit(&created, true)?;
        }
        Command::BatchYears => emit(&Value::Array(session.client().batch_years().await?), json_only)?,
    }
    Ok(())
}
