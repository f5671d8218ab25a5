use tripstream::client::AgentType;
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[cfg(feature = "admin")]
use tripstream::admin::{AdminRole, Resource, SearchScope};

/// Travel planner client (Rust)
#[derive(Debug, Parser)]
#[command(name = "tripstream")]
#[command(version)]
#[command(about = "Terminal client for the travel planning backend", long_about = None)]
pub struct Args {
    /// Backend root URL (default: $TRIPSTREAM_BASE_URL, config, or http://127.0.0.1:5000)
    #[arg(long = "base-url", global = true, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask the planner for a day-by-day itinerary
    Plan(PlanArgs),

    /// Send a single chat message and stream the reply
    Chat {
        /// Agent that should answer
        #[arg(short = 'a', long = "agent", value_enum, default_value_t = AgentType::Travel)]
        agent: AgentType,

        /// Message text
        #[arg(value_name = "MESSAGE", required = true)]
        message: Vec<String>,
    },

    /// Get a narrated introduction to an attraction
    Guide {
        /// Attraction name
        attraction: String,

        /// Narration style
        #[arg(long = "style", default_value = "detailed")]
        style: String,

        /// Ask the backend to generate an illustration
        #[arg(long = "image")]
        image: bool,
    },

    /// Interactive chat on stdin (commands: /plan, /guide, /export, /save, /clear, /quit)
    Repl,

    /// Run an interactive terminal chat UI
    #[cfg(feature = "tui")]
    Tui,

    /// Admin back-office operations
    #[cfg(feature = "admin")]
    Admin {
        #[command(subcommand)]
        cmd: AdminCommand,
    },
}

#[derive(Debug, Clone, ClapArgs)]
pub struct PlanArgs {
    /// Read the whole trip form from a TOML file instead of flags
    #[arg(long = "form", value_name = "FILE", conflicts_with_all = ["source", "destination"])]
    pub form: Option<PathBuf>,

    /// Departure city
    #[arg(long = "from", required_unless_present = "form")]
    pub source: Option<String>,

    /// Destination
    #[arg(long = "to", required_unless_present = "form")]
    pub destination: Option<String>,

    /// Start date, YYYY-MM-DD (default: tomorrow)
    #[arg(long = "start")]
    pub start_date: Option<NaiveDate>,

    /// End date, YYYY-MM-DD (default: a week after the start)
    #[arg(long = "end")]
    pub end_date: Option<NaiveDate>,

    /// Budget per person
    #[arg(long = "budget", default_value_t = 3000)]
    pub budget_per_person: u32,

    /// Number of travelers (1-20)
    #[arg(long = "travelers", default_value_t = 1)]
    pub travelers: u32,

    /// Accommodation type
    #[arg(long = "stay", default_value = "hotel")]
    pub accommodation_type: String,

    /// Travel preference (repeatable)
    #[arg(long = "pref", value_name = "PREF")]
    pub preferences: Vec<String>,

    /// Transport mode (repeatable)
    #[arg(long = "transport", value_name = "MODE")]
    pub transportation_mode: Vec<String>,

    /// Dietary restriction (repeatable)
    #[arg(long = "diet", value_name = "DIET")]
    pub dietary_restrictions: Vec<String>,

    /// Also save the plan as an HTML page
    #[arg(long = "save", value_name = "PATH")]
    pub save: Option<PathBuf>,
}

#[cfg(feature = "admin")]
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// List a resource page by page
    List {
        #[arg(value_enum)]
        resource: Resource,
        #[arg(long = "page", default_value_t = 1)]
        page: u32,
        #[arg(long = "per-page")]
        per_page: Option<u32>,
    },
    /// Search users, conversations or messages
    Search {
        #[arg(value_enum)]
        scope: SearchScope,
        query: String,
        #[arg(long = "page", default_value_t = 1)]
        page: u32,
        #[arg(long = "per-page")]
        per_page: Option<u32>,
    },
    /// Show a user with their conversations
    User { email: String },
    /// Show a conversation with its messages
    Conversation { id: String },
    /// System statistics
    Stats,
    /// Permanently delete a record
    Delete {
        #[command(subcommand)]
        target: DeleteCommand,
        /// Confirm the deletion
        #[arg(long = "yes", global = true)]
        yes: bool,
    },
    /// Add an administrator
    AddAdmin {
        username: String,
        #[arg(long = "password")]
        password: String,
        #[arg(long = "email")]
        email: Option<String>,
        #[arg(long = "role", value_enum, default_value_t = AdminRole::Admin)]
        role: AdminRole,
    },
    /// Update an administrator
    UpdateAdmin {
        id: i64,
        #[arg(long = "email")]
        email: Option<String>,
        #[arg(long = "role", value_enum)]
        role: Option<AdminRole>,
        /// New password (omit to keep the current one)
        #[arg(long = "password")]
        password: Option<String>,
    },
}

#[cfg(feature = "admin")]
#[derive(Debug, Clone, Subcommand)]
pub enum DeleteCommand {
    User { email: String },
    Conversation { id: String },
    Message { id: i64 },
    Admin { id: i64 },
}
