use anyhow::anyhow;
use clap::{Parser, Subcommand};
use cineadmin::catalog::EntityKind;

#[derive(Parser)]
#[command(name = "cineadmin")]
#[command(about = "Admin dashboard for a film catalog REST API: films, actors, categories, editors and languages")]
#[command(version)]
pub struct Cli {
    /// Base address of the catalog API (overrides CINEADMIN_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every record of an entity
    List {
        /// Entity (film, actor, category, editor, language)
        entity: String,

        /// Case-insensitive text to filter rows by
        #[arg(short, long)]
        filter: Option<String>,

        /// Field to sort by
        #[arg(short, long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Page to show (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Show one record as JSON
    Get {
        /// Entity (film, actor, category, editor, language)
        entity: String,

        /// Record identifier
        id: i64,
    },

    /// Create a record
    Add {
        /// Entity (film, actor, category, editor, language)
        entity: String,

        /// Field value, repeatable
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Update a record; unset fields keep their current value
    Edit {
        /// Entity (film, actor, category, editor, language)
        entity: String,

        /// Record identifier
        id: i64,

        /// Field value, repeatable
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Delete a record
    Delete {
        /// Entity (film, actor, category, editor, language)
        entity: String,

        /// Record identifier
        id: i64,
    },

    /// Sign in and store the session token
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long)]
        confirm_password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Launch the terminal UI
    Tui,
}

impl Commands {
    pub fn parse_entity(entity: &str) -> Result<EntityKind, anyhow::Error> {
        entity.parse().map_err(|e: String| anyhow!(e))
    }

    pub fn is_tui(&self) -> bool {
        matches!(self, Commands::Tui)
    }
}
