pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::{Role, ToggleKind};

#[derive(Parser)]
#[command(name = "uttar")]
#[command(about = "Client for the Uttar Q&A platform", long_about = None)]
pub struct Cli {
    /// Override the backend base URL from the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a session token obtained from the web login
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        username: String,
        #[arg(long, value_enum, default_value_t = RoleArg::User)]
        role: RoleArg,
    },
    /// Forget the stored session
    Logout,
    /// Show the current session
    Whoami,
    /// Check where navigating to a route would lead
    Open {
        /// Route path, e.g. /admin/tags
        route: String,
    },
    /// Like, unlike, bookmark or unbookmark
    Toggle {
        #[arg(value_enum)]
        kind: KindArg,
        /// Question or comment id
        id: String,
        /// Currently active, as last loaded from the server
        #[arg(long)]
        active: bool,
        /// Current like count, as last loaded from the server
        #[arg(long, default_value_t = 0)]
        count: u64,
        /// Number of rapid clicks to simulate
        #[arg(long, default_value_t = 1)]
        clicks: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    User,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::User => Role::User,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    QuestionLike,
    CommentLike,
    QuestionBookmark,
}

impl From<KindArg> for ToggleKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::QuestionLike => ToggleKind::QuestionLike,
            KindArg::CommentLike => ToggleKind::CommentLike,
            KindArg::QuestionBookmark => ToggleKind::QuestionBookmark,
        }
    }
}
