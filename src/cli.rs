//! Command-line interface definition
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the interactive menu, the chore and meal
//! flows, list views, member and recipe management, and chat.

use clap::{Parser, Subcommand, ValueEnum};

use crate::flow::EntityType;

/// Household assistant terminal client
///
/// Create chores and meals step by step, browse household records,
/// and chat with the assistant backend.
#[derive(Parser, Debug, Clone)]
#[command(name = "household")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the backend base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute (defaults to the interactive menu)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Open the interactive main menu
    Menu,

    /// Start interactive chat with the assistant
    Chat,

    /// Create a chore step by step
    Chore,

    /// Plan a meal step by step
    Meal,

    /// Show all records of a kind
    List {
        /// Which records to list
        #[arg(value_enum)]
        kind: ListKind,
    },

    /// Manage family members
    Members {
        /// Member subcommand
        #[command(subcommand)]
        command: MemberCommand,
    },

    /// Browse and add recipes
    Recipes {
        /// Recipe subcommand
        #[command(subcommand)]
        command: RecipeCommand,
    },

    /// Check that the backend is reachable
    Health,
}

/// Record collections that can be listed
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// All chores
    Chores,
    /// All meals
    Meals,
    /// All recipes
    Recipes,
    /// All family members
    Members,
}

impl From<ListKind> for EntityType {
    fn from(kind: ListKind) -> Self {
        match kind {
            ListKind::Chores => EntityType::Chore,
            ListKind::Meals => EntityType::Meal,
            ListKind::Recipes => EntityType::Recipe,
            ListKind::Members => EntityType::Member,
        }
    }
}

/// Family member subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MemberCommand {
    /// Add a family member
    Add {
        /// Member name
        #[arg(short, long)]
        name: String,

        /// Gender (male, female, or other)
        #[arg(short, long)]
        gender: Option<String>,

        /// Avatar image URL
        #[arg(short, long)]
        avatar: Option<String>,
    },

    /// Replace a family member's details
    Update {
        /// Member id
        id: u64,

        /// Member name
        #[arg(short, long)]
        name: String,

        /// Gender (male, female, or other)
        #[arg(short, long)]
        gender: Option<String>,

        /// Avatar image URL
        #[arg(short, long)]
        avatar: Option<String>,
    },

    /// Remove a family member
    Remove {
        /// Member id
        id: u64,
    },
}

/// Recipe subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RecipeCommand {
    /// Search recipes by name
    Search {
        /// Part of the recipe name
        query: String,
    },

    /// Add a recipe
    Add {
        /// Recipe name
        #[arg(short, long)]
        name: String,

        /// Recipe kind (breakfast, lunch, dinner, snack)
        #[arg(short, long)]
        kind: String,

        /// Free-form description
        #[arg(short, long)]
        description: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The command to run, falling back to the interactive menu
    pub fn command_or_menu(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Menu)
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            api_url: None,
            verbose: false,
            command: None,
        }
    }
}
