//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::application::services::BACKUP_FILE_NAME;

/// Durian orchard tracker: gardens on a grid, per-cell tree records, photos and harvest logs
#[derive(Parser, Debug)]
#[command(name = "saurieng")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Local config file (default: ./saurieng.toml when present)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Skip creating the sample garden on an empty store
        #[arg(long)]
        no_seed: bool,
    },

    /// Manage gardens
    Garden {
        #[command(subcommand)]
        command: GardenCommands,
    },

    /// Manage trees
    Tree {
        #[command(subcommand)]
        command: TreeCommands,
    },

    /// Show a garden's trees grouped by status
    Grouped {
        /// Garden name
        garden: String,
    },

    /// Write a zip backup of all gardens and uploaded photos
    Backup {
        /// Output file
        #[arg(short, long, default_value = BACKUP_FILE_NAME, value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Create the sample garden if the store is empty
    Seed,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum GardenCommands {
    /// Show all gardens with their planted cells
    List,

    /// Create a garden
    Create {
        /// Unique garden name
        name: String,
        /// Number of rows
        #[arg(allow_negative_numbers = true)]
        rows: i64,
        /// Number of columns
        #[arg(allow_negative_numbers = true)]
        cols: i64,
    },

    /// Delete a garden and all of its trees
    Delete {
        /// Garden name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TreeCommands {
    /// Create or replace the tree at a cell
    Upsert {
        /// Garden name
        garden: String,
        #[arg(allow_negative_numbers = true)]
        row: i64,
        #[arg(allow_negative_numbers = true)]
        col: i64,
        #[arg(long)]
        variety: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Previously stored image to keep (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,
        /// Local photo to upload and attach (repeatable)
        #[arg(long = "new-image", value_hint = ValueHint::FilePath)]
        new_images: Vec<PathBuf>,
        /// Harvest records as a JSON array
        #[arg(long)]
        harvest: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Template,

    /// Show config paths
    Path,
}
