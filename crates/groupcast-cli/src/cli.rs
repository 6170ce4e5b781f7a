use clap::{Parser, Subcommand};

use groupcast_core::GroupKey;

#[derive(Parser, Debug)]
#[command(
    name = "groupcast",
    version,
    about = "Groupcast - pick chat groups and broadcast them to a webhook"
)]
pub struct Args {
    /// Print JSON snapshots instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show the group list
    List {
        /// Only show groups whose name contains TEXT (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        /// Only show selected groups
        #[arg(long)]
        selected: bool,
    },

    /// Select one group, or deselect it with --off
    Toggle {
        id: GroupKey,

        #[arg(long)]
        off: bool,
    },

    /// Flip select-all
    SelectAll,

    /// Clear every selection
    Clear,

    /// Send the selected groups to the webhook
    Send,

    /// Delete groups (the selected ones when no ids are given)
    Delete {
        ids: Vec<GroupKey>,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
