use clap::{Args, Subcommand};

/// Top-level command tree. With no subcommand, `cyrisk` runs the pipeline.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Fetch news, analyse risks, and write the reports and dashboard.
    Run,
    /// Inspect or clear the news cache.
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
    /// Print the JSON Schemas the language model is constrained to.
    Schema(SchemaArgs),
}

/// News cache management.
#[derive(Clone, Debug, Subcommand)]
pub enum CacheCommands {
    /// List cached queries with article counts and age.
    Info,
    /// Report corrupt and stale cache entries.
    Check,
    /// Delete every cache file.
    Clear {
        /// Confirm deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Schema name (`risk_analysis`, `action_plan`, `project_plan`). Lists
    /// the available names when omitted.
    pub name: Option<String>,
}
