use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use admincache::cli::{
    AdminSelector, CacheArgs, run_access, run_check, run_dump, run_target,
};

#[derive(Parser)]
#[command(name = "admincache")]
#[command(about = "Inspect and query an admin permission cache", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the definitions and print every override, group and admin
    Dump {
        #[command(flatten)]
        cache: CacheArgs,
    },

    /// Check whether an admin holds a set of flags
    Check {
        #[command(flatten)]
        cache: CacheArgs,

        #[command(flatten)]
        selector: AdminSelector,

        /// Required flag letters
        #[arg(long)]
        flags: String,
    },

    /// Check whether one admin may target another
    Target {
        #[command(flatten)]
        cache: CacheArgs,

        /// Admin performing the action
        #[arg(long)]
        admin: String,

        /// Admin being targeted
        #[arg(long)]
        target: String,
    },

    /// Check whether an admin may run a command
    Access {
        #[command(flatten)]
        cache: CacheArgs,

        /// Admin running the command
        #[arg(long)]
        admin: String,

        /// Command name
        #[arg(long)]
        command: String,

        /// Command group the command belongs to
        #[arg(long)]
        command_group: Option<String>,

        /// Flag letters the command requires when no override applies
        #[arg(long)]
        flags: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("admincache=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Dump { cache } => run_dump(cache)?,
        Commands::Check {
            cache,
            selector,
            flags,
        } => run_check(cache, selector, flags)?,
        Commands::Target {
            cache,
            admin,
            target,
        } => run_target(cache, admin, target)?,
        Commands::Access {
            cache,
            admin,
            command,
            command_group,
            flags,
        } => run_access(cache, admin, command, command_group, flags)?,
    }

    Ok(())
}
