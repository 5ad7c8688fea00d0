//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use taskdeck_core::config;

mod commands;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(version)]
#[command(about = "Command-line client for the taskdeck task API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in and store the session credential
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long)]
        password: String,
    },

    /// Create a new account
    Register {
        /// First name (3-96 characters)
        #[arg(long = "first-name")]
        first_name: String,

        /// Last name (optional; 3-96 characters when given)
        #[arg(long = "last-name", default_value = "")]
        last_name: String,

        /// Account email
        #[arg(long)]
        email: String,

        /// Account password (at least 8 characters)
        #[arg(long)]
        password: String,
    },

    /// Sign out and clear the stored credential
    Logout,

    /// Show session status
    Whoami,

    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum TaskCommands {
    /// List tasks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a task
    Add {
        /// Task title
        #[arg(long, default_value = "")]
        title: String,

        /// Task description
        #[arg(long, default_value = "")]
        description: String,

        /// Create the task already completed
        #[arg(long)]
        completed: bool,

        /// Priority (low, medium, high)
        #[arg(long, default_value = "low")]
        priority: String,
    },
    /// Edit an existing task
    Edit {
        /// The id of the task to edit
        #[arg(value_name = "TASK_ID")]
        id: i64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New completion state (true/false)
        #[arg(long)]
        completed: Option<bool>,

        /// New priority (low, medium, high)
        #[arg(long)]
        priority: Option<String>,
    },
    /// Mark a task completed
    Done {
        /// The id of the task to complete
        #[arg(value_name = "TASK_ID")]
        id: i64,
    },
    /// Delete a task
    Rm {
        /// The id of the task to delete
        #[arg(value_name = "TASK_ID")]
        id: i64,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load().context("load config")?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli, &config).await })
}

async fn dispatch(cli: Cli, config: &config::Config) -> Result<()> {
    match cli.command {
        Commands::Login { email, password } => commands::auth::login(config, &email, &password).await,
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
        } => commands::auth::register(config, first_name, last_name, email, password).await,
        Commands::Logout => commands::auth::logout(),
        Commands::Whoami => commands::auth::whoami(),

        Commands::Tasks { command } => match command {
            TaskCommands::List { json } => commands::tasks::list(config, json).await,
            TaskCommands::Add {
                title,
                description,
                completed,
                priority,
            } => {
                commands::tasks::add(
                    config,
                    commands::tasks::AddArgs {
                        title,
                        description,
                        completed,
                        priority,
                    },
                )
                .await
            }
            TaskCommands::Edit {
                id,
                title,
                description,
                completed,
                priority,
            } => {
                commands::tasks::edit(
                    config,
                    id,
                    commands::tasks::EditArgs {
                        title,
                        description,
                        completed,
                        priority,
                    },
                )
                .await
            }
            TaskCommands::Done { id } => commands::tasks::done(config, id).await,
            TaskCommands::Rm { id } => commands::tasks::rm(config, id).await,
        },

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
