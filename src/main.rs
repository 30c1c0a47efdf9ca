//! forge CLI - startup idea vault with a topic-aware chat assistant.

use clap::{Parser, Subcommand};
use forge::chat::Topic;
use forge::vault::{
    IdeaStatus, JournalDraft, Mood, MvpDraft, MvpStatus, TechStackDraft,
    models::DEFAULT_ENERGY_LEVEL,
};
use forge::{Config, cli, config};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Get the version string.
///
/// - Release builds (on a git tag): "0.1.0"
/// - Development builds: "0.1.0-dev (abc1234)"
/// - Dirty working directory: "0.1.0-dev (abc1234-dirty)"
fn version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("FORGE_GIT_HASH");
    const IS_RELEASE: &str = env!("FORGE_IS_RELEASE");

    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" {
            VERSION.to_string()
        } else {
            format!("{VERSION}-dev ({GIT_HASH})")
        }
    })
}

#[derive(Parser)]
#[command(name = "forge")]
#[command(author, version = version(), about = "Startup idea vault with a topic-aware chat assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant about a topic.
    Chat {
        /// Topic (general, mvp-planning, tech-stack, focus-journal).
        topic: Topic,

        /// Send one message and exit. Starts an interactive session if omitted.
        message: Option<String>,
    },

    /// Inspect or clear stored chat history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Manage the Gemini API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Manage startup ideas.
    Idea {
        #[command(subcommand)]
        action: IdeaAction,
    },

    /// Manage MVP plans.
    Mvp {
        #[command(subcommand)]
        action: MvpAction,
    },

    /// Manage tech stacks.
    Stack {
        #[command(subcommand)]
        action: StackAction,
    },

    /// Focus journal.
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },

    /// Configure the vault PIN.
    Pin {
        #[command(subcommand)]
        action: PinAction,
    },

    /// Unlock the vault.
    Unlock {
        /// Vault PIN.
        pin: String,
    },

    /// Lock the vault.
    Lock,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Print a topic's transcript.
    Show { topic: Topic },

    /// Delete a topic's transcript.
    Clear { topic: Topic },

    /// List topics with stored history.
    List,
}

#[derive(Subcommand)]
enum KeyAction {
    /// Save the API key.
    Set { key: String },

    /// Show the active key, masked.
    Show,

    /// Remove the saved key.
    Clear,
}

#[derive(Subcommand)]
enum IdeaAction {
    /// Add an idea.
    Add {
        title: String,
        description: String,

        #[arg(short, long, default_value = "")]
        category: String,

        /// Comma-separated tags.
        #[arg(short, long, default_value = "")]
        tags: String,
    },

    /// List ideas.
    List {
        /// Only show ideas in this status.
        #[arg(short, long)]
        status: Option<IdeaStatus>,
    },

    /// Change an idea's status.
    Status {
        /// Idea id or unique prefix.
        id: String,

        /// brainstorming, validating, building or shipped.
        status: IdeaStatus,
    },

    /// Delete an idea.
    Remove {
        /// Idea id or unique prefix.
        id: String,
    },
}

#[derive(Subcommand)]
enum MvpAction {
    /// Add an MVP plan.
    Add {
        name: String,
        description: String,

        #[arg(long, default_value = "")]
        audience: String,

        /// Core feature. Repeatable.
        #[arg(short, long = "feature")]
        features: Vec<String>,

        #[arg(long, default_value = "")]
        timeline: String,

        #[arg(long, default_value = "")]
        budget: String,

        /// Success metric. Repeatable.
        #[arg(short, long = "metric")]
        metrics: Vec<String>,
    },

    /// List MVP plans.
    List,

    /// Change a plan's status.
    Status {
        /// Plan id or unique prefix.
        id: String,

        /// planning, building, testing or shipped.
        status: MvpStatus,
    },
}

#[derive(Subcommand)]
enum StackAction {
    /// Add a tech stack. Technologies are repeatable per category.
    Add {
        project_name: String,
        description: String,

        #[arg(long)]
        frontend: Vec<String>,

        #[arg(long)]
        backend: Vec<String>,

        #[arg(long)]
        database: Vec<String>,

        #[arg(long)]
        cloud: Vec<String>,

        #[arg(long)]
        tool: Vec<String>,
    },

    /// List tech stacks.
    List,
}

#[derive(Subcommand)]
enum JournalAction {
    /// Log an entry for today.
    Add {
        title: String,

        /// Goal. Repeatable.
        #[arg(short, long = "goal")]
        goals: Vec<String>,

        /// Accomplishment. Repeatable.
        #[arg(short = 'd', long = "done")]
        accomplishments: Vec<String>,

        /// Blocker. Repeatable.
        #[arg(short, long = "blocker")]
        blockers: Vec<String>,

        #[arg(short, long, default_value = "")]
        reflections: String,

        /// Energy level, 1-10.
        #[arg(short, long, default_value_t = DEFAULT_ENERGY_LEVEL)]
        energy: u8,

        /// excited, happy, neutral, frustrated or tired.
        #[arg(short, long, default_value = "neutral")]
        mood: Mood,
    },

    /// List entries, newest first.
    List {
        /// Maximum number of entries to show.
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
enum PinAction {
    /// Set or change the PIN.
    Setup { pin: String, confirm: String },
}

/// Route `tracing` output to stderr. `FORGE_LOG` wins over the config level.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_env("FORGE_LOG")
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn dispatch(config: &Config, command: Commands) -> forge::Result<()> {
    match command {
        Commands::Chat { topic, message } => {
            cli::chat::run(config, topic, message.as_deref()).await
        }
        Commands::History { action } => match action {
            HistoryAction::Show { topic } => cli::history::show(config, topic),
            HistoryAction::Clear { topic } => cli::history::clear(config, topic),
            HistoryAction::List => cli::history::list(config),
        },
        Commands::Key { action } => match action {
            KeyAction::Set { key } => cli::key::set(config, &key),
            KeyAction::Show => cli::key::show(config),
            KeyAction::Clear => cli::key::clear(config),
        },
        Commands::Idea { action } => match action {
            IdeaAction::Add {
                title,
                description,
                category,
                tags,
            } => cli::idea::add(config, &title, &description, &category, &tags),
            IdeaAction::List { status } => cli::idea::list(config, status),
            IdeaAction::Status { id, status } => cli::idea::set_status(config, &id, status),
            IdeaAction::Remove { id } => cli::idea::remove(config, &id),
        },
        Commands::Mvp { action } => match action {
            MvpAction::Add {
                name,
                description,
                audience,
                features,
                timeline,
                budget,
                metrics,
            } => cli::mvp::add(
                config,
                MvpDraft {
                    name,
                    description,
                    target_audience: audience,
                    core_features: features,
                    timeline,
                    budget,
                    success_metrics: metrics,
                },
            ),
            MvpAction::List => cli::mvp::list(config),
            MvpAction::Status { id, status } => cli::mvp::set_status(config, &id, status),
        },
        Commands::Stack { action } => match action {
            StackAction::Add {
                project_name,
                description,
                frontend,
                backend,
                database,
                cloud,
                tool,
            } => cli::stack::add(
                config,
                TechStackDraft {
                    project_name,
                    description,
                    frontend,
                    backend,
                    database,
                    cloud,
                    tools: tool,
                },
            ),
            StackAction::List => cli::stack::list(config),
        },
        Commands::Journal { action } => match action {
            JournalAction::Add {
                title,
                goals,
                accomplishments,
                blockers,
                reflections,
                energy,
                mood,
            } => cli::journal::add(
                config,
                JournalDraft {
                    title,
                    goals,
                    accomplishments,
                    blockers,
                    reflections,
                    energy_level: energy,
                    mood,
                },
            ),
            JournalAction::List { limit } => cli::journal::list(config, limit),
        },
        Commands::Pin { action } => match action {
            PinAction::Setup { pin, confirm } => cli::pin::setup(config, &pin, &confirm),
        },
        Commands::Unlock { pin } => cli::pin::unlock(config, &pin),
        Commands::Lock => cli::pin::lock(config),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("forge: error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    match dispatch(&config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("forge: error: {e}");
            ExitCode::FAILURE
        }
    }
}
