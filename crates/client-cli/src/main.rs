use anyhow::Result;
use clap::{Parser, Subcommand};
use kinetic_core::profile::ProfileUpdate;
use kinetic_core::AppState;
use shared::{ReviewDecision, UserRole};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod config;
mod dashboard;
mod manage;
mod output;

#[derive(Parser)]
#[command(name = "kinetic")]
#[command(about = "Kinetic club records and sessions from the terminal")]
#[command(version)]
struct Cli {
    /// Config file (overrides KINETIC_CONFIG and the default locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for the file store
    #[arg(long, global = true, env = "KINETIC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Print listings as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a client account and log in
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long, env = "KINETIC_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "KINETIC_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Edit your own profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Change your password
    Passwd {
        /// Current password
        #[arg(long, env = "KINETIC_PASSWORD", hide_env_values = true)]
        current: String,
        /// New password
        #[arg(long)]
        new: String,
        /// Repeat of the new password (defaults to --new)
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Apply for a program
    Apply {
        program: String,
        #[arg(short, long, default_value = "")]
        message: String,
    },
    /// Record an exchange with the club assistant
    Chat {
        message: String,
        #[arg(short, long, default_value = "")]
        response: String,
    },
    /// Record a purchase
    Buy { program: String, amount: f64 },
    /// Show your purchases, applications and chat count
    Overview,
    /// List all users
    Users,
    /// List clients
    Clients,
    /// Show club statistics
    Stats,
    /// Show the activity log, newest first
    Activity {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show assistant chat history, newest first
    Chats {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// List applications
    Applications {
        /// Include already reviewed applications
        #[arg(long)]
        all: bool,
    },
    /// Approve a pending application
    Approve { id: String },
    /// Reject a pending application
    Reject { id: String },
    /// Manage staff accounts
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
    /// Change a user's role or status
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Set profile fields; an empty value clears optional ones
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Create an admin, manager or trainer account
    Add {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long, env = "KINETIC_STAFF_PASSWORD", hide_env_values = true)]
        password: String,
        /// admin, manager or trainer
        #[arg(short, long, default_value = "trainer")]
        role: UserRole,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Assign a new role
    Role { id: String, role: UserRole },
    /// Unblock an account
    Enable { id: String },
    /// Block an account
    Disable { id: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show where configuration is read from
    Path,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kinetic=info,kinetic_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    let config = config::load(cli.config.as_deref(), cli.data_dir)?;

    if let Commands::Config { action } = &cli.command {
        return handle_config_command(action, cli.config.as_deref(), &config);
    }

    let mut state = AppState::open(config)?;

    match cli.command {
        Commands::Register { email, name, password } => auth::register(&mut state, &email, &name, &password),
        Commands::Login { email, password } => auth::login(&mut state, &email, &password),
        Commands::Logout => auth::logout(&mut state),
        Commands::Whoami => auth::whoami(&state, json),
        Commands::Profile {
            action:
                ProfileAction::Set {
                    name,
                    phone,
                    bio,
                    avatar,
                    theme,
                    language,
                },
        } => {
            let preferences = if theme.is_some() || language.is_some() {
                let mut prefs = state
                    .session
                    .current_user()
                    .and_then(|u| u.preferences.clone())
                    .unwrap_or_default();
                if let Some(theme) = theme {
                    prefs.theme = theme;
                }
                if let Some(language) = language {
                    prefs.language = language;
                }
                Some(prefs)
            } else {
                None
            };
            let update = ProfileUpdate {
                name,
                phone,
                bio,
                avatar,
                preferences,
            };
            auth::update_profile(&mut state, update)
        }
        Commands::Passwd { current, new, confirm } => {
            let confirm = confirm.unwrap_or_else(|| new.clone());
            auth::change_password(&mut state, &current, &new, &confirm)
        }
        Commands::Apply { program, message } => dashboard::apply(&state, &program, &message),
        Commands::Chat { message, response } => dashboard::chat(&state, &message, &response),
        Commands::Buy { program, amount } => dashboard::buy(&state, &program, amount),
        Commands::Overview => dashboard::overview(&state, json),
        Commands::Users => manage::users(&state, json),
        Commands::Clients => manage::clients(&state, json),
        Commands::Stats => manage::stats(&state, json),
        Commands::Activity { limit } => manage::activity(&state, limit, json),
        Commands::Chats { limit } => manage::chats(&state, limit, json),
        Commands::Applications { all } => manage::applications(&state, all, json),
        Commands::Approve { id } => manage::review(&state, &id, ReviewDecision::Approve),
        Commands::Reject { id } => manage::review(&state, &id, ReviewDecision::Reject),
        Commands::Staff {
            action:
                StaffAction::Add {
                    email,
                    name,
                    password,
                    role,
                },
        } => manage::add_staff(&state, &email, &name, &password, role),
        Commands::User { action } => match action {
            UserAction::Role { id, role } => manage::set_role(&state, &id, role),
            UserAction::Enable { id } => manage::set_active(&state, &id, true),
            UserAction::Disable { id } => manage::set_active(&state, &id, false),
        },
        Commands::Config { .. } => Ok(()),
    }
}

fn handle_config_command(
    action: &ConfigAction,
    explicit: Option<&std::path::Path>,
    config: &kinetic_core::Config,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", config::render(config)?);
        }
        ConfigAction::Path => {
            let candidates = match explicit {
                Some(path) => vec![path.to_path_buf()],
                None => config::config_candidates(),
            };
            for path in candidates {
                let marker = if path.exists() { "✓" } else { " " };
                println!("{} {}", marker, path.display());
            }
            println!("data: {}", config.storage.resolved_path().display());
        }
    }
    Ok(())
}
