//! Thanks CLI - star the repositories behind your installed plugins and themes.

mod commands;
mod config;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::output::OutputFormat;

#[derive(Parser)]
#[command(name = "thanks")]
#[command(version)]
#[command(about = "Star the GitHub repositories behind your installed plugins and themes")]
#[command(
    long_about = "Thanks reads the plugins and themes installed in a vault, looks them up in \
the community catalogs, and shows which of their GitHub repositories you have starred. \
It can star the rest for you. Authentication uses the GitHub OAuth device flow."
)]
#[command(after_long_help = r#"EXAMPLES
    Show installed plugins and themes with their starred state:
        $ thanks list --vault ~/Notes

    Star every installed item you have not starred yet:
        $ thanks star --vault ~/Notes

    Star one repository, showing what would happen first:
        $ thanks star --vault ~/Notes kepano/obsidian-minimal --dry-run

    Generate shell completions:
        $ thanks completions bash > ~/.local/share/bash-completion/completions/thanks

CONFIGURATION
    Thanks reads configuration from:
      1. ~/.config/thanks/config.toml (or $XDG_CONFIG_HOME/thanks/config.toml)
      2. ./thanks.toml
      3. Environment variables (THANKS_* prefix, e.g., THANKS_GITHUB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    THANKS_GITHUB_TOKEN       GitHub token; skips the device flow when set
    THANKS_VAULT              Default vault directory
    THANKS_PAGE_CONCURRENCY   Starred pages fetched in parallel (default: 2)
    RUST_LOG                  Log filter when output is not a terminal
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with GitHub using OAuth Device Flow
    ///
    /// Opens your browser to authorize thanks with GitHub and checks the
    /// token by counting your starred repositories.
    Login {
        /// Print the access token to stdout
        #[arg(long)]
        print_token: bool,
    },
    /// List installed plugins and themes with their starred state
    List {
        /// Vault directory (default from config or the current directory)
        #[arg(short, long)]
        vault: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,

        /// Look up star counts for repositories you have not starred
        #[arg(short = 's', long)]
        star_counts: bool,
    },
    /// Star repositories of installed plugins and themes
    Star {
        /// Repositories (owner/name) to star; defaults to every unstarred one
        repos: Vec<String>,

        /// Vault directory (default from config or the current directory)
        #[arg(short, long)]
        vault: Option<PathBuf>,

        /// Dry run - show what would be starred without starring
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Inspect or initialize the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Write a settings file with default values
    Init {
        /// File to write (default: the XDG config file)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file, keeping its values
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logging only when not connected to a TTY
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("thanks=info,thanks_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => commands::meta::handle_completions(shell)?,
        Commands::Man { output } => commands::meta::handle_man(output)?,
        Commands::Config {
            action: ConfigAction::Init { path, force },
        } => commands::settings::handle_init(path, force)?,
        command => {
            let config = config::Config::load();
            match command {
                Commands::Login { print_token } => {
                    commands::login::handle_login(&config, print_token).await?;
                }
                Commands::List {
                    vault,
                    output,
                    star_counts,
                } => {
                    commands::list::handle_list(&config, vault, output, star_counts).await?;
                }
                Commands::Star {
                    repos,
                    vault,
                    dry_run,
                } => {
                    commands::star::handle_star(&config, vault, repos, dry_run).await?;
                }
                Commands::Config {
                    action: ConfigAction::Show,
                } => commands::settings::handle_show(&config)?,
                Commands::Config { .. } | Commands::Completions { .. } | Commands::Man { .. } => {}
            }
        }
    }

    Ok(())
}
