use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod commands;
mod config;
mod session_file;

use app::App;
use commands::{
    CommentCommand, ConfigCommand, FavoritesCommand, LoginCommand, LogoutCommand, RecipeCommand,
    SignupCommand, WatchCommand, WhoamiCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "recipebox")]
#[command(version)]
#[command(about = "Share recipes, keep favorites and comment", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Signup(SignupCommand),

    /// Log in to an existing account
    Login(LoginCommand),

    /// Log out
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Add, list, show and favorite recipes
    Recipe(RecipeCommand),

    /// List your favorite recipes
    Favorites(FavoritesCommand),

    /// Add or delete comments
    Comment(CommentCommand),

    /// Print a screen every time it changes, until Ctrl-C
    Watch(WatchCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute_command(&cli.command, &config))
}

/// Logs go to stderr so command output stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("RECIPEBOX_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| "recipebox_core=warn,recipebox=warn".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn execute_command(
    command: &Option<Commands>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = command else {
        println!("Use --help to see available commands");
        return Ok(());
    };

    // Config needs no data directory
    if let Commands::Config(cmd) = command {
        return cmd.run(config);
    }

    let app = App::open(config)?;
    match command {
        Commands::Signup(cmd) => cmd.run(&app).await,
        Commands::Login(cmd) => cmd.run(&app).await,
        Commands::Logout => LogoutCommand.run(&app),
        Commands::Whoami => WhoamiCommand.run(&app).await,
        Commands::Recipe(cmd) => cmd.run(&app).await,
        Commands::Favorites(cmd) => cmd.run(&app).await,
        Commands::Comment(cmd) => cmd.run(&app).await,
        Commands::Watch(cmd) => cmd.run(&app).await,
        Commands::Config(cmd) => cmd.run(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_comment_delete() {
        let cli = Cli::try_parse_from(["recipebox", "comment", "delete", "r1", "c1"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Comment(_))));
    }

    #[test]
    fn test_format_flag_on_watch() {
        let cli =
            Cli::try_parse_from(["recipebox", "watch", "recipe", "r1", "--format", "json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Watch(_))));
    }
}
