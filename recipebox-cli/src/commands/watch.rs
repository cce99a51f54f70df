//! Live views: keep a screen mounted and print every push until Ctrl-C.

use clap::{Args, Subcommand};
use recipebox_core::{FavoritesScreen, RecipeDetailScreen, RecipeListScreen, Screen};
use serde::Serialize;
use tracing::info;

use super::output::{print_view, render_cards, render_detail, OutputFormat};
use crate::app::App;

#[derive(Args)]
pub struct WatchCommand {
    #[command(subcommand)]
    pub command: WatchSubcommand,

    #[arg(long, short, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum WatchSubcommand {
    /// Watch the recipe feed
    Feed,

    /// Watch your favorites
    Favorites,

    /// Watch one recipe and its comments
    Recipe {
        /// Recipe ID
        id: String,
    },
}

impl WatchCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let session = app.require_session()?;

        match &self.command {
            WatchSubcommand::Feed => {
                let screen = RecipeListScreen::mount(app.repo.clone(), app.authors(), session).await;
                watch(screen, &self.format, |cards| render_cards(cards)).await
            }
            WatchSubcommand::Favorites => {
                let screen = FavoritesScreen::mount(app.repo.clone(), app.authors(), session).await;
                watch(screen, &self.format, |cards| render_cards(cards)).await
            }
            WatchSubcommand::Recipe { id } => {
                let screen =
                    RecipeDetailScreen::mount(app.repo.clone(), app.authors(), session, id).await;
                watch(screen, &self.format, render_detail).await
            }
        }
    }
}

async fn watch<S>(
    mut screen: S,
    format: &OutputFormat,
    render: impl Fn(&S::View) -> String,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: Screen,
    S::View: Serialize,
{
    screen.wait_settled().await;

    loop {
        if let Some(message) = screen.state().error() {
            let message = message.to_string();
            screen.unmount();
            return Err(message.into());
        }
        if let Some(view) = screen.state().view() {
            print_view(view, format, &render)?;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            more = screen.next_update() => {
                if !more {
                    break;
                }
                if matches!(format, OutputFormat::Text) {
                    println!("\n{}", "-".repeat(40));
                }
            }
        }
    }

    screen.unmount();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_app;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_watch_missing_recipe_fails_fast() {
        let dir = TempDir::new().unwrap();
        let app = test_app::open(&dir);
        let session = app
            .sessions
            .sign_up("alice@example.com", "secret1", "alice")
            .await
            .unwrap();
        app.session_file.save(&session).unwrap();

        let cmd = WatchCommand {
            command: WatchSubcommand::Recipe { id: "ghost".into() },
            format: OutputFormat::Text,
        };
        let err = cmd.run(&app).await.unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}
