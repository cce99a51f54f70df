use clap::Args;
use recipebox_core::FavoritesScreen;

use super::output::{print_view, render_cards, OutputFormat};
use super::settled_view;
use crate::app::App;

#[derive(Args)]
pub struct FavoritesCommand {
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl FavoritesCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let session = app.require_session()?;
        let mut screen = FavoritesScreen::mount(app.repo.clone(), app.authors(), session).await;
        let cards = settled_view(&mut screen).await?;
        print_view(&cards, &self.format, |cards| render_cards(cards))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_app;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_lists_favorites() {
        let dir = TempDir::new().unwrap();
        let app = test_app::open(&dir);
        let session = app
            .sessions
            .sign_up("alice@example.com", "secret1", "alice")
            .await
            .unwrap();
        app.session_file.save(&session).unwrap();

        let id = app
            .repo
            .add_recipe("Soup", "water", "boil", session.user_id(), None)
            .await
            .unwrap();
        app.repo.add_to_favorites(session.user_id(), &id).await.unwrap();

        let cmd = FavoritesCommand {
            format: OutputFormat::Text,
        };
        cmd.run(&app).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_profile_is_reported() {
        let dir = TempDir::new().unwrap();
        let app = test_app::open(&dir);
        app.session_file
            .save(&recipebox_core::Session::new("ghost", "ghost@example.com"))
            .unwrap();

        let cmd = FavoritesCommand {
            format: OutputFormat::Json,
        };
        let err = cmd.run(&app).await.unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}
