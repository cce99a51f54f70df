use clap::{Args, Subcommand};
use recipebox_core::{RecipeDetailScreen, Screen};

use crate::app::App;

#[derive(Args)]
pub struct CommentCommand {
    #[command(subcommand)]
    pub command: CommentSubcommand,
}

#[derive(Subcommand)]
pub enum CommentSubcommand {
    /// Comment on a recipe
    Add {
        /// Recipe ID
        recipe_id: String,

        /// Comment text
        text: String,
    },

    /// Delete one of your comments
    Delete {
        /// Recipe ID
        recipe_id: String,

        /// Comment ID
        comment_id: String,
    },
}

impl CommentCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let session = app.require_session()?;
        let recipe_id = match &self.command {
            CommentSubcommand::Add { recipe_id, .. } | CommentSubcommand::Delete { recipe_id, .. } => {
                recipe_id
            }
        };

        // Actions go through the detail screen, which knows the comment owners
        let mut screen =
            RecipeDetailScreen::mount(app.repo.clone(), app.authors(), session, recipe_id).await;
        screen.wait_settled().await;
        if let Some(message) = screen.state().error() {
            return Err(message.into());
        }

        let outcome = match &self.command {
            CommentSubcommand::Add { text, .. } => match screen.add_comment(text).await {
                Ok(Some(id)) => {
                    println!("Added comment [{}]", id);
                    Ok(())
                }
                Ok(None) => {
                    println!("Nothing to post: comment is empty");
                    Ok(())
                }
                Err(notice) => Err(notice),
            },
            CommentSubcommand::Delete { comment_id, .. } => screen
                .delete_comment(comment_id)
                .await
                .map(|()| println!("Deleted comment [{}]", comment_id)),
        };
        screen.unmount();
        outcome?;
        Ok(())
    }
}
