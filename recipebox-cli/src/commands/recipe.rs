use clap::{Args, Subcommand};
use recipebox_core::{AddRecipeForm, RecipeDetailScreen, RecipeListScreen};

use super::output::{print_view, render_cards, render_detail, OutputFormat};
use super::settled_view;
use crate::app::App;

#[derive(Args)]
pub struct RecipeCommand {
    #[command(subcommand)]
    pub command: RecipeSubcommand,
}

#[derive(Subcommand)]
pub enum RecipeSubcommand {
    /// Share a new recipe
    Add {
        /// Recipe title
        title: String,

        /// Ingredients, one per line
        #[arg(long, short)]
        ingredients: String,

        /// Preparation steps
        #[arg(long = "instructions", short = 's')]
        instructions: String,

        /// Link to a photo of the dish
        #[arg(long)]
        image_url: Option<String>,
    },

    /// List every recipe, newest first
    List {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a recipe with its comments
    Show {
        /// Recipe ID
        id: String,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a recipe to your favorites
    Favorite {
        /// Recipe ID
        id: String,
    },

    /// Remove a recipe from your favorites
    Unfavorite {
        /// Recipe ID
        id: String,
    },
}

impl RecipeCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let session = app.require_session()?;

        match &self.command {
            RecipeSubcommand::Add {
                title,
                ingredients,
                instructions,
                image_url,
            } => {
                let mut form = AddRecipeForm::new(title, ingredients, instructions);
                if let Some(url) = image_url {
                    form = form.with_image_url(url);
                }
                let id = form.submit(&app.repo, &session).await?;
                println!("Created recipe: {} [{}]", title.trim(), id);
            }

            RecipeSubcommand::List { format } => {
                let mut screen = RecipeListScreen::mount(app.repo.clone(), app.authors(), session).await;
                let cards = settled_view(&mut screen).await?;
                print_view(&cards, format, |cards| render_cards(cards))?;
            }

            RecipeSubcommand::Show { id, format } => {
                let mut screen =
                    RecipeDetailScreen::mount(app.repo.clone(), app.authors(), session, id).await;
                let detail = settled_view(&mut screen).await?;
                print_view(&detail, format, render_detail)?;
            }

            RecipeSubcommand::Favorite { id } => {
                let recipe = app.repo.get_recipe(id).await?;
                app.repo.add_to_favorites(session.user_id(), id).await?;
                println!("Added '{}' to favorites", recipe.title);
            }

            RecipeSubcommand::Unfavorite { id } => {
                app.repo.remove_from_favorites(session.user_id(), id).await?;
                println!("Removed {} from favorites", id);
            }
        }
        Ok(())
    }
}
