//! Text and JSON rendering of screen views.

use clap::ValueEnum;
use recipebox_core::screens::{RecipeCard, RecipeDetail};
use serde::Serialize;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn print_view<V: Serialize + ?Sized>(
    view: &V,
    format: &OutputFormat,
    text: impl FnOnce(&V) -> String,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Text => println!("{}", text(view)),
    }
    Ok(())
}

pub fn render_cards(cards: &[RecipeCard]) -> String {
    if cards.is_empty() {
        return "No recipes found".to_string();
    }

    let mut out = String::new();
    for card in cards {
        let star = if card.is_favorite { "*" } else { " " };
        out.push_str(&format!(
            "{} {}  by {}  [{}]\n",
            star, card.recipe.title, card.author, card.recipe.id
        ));
    }
    out.push_str(&format!("\nTotal: {} recipe(s)", cards.len()));
    out
}

pub fn render_detail(detail: &RecipeDetail) -> String {
    let mut out = format!("{}\n\n", detail.recipe);
    out.push_str(&format!("By {}", detail.author));
    if detail.is_favorite {
        out.push_str("  (favorite)");
    }
    out.push_str("\n\nComments:\n");

    if detail.comments.is_empty() {
        out.push_str("  (none)");
        return out;
    }
    let lines: Vec<String> = detail
        .comments
        .iter()
        .map(|c| {
            let mine = if c.can_delete { " (yours)" } else { "" };
            format!("  {}: {}  [{}]{}", c.author, c.comment.text, c.comment.id, mine)
        })
        .collect();
    out.push_str(&lines.join("\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use recipebox_core::screens::CommentView;
    use recipebox_core::{Comment, Recipe};

    fn recipe() -> Recipe {
        Recipe {
            id: "r1".into(),
            title: "Soup".into(),
            ingredients: "water\nsalt".into(),
            instructions: "Boil.".into(),
            image_url: None,
            user_id: "u1".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_render_cards() {
        let cards = vec![RecipeCard {
            recipe: recipe(),
            author: "alice".into(),
            is_favorite: true,
        }];
        let text = render_cards(&cards);
        assert!(text.starts_with("* Soup  by alice  [r1]"));
        assert!(text.ends_with("Total: 1 recipe(s)"));
        assert_eq!(render_cards(&[]), "No recipes found");
    }

    #[test]
    fn test_render_detail_marks_own_comments() {
        let detail = RecipeDetail {
            recipe: recipe(),
            author: "alice".into(),
            is_favorite: false,
            comments: vec![CommentView {
                comment: Comment {
                    id: "c1".into(),
                    text: "tasty".into(),
                    user_id: "u1".into(),
                    timestamp: Utc::now(),
                },
                author: "alice".into(),
                can_delete: true,
            }],
        };
        let text = render_detail(&detail);
        assert!(text.contains("  - water"));
        assert!(text.contains("By alice\n"));
        assert!(text.contains("  alice: tasty  [c1] (yours)"));
    }
}
