mod auth;
mod comment;
mod config_cmd;
mod favorites;
mod output;
mod recipe;
mod watch;

pub use auth::{LoginCommand, LogoutCommand, SignupCommand, WhoamiCommand};
pub use comment::CommentCommand;
pub use config_cmd::ConfigCommand;
pub use favorites::FavoritesCommand;
pub use recipe::RecipeCommand;
pub use watch::WatchCommand;

use recipebox_core::Screen;

/// Waits for the screen's first complete render, then unmounts it.
pub(crate) async fn settled_view<S>(screen: &mut S) -> Result<S::View, Box<dyn std::error::Error>>
where
    S: Screen,
    S::View: Clone,
{
    screen.wait_settled().await;
    let result = match (screen.state().view(), screen.state().error()) {
        (Some(view), _) => Ok(view.clone()),
        (None, Some(message)) => Err(message.into()),
        (None, None) => Err("screen closed before it rendered".into()),
    };
    screen.unmount();
    result
}
