//! Account commands: signup, login, logout and whoami.

use clap::Args;
use recipebox_core::AuthForm;
use std::io::{self, Write};

use crate::app::App;

#[derive(Args)]
pub struct SignupCommand {
    /// Account email
    #[arg(long)]
    email: String,

    /// Name shown on your recipes and comments
    #[arg(long)]
    username: String,

    /// Password (prompted for when omitted)
    #[arg(long)]
    password: Option<String>,
}

#[derive(Args)]
pub struct LoginCommand {
    /// Account email
    #[arg(long)]
    email: String,

    /// Password (prompted for when omitted)
    #[arg(long)]
    password: Option<String>,
}

pub struct LogoutCommand;

pub struct WhoamiCommand;

impl SignupCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let password = password_or_prompt(self.password.as_deref())?;
        let session = AuthForm::sign_up(&self.email, password, &self.username)
            .submit(&app.sessions)
            .await?;
        app.session_file.save(&session)?;

        println!(
            "Signed up and logged in as {} <{}>",
            self.username.trim(),
            session.email()
        );
        Ok(())
    }
}

impl LoginCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let password = password_or_prompt(self.password.as_deref())?;
        let session = AuthForm::sign_in(&self.email, password)
            .submit(&app.sessions)
            .await?;
        app.session_file.save(&session)?;

        match app.repo.find_profile(session.user_id()).await? {
            Some(profile) => println!("Logged in as {} <{}>", profile.username, session.email()),
            None => println!("Logged in as {}", session.email()),
        }
        Ok(())
    }
}

impl LogoutCommand {
    pub fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        app.sessions.sign_out();
        if app.session_file.clear()? {
            println!("Logged out");
        } else {
            println!("Not logged in");
        }
        Ok(())
    }
}

impl WhoamiCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let Some(session) = app.session_file.load()? else {
            println!("Not logged in");
            return Ok(());
        };

        let username = app
            .repo
            .find_profile(session.user_id())
            .await?
            .map(|p| p.username);
        println!("email:    {}", session.email());
        println!("username: {}", username.as_deref().unwrap_or("(no profile)"));
        println!("user id:  {}", session.user_id());
        Ok(())
    }
}

fn password_or_prompt(password: Option<&str>) -> io::Result<String> {
    if let Some(password) = password {
        return Ok(password.to_string());
    }

    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_app;
    use tempfile::TempDir;

    fn signup(email: &str, username: &str) -> SignupCommand {
        SignupCommand {
            email: email.into(),
            username: username.into(),
            password: Some("secret1".into()),
        }
    }

    #[tokio::test]
    async fn test_signup_saves_session() {
        let dir = TempDir::new().unwrap();
        let app = test_app::open(&dir);

        signup("alice@example.com", "alice").run(&app).await.unwrap();

        let session = app.session_file.load().unwrap().unwrap();
        assert_eq!(session.email(), "alice@example.com");
        let profile = app.repo.get_profile(session.user_id()).await.unwrap();
        assert_eq!(profile.username, "alice");
    }

    #[tokio::test]
    async fn test_wrong_password_leaves_no_session() {
        let dir = TempDir::new().unwrap();
        let app = test_app::open(&dir);
        signup("alice@example.com", "alice").run(&app).await.unwrap();
        LogoutCommand.run(&app).unwrap();

        let login = LoginCommand {
            email: "alice@example.com".into(),
            password: Some("wrong-password".into()),
        };
        assert!(login.run(&app).await.is_err());
        assert!(app.session_file.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let dir = TempDir::new().unwrap();
        let app = test_app::open(&dir);
        signup("alice@example.com", "alice").run(&app).await.unwrap();
        LogoutCommand.run(&app).unwrap();

        LoginCommand {
            email: "ALICE@example.com ".into(),
            password: Some("secret1".into()),
        }
        .run(&app)
        .await
        .unwrap();
        assert!(app.session_file.load().unwrap().is_some());

        LogoutCommand.run(&app).unwrap();
        assert!(app.session_file.load().unwrap().is_none());
        assert!(app.sessions.current().is_none());
    }
}
