use clap::{Args, Subcommand};

use super::output::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => println!("{}", render(config)),
                }
                Ok(())
            }
        }
    }
}

fn render(config: &Config) -> String {
    let config_file = match &config.config_file {
        Some(path) => path.display().to_string(),
        None => format!("{} (not found)", Config::default_config_path().display()),
    };

    format!(
        "Configuration\n=============\n\nConfig file: {}\n\ndata_dir: {}\n  source: {}\n\njoin_concurrency: {}\n  source: {}",
        config_file,
        config.data_dir.value.display(),
        config.data_dir.source,
        config.join_concurrency.value,
        config.join_concurrency.source,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_render_shows_sources() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "join_concurrency: 4\n").unwrap();
        let config = Config::load(Some(path.clone())).unwrap();

        let text = render(&config);
        assert!(text.contains(&format!("Config file: {}", path.display())));
        assert!(text.contains("join_concurrency: 4\n  source: file"));
        assert!(text.contains("  source: default"));
    }
}
