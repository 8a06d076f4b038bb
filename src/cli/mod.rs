pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "sitecms-api")]
#[command(about = "Business-site CMS API server and admin tooling")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server (default)")]
    Serve {
        #[arg(long, help = "Bind address, overrides HOST")]
        host: Option<String>,
        #[arg(long, help = "Port, overrides PORT")]
        port: Option<u16>,
    },

    #[command(about = "Create collection tables and unique indexes in PostgreSQL")]
    Migrate,

    #[command(about = "Create a user directly in the store")]
    CreateUser {
        #[arg(long, help = "Login name")]
        username: String,
        #[arg(long, help = "Plaintext password, hashed before storing")]
        password: String,
        #[arg(long, default_value = "admin", help = "admin or editor")]
        role: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env();

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => commands::server::handle(config, host, port).await,
        Commands::Migrate => commands::migrate::handle(config, output_format).await,
        Commands::CreateUser {
            username,
            password,
            role,
        } => commands::user::handle(config, username, password, role, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["sitecms-api"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);
    }

    #[test]
    fn parses_create_user() {
        let cli = Cli::try_parse_from([
            "sitecms-api",
            "--json",
            "create-user",
            "--username",
            "root",
            "--password",
            "password123",
        ])
        .unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Some(Commands::CreateUser { username, role, .. }) => {
                assert_eq!(username, "root");
                assert_eq!(role, "admin");
            }
            _ => panic!("expected create-user"),
        }
    }
}
