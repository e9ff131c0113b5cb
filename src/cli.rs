use clap::{Parser, Subcommand};

/// Slack approval bot: request, approve, notify
#[derive(Parser)]
#[command(name = "approval-bot", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the bot's HTTP listener (the default)
    Serve {
        /// Port to bind; overrides PORT
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the request modal's view JSON
    Modal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["approval-bot"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_port_override() {
        let cli = Cli::try_parse_from(["approval-bot", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Some(Commands::Serve { port }) => assert_eq!(port, Some(8080)),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_serve_without_port() {
        let cli = Cli::try_parse_from(["approval-bot", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: None })));
    }
}
