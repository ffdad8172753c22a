use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mm-pipe")]
#[command(version, about = "Send or pipe messages to Mattermost")]
pub struct Cli {
    /// Path to config file
    #[arg(long, default_value = "~/.mm-pipe.conf")]
    pub config: String,

    /// Configuration instance to use
    #[arg(long, default_value = "default")]
    pub instance: String,

    /// Mattermost server URL (overrides config)
    #[arg(long)]
    pub server_url: Option<String>,

    /// Mattermost access token (overrides config)
    #[arg(long)]
    pub token: Option<String>,

    /// User to send a direct message to
    #[arg(short, long)]
    pub user: Option<String>,

    /// Channel to send the message to
    #[arg(short, long)]
    pub channel: Option<String>,

    /// List available users
    #[arg(long)]
    pub list_users: bool,

    /// List available channels
    #[arg(long)]
    pub list_channels: bool,

    /// Attach this file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Message to send
    #[arg(short, long, default_value = "")]
    pub message: String,

    /// Syntax highlighting for piped text: auto, no, or a language (e.g.
    /// python); on its own means auto [default: auto_highlight from config]
    #[arg(long, value_name = "MODE", num_args = 0..=1, default_missing_value = "auto")]
    pub highlight: Option<String>,

    /// Attach piped text as a file when the message would be longer than this
    /// [default: max_message_length from config, or 4000]
    #[arg(long, value_name = "CHARS")]
    pub max_length: Option<usize>,

    /// Output bash completion script
    #[arg(long, conflicts_with = "zsh")]
    pub bash: bool,

    /// Output zsh completion script
    #[arg(long)]
    pub zsh: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_highlight_means_auto() {
        let cli = Cli::parse_from(["mm-pipe", "-c", "dev", "--highlight"]);
        assert_eq!(cli.highlight.as_deref(), Some("auto"));

        let cli = Cli::parse_from(["mm-pipe", "-c", "dev", "--highlight", "rust"]);
        assert_eq!(cli.highlight.as_deref(), Some("rust"));

        let cli = Cli::parse_from(["mm-pipe", "-c", "dev"]);
        assert_eq!(cli.highlight, None);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["mm-pipe", "-u", "alice"]);
        assert_eq!(cli.config, "~/.mm-pipe.conf");
        assert_eq!(cli.instance, "default");
        assert_eq!(cli.message, "");
        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert_eq!(cli.channel, None);
    }
}
