use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;

/// The shell asked for on the command line, if any.
pub fn requested_shell(cli: &Cli) -> Option<Shell> {
    if cli.bash {
        Some(Shell::Bash)
    } else if cli.zsh {
        Some(Shell::Zsh)
    } else {
        None
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
