//! Shell completion scripts for `merge-wizard`, generated with `clap_complete`.
//!
//! ```bash
//! merge-wizard completions bash > ~/.local/share/bash-completion/completions/merge-wizard
//! merge-wizard completions zsh > ~/.zfunc/_merge-wizard
//! merge-wizard completions fish > ~/.config/fish/completions/merge-wizard.fish
//! ```

use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use merge_wizard::exit_codes;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for (bash, zsh, fish, powershell, elvish)
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `args.shell` to stdout.
pub fn execute(args: CompletionsArgs) -> Result<i32> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut stdout = io::stdout().lock();
    generate(args.shell, &mut cmd, name, &mut stdout);
    stdout.flush()?;
    Ok(exit_codes::SUCCESS)
}
