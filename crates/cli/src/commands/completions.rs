// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell completion scripts, written to the caller's stream so tests can
//! capture them.
//!
//! ```bash
//! kup completions bash > ~/.local/share/bash-completion/completions/kup
//! kup completions zsh > ~/.zfunc/_kup
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io;

/// Emit the completion script for `shell`. The binary name comes from the
/// clap command definition rather than being repeated here.
pub fn generate_completions<C: CommandFactory>(shell: Shell, out: &mut impl io::Write) {
    let mut cmd = C::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}

/// Arguments for the completions command.
#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
