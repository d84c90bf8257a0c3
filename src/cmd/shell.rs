/*!
`shell.rs`

Implements the `shell` subcommand: the interactive stream shell.

One prompt, two behaviors: plain text is absorbed as a memory, and
/-prefixed input runs a command. Each submitted line goes through the same
classifier + dispatcher the `line` subcommand uses; this module only
renders the typed outcomes.

Loop conventions:
  - Enter submits the current line.
  - An empty line dismisses the help panel when it is open (ESC
    equivalent); otherwise it is ignored.
  - `:q` / `:quit` / Ctrl-D exit.

A `/vault` submission renders the vault view inline, carrying the filter
from the navigation target. Failures are reported and the prompt returns;
nothing here ever ends the process.
*/

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;

use crate::backend::Backend;
use crate::cmd::format::{Role, StyleOptions, color, emoji, panel};
use crate::cmd::vault::render_vault;
use crate::cmd::{COMMAND_REFERENCE, resolve_backend};
use crate::stream::dispatch::{Outcome, ShellState, dismiss, submit};
use crate::stream::{Mode, classify};

/// CLI arguments for `memstream shell`.
#[derive(Args, Debug)]
pub struct ShellArgs {
    /// Backend base URL (falls back to MEMSTREAM_BACKEND env)
    #[arg(short = 'b', long)]
    pub backend: Option<String>,
}

/// Entry point for the shell subcommand.
pub fn execute_shell(args: ShellArgs) -> Result<()> {
    let backend = resolve_backend(args.backend.as_deref())?;
    let rt = tokio::runtime::Runtime::new().context("failed to create Tokio runtime")?;
    rt.block_on(run_shell(backend))
}

async fn run_shell(backend: Backend) -> Result<()> {
    let style = StyleOptions::detect();
    print_banner(&backend, &style);

    let mut state = ShellState::new();
    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        print!("{} ", color(Role::Primary, "»", &style));
        std::io::stdout().flush().ok();

        line.clear();
        let read = stdin.lock().read_line(&mut line).context("stdin closed")?;
        if read == 0 {
            // Ctrl-D
            println!();
            break;
        }
        let input = line.trim_end_matches(['\n', '\r']);

        if matches!(input, ":q" | ":quit" | ":exit") {
            break;
        }
        if input.is_empty() {
            // Empty submit doubles as the dismiss signal for help.
            dismiss(&mut state);
            continue;
        }

        state.input = input.to_string();
        hint_mode(&state.input, &style);

        let outcome = submit(&mut state, &backend).await;
        render_outcome(outcome, &backend, &style).await;
    }

    Ok(())
}

fn print_banner(backend: &Backend, style: &StyleOptions) {
    println!(
        "{} {}",
        emoji("spark", style),
        color(Role::Primary, "memstream - what's on your mind?", style)
    );
    println!(
        "{}",
        color(
            Role::Dim,
            format!("backend {} • /help for commands • :q to quit", backend.base()),
            style
        )
    );
}

/// Echo a dim one-word mode indicator for command input, mirroring the
/// mode highlight of a richer UI.
fn hint_mode(input: &str, style: &StyleOptions) {
    let mode = classify(input).mode;
    if mode != Mode::None {
        println!("{}", color(Role::Accent, format!("[{mode}]"), style));
    }
}

async fn render_outcome(outcome: Outcome, backend: &Backend, style: &StyleOptions) {
    match outcome {
        Outcome::Stored => println!(
            "{} {}",
            emoji("success", style),
            color(Role::Success, "Memory absorbed", style)
        ),
        Outcome::Answer(answer) => {
            println!("{}", panel("Answer", &[answer], style));
        }
        Outcome::Configured => println!(
            "{} {}",
            emoji("key", style),
            color(Role::Success, "API key configured", style)
        ),
        Outcome::Navigate(target) => {
            crate::log_trace!("navigating to {}", target.to_uri());
            if let Err(e) = render_vault(backend, target.query.as_deref(), style).await {
                crate::log_debug!("vault fetch failed: {e:#}");
                println!(
                    "{} {}",
                    emoji("error", style),
                    color(Role::Error, "could not load memories", style)
                );
            }
        }
        Outcome::HelpShown => {
            let lines: Vec<String> = COMMAND_REFERENCE
                .iter()
                .map(|(cmd, desc)| format!("{cmd}  - {desc}"))
                .collect();
            println!("{}", panel("Commands", &lines, style));
            println!(
                "{}",
                color(Role::Dim, "(press Enter on an empty line to close)", style)
            );
        }
        Outcome::HelpDismissed | Outcome::Ignored => {}
        Outcome::Invalid(msg) => println!(
            "{} {}",
            emoji("warn", style),
            color(Role::Warning, msg, style)
        ),
        Outcome::Failed(msg) => println!(
            "{} {}",
            emoji("error", style),
            color(Role::Error, msg, style)
        ),
    }
}
