/*!
`line.rs`

Implements the `line` subcommand: dispatch exactly one input line the same
way the interactive shell would, then print the outcome and exit. Meant
for scripting and quick captures (`memstream line "note to self"`).

JSON output shapes:
  ok:    {"status":"ok","outcome":"stored|configured|answer|navigate|help|ignored", ...}
  error: {"status":"error","outcome":"invalid|failed","error":"message"}

The process exits 0 in every case the dispatcher handled; only CLI-level
problems (bad backend URL) are real errors.
*/

use anyhow::{Context, Result};
use clap::Args;

use crate::backend::Backend;
use crate::cmd::format::{Role, StyleOptions, color, emoji};
use crate::cmd::{COMMAND_REFERENCE, resolve_backend};
use crate::stream::dispatch::{Outcome, ShellState, submit};

/// CLI arguments for `memstream line <TEXT>`.
#[derive(Args, Debug)]
pub struct LineArgs {
    /// The input line (memory text or a /-prefixed command)
    pub text: String,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,

    /// Backend base URL (falls back to MEMSTREAM_BACKEND env)
    #[arg(short = 'b', long)]
    pub backend: Option<String>,
}

/// Entry point for the line subcommand.
pub fn execute_line(args: LineArgs) -> Result<()> {
    let backend = resolve_backend(args.backend.as_deref())?;
    let rt = tokio::runtime::Runtime::new().context("failed to create Tokio runtime")?;
    rt.block_on(run(args, backend))
}

async fn run(args: LineArgs, backend: Backend) -> Result<()> {
    let mut state = ShellState::with_input(&args.text);
    let outcome = submit(&mut state, &backend).await;

    if args.json {
        println!("{}", outcome_json(&outcome));
        return Ok(());
    }

    let style = StyleOptions::detect();
    match outcome {
        Outcome::Stored => println!(
            "{} {}",
            emoji("success", &style),
            color(Role::Success, "Memory absorbed", &style)
        ),
        Outcome::Answer(answer) => println!("{answer}"),
        Outcome::Configured => println!(
            "{} {}",
            emoji("key", &style),
            color(Role::Success, "API key configured", &style)
        ),
        Outcome::Navigate(target) => {
            // One-shot mode has no view to swap in; print the target so
            // callers can follow it (e.g. `memstream vault <query>`).
            println!("{}", target.to_uri());
        }
        Outcome::HelpShown => {
            for (cmd, desc) in COMMAND_REFERENCE {
                println!("{:<62} {}", cmd, color(Role::Dim, desc, &style));
            }
        }
        Outcome::HelpDismissed | Outcome::Ignored => {
            println!("{}", color(Role::Dim, "(nothing to do)", &style));
        }
        Outcome::Invalid(msg) | Outcome::Failed(msg) => println!(
            "{} {}",
            emoji("error", &style),
            color(Role::Error, msg, &style)
        ),
    }
    Ok(())
}

fn outcome_json(outcome: &Outcome) -> serde_json::Value {
    match outcome {
        Outcome::Stored => serde_json::json!({"status":"ok","outcome":"stored"}),
        Outcome::Answer(answer) => {
            serde_json::json!({"status":"ok","outcome":"answer","answer":answer})
        }
        Outcome::Configured => serde_json::json!({"status":"ok","outcome":"configured"}),
        Outcome::Navigate(target) => {
            serde_json::json!({"status":"ok","outcome":"navigate","target":target.to_uri()})
        }
        Outcome::HelpShown => {
            let commands: Vec<serde_json::Value> = COMMAND_REFERENCE
                .iter()
                .map(|(cmd, desc)| serde_json::json!({"cmd":cmd,"desc":desc}))
                .collect();
            serde_json::json!({"status":"ok","outcome":"help","commands":commands})
        }
        Outcome::HelpDismissed | Outcome::Ignored => {
            serde_json::json!({"status":"ok","outcome":"ignored"})
        }
        Outcome::Invalid(msg) => {
            serde_json::json!({"status":"error","outcome":"invalid","error":msg})
        }
        Outcome::Failed(msg) => {
            serde_json::json!({"status":"error","outcome":"failed","error":msg})
        }
    }
}
