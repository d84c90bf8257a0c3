use anyhow::Result;
use clap::{Parser, Subcommand};

mod backend;
mod cmd;
mod stream;
mod utils;

use cmd::{LineArgs, ShellArgs, VaultArgs};

/// memstream - one input box for your second brain
///
/// Command layout:
///   memstream shell                      interactive stream shell
///   memstream line "<text>" [--json]     dispatch a single input line
///   memstream vault [QUERY] [--json]     browse stored memories
///   memstream vault --delete <ID>        delete one memory
///
/// Input grammar (shell and line are the same):
///   /ask [question]                           ask your memories a question
///   /apikey provider=<p> key=<k> [base=<u>] [model=<m>]   configure provider
///   /vault [search text | date:YYYY-MM-DD]    open the vault, filtered
///   /help                                     show the command reference
///   anything else                             stored verbatim as a memory
///
/// Global flags / env:
///   -v / -vv            Debug / trace diagnostics (stderr)
///   -q / --quiet        Errors only
///   -b / --backend URL  Memory backend base URL
///   MEMSTREAM_BACKEND   Environment fallback if -b not provided
///                       (default http://127.0.0.1:8000)
#[derive(Parser, Debug)]
#[command(
    name = "memstream",
    version,
    author,
    about = "memstream - a single-box command shell for a personal memory stream",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error diagnostics
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Backend base URL (or MEMSTREAM_BACKEND env)
    #[arg(short = 'b', long = "backend", global = true, value_name = "URL")]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive stream shell
    Shell(ShellArgs),

    /// Dispatch a single input line and print the outcome
    Line(LineArgs),

    /// Browse (or delete from) the stored memories
    Vault(VaultArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    match cli.command {
        Commands::Shell(mut args) => {
            if args.backend.is_none() {
                args.backend = cli.backend.clone();
            }
            cmd::execute_shell(args)
        }
        Commands::Line(mut args) => {
            if args.backend.is_none() {
                args.backend = cli.backend.clone();
            }
            cmd::execute_line(args)
        }
        Commands::Vault(mut args) => {
            if args.backend.is_none() {
                args.backend = cli.backend.clone();
            }
            cmd::execute_vault(args)
        }
    }
}
