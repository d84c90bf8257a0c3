/*!
Command modules for the `memstream` CLI.

Each subcommand lives in its own file and exposes exactly one public
`execute_*` function returning `anyhow::Result<()>`:

  shell.rs   interactive stream shell (the default way in)
  line.rs    one-shot dispatch of a single input line (scripting)
  vault.rs   browse / delete stored memories
  format.rs  shared human-output helpers (no printing, returns strings)

Shared here: backend resolution (flag > MEMSTREAM_BACKEND env > default)
and the user-facing command reference rendered by `/help`.
*/

use anyhow::{Context, Result};

use crate::backend::{Backend, DEFAULT_BACKEND};

pub mod format;
pub mod line;
pub mod shell;
pub mod vault;

pub use line::{LineArgs, execute_line};
pub use shell::{ShellArgs, execute_shell};
pub use vault::{VaultArgs, execute_vault};

/// Command grammar shown by `/help`. Exact tokens; keep in sync with the
/// classifier prefixes.
pub const COMMAND_REFERENCE: [(&str, &str); 4] = [
    ("/ask [question]", "Ask your memories a question"),
    (
        "/apikey provider=<name> key=<value> [base=<url>] [model=<name>]",
        "Configure the AI provider (key=value pairs or a JSON object)",
    ),
    (
        "/vault [search text | date:YYYY-MM-DD]",
        "Browse stored memories, optionally filtered",
    ),
    ("/help", "Show this help"),
];

/// Resolve the backend base URL: explicit flag, then MEMSTREAM_BACKEND,
/// then the localhost default.
pub(crate) fn resolve_backend(flag: Option<&str>) -> Result<Backend> {
    let raw = match flag {
        Some(f) if !f.trim().is_empty() => f.to_string(),
        _ => std::env::var("MEMSTREAM_BACKEND")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
    };
    Backend::new(&raw).with_context(|| format!("cannot use backend '{raw}'"))
}
