/*!
`vault.rs`

Implements the `vault` subcommand: the browse/list view over stored
memories.

Behavior:
  - Fetches every memory (`GET /memories`) and filters client-side with
    the query filter (content substring or `date:` prefix predicate).
  - `--delete ID` removes a single memory instead of listing.
  - Output is a human table by default, or machine JSON with `--json`.

JSON output shape (list):
{
  "status": "ok",
  "query": "<query or null>",
  "count": 2,
  "memories": [ { "id": "...", "content": "...", "created_at": "..." } ]
}
*/

use anyhow::{Context, Result};
use clap::Args;

use crate::backend::Backend;
use crate::cmd::format::{Role, StyleOptions, color, emoji, table, truncate_ellipsis};
use crate::cmd::resolve_backend;
use crate::stream::filter::filter_memories;

/// CLI arguments for `memstream vault [QUERY]`.
#[derive(Args, Debug)]
pub struct VaultArgs {
    /// Filter query: content keywords, or date:YYYY-MM-DD
    pub query: Option<String>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,

    /// Delete the memory with this id instead of listing
    #[arg(long, value_name = "ID")]
    pub delete: Option<String>,

    /// Backend base URL (falls back to MEMSTREAM_BACKEND env)
    #[arg(short = 'b', long)]
    pub backend: Option<String>,
}

/// Entry point for the vault subcommand.
pub fn execute_vault(args: VaultArgs) -> Result<()> {
    let backend = resolve_backend(args.backend.as_deref())?;
    let rt = tokio::runtime::Runtime::new().context("failed to create Tokio runtime")?;
    rt.block_on(run(args, backend))
}

async fn run(args: VaultArgs, backend: Backend) -> Result<()> {
    if let Some(id) = &args.delete {
        return delete_one(&backend, id, args.json).await;
    }

    if args.json {
        let memories = backend.list_memories().await?;
        let query = args.query.as_deref().unwrap_or("");
        let matched = filter_memories(&memories, query);
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "query": args.query,
                "count": matched.len(),
                "memories": matched,
            })
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    render_vault(&backend, args.query.as_deref(), &style).await
}

/// Fetch, filter and print the vault table. Also used by the shell when a
/// `/vault` submission navigates here.
pub(crate) async fn render_vault(
    backend: &Backend,
    query: Option<&str>,
    style: &StyleOptions,
) -> Result<()> {
    let memories = backend
        .list_memories()
        .await
        .context("could not load memories")?;
    let matched = filter_memories(&memories, query.unwrap_or(""));

    println!(
        "{} {}",
        emoji("vault", style),
        color(Role::Primary, format!("Vault ({} memories)", matched.len()), style)
    );
    if let Some(q) = query
        && !q.is_empty()
    {
        println!("{}", color(Role::Dim, format!("filtering by: {q}"), style));
    }

    if matched.is_empty() {
        println!("{}", color(Role::Dim, "(no memories found)", style));
        return Ok(());
    }

    let rows: Vec<Vec<String>> = matched
        .iter()
        .enumerate()
        .map(|(idx, m)| {
            vec![
                (idx + 1).to_string(),
                m.created_at.clone(),
                truncate_ellipsis(&m.content.replace('\n', " "), 90),
                m.id.clone(),
            ]
        })
        .collect();

    println!("{}", table(&["#", "DATE", "CONTENT", "ID"], &rows, style));
    Ok(())
}

async fn delete_one(backend: &Backend, id: &str, json: bool) -> Result<()> {
    match backend.delete_memory(id).await {
        Ok(()) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({"status":"ok","deleted": id})
                );
            } else {
                let style = StyleOptions::detect();
                println!(
                    "{} {}",
                    emoji("success", &style),
                    color(Role::Success, format!("Memory {id} deleted"), &style)
                );
            }
            Ok(())
        }
        Err(e) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({"status":"error","error": e.to_string()})
                );
                Ok(())
            } else {
                Err(e)
            }
        }
    }
}
