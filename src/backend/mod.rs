/*!
`backend` - HTTP client for the memory store.

Fixed request contract (JSON over HTTP, single attempt, no retry):
  POST   /settings/apikey   body = populated ProviderConfig fields
  POST   /memories          body = {"content": "..."}
  GET    /memories          -> [Memory]
  DELETE /memories/{id}
  POST   /chat              body = {"query": "..."} -> {"answer": "..."}

Any 2xx status is success. On a non-2xx response the error body may carry a
`detail` string; when present it is surfaced verbatim in the returned error
so the dispatcher can show the server's own message.

Base URL resolution and validation live in `Backend::new` (http/https only),
mirroring how targets are validated before any command runs.
*/

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::stream::config::ProviderConfig;

/// Default backend when neither `--backend` nor MEMSTREAM_BACKEND is set.
pub const DEFAULT_BACKEND: &str = "http://127.0.0.1:8000";

/// A freeform text record owned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub content: String,
    /// ISO-like timestamp string; the filter layer treats it as opaque text.
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Serialize)]
struct MemoryCreate<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    answer: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Client for one memory backend. Each request owns its own cycle; the
/// client itself is cheap to clone and holds no request state.
#[derive(Debug, Clone)]
pub struct Backend {
    http: reqwest::Client,
    base: Url,
}

impl Backend {
    /// Build a client from a raw base URL string (http/https only).
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("backend URL is empty");
        }
        let base = Url::parse(trimmed)
            .with_context(|| format!("invalid backend URL: '{trimmed}'"))?;
        match base.scheme() {
            "http" | "https" => {}
            other => bail!("unsupported backend scheme '{other}' (expected http or https)"),
        }
        Ok(Backend {
            http: reqwest::Client::new(),
            base,
        })
    }

    /// The resolved base URL, without a trailing slash.
    pub fn base(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base())
    }

    /// `POST /settings/apikey` - persist provider credentials.
    pub async fn configure(&self, cfg: &ProviderConfig) -> Result<()> {
        let resp = self
            .http
            .post(self.endpoint("/settings/apikey"))
            .json(cfg)
            .send()
            .await
            .context("apikey request failed")?;
        check_success(resp, "failed to set API key").await
    }

    /// `POST /memories` - store one freeform memory (literal content).
    pub async fn create_memory(&self, content: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.endpoint("/memories"))
            .json(&MemoryCreate { content })
            .send()
            .await
            .context("memory request failed")?;
        check_success(resp, "failed to save memory").await
    }

    /// `GET /memories` - fetch every stored memory.
    pub async fn list_memories(&self) -> Result<Vec<Memory>> {
        let resp = self
            .http
            .get(self.endpoint("/memories"))
            .send()
            .await
            .context("memories request failed")?;
        if !resp.status().is_success() {
            bail!(error_message(resp, "failed to fetch memories").await);
        }
        resp.json::<Vec<Memory>>()
            .await
            .context("malformed memories response")
    }

    /// `DELETE /memories/{id}` - remove one memory.
    pub async fn delete_memory(&self, id: &str) -> Result<()> {
        let resp = self
            .http
            .delete(self.endpoint(&format!("/memories/{id}")))
            .send()
            .await
            .context("delete request failed")?;
        check_success(resp, "failed to delete memory").await
    }

    /// `POST /chat` - ask a question, returning the answer text.
    pub async fn chat(&self, query: &str) -> Result<String> {
        let resp = self
            .http
            .post(self.endpoint("/chat"))
            .json(&ChatRequest { query })
            .send()
            .await
            .context("chat request failed")?;
        if !resp.status().is_success() {
            bail!(error_message(resp, "failed to search").await);
        }
        let body: ChatResponse = resp.json().await.context("malformed chat response")?;
        Ok(body.answer)
    }
}

/// Consume a response: 2xx is Ok, otherwise an error carrying the server's
/// `detail` message when one is present.
async fn check_success(resp: reqwest::Response, fallback: &str) -> Result<()> {
    if resp.status().is_success() {
        return Ok(());
    }
    bail!(error_message(resp, fallback).await)
}

async fn error_message(resp: reqwest::Response, fallback: &str) -> String {
    let status = resp.status();
    match resp.json::<ErrorBody>().await {
        Ok(ErrorBody { detail: Some(d) }) if !d.is_empty() => d,
        _ => format!("{fallback} (HTTP {status})"),
    }
}

/* -------------------------------------------------------------------------- */
/* Test stub server                                                           */
/* -------------------------------------------------------------------------- */


#[cfg(test)]
mod tests {
    use super::testutil::StubServer;
    use super::*;

    #[test]
    fn new_rejects_non_http_schemes() {
        assert!(Backend::new("ftp://example.com").is_err());
        assert!(Backend::new("   ").is_err());
        assert!(Backend::new("http://127.0.0.1:8000").is_ok());
    }

    #[test]
    fn trailing_slash_normalized() {
        let b = Backend::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(b.base(), "http://127.0.0.1:8000");
    }

    #[tokio::test]
    async fn create_memory_posts_literal_content() {
        let stub = StubServer::spawn(200, r#"{"status":"saved"}"#).await;
        let backend = Backend::new(&stub.base).unwrap();

        backend.create_memory("  kept verbatim \n").await.unwrap();

        let hits = stub.hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].method, "POST");
        assert_eq!(hits[0].path, "/memories");
        let body: serde_json::Value = serde_json::from_str(&hits[0].body).unwrap();
        assert_eq!(body, serde_json::json!({"content": "  kept verbatim \n"}));
    }

    #[tokio::test]
    async fn chat_extracts_answer_field() {
        let stub = StubServer::spawn(200, r#"{"answer":"tuesday","context_used":2}"#).await;
        let backend = Backend::new(&stub.base).unwrap();

        let answer = backend.chat("when did I run?").await.unwrap();
        assert_eq!(answer, "tuesday");

        let hits = stub.hits();
        assert_eq!(hits[0].path, "/chat");
        let body: serde_json::Value = serde_json::from_str(&hits[0].body).unwrap();
        assert_eq!(body, serde_json::json!({"query": "when did I run?"}));
    }

    #[tokio::test]
    async fn list_memories_parses_array() {
        let stub = StubServer::spawn(
            200,
            r#"[{"id":"a","content":"x","created_at":"2024-01-05","source_type":"manual"}]"#,
        )
        .await;
        let backend = Backend::new(&stub.base).unwrap();

        let items = backend.list_memories().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[0].created_at, "2024-01-05");
    }

    #[tokio::test]
    async fn delete_targets_memory_id() {
        let stub = StubServer::spawn(200, r#"{"status":"deleted"}"#).await;
        let backend = Backend::new(&stub.base).unwrap();

        backend.delete_memory("abc-123").await.unwrap();
        let hits = stub.hits();
        assert_eq!(hits[0].method, "DELETE");
        assert_eq!(hits[0].path, "/memories/abc-123");
    }

    #[tokio::test]
    async fn non_success_surfaces_detail_verbatim() {
        let stub = StubServer::spawn(400, r#"{"detail":"Invalid OpenAI API Key format"}"#).await;
        let backend = Backend::new(&stub.base).unwrap();

        let cfg = ProviderConfig {
            api_key: "bad".to_string(),
            ..ProviderConfig::default()
        };
        let err = backend.configure(&cfg).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid OpenAI API Key format");
    }

    #[tokio::test]
    async fn non_success_without_detail_uses_fallback() {
        let stub = StubServer::spawn(500, "{}").await;
        let backend = Backend::new(&stub.base).unwrap();

        let err = backend.create_memory("x").await.unwrap_err();
        assert!(err.to_string().contains("failed to save memory"));
        assert!(err.to_string().contains("500"));
    }
}
