/*!
`dispatch.rs`

Command dispatcher: one confirm action drives a small state machine
(Idle -> Submitting -> Idle) over the classified input.

Per mode:
  help      set the help flag, clear input (no request)
  vault     build a navigation target carrying the filter text (no request)
  ask       POST /chat, expose the answer
  apikey    parse + validate ProviderConfig, POST /settings/apikey
  (none)    POST /memories with the literal untrimmed text

Every failure is absorbed here and returned as a typed `Outcome`; nothing
propagates past the dispatcher and the shell stays usable after any error.
Transport detail is logged at debug level only.

Single-flight: a submission attempt while one is already in flight is
dropped (`Ignored`). Cancellation is not supported; an issued request runs
to completion and late results are the presentation layer's problem.
*/

use crate::backend::Backend;
use crate::stream::config::parse_provider_config;
use crate::stream::{Classified, Mode, classify};

/* -------------------------------------------------------------------------- */
/* State                                                                      */
/* -------------------------------------------------------------------------- */

/// Busy flag for the confirm action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
}

/// Transient, process-local shell state. Passed into and mutated by the
/// dispatcher so the core stays unit-testable without a rendering layer.
#[derive(Debug, Clone, Default)]
pub struct ShellState {
    /// Raw input text. Reset to empty after a successful mutating action.
    pub input: String,
    pub phase: Phase,
    /// Whether the help panel is displayed.
    pub help_visible: bool,
    /// Last `/ask` answer, if any.
    pub answer: Option<String>,
}

impl ShellState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for one-shot dispatch: state pre-loaded with input.
    pub fn with_input(text: impl Into<String>) -> Self {
        ShellState {
            input: text.into(),
            ..Self::default()
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Outcomes                                                                   */
/* -------------------------------------------------------------------------- */

/// Browse navigation intent: a path plus at most one query parameter
/// carrying the raw filter text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavTarget {
    pub path: String,
    /// Raw (not yet encoded) filter text.
    pub query: Option<String>,
}

impl NavTarget {
    pub fn vault(filter: Option<&str>) -> Self {
        NavTarget {
            path: "/vault".to_string(),
            query: filter.map(str::to_string),
        }
    }

    /// Render as a URI, URL-encoding the query parameter.
    pub fn to_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?q={}", self.path, urlencoding::encode(q)),
            None => self.path.clone(),
        }
    }
}

/// Typed result of one confirm (or dismiss) action, handed to the
/// presentation layer to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Freeform memory persisted; input cleared.
    Stored,
    /// `/ask` answered.
    Answer(String),
    /// Provider credentials accepted by the backend; input cleared.
    Configured,
    /// `/vault` navigation intent; input left as-is (the view changes).
    Navigate(NavTarget),
    /// Help panel turned on; input cleared.
    HelpShown,
    HelpDismissed,
    /// Nothing happened: empty submission, or one already in flight.
    Ignored,
    /// Local validation failure; no request was sent.
    Invalid(String),
    /// Transport failure or non-2xx response; state unchanged apart from
    /// the transient busy flag.
    Failed(String),
}

/* -------------------------------------------------------------------------- */
/* Dispatch                                                                   */
/* -------------------------------------------------------------------------- */

/// Dispatch the current input. Suspends at the outbound request boundary;
/// always returns with `state.phase` back at `Idle`.
pub async fn submit(state: &mut ShellState, backend: &Backend) -> Outcome {
    if state.phase == Phase::Submitting {
        return Outcome::Ignored;
    }

    let Classified { mode, argument } = classify(&state.input);

    match mode {
        Mode::Help => {
            state.help_visible = true;
            state.input.clear();
            Outcome::HelpShown
        }

        Mode::Browse => {
            let filter = (!argument.is_empty()).then_some(argument.as_str());
            Outcome::Navigate(NavTarget::vault(filter))
        }

        Mode::Ask => {
            if argument.is_empty() {
                return Outcome::Ignored;
            }
            state.answer = None;
            state.phase = Phase::Submitting;
            let outcome = match backend.chat(&argument).await {
                Ok(answer) => {
                    state.answer = Some(answer.clone());
                    Outcome::Answer(answer)
                }
                Err(e) => {
                    crate::log_debug!("chat request failed: {e:#}");
                    Outcome::Failed("search failed".to_string())
                }
            };
            state.phase = Phase::Idle;
            outcome
        }

        Mode::Configure => {
            if argument.is_empty() {
                return Outcome::Ignored;
            }
            let cfg = match parse_provider_config(&argument) {
                Ok(cfg) => cfg,
                Err(e) => return Outcome::Invalid(e.to_string()),
            };
            state.phase = Phase::Submitting;
            let outcome = match backend.configure(&cfg).await {
                Ok(()) => {
                    state.input.clear();
                    Outcome::Configured
                }
                // The backend error already carries the server `detail`
                // message when one was provided.
                Err(e) => {
                    crate::log_debug!("apikey request failed: {e:#}");
                    Outcome::Failed(e.to_string())
                }
            };
            state.phase = Phase::Idle;
            outcome
        }

        Mode::None => {
            if state.input.trim().is_empty() {
                return Outcome::Ignored;
            }
            state.answer = None;
            state.phase = Phase::Submitting;
            let outcome = match backend.create_memory(&argument).await {
                Ok(()) => {
                    state.input.clear();
                    Outcome::Stored
                }
                // Input stays intact so the user can retry.
                Err(e) => {
                    crate::log_debug!("memory request failed: {e:#}");
                    Outcome::Failed("failed to save memory".to_string())
                }
            };
            state.phase = Phase::Idle;
            outcome
        }
    }
}

/// Dismiss signal (ESC equivalent): clears the help panel when visible.
/// Has no effect on an in-flight submission.
pub fn dismiss(state: &mut ShellState) -> Outcome {
    if state.help_visible {
        state.help_visible = false;
        Outcome::HelpDismissed
    } else {
        Outcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testutil::StubServer;

    async fn stub_ok(body: &str) -> (StubServer, Backend) {
        let stub = StubServer::spawn(200, body).await;
        let backend = Backend::new(&stub.base).unwrap();
        (stub, backend)
    }

    #[tokio::test]
    async fn help_sets_flag_and_clears_input() {
        let (stub, backend) = stub_ok("{}").await;
        let mut state = ShellState::with_input("/help");
        assert_eq!(submit(&mut state, &backend).await, Outcome::HelpShown);
        assert!(state.help_visible);
        assert_eq!(state.input, "");
        assert!(stub.hits().is_empty(), "help must not touch the network");
    }

    #[tokio::test]
    async fn dismiss_clears_help_only() {
        let mut state = ShellState::new();
        assert_eq!(dismiss(&mut state), Outcome::Ignored);
        state.help_visible = true;
        assert_eq!(dismiss(&mut state), Outcome::HelpDismissed);
        assert!(!state.help_visible);
    }

    #[tokio::test]
    async fn browse_builds_encoded_nav_target() {
        let (stub, backend) = stub_ok("{}").await;
        let mut state = ShellState::with_input("/vault date:2024-03-01");
        let outcome = submit(&mut state, &backend).await;
        match outcome {
            Outcome::Navigate(target) => {
                assert_eq!(target.to_uri(), "/vault?q=date%3A2024-03-01");
                assert_eq!(target.query.as_deref(), Some("date:2024-03-01"));
            }
            other => panic!("expected Navigate, got {other:?}"),
        }
        // Navigation replaces the view; the input is not cleared.
        assert_eq!(state.input, "/vault date:2024-03-01");
        assert!(stub.hits().is_empty());
    }

    #[tokio::test]
    async fn browse_without_argument_has_no_query() {
        let (_stub, backend) = stub_ok("{}").await;
        let mut state = ShellState::with_input("/vault");
        match submit(&mut state, &backend).await {
            Outcome::Navigate(target) => assert_eq!(target.to_uri(), "/vault"),
            other => panic!("expected Navigate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_ask_is_dropped_without_request() {
        let (stub, backend) = stub_ok("{}").await;
        let mut state = ShellState::with_input("/ask   ");
        assert_eq!(submit(&mut state, &backend).await, Outcome::Ignored);
        assert!(stub.hits().is_empty());
    }

    #[tokio::test]
    async fn empty_configure_is_dropped_without_request() {
        let (stub, backend) = stub_ok("{}").await;
        let mut state = ShellState::with_input("/apikey");
        assert_eq!(submit(&mut state, &backend).await, Outcome::Ignored);
        assert!(stub.hits().is_empty());
    }

    #[tokio::test]
    async fn invalid_configure_never_reaches_network() {
        let (stub, backend) = stub_ok("{}").await;
        // Multi-token so the bare-shorthand rule does not apply.
        let mut state = ShellState::with_input("/apikey model=gpt base=b");
        assert_eq!(
            submit(&mut state, &backend).await,
            Outcome::Invalid("API key is required".to_string())
        );
        assert!(stub.hits().is_empty());

        let mut state = ShellState::with_input("/apikey {broken json");
        assert_eq!(
            submit(&mut state, &backend).await,
            Outcome::Invalid("invalid JSON config".to_string())
        );
        assert!(stub.hits().is_empty());
    }

    #[tokio::test]
    async fn configure_end_to_end() {
        let (stub, backend) = stub_ok(r#"{"status":"configured"}"#).await;
        let mut state = ShellState::with_input("/apikey provider=gemini key=abc");
        assert_eq!(submit(&mut state, &backend).await, Outcome::Configured);
        assert_eq!(state.input, "", "input clears on success");
        assert_eq!(state.phase, Phase::Idle);

        let hits = stub.hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].method, "POST");
        assert_eq!(hits[0].path, "/settings/apikey");
        let body: serde_json::Value = serde_json::from_str(&hits[0].body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"provider":"gemini","api_key":"abc"})
        );
    }

    #[tokio::test]
    async fn single_token_configure_is_bare_key_shorthand() {
        // One token is always the key itself, even when it contains `=`.
        let (stub, backend) = stub_ok(r#"{"status":"configured"}"#).await;
        let mut state = ShellState::with_input("/apikey model=gpt");
        assert_eq!(submit(&mut state, &backend).await, Outcome::Configured);

        let hits = stub.hits();
        assert_eq!(hits.len(), 1);
        let body: serde_json::Value = serde_json::from_str(&hits[0].body).unwrap();
        assert_eq!(body, serde_json::json!({"api_key":"model=gpt"}));
    }

    #[tokio::test]
    async fn configure_failure_surfaces_server_detail() {
        let stub = StubServer::spawn(400, r#"{"detail":"Unknown provider: foo"}"#).await;
        let backend = Backend::new(&stub.base).unwrap();
        let mut state = ShellState::with_input("/apikey provider=foo key=k");
        assert_eq!(
            submit(&mut state, &backend).await,
            Outcome::Failed("Unknown provider: foo".to_string())
        );
        assert_eq!(state.input, "/apikey provider=foo key=k");
        assert_eq!(state.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn memory_success_clears_input() {
        let (stub, backend) = stub_ok(r#"{"status":"saved"}"#).await;
        let mut state = ShellState::with_input("had coffee today");
        state.answer = Some("stale".to_string());

        assert_eq!(submit(&mut state, &backend).await, Outcome::Stored);
        assert_eq!(state.input, "");
        assert_eq!(state.answer, None, "stored memory clears the answer pane");

        let hits = stub.hits();
        assert_eq!(hits[0].path, "/memories");
        let body: serde_json::Value = serde_json::from_str(&hits[0].body).unwrap();
        assert_eq!(body, serde_json::json!({"content":"had coffee today"}));
    }

    #[tokio::test]
    async fn memory_failure_keeps_input_for_retry() {
        let stub = StubServer::spawn(500, "{}").await;
        let backend = Backend::new(&stub.base).unwrap();
        let mut state = ShellState::with_input("do not lose me");
        assert_eq!(
            submit(&mut state, &backend).await,
            Outcome::Failed("failed to save memory".to_string())
        );
        assert_eq!(state.input, "do not lose me");
        assert_eq!(state.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn whitespace_memory_is_dropped() {
        let (stub, backend) = stub_ok("{}").await;
        let mut state = ShellState::with_input("   \n  ");
        assert_eq!(submit(&mut state, &backend).await, Outcome::Ignored);
        assert!(stub.hits().is_empty());
    }

    #[tokio::test]
    async fn ask_success_exposes_answer() {
        let (stub, backend) = stub_ok(r#"{"answer":"coffee at 8am"}"#).await;
        let mut state = ShellState::with_input("/ask when was coffee?");
        assert_eq!(
            submit(&mut state, &backend).await,
            Outcome::Answer("coffee at 8am".to_string())
        );
        assert_eq!(state.answer.as_deref(), Some("coffee at 8am"));
        let body: serde_json::Value = serde_json::from_str(&stub.hits()[0].body).unwrap();
        assert_eq!(body, serde_json::json!({"query":"when was coffee?"}));
    }

    #[tokio::test]
    async fn ask_failure_clears_answer() {
        let stub = StubServer::spawn(500, "{}").await;
        let backend = Backend::new(&stub.base).unwrap();
        let mut state = ShellState::with_input("/ask anything");
        state.answer = Some("previous".to_string());
        assert_eq!(
            submit(&mut state, &backend).await,
            Outcome::Failed("search failed".to_string())
        );
        assert_eq!(state.answer, None);
        assert_eq!(state.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn in_flight_submission_drops_new_attempt() {
        let (stub, backend) = stub_ok("{}").await;
        let mut state = ShellState::with_input("anything at all");
        state.phase = Phase::Submitting;
        assert_eq!(submit(&mut state, &backend).await, Outcome::Ignored);
        assert!(stub.hits().is_empty());
        // The dropped attempt must not flip the busy flag off.
        assert_eq!(state.phase, Phase::Submitting);
    }
}
